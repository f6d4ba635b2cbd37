//! Machine-mode control/status register definitions.

/// Set in `mcause` when the trap was an interrupt.
pub const MCAUSE_INTERRUPT: u32 = 1 << 31;

/// Environment call from M-mode.
pub const CAUSE_MACHINE_ECALL: u32 = 11;

/// Machine external interrupt.
pub const CAUSE_MACHINE_EXTERNAL: u32 = MCAUSE_INTERRUPT | 11;

pub const MIE_MEIE: u32 = 1 << 11;

pub const MSTATUS_MIE: u32 = 1 << 3;

/// RV32I has no compressed encodings, every instruction is one word.
pub const INSTRUCTION_BYTES: u32 = 4;

/// The trap control state the hardware latches on trap entry.
pub trait TrapCsrs {
    /// `mcause`
    fn cause(&self) -> u32;
    /// `mepc`
    fn resume_address(&self) -> u32;
    fn set_resume_address(&mut self, addr: u32);
    /// `mtval`
    fn trap_value(&self) -> u32;
}

/// Snapshot of [`TrapCsrs`], taken once at the start of dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrapInfo {
    pub cause: u32,
    pub epc: u32,
    pub tval: u32,
}

impl TrapInfo {
    #[inline]
    pub fn latch<C: TrapCsrs + ?Sized>(csrs: &C) -> Self {
        Self {
            cause: csrs.cause(),
            epc: csrs.resume_address(),
            tval: csrs.trap_value(),
        }
    }
}
