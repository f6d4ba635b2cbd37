use riscv::register::mcause::{Exception, Interrupt, Trap};

use crate::csr::{CAUSE_MACHINE_ECALL, CAUSE_MACHINE_EXTERNAL, MCAUSE_INTERRUPT};

/// What a trap means to the runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrapCause {
    /// `ecall` from M-mode.
    ServiceCall,
    /// Machine external interrupt.
    ExternalInterrupt,
    /// Anything else. Never resumed.
    Fault(Trap),
}

impl TrapCause {
    /// The only place raw `mcause` values are interpreted.
    #[inline]
    pub fn decode(mcause: u32) -> Self {
        match mcause {
            CAUSE_MACHINE_ECALL => Self::ServiceCall,
            CAUSE_MACHINE_EXTERNAL => Self::ExternalInterrupt,
            raw => Self::Fault(decode_trap(raw)),
        }
    }
}

/// `mcause` as the architectural interrupt or exception it encodes.
#[inline]
pub fn decode_trap(mcause: u32) -> Trap {
    let code = (mcause & !MCAUSE_INTERRUPT) as usize;
    if mcause & MCAUSE_INTERRUPT != 0 {
        Trap::Interrupt(Interrupt::from(code))
    } else {
        Trap::Exception(Exception::from(code))
    }
}
