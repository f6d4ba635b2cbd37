//! Trap frame layout and the trap entry path.
//!
//! Platforms MUST provide `trap_handler(frame: *mut TrapFrame)`; this module
//! only provides the vector and the save/restore trampoline around it.

use cfg_if::cfg_if;
use memoffset::offset_of;

use crate::regs::Reg;

/// The interrupted program's register file, x1..x31 in architectural order.
///
/// One word per register at `4 * (n - 1)` for xn, padded to the 16-byte
/// stack alignment the calling convention requires.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrapFrame {
    pub ra: u32,
    pub sp: u32,
    pub gp: u32,
    pub tp: u32,
    pub t0: u32,
    pub t1: u32,
    pub t2: u32,
    pub s0: u32,
    pub s1: u32,
    pub a0: u32,
    pub a1: u32,
    pub a2: u32,
    pub a3: u32,
    pub a4: u32,
    pub a5: u32,
    pub a6: u32,
    pub a7: u32,
    pub s2: u32,
    pub s3: u32,
    pub s4: u32,
    pub s5: u32,
    pub s6: u32,
    pub s7: u32,
    pub s8: u32,
    pub s9: u32,
    pub s10: u32,
    pub s11: u32,
    pub t3: u32,
    pub t4: u32,
    pub t5: u32,
    pub t6: u32,
}

pub const FRAME_SIZE: usize = core::mem::size_of::<TrapFrame>();

macro_rules! frame_slots {
    ($($reg:ident => $field:ident),+ $(,)?) => {
        impl TrapFrame {
            #[inline]
            pub fn get(&self, reg: Reg) -> u32 {
                match reg {
                    $(Reg::$reg => self.$field,)+
                }
            }

            #[inline]
            pub fn set(&mut self, reg: Reg, value: u32) {
                match reg {
                    $(Reg::$reg => self.$field = value,)+
                }
            }

            /// Byte offset of `reg`'s slot, as used by the trampoline.
            pub const fn offset_of(reg: Reg) -> usize {
                match reg {
                    $(Reg::$reg => offset_of!(TrapFrame, $field),)+
                }
            }
        }
    };
}

frame_slots! {
    Ra => ra, Sp => sp, Gp => gp, Tp => tp,
    T0 => t0, T1 => t1, T2 => t2,
    S0 => s0, S1 => s1,
    A0 => a0, A1 => a1, A2 => a2, A3 => a3, A4 => a4, A5 => a5, A6 => a6, A7 => a7,
    S2 => s2, S3 => s3, S4 => s4, S5 => s5, S6 => s6, S7 => s7, S8 => s8, S9 => s9,
    S10 => s10, S11 => s11,
    T3 => t3, T4 => t4, T5 => t5, T6 => t6,
}

cfg_if! {
    if #[cfg(target_arch = "riscv32")] {
        use core::arch::global_asm;

        use foundation::TrapCsrs;
        use riscv::register::{mcause, mepc, mtval};

        mod imp {
            use merlin_macros::trap_trampoline;

            /// # Safety
            /// Trap entry point; must only be reached through `_trap_vector`
            /// with `mscratch` holding the trap stack pointer.
            #[cfg(not(feature = "caller-saved"))]
            #[unsafe(naked)]
            #[no_mangle]
            #[link_section = ".text.trap"]
            pub unsafe extern "C" fn _trap_trampoline() {
                full_save_set!(trap_trampoline!(
                    frame: crate::trap::TrapFrame,
                    store: "sw",
                    load: "lw",
                    handler: crate::trap_handler,
                    preserve:
                ))
            }

            /// # Safety
            /// Trap entry point; must only be reached through `_trap_vector`
            /// with `mscratch` holding the trap stack pointer.
            #[cfg(feature = "caller-saved")]
            #[unsafe(naked)]
            #[no_mangle]
            #[link_section = ".text.trap"]
            pub unsafe extern "C" fn _trap_trampoline() {
                caller_saved_set!(trap_trampoline!(
                    frame: crate::trap::TrapFrame,
                    store: "sw",
                    load: "lw",
                    handler: crate::trap_handler,
                    preserve:
                ))
            }
        }

        pub use imp::_trap_trampoline;

        // Direct-mode mtvec needs a 4-byte aligned target.
        global_asm!(
            ".pushsection .text.trap, \"ax\", @progbits",
            ".balign 4",
            ".globl _trap_vector",
            ".type  _trap_vector, @function",
            "_trap_vector:",
            "   j       {trampoline}",
            ".popsection",
            trampoline = sym imp::_trap_trampoline,
        );

        /// The trap control registers of the running hart.
        pub struct MachineCsrs {
            _private: (),
        }

        impl MachineCsrs {
            /// # Safety
            /// Only meaningful in trap context, before `mret`.
            #[inline]
            pub unsafe fn new() -> Self {
                Self { _private: () }
            }
        }

        impl TrapCsrs for MachineCsrs {
            #[inline]
            fn cause(&self) -> u32 {
                mcause::read().bits() as u32
            }

            #[inline]
            fn resume_address(&self) -> u32 {
                mepc::read() as u32
            }

            #[inline]
            #[allow(unused_unsafe)]
            fn set_resume_address(&mut self, addr: u32) {
                unsafe { mepc::write(addr as usize) }
            }

            #[inline]
            fn trap_value(&self) -> u32 {
                mtval::read() as u32
            }
        }

        /// Stop making progress, for good. Interrupts stay masked in trap
        /// context, so nothing runs after this.
        #[allow(unused_unsafe)]
        pub fn park() -> ! {
            loop {
                unsafe { riscv::asm::wfi() };
            }
        }
    }
}
