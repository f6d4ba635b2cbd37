//! RV32I machine-mode support: reset entry, the trap vector and trampoline,
//! and the frame the trampoline saves.
//!
//! Platforms MUST provide `trap_handler(frame: *mut TrapFrame)`, which the
//! trampoline calls with the register file of the interrupted program saved
//! in `*frame`. Programs MUST provide `main`, which the boot code jumps to.

#![no_std]

use cfg_if::cfg_if;

#[macro_use]
pub mod regs;
pub mod trap;

#[cfg(test)]
pub mod model;

cfg_if! {
    if #[cfg(target_arch = "riscv32")] {
        pub mod boot;

        pub use boot::_entry;
        pub use trap::{park, MachineCsrs, _trap_trampoline};
    }
}

extern "C" {
    // Trap dispatch glue called by the trampoline.
    pub fn trap_handler(frame: *mut TrapFrame);
}

pub use regs::{Reg, SaveSet};
pub use trap::TrapFrame;
