//! Compile-time configuration of the boot path and the trap policy.
//!
//! Both configurations are checked with `const fn validate`, so a bad
//! combination fails the build instead of misbehaving on the hart.

use core::fmt;

use crate::csr::{INSTRUCTION_BYTES, MIE_MEIE, MSTATUS_MIE};

/// Stack alignment the RISC-V calling convention requires at every call.
pub const STACK_ALIGN: u32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BootConfig {
    /// Initial trap-mode stack pointer, parked in `mscratch`.
    pub trap_stack_top: u32,
    /// Initial program stack pointer.
    pub stack_top: u32,
    /// Bits set in `mie`.
    pub mie: u32,
    /// Bits set in `mstatus` once everything else is in place.
    pub mstatus: u32,
}

impl BootConfig {
    /// 64 KiB of RAM: the program stack grows down from 32 KiB, the trap
    /// stack from the end of RAM.
    pub const MERLIN: Self = Self {
        trap_stack_top: 0x0001_0000,
        stack_top: 0x0000_8000,
        mie: MIE_MEIE,
        mstatus: MSTATUS_MIE,
    };

    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.trap_stack_top % STACK_ALIGN != 0 {
            return Err(ConfigError::MisalignedStack {
                top: self.trap_stack_top,
            });
        }
        if self.stack_top % STACK_ALIGN != 0 {
            return Err(ConfigError::MisalignedStack {
                top: self.stack_top,
            });
        }
        if self.trap_stack_top == self.stack_top {
            return Err(ConfigError::SharedStack);
        }
        Ok(())
    }
}

/// Where execution continues after a trap is handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resume {
    /// The instruction after the trapping one.
    Next,
    /// The trapping instruction itself.
    Same,
}

impl Resume {
    #[inline]
    pub const fn apply(self, epc: u32) -> u32 {
        match self {
            Self::Next => epc.wrapping_add(INSTRUCTION_BYTES),
            Self::Same => epc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrapConfig {
    pub service_call: Resume,
    pub external_interrupt: Resume,
    /// Occurrence number of the first external interrupt.
    pub first_count: u32,
    /// The external interrupt with this occurrence number ends the run.
    pub interrupt_limit: u32,
    /// Value written to the halt register when the limit is reached.
    pub halt_code: u32,
}

impl TrapConfig {
    pub const MERLIN: Self = Self {
        service_call: Resume::Next,
        external_interrupt: Resume::Same,
        first_count: 1,
        interrupt_limit: 20,
        halt_code: 0,
    };

    pub const fn validate(&self) -> Result<(), ConfigError> {
        // The interrupted instruction has not executed yet.
        if let Resume::Next = self.external_interrupt {
            return Err(ConfigError::AdvancingInterrupt);
        }
        if self.interrupt_limit < self.first_count {
            return Err(ConfigError::LimitBelowFirstCount {
                first: self.first_count,
                limit: self.interrupt_limit,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    MisalignedStack { top: u32 },
    SharedStack,
    AdvancingInterrupt,
    LimitBelowFirstCount { first: u32, limit: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MisalignedStack { top } => {
                write!(f, "stack top {top:#010x} is not {STACK_ALIGN}-byte aligned")
            }
            Self::SharedStack => f.write_str("trap stack and program stack share a top address"),
            Self::AdvancingInterrupt => {
                f.write_str("external interrupts must resume at the interrupted instruction")
            }
            Self::LimitBelowFirstCount { first, limit } => write!(
                f,
                "interrupt limit {limit} is below the first occurrence number {first}"
            ),
        }
    }
}
