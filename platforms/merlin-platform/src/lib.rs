//! Merlin testbench platform.
//!
//! Binds the hardware-independent runtime to the testbench: the console and
//! halt registers, the `trap_handler` the trampoline calls, the debug output
//! hook and the panic handler. Everything here stores to fixed device
//! addresses, so it only exists in builds for the hart (`target_os = "none"`).

#![no_std]

pub use testbench::{EXIT_FAILURE, EXIT_SUCCESS};

#[cfg(target_os = "none")]
mod hart;

#[cfg(target_os = "none")]
pub use hart::*;
