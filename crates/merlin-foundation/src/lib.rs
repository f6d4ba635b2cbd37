//! Hardware-independent core of the Merlin trap runtime.
//!
//! Everything here is written against the [`DeviceRegisters`], [`WordMemory`]
//! and [`TrapCsrs`] traits so it runs unchanged on the hart and in host tests.

#![no_std]

#[cfg(any(test, feature = "testing"))]
extern crate alloc;

pub mod cause;
pub mod config;
pub mod console;
pub mod csr;
pub mod device;
pub mod dispatch;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cause::TrapCause;
pub use config::{BootConfig, ConfigError, Resume, TrapConfig};
pub use console::{Console, ConsoleWriter, WordStr};
pub use csr::{TrapCsrs, TrapInfo};
pub use device::{DeviceRegisters, DirectMemory, WordMemory};
pub use dispatch::{Dispatcher, Disposition, InterruptCounter, Reporter, TrapHooks};
