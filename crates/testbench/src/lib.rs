//! Memory-mapped registers of the Merlin RV32I testbench.
//!
//! All three registers are write-only words. A store to the console register
//! emits its low byte, a store to the acknowledge register clears the pending
//! external interrupt, and any store to the halt register ends the run.

#![no_std]

use core::ptr;

use foundation::DeviceRegisters;

/// Value stored to the acknowledge register.
pub const ACK: u32 = 1;

pub const EXIT_SUCCESS: u32 = 0;
pub const EXIT_FAILURE: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceMap {
    pub console: usize,
    pub interrupt_ack: usize,
    pub halt: usize,
}

impl DeviceMap {
    pub const MERLIN: Self = Self {
        console: 0x8000_0000,
        interrupt_ack: 0x0000_0004,
        halt: 0xFFFF_FFFC,
    };
}

/// Handle on a [`DeviceMap`] that performs real volatile stores.
#[derive(Clone, Copy, Debug)]
pub struct Mmio {
    map: DeviceMap,
}

impl Mmio {
    /// The testbench registers. Only exists in builds for the Merlin hart.
    #[cfg(target_os = "none")]
    pub const MERLIN: Self = Self {
        map: DeviceMap::MERLIN,
    };

    /// # Safety
    /// Each address in `map` must be valid for aligned 32-bit volatile stores
    /// for as long as the handle is used.
    pub const unsafe fn new(map: DeviceMap) -> Self {
        Self { map }
    }

    #[inline(always)]
    fn store(addr: usize, value: u32) {
        unsafe { ptr::write_volatile(addr as *mut u32, value) }
    }
}

impl DeviceRegisters for Mmio {
    #[inline]
    fn write_console(&self, byte: u8) {
        Self::store(self.map.console, u32::from(byte));
    }

    #[inline]
    fn acknowledge_interrupt(&self) {
        Self::store(self.map.interrupt_ack, ACK);
    }

    #[inline]
    fn halt(&self, code: u32) {
        Self::store(self.map.halt, code);
    }
}

/// Write the halt register and wait for the testbench to stop the hart.
#[cfg(target_os = "none")]
pub fn exit(code: u32) -> ! {
    Mmio::MERLIN.halt(code);
    loop {
        core::hint::spin_loop();
    }
}
