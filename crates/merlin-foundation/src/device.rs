/// The testbench's write-only peripheral surface.
///
/// Every call is exactly one device store. Implementations never read these
/// registers back.
pub trait DeviceRegisters {
    /// Emit one byte on the test console.
    fn write_console(&self, byte: u8);
    /// Clear the pending external interrupt source.
    fn acknowledge_interrupt(&self);
    /// End the simulated run.
    fn halt(&self, code: u32);
}

impl<D: DeviceRegisters + ?Sized> DeviceRegisters for &D {
    #[inline]
    fn write_console(&self, byte: u8) {
        (**self).write_console(byte)
    }

    #[inline]
    fn acknowledge_interrupt(&self) {
        (**self).acknowledge_interrupt()
    }

    #[inline]
    fn halt(&self, code: u32) {
        (**self).halt(code)
    }
}

/// Memory as seen by the console driver's read path: whole aligned words only.
pub trait WordMemory {
    /// `addr` is always a multiple of 4.
    fn load_word(&self, addr: usize) -> u32;
}

impl<M: WordMemory + ?Sized> WordMemory for &M {
    #[inline]
    fn load_word(&self, addr: usize) -> u32 {
        (**self).load_word(addr)
    }
}

/// Plain loads from the address space the code runs in.
#[derive(Clone, Copy, Debug)]
pub struct DirectMemory {
    _private: (),
}

impl DirectMemory {
    /// # Safety
    /// Every word later loaded through this handle must be readable. For the
    /// console driver that means the whole aligned span of each string, up to
    /// and including the word holding its NUL terminator.
    #[inline]
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl WordMemory for DirectMemory {
    #[inline]
    fn load_word(&self, addr: usize) -> u32 {
        debug_assert!(addr & 0x3 == 0);
        unsafe { core::ptr::read_volatile(addr as *const u32) }
    }
}
