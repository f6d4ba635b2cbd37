use core::fmt;

use foundation::{Console, ConsoleWriter, DirectMemory};
use testbench::Mmio;

pub use testbench::exit;

#[cfg(target_arch = "riscv32")]
mod trap;

/// The console driver over the testbench registers and the hart's RAM.
pub fn console() -> Console<Mmio, DirectMemory> {
    // All of RAM is readable, so any string the program holds is.
    Console::new(Mmio::MERLIN, unsafe { DirectMemory::new() })
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments<'_>) {
    let _ = fmt::Write::write_fmt(&mut ConsoleWriter(Mmio::MERLIN), args);
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::_print(::core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! println {
    () => {
        $crate::print!("\n")
    };
    ($fmt:literal $($arg:tt)*) => {
        $crate::_print(::core::format_args!(::core::concat!($fmt, "\n") $($arg)*))
    };
}

/// # Safety
/// `bytes` must point to `len` readable bytes.
#[cfg(feature = "debug")]
#[no_mangle]
pub unsafe extern "C" fn __debug_write(bytes: *const u8, len: usize) {
    let bytes = unsafe { core::slice::from_raw_parts(bytes, len) };
    for &byte in bytes {
        foundation::DeviceRegisters::write_console(&Mmio::MERLIN, byte);
    }
}

#[panic_handler]
#[allow(unused_unsafe)]
fn panic(info: &core::panic::PanicInfo<'_>) -> ! {
    // A trap arriving mid-report would interleave with it.
    unsafe { riscv::register::mstatus::clear_mie() };
    _print(format_args!("<\nPanic: {}\n>", info));
    exit(crate::EXIT_FAILURE)
}
