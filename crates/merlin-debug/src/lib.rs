//! Trace output for debug builds.
//!
//! With the `debug` feature off, `write!`/`writeln!` expand to code that only
//! type-checks its arguments. With it on, the formatted text is handed to
//! `__debug_write`, which the platform must export.

#![no_std]

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "debug")] {
        use core::fmt;

        extern "C" {
            fn __debug_write(bytes: *const u8, len: usize);
        }

        pub struct DebugWriter;

        impl fmt::Write for DebugWriter {
            fn write_str(&mut self, s: &str) -> fmt::Result {
                unsafe { __debug_write(s.as_ptr(), s.len()) };
                Ok(())
            }
        }

        #[doc(hidden)]
        pub fn __write_fmt(args: fmt::Arguments<'_>) {
            let _ = fmt::Write::write_fmt(&mut DebugWriter, args);
        }

        #[macro_export]
        macro_rules! write {
            ($($arg:tt)+) => {
                $crate::__write_fmt(::core::format_args!($($arg)+))
            };
        }

        #[macro_export]
        macro_rules! writeln {
            () => {
                $crate::__write_fmt(::core::format_args!("\n"))
            };
            ($fmt:literal $($arg:tt)*) => {
                $crate::__write_fmt(::core::format_args!(::core::concat!($fmt, "\n") $($arg)*))
            };
        }
    } else {
        #[macro_export]
        macro_rules! write {
            ($($arg:tt)+) => {
                if false {
                    let _ = ::core::format_args!($($arg)+);
                }
            };
        }

        #[macro_export]
        macro_rules! writeln {
            () => {};
            ($fmt:literal $($arg:tt)*) => {
                if false {
                    let _ = ::core::format_args!($fmt $($arg)*);
                }
            };
        }
    }
}
