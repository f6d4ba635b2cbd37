//! Console and service call smoke test.
//!
//! Prints through the word-granular console driver, traps once with `ecall`
//! and halts. Expected console output ends with the service call report
//! followed by the banner and `027A7FE4`.

#![cfg_attr(target_os = "none", no_std)]
#![no_main]

use foundation::{wstr, WordStr};

cfg_if::cfg_if! {
    if #[cfg(target_os = "none")] {
        fn writes<const N: usize>(text: &WordStr<N>) {
            platform::console().write_str(text);
        }

        fn writex(value: u32) {
            platform::console().write_hex(value);
        }

        fn exit(code: u32) -> ! {
            platform::exit(code)
        }
    } else {
        fn writes<const N: usize>(text: &WordStr<N>) {
            print!("{}", String::from_utf8_lossy(text.as_bytes()));
        }

        fn writex(value: u32) {
            print!("{value:08X}");
        }

        fn exit(code: u32) -> ! {
            std::process::exit(code as i32)
        }
    }
}

fn service_call() {
    #[cfg(target_arch = "riscv32")]
    unsafe {
        core::arch::asm!("ecall");
    }
}

#[no_mangle]
fn main() -> ! {
    debug::writeln!("[hello-world] main");

    for j in 0..4 {
        for _ in 0..j {
            writes(wstr!("Hello World!\n"));
        }
    }

    service_call();

    writes(wstr!("From the Merlin RV32I test program\n"));
    writex(0x027A_7FE4);
    writes(wstr!("\n"));

    exit(platform::EXIT_SUCCESS)
}
