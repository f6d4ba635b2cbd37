//! External interrupt stress test.
//!
//! After a short warm-up the program waits for interrupt and then spins. The
//! testbench keeps raising the machine external interrupt; every one is
//! reported and acknowledged, and the trap path halts the run on the 20th.

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

        fn spin() -> ! {
            loop {
                core::hint::spin_loop();
            }
        }
    } else {
        fn writes<const N: usize>(text: &WordStr<N>) {
            print!("{}", String::from_utf8_lossy(text.as_bytes()));
        }

        fn writex(value: u32) {
            print!("{value:08X}");
        }

        // Nothing raises interrupts on the host.
        fn spin() -> ! {
            std::process::exit(0)
        }
    }
}

fn wait_for_interrupt() {
    #[cfg(target_arch = "riscv32")]
    unsafe {
        core::arch::asm!("wfi");
    }
}

#[cfg(feature = "program-hooks")]
mod hooks {
    use foundation::wstr;

    #[no_mangle]
    extern "C" fn merlin_service_call(epc: u32, _tval: u32) {
        super::writes(wstr!("[ecall @ "));
        super::writex(epc);
        super::writes(wstr!("]\n"));
    }

    #[no_mangle]
    extern "C" fn merlin_external_interrupt(_epc: u32, _tval: u32, count: u32) {
        super::writes(wstr!("[irq "));
        super::writex(count);
        super::writes(wstr!("]\n"));
    }
}

#[no_mangle]
fn main() -> ! {
    debug::writeln!("[interrupt-stress] main");

    for j in 0..4 {
        for _ in 0..j {
            writes(wstr!("Hello World!\n"));
        }
    }

    wait_for_interrupt();

    writes(wstr!("From the Merlin RV32I test program\n"));
    writex(0x027A_7FE4);
    writes(wstr!("\nEntering a \"while (1)\".\n"));

    spin()
}
