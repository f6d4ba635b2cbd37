//! Fatal trap test.
//!
//! Loads a word from an odd address. The trap path prints the exception
//! report (cause 4, the `lw` address as epc, the bad address as mtval) and
//! parks the hart without writing the halt register, so the testbench run
//! ends on its own timeout. Nothing after the load may reach the console.

#![cfg_attr(target_os = "none", no_std)]
#![no_main]

use foundation::{wstr, WordStr};

cfg_if::cfg_if! {
    if #[cfg(target_os = "none")] {
        fn writes<const N: usize>(text: &WordStr<N>) {
            platform::console().write_str(text);
        }

        fn exit(code: u32) -> ! {
            platform::exit(code)
        }
    } else {
        fn writes<const N: usize>(text: &WordStr<N>) {
            print!("{}", String::from_utf8_lossy(text.as_bytes()));
        }

        fn exit(code: u32) -> ! {
            std::process::exit(code as i32)
        }
    }
}

fn misaligned_load() {
    #[cfg(target_arch = "riscv32")]
    unsafe {
        core::arch::asm!(
            "la     {addr}, _trap_vector",
            "addi   {addr}, {addr}, 1",
            "lw     {addr}, 0({addr})",
            addr = out(reg) _,
        );
    }
}

#[no_mangle]
fn main() -> ! {
    debug::writeln!("[load-fault] main");

    writes(wstr!("Loading from a misaligned address\n"));
    misaligned_load();

    writes(wstr!("Resumed after a fault\n"));
    exit(platform::EXIT_FAILURE)
}
