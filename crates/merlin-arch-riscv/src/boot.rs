use core::arch::naked_asm;

use foundation::BootConfig;

const BOOT: BootConfig = BootConfig::MERLIN;
const _: () = assert!(BOOT.validate().is_ok());

/// Reset entry.
///
/// Parks the trap stack pointer in `mscratch`, points `mtvec` at the vector,
/// enables the machine external interrupt and only then the global interrupt
/// enable, and jumps to `main`. Nothing between reset and `main` touches
/// memory other than the stack.
///
/// # Safety
/// Must only be entered by the hart coming out of reset.
#[unsafe(naked)]
#[link_section = ".init"]
#[no_mangle]
pub unsafe extern "C" fn _entry() -> ! {
    naked_asm!(
        ".weak __global_pointer$",
        ".hidden __global_pointer$",
        ".option push",
        ".option norelax",
        "   lla     gp, __global_pointer$",
        ".option pop",

        "   li      t0, {trap_stack_top}",
        "   csrw    mscratch, t0",
        "   li      sp, {stack_top}",

        "   la      t0, _trap_vector",
        "   csrw    mtvec, t0",

        "   call    {trace_vector}",

        "   li      t0, {mie}",
        "   csrs    mie, t0",
        // Global enable last: nothing may trap before mtvec and mscratch hold.
        "   li      t0, {mstatus}",
        "   csrs    mstatus, t0",

        "   tail    main",

        trap_stack_top = const BOOT.trap_stack_top,
        stack_top = const BOOT.stack_top,
        mie = const BOOT.mie,
        mstatus = const BOOT.mstatus,
        trace_vector = sym __boot_trace_vector,
    )
}

#[no_mangle]
extern "C" fn __boot_trace_vector() {
    debug::writeln!(
        "[BOOT] mtvec=_trap_vector mscratch={:#010x} sp={:#010x}",
        BOOT.trap_stack_top,
        BOOT.stack_top
    );
}
