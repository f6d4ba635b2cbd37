#![no_std]

#[doc(hidden)]
pub use memoffset as __memoffset;

/// Expands to the body of a naked trap trampoline.
///
/// Every register named in `preserve` is stored into `frame` at the offset of
/// the field with the same name and reloaded from it after `handler` returns.
/// The frame's `sp` field always receives the interrupted stack pointer, which
/// sits in `mscratch` once the stacks have been exchanged. `sp` itself is never
/// reloaded from the frame; the second exchange restores it.
///
/// `t0` must be part of `preserve`: it is the scratch register used to copy the
/// interrupted stack pointer into the frame.
#[macro_export]
macro_rules! trap_trampoline {
    (
        frame: $frame:path,
        store: $store:literal,
        load: $load:literal,
        handler: $handler:path,
        preserve: [$($reg:ident),+ $(,)?] $(,)?
    ) => {
        ::core::arch::naked_asm!(
            "csrrw  sp, mscratch, sp",
            "addi   sp, sp, -{frame_size}",
            $(::core::concat!(
                $store, " ", ::core::stringify!($reg), ", {", ::core::stringify!($reg), "}(sp)"
            ),)+
            "csrr   t0, mscratch",
            ::core::concat!($store, " t0, {sp_slot}(sp)"),
            "mv     a0, sp",
            "call   {handler}",
            $(::core::concat!(
                $load, " ", ::core::stringify!($reg), ", {", ::core::stringify!($reg), "}(sp)"
            ),)+
            "addi   sp, sp, {frame_size}",
            "csrrw  sp, mscratch, sp",
            "mret",
            frame_size = const ::core::mem::size_of::<$frame>(),
            sp_slot = const $crate::__memoffset::offset_of!($frame, sp),
            handler = sym $handler,
            $($reg = const $crate::__memoffset::offset_of!($frame, $reg),)+
        )
    };
}
