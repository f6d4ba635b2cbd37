/// General-purpose registers x1..x31 by ABI name. x0 is hard-wired to zero
/// and never saved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Reg {
    Ra = 1,
    Sp,
    Gp,
    Tp,
    T0,
    T1,
    T2,
    S0,
    S1,
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    A7,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    S8,
    S9,
    S10,
    S11,
    T3,
    T4,
    T5,
    T6,
}

use Reg::*;

impl Reg {
    pub const ALL: [Reg; 31] = [
        Ra, Sp, Gp, Tp, T0, T1, T2, S0, S1, A0, A1, A2, A3, A4, A5, A6, A7, S2, S3, S4, S5, S6, S7,
        S8, S9, S10, S11, T3, T4, T5, T6,
    ];

    /// Architectural register number.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Registers a callee may overwrite under the standard calling convention.
    pub const fn is_caller_saved(self) -> bool {
        matches!(
            self,
            Ra | T0 | T1 | T2 | A0 | A1 | A2 | A3 | A4 | A5 | A6 | A7 | T3 | T4 | T5 | T6
        )
    }
}

/// Registers the trampoline moves through the frame.
///
/// `sp` is never in the set: its frame slot is filled from `mscratch` and the
/// live value is restored by the second stack exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveSet {
    /// x1 and x3..x31.
    Full,
    /// Only what a call into Rust may clobber. Callee-saved registers survive
    /// because the dispatch glue is an ordinary `extern "C"` function.
    CallerSaved,
}

/// Passes the frame fields of [`SaveSet::Full`] to `$m!`, after `$args`.
///
/// This list and `caller_saved_set!` are the only place the saved
/// registers are named; the trampoline asm and [`SaveSet::registers`] are
/// both generated from them.
macro_rules! full_save_set {
    ($m:ident!($($args:tt)*)) => {
        $m!($($args)* [
            ra, gp, tp, t0, t1, t2, s0, s1,
            a0, a1, a2, a3, a4, a5, a6, a7,
            s2, s3, s4, s5, s6, s7, s8, s9, s10, s11,
            t3, t4, t5, t6
        ])
    };
}

/// Passes the frame fields of [`SaveSet::CallerSaved`] to `$m!`, after `$args`.
macro_rules! caller_saved_set {
    ($m:ident!($($args:tt)*)) => {
        $m!($($args)* [
            ra, t0, t1, t2,
            a0, a1, a2, a3, a4, a5, a6, a7,
            t3, t4, t5, t6
        ])
    };
}

/// `[Reg]` from frame field names, by slot offset.
macro_rules! regs_of {
    ([$($reg:ident),+ $(,)?]) => {
        [$(Reg::ALL[::memoffset::offset_of!($crate::trap::TrapFrame, $reg) / 4]),+]
    };
}

const FULL: [Reg; 30] = full_save_set!(regs_of!());

const CALLER_SAVED: [Reg; 16] = caller_saved_set!(regs_of!());

impl SaveSet {
    /// The set the trampoline in this build was generated with.
    #[cfg(not(feature = "caller-saved"))]
    pub const ACTIVE: SaveSet = SaveSet::Full;
    /// The set the trampoline in this build was generated with.
    #[cfg(feature = "caller-saved")]
    pub const ACTIVE: SaveSet = SaveSet::CallerSaved;

    pub const fn registers(self) -> &'static [Reg] {
        match self {
            Self::Full => &FULL,
            Self::CallerSaved => &CALLER_SAVED,
        }
    }

    pub fn preserves(self, reg: Reg) -> bool {
        self.registers().contains(&reg)
    }
}
