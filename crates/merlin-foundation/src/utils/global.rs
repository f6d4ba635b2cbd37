use core::cell::UnsafeCell;

/// Process-wide mutable state on a single hart.
///
/// Access goes through closures so no reference outlives the call. The cell
/// is only sound because nothing that touches a given cell can preempt
/// another access to it: on this runtime, trap-context state is only used
/// from the dispatcher, and traps do not nest.
pub struct GlobalCell<T> {
    inner: UnsafeCell<T>,
}

// Single hart; see the type-level invariant.
unsafe impl<T: Send> Sync for GlobalCell<T> {}

impl<T> GlobalCell<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: UnsafeCell::new(value),
        }
    }

    #[inline]
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(unsafe { &*self.inner.get() })
    }

    /// Must not be re-entered for the same cell from within `f`.
    #[inline]
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(unsafe { &mut *self.inner.get() })
    }
}
