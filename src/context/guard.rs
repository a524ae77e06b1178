use std::{fmt::Debug, marker::PhantomData};

use super::{Context, REGISTERS, debug_mode};
use crate::{device::Device, num::DataType};

/// One of the thread's default registers, addressable by type.
pub trait Register: Sized + 'static {
    type Value: Copy + Debug;
    /// Name of the register, used in diagnostics.
    const NAME: &'static str;

    fn get() -> Self::Value;
    fn set(value: Self::Value);

    /// Writes `value` and returns the value it replaced.
    #[inline]
    fn replace(value: Self::Value) -> Self::Value {
        let prev = Self::get();
        Self::set(value);
        prev
    }

    /// Runs `f` with the register overridden to `value`; the previous value is restored after `f`
    /// returns or unwinds.
    #[inline]
    fn scope<T>(value: Self::Value, f: impl FnOnce() -> T) -> T {
        let _guard = ScopedGuard::<Self>::new(value);
        f()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeviceRegister;

impl Register for DeviceRegister {
    type Value = Device;
    const NAME: &'static str = "device";

    #[inline]
    fn get() -> Device {
        super::default_device()
    }

    #[inline]
    fn set(value: Device) {
        super::set_default_device(value)
    }
}

/// Rejects the [`DataType::Default`] placeholder on write, by panicking.
#[derive(Debug, Clone, Copy)]
pub struct DtypeRegister;

impl Register for DtypeRegister {
    type Value = DataType;
    const NAME: &'static str = "dtype";

    #[inline]
    fn get() -> DataType {
        super::default_dtype()
    }

    #[inline]
    fn set(value: DataType) {
        super::set_default_dtype(value)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DebugRegister;

impl Register for DebugRegister {
    type Value = bool;
    const NAME: &'static str = "debug";

    #[inline]
    fn get() -> bool {
        super::debug_mode()
    }

    #[inline]
    fn set(value: bool) {
        super::set_debug_mode(value)
    }
}

/// All registers at once.
#[derive(Debug, Clone, Copy)]
pub struct ContextRegister;

impl Register for ContextRegister {
    type Value = Context;
    const NAME: &'static str = "context";

    #[inline]
    fn get() -> Context {
        Context::current()
    }

    #[inline]
    fn set(value: Context) {
        value.install();
    }
}

/// Overrides a register until dropped, then writes back the value it found.
///
/// Guards nest: dropping the innermost one restores exactly what was current when it was created.
/// A guard is bound to the thread that created it and cannot be cloned.
///
/// # Example
/// ```
/// use tensor_common::{DataType, DtypeGuard, default_dtype};
///
/// let before = default_dtype();
/// {
///     let _guard = DtypeGuard::new(DataType::F64);
///     assert_eq!(default_dtype(), DataType::F64);
/// }
/// assert_eq!(default_dtype(), before);
/// ```
#[must_use = "the override is reverted as soon as the guard is dropped"]
pub struct ScopedGuard<R: Register> {
    prev: R::Value,
    depth: usize,
    phantom: PhantomData<(R, *const ())>,
}

pub type DeviceGuard = ScopedGuard<DeviceRegister>;
pub type DtypeGuard = ScopedGuard<DtypeRegister>;
pub type DebugGuard = ScopedGuard<DebugRegister>;
pub type ContextGuard = ScopedGuard<ContextRegister>;

impl<R: Register> ScopedGuard<R> {
    pub fn new(value: R::Value) -> Self {
        let prev = R::replace(value);
        let depth = REGISTERS.with(|registers| {
            let mut state = registers.get();
            state.depth += 1;
            registers.set(state);
            state.depth
        });
        log::trace!("override {} at depth {depth}: {prev:?} -> {value:?}", R::NAME);
        Self {
            prev,
            depth,
            phantom: PhantomData,
        }
    }

    /// The value that will be restored.
    #[inline]
    pub fn previous(&self) -> R::Value {
        self.prev
    }
}

impl<R: Register> Debug for ScopedGuard<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedGuard")
            .field("register", &R::NAME)
            .field("prev", &self.prev)
            .field("depth", &self.depth)
            .finish()
    }
}

impl<R: Register> Drop for ScopedGuard<R> {
    fn drop(&mut self) {
        let depth = REGISTERS.with(|registers| {
            let mut state = registers.get();
            let depth = state.depth;
            state.depth = depth.saturating_sub(1);
            registers.set(state);
            depth
        });
        // read before restoring: the restore may itself switch debug mode off
        let debug = debug_mode();
        R::set(self.prev);
        log::trace!("restore {} at depth {depth}: {:?}", R::NAME, self.prev);

        if depth != self.depth {
            log::warn!(
                "{} guard released out of order: created at depth {}, released at depth {depth}",
                R::NAME,
                self.depth
            );
            if debug && !std::thread::panicking() {
                panic!(
                    "{} guard released out of order: created at depth {}, released at depth {depth}",
                    R::NAME,
                    self.depth
                );
            }
        }
    }
}
