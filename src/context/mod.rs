//! Default execution context: the device, data type and debug flag used when a caller does not specify them.
//!
//! Every thread owns its own registers, initialised on first use from [`Context::initial`].
//! Overrides are scoped with guards ([`DeviceGuard`], [`DtypeGuard`], [`DebugGuard`], [`ContextGuard`])
//! and never leak into other threads. To carry a context across threads or tasks, use
//! [`Context::bind`] or [`ContextExt::with_context`].

use std::cell::Cell;

use derive_more::Display;

use crate::{
    device::Device,
    num::DataType,
    variant::{Enumerant, VariantError},
};

pub use future::{ContextExt, WithContext};
pub use guard::{
    ContextGuard, ContextRegister, DebugGuard, DebugRegister, DeviceGuard, DeviceRegister,
    DtypeGuard, DtypeRegister, Register, ScopedGuard,
};

pub mod env;
mod future;
mod guard;

/// A complete set of default registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{device}/{dtype}{}", if *debug { " (debug)" } else { "" })]
pub struct Context {
    device: Device,
    dtype: DataType,
    debug: bool,
}

impl Default for Context {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// The built-in context: CPU, single precision, debug off.
    #[inline]
    pub const fn new() -> Self {
        Self {
            device: Device::CPU,
            dtype: DataType::F32,
            debug: false,
        }
    }

    /// The context every thread starts from, read once per process from the environment.
    /// See [`env`] for the variables.
    #[inline]
    pub fn initial() -> Self {
        env::initial()
    }

    /// Snapshot of the calling thread's registers.
    #[inline]
    pub fn current() -> Self {
        REGISTERS.with(|registers| registers.get().context)
    }

    #[inline]
    pub const fn device(self) -> Device {
        self.device
    }

    #[inline]
    pub const fn dtype(self) -> DataType {
        self.dtype
    }

    #[inline]
    pub const fn debug(self) -> bool {
        self.debug
    }

    #[inline]
    pub fn with_device(mut self, device: impl Into<Device>) -> Self {
        self.device = device.into();
        self
    }

    /// Replaces the data type. The placeholder is rejected, a context is always concrete.
    #[inline]
    pub fn try_with_dtype(mut self, dtype: DataType) -> Result<Self, VariantError> {
        if !dtype.is_concrete() {
            return Err(dtype.unsupported("with_dtype"));
        }
        self.dtype = dtype;
        Ok(self)
    }

    /// Replaces the data type.
    ///
    /// # Panics
    /// Panics if `dtype` is the [`DataType::Default`] placeholder.
    #[inline]
    pub fn with_dtype(self, dtype: DataType) -> Self {
        match self.try_with_dtype(dtype) {
            Ok(context) => context,
            Err(err) => panic!("{err}"),
        }
    }

    #[inline]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Installs this context on the calling thread and returns the one it replaced.
    #[cfg_attr(feature = "trace", tracing::instrument(level = "trace"))]
    pub fn install(self) -> Self {
        let prev = REGISTERS.with(|registers| {
            let mut state = registers.get();
            let prev = state.context;
            state.context = self;
            registers.set(state);
            prev
        });
        log::trace!("context {prev} -> {self}");
        prev
    }

    /// Installs this context until the returned guard is dropped.
    #[inline]
    pub fn enter(self) -> ContextGuard {
        ContextGuard::new(self)
    }

    /// Runs `f` with this context installed, restoring the previous one afterwards, even on unwinding.
    #[inline]
    pub fn scope<T>(self, f: impl FnOnce() -> T) -> T {
        ContextRegister::scope(self, f)
    }

    /// Captures the calling thread's context and returns a closure that runs `f` under it,
    /// wherever the closure is called. Use this to hand work to another thread.
    pub fn bind<F, T>(f: F) -> impl FnOnce() -> T + Send
    where
        F: FnOnce() -> T + Send,
    {
        let context = Self::current();
        move || {
            let frame = Frame::enter(Registers::from(context));
            let output = f();
            frame.exit();
            output
        }
    }
}

/// The per-thread state: the registers plus the nesting depth of live guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Registers {
    context: Context,
    depth: usize,
}

impl From<Context> for Registers {
    #[inline]
    fn from(context: Context) -> Self {
        Self { context, depth: 0 }
    }
}

thread_local! {
    static REGISTERS: Cell<Registers> = Cell::new(Registers::from(Context::initial()));
}

/// Swaps a whole register state in for the duration of a frame (a bound closure, a future poll).
/// Guards opened inside the frame nest independently of the ones outside.
struct Frame {
    outer: Option<Registers>,
}

impl Frame {
    fn enter(inner: Registers) -> Self {
        let outer = REGISTERS.with(|registers| registers.replace(inner));
        Self { outer: Some(outer) }
    }

    /// Leaves the frame and returns the state it ended with.
    fn exit(mut self) -> Registers {
        let outer = self.outer.take();
        REGISTERS.with(|registers| match outer {
            Some(outer) => registers.replace(outer),
            None => registers.get(),
        })
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        if let Some(outer) = self.outer.take() {
            REGISTERS.with(|registers| registers.set(outer));
        }
    }
}

/// Returns the default device of the calling thread.
#[inline]
pub fn default_device() -> Device {
    Context::current().device
}

/// Sets the default device of the calling thread.
#[inline]
pub fn set_default_device(device: impl Into<Device>) {
    let device = device.into();
    Context::current().with_device(device).install();
}

/// Returns the default data type of the calling thread. Never the placeholder.
#[inline]
pub fn default_dtype() -> DataType {
    Context::current().dtype
}

/// Sets the default data type of the calling thread.
/// Fails if `dtype` is the [`DataType::Default`] placeholder, leaving the register unchanged.
#[inline]
pub fn try_set_default_dtype(dtype: DataType) -> Result<(), VariantError> {
    let context = Context::current().try_with_dtype(dtype)?;
    context.install();
    Ok(())
}

/// Sets the default data type of the calling thread.
///
/// # Panics
/// Panics if `dtype` is the [`DataType::Default`] placeholder.
#[inline]
pub fn set_default_dtype(dtype: DataType) {
    if let Err(err) = try_set_default_dtype(dtype) {
        panic!("{err}");
    }
}

/// Returns `true` if extra, expensive consistency checks should run on the calling thread.
#[inline]
pub fn debug_mode() -> bool {
    Context::current().debug
}

#[inline]
pub fn set_debug_mode(debug: bool) {
    Context::current().with_debug(debug).install();
}

/// Runs `f` with `device` as the default device.
#[inline]
pub fn with_default_device<T>(device: impl Into<Device>, f: impl FnOnce() -> T) -> T {
    DeviceRegister::scope(device.into(), f)
}

/// Runs `f` with `dtype` as the default data type.
///
/// # Panics
/// Panics if `dtype` is the [`DataType::Default`] placeholder.
#[inline]
pub fn with_default_dtype<T>(dtype: DataType, f: impl FnOnce() -> T) -> T {
    DtypeRegister::scope(dtype, f)
}

/// Runs `f` with debug mode set to `debug`.
#[inline]
pub fn with_debug_mode<T>(debug: bool, f: impl FnOnce() -> T) -> T {
    DebugRegister::scope(debug, f)
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::{
        Context, debug_mode, env, default_device, default_dtype, set_debug_mode, set_default_device,
        set_default_dtype, try_set_default_dtype, with_default_device, with_default_dtype,
    };
    use crate::{
        device::{Device, DeviceType},
        num::DataType,
        variant::{Enumerant, VariantError},
    };

    #[test]
    fn test_initial_state() {
        let initial = Context::initial();
        assert_eq!(Context::current(), initial);
        assert_eq!(default_device(), initial.device());
        assert_eq!(default_dtype(), initial.dtype());
        assert_eq!(debug_mode(), initial.debug());
        assert!(initial.dtype().is_concrete());

        assert_eq!(Context::new().device(), Device::CPU);
        assert_eq!(Context::new().dtype(), DataType::F32);
        assert!(!Context::new().debug());
    }

    #[test]
    fn test_fresh_thread_start_state() -> Result<(), Box<dyn Error>> {
        let (context, debug) = std::thread::spawn(|| (Context::current(), debug_mode()))
            .join()
            .map_err(|_| "thread panicked")?;
        assert_eq!(context, env::from_env());
        assert_eq!(debug, context.debug());

        if std::env::var_os(env::DEBUG_VAR).is_none() {
            assert!(!debug);
        }
        if [env::DEVICE_VAR, env::DTYPE_VAR, env::DEBUG_VAR]
            .iter()
            .all(|key| std::env::var_os(key).is_none())
        {
            assert_eq!(context, Context::new());
        }
        Ok(())
    }

    #[test]
    fn test_set_then_get() {
        set_default_device(DeviceType::Cuda);
        assert_eq!(default_device(), Device::CUDA);
        set_default_device(Device::CPU);
        assert_eq!(default_device(), Device::CPU);

        set_default_dtype(DataType::F64);
        assert_eq!(default_dtype(), DataType::F64);
        set_default_dtype(DataType::F32);
        assert_eq!(default_dtype(), DataType::F32);

        set_debug_mode(true);
        assert!(debug_mode());
        set_debug_mode(false);
        assert!(!debug_mode());
    }

    #[test]
    fn test_random_set_sequence() {
        let devices = DeviceType::VARIANTS;
        let dtypes = [DataType::F32, DataType::F64];
        for _ in 0..256 {
            match fastrand::u8(0..3) {
                0 => {
                    let device = Device::new(devices[fastrand::usize(..devices.len())]);
                    set_default_device(device);
                    assert_eq!(default_device(), device);
                }
                1 => {
                    let dtype = dtypes[fastrand::usize(..dtypes.len())];
                    set_default_dtype(dtype);
                    assert_eq!(default_dtype(), dtype);
                }
                _ => {
                    let debug = fastrand::bool();
                    set_debug_mode(debug);
                    assert_eq!(debug_mode(), debug);
                }
            }
        }
    }

    #[test]
    fn test_placeholder_rejected() {
        set_default_dtype(DataType::F64);
        let err = try_set_default_dtype(DataType::Default).unwrap_err();
        assert_eq!(
            err,
            VariantError::Unsupported {
                op: "with_dtype",
                type_name: "DataType",
                variant: "default",
            }
        );
        assert_eq!(default_dtype(), DataType::F64);
    }

    #[test]
    #[should_panic(expected = "unsupported DataType variant `default`")]
    fn test_placeholder_panics() {
        set_default_dtype(DataType::Default);
    }

    #[test]
    fn test_registers_are_thread_local() -> Result<(), Box<dyn Error>> {
        set_default_device(Device::CUDA);
        set_default_dtype(DataType::F64);

        let other = std::thread::spawn(Context::current)
            .join()
            .map_err(|_| "thread panicked")?;
        assert_eq!(other, Context::initial());
        assert_eq!(Context::current().device(), Device::CUDA);
        Ok(())
    }

    #[test]
    fn test_bind() -> Result<(), Box<dyn Error>> {
        Context::new().install();
        let context = Context::new()
            .with_device(Device::CUDA)
            .with_dtype(DataType::F64)
            .with_debug(true);

        let f = context.scope(|| Context::bind(|| (Context::current(), default_dtype())));
        assert_eq!(Context::current(), Context::new());

        let (seen, dtype) = std::thread::spawn(f)
            .join()
            .map_err(|_| "thread panicked")?;
        assert_eq!(seen, context);
        assert_eq!(dtype, DataType::F64);
        Ok(())
    }

    #[test]
    fn test_bind_restores_caller() {
        Context::new().install();
        let f = with_default_device(Device::CUDA, || Context::bind(|| set_default_dtype(DataType::F64)));
        f();
        assert_eq!(default_dtype(), DataType::F32);
        assert_eq!(default_device(), Device::CPU);
    }

    #[test]
    fn test_install_returns_previous() {
        Context::new().install();
        let context = Context::new().with_device(Device::CUDA);
        let prev = context.install();
        assert_eq!(prev, Context::new());
        assert_eq!(Context::current(), context);
        assert_eq!(prev.install(), context);
    }

    #[test]
    fn test_display() {
        let context = Context::new();
        assert_eq!(context.to_string(), "cpu/float");
        assert_eq!(
            context.with_device(Device::CUDA).with_debug(true).to_string(),
            "cuda/float (debug)"
        );
    }

    #[test]
    fn test_with_default_dtype_nested() {
        let dtype = with_default_dtype(DataType::F64, || {
            with_default_dtype(DataType::F32, default_dtype);
            default_dtype()
        });
        assert_eq!(dtype, DataType::F64);
        assert_eq!(default_dtype(), DataType::F32);
    }
}
