//! `tensor-common` provides the ambient configuration layer shared by tensor components.
//! It decides which device and numeric type a tensor gets when the caller does not say, and hands out version ticks.
//!
//! ## Key Components
//! 1. **Default Context**:
//!    - Per-thread registers for the default device, data type and debug flag (`context`).
//!    - Scoped guards (`DeviceGuard`, `DtypeGuard`, `DebugGuard`) that override and restore them.
//!    - Explicit propagation to other threads and to futures.
//!
//! 2. **Options Resolution**:
//!    - `TensorOptions` is always concrete; omitted fields are filled from the context at construction.
//!
//! 3. **Numerical System**:
//!    - Data type metadata (`DataType`) and byte widths for tensor element representation.
//!    - `Scalar` ties Rust element types to their `DataType`.
//!
//! 4. **Versioning**:
//!    - A process-wide monotonic tick counter and `Stamp` for staleness checks.
//!
//! Enumerations derive [`Enumerant`](variant::Enumerant), which gives them stable codes and names.

pub mod context;
pub mod device;
pub mod num;
pub mod ops;
pub mod options;
pub mod policy;
pub mod tick;
pub mod variant;

pub use context::{
    Context, ContextExt, ContextGuard, DebugGuard, DeviceGuard, DtypeGuard, Register,
    ScopedGuard, WithContext, debug_mode, default_device, default_dtype, set_debug_mode,
    set_default_device, set_default_dtype, try_set_default_dtype, with_debug_mode,
    with_default_device, with_default_dtype,
};
pub use device::{Device, DeviceType};
pub use num::{DataType, Scalar};
pub use ops::{BinaryFunction, UnaryFunction};
pub use options::{PartialOptions, TensorOptions};
pub use policy::{InitializePolicy, MAX_AXES, StridePolicy};
pub use tick::{Stamp, Tick, TickCounter, current_tick, next_tick};
pub use variant::{Enumerant, VariantError};
