//! Policies an allocator is handed alongside [`TensorOptions`](crate::TensorOptions).

use crate::variant::Enumerant;

/// Maximum number of axes of a tensor.
///
/// User tensors rarely exceed 5 axes; simplifying a matrix multiplication may add one temporarily.
pub const MAX_AXES: usize = 6;

/// How to choose strides when allocating a tensor like another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enumerant)]
#[enumerant(crate = "crate")]
pub enum StridePolicy {
    /// Keep the size-ordering of the source tensor's strides, made positive.
    KeepStrideOrder,
    /// Strides of non-unit axes decrease from the first axis to the last, as in a C array.
    /// Axes of extent 1 get stride 0.
    Normalized,
    /// Use exactly the strides provided.
    CopyStrides,
}

/// Whether a freshly allocated tensor is zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enumerant)]
#[enumerant(crate = "crate")]
pub enum InitializePolicy {
    ZeroData,
    Uninitialized,
}
