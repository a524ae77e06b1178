//! Tags of the element-wise functions a dispatcher can apply to tensors.
//! Multiplication is not among them; it goes to BLAS.

use crate::variant::Enumerant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enumerant)]
#[enumerant(crate = "crate")]
pub enum UnaryFunction {
    Exp,
    Log,
    Relu,
    /// `1 / x`.
    Invert,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enumerant)]
#[enumerant(crate = "crate")]
pub enum BinaryFunction {
    Add,
    Divide,
    Max,
    Min,
}
