use crate::variant::{Enumerant, VariantError};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Enumerant)]
#[enumerant(crate = "crate")]
pub enum DataType {
    /// Placeholder for "whatever the current default is". Only valid in an unresolved request.
    #[default]
    Default = 0,
    #[enumerant(name = "float", alias = "f32")]
    F32 = 1,
    #[enumerant(name = "double", alias = "f64")]
    F64 = 2,
}

impl DataType {
    /// Returns `false` for the [`DataType::Default`] placeholder.
    #[inline]
    pub const fn is_concrete(self) -> bool {
        !matches!(self, DataType::Default)
    }

    /// Returns number of bytes of one element of this data type.
    /// The placeholder has no size and is rejected.
    #[inline]
    pub fn try_size(self) -> Result<usize, VariantError> {
        match self {
            DataType::F32 => Ok(4),
            DataType::F64 => Ok(8),
            DataType::Default => Err(self.unsupported("size")),
        }
    }

    /// Returns number of bytes of one element of this data type.
    ///
    /// # Panics
    /// Panics if called on the [`DataType::Default`] placeholder.
    #[inline]
    pub fn size(self) -> usize {
        match self.try_size() {
            Ok(size) => size,
            Err(err) => panic!("{err}"),
        }
    }

    /// Substitutes the placeholder with the current default data type of this thread.
    #[inline]
    pub fn resolve(self) -> DataType {
        match self {
            DataType::Default => crate::context::default_dtype(),
            dtype => dtype,
        }
    }
}

/// Rust element types that tensors can hold.
pub trait Scalar: Sized + Copy + Send + Sync + sealed::Sealed {
    const DATA_TYPE: DataType;
}

impl Scalar for f32 {
    const DATA_TYPE: DataType = DataType::F32;
}

impl Scalar for f64 {
    const DATA_TYPE: DataType = DataType::F64;
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

#[cfg(test)]
mod tests {
    use super::{DataType, Scalar};
    use crate::{
        context::DtypeGuard,
        variant::{Enumerant, VariantError},
    };

    fn check_scalar<T: Scalar>() {
        assert_eq!(T::DATA_TYPE.size(), size_of::<T>());
    }

    #[test]
    fn test_size_matches_scalar() {
        check_scalar::<f32>();
        check_scalar::<f64>();
        assert!(DataType::F32.size() < DataType::F64.size());
    }

    #[test]
    fn test_size_covers_concrete_variants() {
        for &dtype in DataType::VARIANTS {
            match dtype.is_concrete() {
                true => assert!(dtype.try_size().is_ok(), "{dtype} has no size"),
                false => assert!(dtype.try_size().is_err()),
            }
        }
    }

    #[test]
    fn test_size_deterministic() {
        for _ in 0..16 {
            assert_eq!(DataType::F32.size(), 4);
            assert_eq!(DataType::F64.size(), 8);
        }
    }

    #[test]
    fn test_size_placeholder_error() {
        let err = DataType::Default.try_size().unwrap_err();
        assert_eq!(
            err,
            VariantError::Unsupported {
                op: "size",
                type_name: "DataType",
                variant: "default",
            }
        );
        assert_eq!(err.to_string(), "size: unsupported DataType variant `default`");
    }

    #[test]
    #[should_panic(expected = "size: unsupported DataType variant `default`")]
    fn test_size_placeholder_panics() {
        DataType::Default.size();
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(DataType::try_from(2), Ok(DataType::F64));
        assert_eq!(
            DataType::try_from(3),
            Err(VariantError::Code {
                type_name: "DataType",
                code: 3
            })
        );
    }

    #[test]
    fn test_names() {
        assert_eq!(DataType::F32.to_string(), "float");
        assert_eq!(DataType::F64.to_string(), "double");
        assert_eq!("f64".parse(), Ok(DataType::F64));
        assert_eq!("Float".parse(), Ok(DataType::F32));
        assert_eq!("default".parse(), Ok(DataType::Default));
        assert!("half".parse::<DataType>().is_err());
    }

    #[test]
    fn test_resolve() {
        assert_eq!(DataType::F64.resolve(), DataType::F64);

        let _guard = DtypeGuard::new(DataType::F64);
        assert_eq!(DataType::Default.resolve(), DataType::F64);
        assert_eq!(DataType::F32.resolve(), DataType::F32);
    }
}
