use itertools::Itertools;
use thiserror::Error;

pub use tensor_common_derive::Enumerant;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariantError {
    #[error("invalid {type_name} code {code}")]
    Code { type_name: &'static str, code: u32 },
    #[error("invalid {type_name} name `{name}`, expected one of: {expected}")]
    Name {
        type_name: &'static str,
        name: String,
        expected: String,
    },
    #[error("{op}: unsupported {type_name} variant `{variant}`")]
    Unsupported {
        op: &'static str,
        type_name: &'static str,
        variant: &'static str,
    },
}

/// A fieldless enumeration with a closed, reflectable set of variants.
///
/// Use `#[derive(Enumerant)]` rather than implementing this by hand; the derive also provides
/// `Display`, `FromStr` and `TryFrom<u32>` in terms of this trait.
pub trait Enumerant: Sized + Copy + PartialEq + 'static {
    /// Name of the enumeration, used in diagnostics.
    const TYPE_NAME: &'static str;
    /// Every variant, in declaration order.
    const VARIANTS: &'static [Self];

    /// Canonical lowercase name.
    fn name(self) -> &'static str;
    /// Other names accepted when parsing.
    fn aliases(self) -> &'static [&'static str];
    /// Stable numeric code, the enum discriminant.
    fn code(self) -> u32;

    /// Decodes a numeric code. Fails on codes outside the known variant set.
    fn from_code(code: u32) -> Result<Self, VariantError> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|variant| variant.code() == code)
            .ok_or(VariantError::Code {
                type_name: Self::TYPE_NAME,
                code,
            })
    }

    /// Parses a name or alias, ignoring ASCII case and surrounding whitespace.
    fn from_name(name: &str) -> Result<Self, VariantError> {
        let key = name.trim();
        Self::VARIANTS
            .iter()
            .copied()
            .find(|variant| {
                variant.name().eq_ignore_ascii_case(key)
                    || variant
                        .aliases()
                        .iter()
                        .any(|alias| alias.eq_ignore_ascii_case(key))
            })
            .ok_or_else(|| VariantError::Name {
                type_name: Self::TYPE_NAME,
                name: name.to_owned(),
                expected: Self::VARIANTS.iter().map(|variant| variant.name()).join(", "),
            })
    }

    /// The error reported when operation `op` is handed a variant it does not handle.
    #[inline]
    fn unsupported(self, op: &'static str) -> VariantError {
        VariantError::Unsupported {
            op,
            type_name: Self::TYPE_NAME,
            variant: self.name(),
        }
    }
}
