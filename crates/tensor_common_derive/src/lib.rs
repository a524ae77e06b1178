use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod enumerant;

/// Derives `Enumerant` for a fieldless enum, along with `Display`, `FromStr`,
/// `TryFrom<u32>` and, when the deriving crate enables its `serde` feature,
/// name-based `Serialize` and `Deserialize`.
///
/// Variants are named in `snake_case` unless overridden:
/// ```ignore
/// #[derive(Clone, Copy, PartialEq, Enumerant)]
/// enum DataType {
///     #[enumerant(name = "float", alias = "f32")]
///     F32,
/// }
/// ```
#[proc_macro_derive(Enumerant, attributes(enumerant))]
pub fn derive_enumerant(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let expanded = enumerant::derive_enumerant(input);
    expanded.into()
}
