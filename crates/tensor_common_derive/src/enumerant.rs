use proc_macro2::TokenStream;
use quote::quote;
use rustc_hash::FxHashSet as HashSet;
use syn::{
    DeriveInput, Fields, Ident, LitStr, Meta, Path, Token, punctuated::Punctuated,
    spanned::Spanned,
};

/// Integer representations whose every value fits the `u32` code.
const CODE_REPRS: [&str; 3] = ["u8", "u16", "u32"];
const INT_REPRS: [&str; 12] = [
    "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64", "i128", "isize",
];

/// Converts a `CamelCase` variant identifier into its default `snake_case` name.
fn snake_case(ident: &Ident) -> String {
    let mut name = String::new();
    for (index, c) in ident.to_string().chars().enumerate() {
        if c.is_uppercase() {
            if index > 0 {
                name.push('_');
            }
            name.extend(c.to_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

struct Variant {
    ident: Ident,
    name: String,
    aliases: Vec<String>,
}

pub fn derive_enumerant(input: DeriveInput) -> TokenStream {
    // retrieve enum variant information
    let data = match &input.data {
        syn::Data::Enum(data_enum) => data_enum,
        _ => {
            return syn::Error::new(input.span(), "`Enumerant` can only be derived for enums")
                .to_compile_error();
        }
    };

    if !input.generics.params.is_empty() {
        return syn::Error::new(
            input.generics.span(),
            "generic enums are not supported by `Enumerant` derive",
        )
        .to_compile_error();
    }

    // parse enumerant attributes on the enum itself
    let mut crate_name = None;
    for attr in &input.attrs {
        if attr.path().is_ident("repr") {
            let reprs = match attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated) {
                Ok(reprs) => reprs,
                Err(err) => return err.to_compile_error(),
            };
            for repr in reprs {
                let Some(ident) = repr.path().get_ident().map(Ident::to_string) else {
                    continue;
                };
                if INT_REPRS.contains(&ident.as_str()) && !CODE_REPRS.contains(&ident.as_str()) {
                    return syn::Error::new(
                        repr.span(),
                        format!(
                            "`#[repr({ident})]` does not fit the `u32` code; use one of `u8`, `u16` or `u32`"
                        ),
                    )
                    .to_compile_error();
                }
            }
            continue;
        }
        if !attr.path().is_ident("enumerant") {
            continue;
        }

        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let value = meta.value()?;
                let s: LitStr = value.parse()?;
                crate_name = Some(s.parse::<Path>()?);
                Ok(())
            } else {
                Err(meta.error("unexpected attribute; supported is `crate`"))
            }
        });

        if let Err(err) = result {
            return err.to_compile_error();
        }
    }
    let base_path = match crate_name {
        Some(path) => quote!(#path::variant),
        None => quote!(::tensor_common::variant),
    };

    // collect variants, their names and aliases
    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return syn::Error::new(
                variant.span(),
                "only unit variants are supported by `Enumerant` derive",
            )
            .to_compile_error();
        }

        let ident = variant.ident.clone();
        let mut name = snake_case(&ident);
        let mut aliases = vec![];
        for attr in &variant.attrs {
            if !attr.path().is_ident("enumerant") {
                continue;
            }

            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let s: LitStr = meta.value()?.parse()?;
                    name = s.value();
                    Ok(())
                } else if meta.path.is_ident("alias") {
                    let s: LitStr = meta.value()?.parse()?;
                    aliases.push(s.value());
                    Ok(())
                } else {
                    Err(meta.error("unexpected attribute; supported are `name` and `alias`"))
                }
            });

            if let Err(err) = result {
                return err.to_compile_error();
            }
        }
        variants.push(Variant {
            ident,
            name,
            aliases,
        });
    }

    // names must not collide, or parsing would be ambiguous
    let mut seen = HashSet::default();
    for variant in &variants {
        for name in std::iter::once(&variant.name).chain(variant.aliases.iter()) {
            if !seen.insert(name.to_ascii_lowercase()) {
                return syn::Error::new(
                    variant.ident.span(),
                    format!("duplicated enumerant name `{name}`"),
                )
                .to_compile_error();
            }
        }
    }

    let name = &input.ident;
    let type_name = name.to_string();
    let idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();
    let names: Vec<_> = variants.iter().map(|v| &v.name).collect();
    let aliases: Vec<_> = variants
        .iter()
        .map(|v| {
            let aliases = &v.aliases;
            quote! { &[#(#aliases),*] }
        })
        .collect();

    // the default `isize` representation admits negative discriminants
    let range_messages: Vec<_> = idents
        .iter()
        .map(|ident| format!("discriminant of `{type_name}::{ident}` does not fit the `u32` code"))
        .collect();

    quote! {
        const _: () = {
            #(
                ::core::assert!(
                    (#name::#idents as i128) >= 0
                        && (#name::#idents as i128) <= (::core::primitive::u32::MAX as i128),
                    #range_messages
                );
            )*
        };

        impl #base_path::Enumerant for #name {
            const TYPE_NAME: &'static str = #type_name;
            const VARIANTS: &'static [Self] = &[#(Self::#idents),*];

            #[inline]
            fn name(self) -> &'static str {
                match self {
                    #(Self::#idents => #names),*
                }
            }

            #[inline]
            fn aliases(self) -> &'static [&'static str] {
                match self {
                    #(Self::#idents => #aliases),*
                }
            }

            #[inline]
            fn code(self) -> u32 {
                self as u32
            }
        }

        impl ::core::fmt::Display for #name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.pad(#base_path::Enumerant::name(*self))
            }
        }

        impl ::core::str::FromStr for #name {
            type Err = #base_path::VariantError;

            #[inline]
            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                <Self as #base_path::Enumerant>::from_name(s)
            }
        }

        impl ::core::convert::TryFrom<u32> for #name {
            type Error = #base_path::VariantError;

            #[inline]
            fn try_from(code: u32) -> ::core::result::Result<Self, Self::Error> {
                <Self as #base_path::Enumerant>::from_code(code)
            }
        }

        #[cfg(feature = "serde")]
        impl ::serde::Serialize for #name {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_str(#base_path::Enumerant::name(*self))
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> ::serde::Deserialize<'de> for #name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let name = <::std::string::String as ::serde::Deserialize>::deserialize(deserializer)?;
                <Self as #base_path::Enumerant>::from_name(&name).map_err(::serde::de::Error::custom)
            }
        }
    }
}
