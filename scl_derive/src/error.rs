//! Derive macro for runtime error enums.
//!
//! Generates `std::fmt::Display` and `std::error::Error` from
//! `#[error("…")]` attributes. The runtime keeps its error variants in two
//! shapes only, and the derive enforces that:
//! - unit variants: the message is written verbatim
//! - named-field variants: the message interpolates fields by name
//!   (`{field}`), and every field must appear in the message
//!
//! # Usage
//!
//! ```ignore
//! use scl_derive::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum MyError {
//!     #[error("rejected by logic")]
//!     Rejected,
//!
//!     #[error("invalid type: expected {expected}, got {actual}")]
//!     InvalidType { expected: &'static str, actual: &'static str },
//! }
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Variant};

pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let data = match &input.data {
        Data::Enum(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Error can only be derived for enums",
            ))
        }
    };

    let name = &input.ident;
    let arms = data
        .variants
        .iter()
        .map(display_arm)
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl ::std::fmt::Display for #name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    #(#arms)*
                }
            }
        }

        impl ::std::error::Error for #name {}
    })
}

/// Builds the `Display` match arm for one variant.
fn display_arm(variant: &Variant) -> syn::Result<proc_macro2::TokenStream> {
    let ident = &variant.ident;
    let message = message_of(variant)?;

    match &variant.fields {
        Fields::Unit => Ok(quote! {
            Self::#ident => f.write_str(#message),
        }),
        Fields::Named(fields) => {
            let names: Vec<_> = fields.named.iter().map(|field| &field.ident).collect();
            Ok(quote! {
                Self::#ident { #(#names),* } => write!(f, #message, #(#names = #names),*),
            })
        }
        Fields::Unnamed(_) => Err(syn::Error::new_spanned(
            variant,
            "give the fields names so the message can interpolate them, \
             e.g. #[error(\"unknown opcode: {name}\")] UnknownOpcode { name: String }",
        )),
    }
}

/// Reads the variant's mandatory `#[error("…")]` message.
fn message_of(variant: &Variant) -> syn::Result<String> {
    for attr in &variant.attrs {
        if attr.path().is_ident("error") {
            let message: LitStr = attr.parse_args().map_err(|_| {
                syn::Error::new_spanned(
                    attr,
                    "expected a string literal, e.g. #[error(\"division by zero\")]",
                )
            })?;
            return Ok(message.value());
        }
    }
    Err(syn::Error::new_spanned(
        variant,
        format!(
            "variant `{}` has no #[error(\"…\")] message",
            variant.ident
        ),
    ))
}
