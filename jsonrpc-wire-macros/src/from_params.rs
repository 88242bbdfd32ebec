//! `#[derive(FromParams)]` implementation
//!
//! For a struct with named fields, generates a `FromParams` impl that binds
//! params to the fields in declaration order. The field list becomes a
//! `RecordPlan` built on first use and cached in a static.
//!
//! Input:
//! ```ignore
//! #[derive(Default, FromParams)]
//! struct GetLogs {
//!     #[params(rename = "fromBlock")]
//!     from_block: u64,
//!     address: String,
//! }
//! ```
//!
//! Generated output:
//! ```ignore
//! impl ::jsonrpc_wire_core::params::FromParams for GetLogs {
//!     const SHAPE: ::jsonrpc_wire_core::params::Shape = ::jsonrpc_wire_core::params::Shape::Record;
//!
//!     fn from_params(raw: &str) -> ::jsonrpc_wire_core::Result<Self> {
//!         static PLAN: OnceLock<RecordPlan<GetLogs>> = OnceLock::new();
//!         PLAN.get_or_init(|| {
//!             RecordPlan::new()
//!                 .field("fromBlock", |record: &mut GetLogs, value: u64| record.from_block = value)
//!                 .field("address", |record: &mut GetLogs, value: String| record.address = value)
//!         })
//!         .decode(raw)
//!     }
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use std::collections::HashSet;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Field, Fields, LitStr, Path};

pub fn derive_from_params_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "FromParams cannot be derived for generic types",
        ));
    }

    let krate = crate_path(&input.attrs)?;

    let fields: Vec<&Field> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    &data.fields,
                    "FromParams needs named fields; use Vec<T> for positional-only params",
                ))
            }
        },
        Data::Enum(data) => {
            return Err(syn::Error::new_spanned(
                data.enum_token,
                "FromParams can only be derived for structs",
            ))
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "FromParams can only be derived for structs",
            ))
        }
    };

    let mut seen = HashSet::new();
    let mut slots = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(ident) = &field.ident else { continue };
        let key = wire_name(field)?;
        if !seen.insert(key.value()) {
            return Err(syn::Error::new_spanned(
                &key,
                format!("duplicate params key `{}`", key.value()),
            ));
        }
        let ty = &field.ty;
        slots.push(quote! {
            .field(#key, |record: &mut #name, value: #ty| record.#ident = value)
        });
    }

    Ok(quote! {
        impl #krate::params::FromParams for #name {
            const SHAPE: #krate::params::Shape = #krate::params::Shape::Record;

            fn from_params(raw: &str) -> #krate::Result<Self> {
                static PLAN: ::std::sync::OnceLock<#krate::params::RecordPlan<#name>> =
                    ::std::sync::OnceLock::new();
                PLAN.get_or_init(|| #krate::params::RecordPlan::new() #(#slots)*)
                    .decode(raw)
            }
        }
    })
}

/// `#[params(crate = "...")]` on the struct, for use through a re-export
fn crate_path(attrs: &[Attribute]) -> syn::Result<TokenStream2> {
    let mut path: Option<Path> = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("params")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                let lit: LitStr = meta.value()?.parse()?;
                path = Some(lit.parse()?);
                Ok(())
            } else {
                Err(meta.error("unsupported container attribute, expected `crate`"))
            }
        })?;
    }
    Ok(match path {
        Some(path) => quote!(#path),
        None => quote!(::jsonrpc_wire_core),
    })
}

/// Key used for named params: `#[params(rename = "...")]` or the field name
fn wire_name(field: &Field) -> syn::Result<LitStr> {
    let mut key = field
        .ident
        .as_ref()
        .map(|ident| LitStr::new(&ident.unraw().to_string(), ident.span()));
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("params")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                key = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unsupported field attribute, expected `rename`"))
            }
        })?;
    }
    key.ok_or_else(|| syn::Error::new_spanned(field, "field has no name"))
}
