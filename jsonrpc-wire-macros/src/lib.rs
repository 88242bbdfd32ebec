//! Procedural macros for the jsonrpc-wire params decoder
//!
//! # `#[derive(FromParams)]`
//!
//! Makes a struct with named fields usable as a params destination. The
//! generated decoder accepts both wire shapes:
//!
//! - positional `[a, b]`: element i binds to the i-th declared field, and the
//!   array length must equal the field count
//! - named `{"a": .., "b": ..}`: members bind by key; missing and unknown
//!   keys are fine
//!
//! Fields left unbound, or bound to JSON `null`, keep their `Default` value,
//! so the struct must implement `Default`.
//!
//! # Attributes
//!
//! - `#[params(rename = "key")]` on a field: the key used for named params
//! - `#[params(crate = "path")]` on the struct: path to the core crate when
//!   it is only reachable through a re-export (e.g. `"jsonrpc_wire::core"`)
//!
//! # Examples
//!
//! ```ignore
//! use jsonrpc_wire_core::{FromParams, ParamsDecoder};
//!
//! #[derive(Debug, Default, FromParams)]
//! struct EthCall {
//!     to: String,
//!     #[params(rename = "blockNumber")]
//!     block_number: Option<String>,
//! }
//!
//! let call = ParamsDecoder::<EthCall>::new().decode(r#"["0xabc", "latest"]"#)?;
//! ```
//!
//! # Limitations
//!
//! - Only non-generic structs with named fields (or unit structs)
//! - Field types must implement `serde::de::DeserializeOwned`

mod from_params;

use proc_macro::TokenStream;

/// Derive `FromParams` for a record-like params destination
#[proc_macro_derive(FromParams, attributes(params))]
pub fn derive_from_params(input: TokenStream) -> TokenStream {
    from_params::derive_from_params_impl(input)
}
