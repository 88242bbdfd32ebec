//! jsonrpc-wire - strict JSON-RPC 2.0 message codec
//!
//! This is the convenience crate that re-exports the jsonrpc-wire sub-crates.
//!
//! # Architecture
//!
//! - **jsonrpc-wire-core**: message types, codec, params decoding, error
//!   catalog, observability
//! - **jsonrpc-wire-macros**: `#[derive(FromParams)]`
//!
//! # Quick Start
//!
//! ```rust
//! use jsonrpc_wire::{codec, ErrorCode, ErrorObject, FromParams};
//!
//! #[derive(Default, FromParams)]
//! #[params(crate = "jsonrpc_wire::core")]
//! struct Greet {
//!     name: String,
//! }
//!
//! let call = codec::decode(r#"{"jsonrpc":"2.0","method":"greet","params":["ada"],"id":"g1"}"#).unwrap();
//! let reply = match call.method() {
//!     Some("greet") => match call.as_request().unwrap().decode_params::<Greet>() {
//!         Ok(p) => call.respond(&format!("hello {}", p.name)),
//!         Err(e) => call.respond_err(e.to_error_object()),
//!     },
//!     _ => call.respond_err(ErrorObject::from_code(ErrorCode::METHOD_NOT_FOUND)),
//! };
//! assert_eq!(reply.to_string(), r#"{"jsonrpc":"2.0","id":"g1","result":"hello ada"}"#);
//! ```
//!
//! Types deriving `FromParams` through this crate need
//! `#[params(crate = "jsonrpc_wire::core")]`, since the generated code names
//! the core crate.

pub use jsonrpc_wire_core as core;
pub use jsonrpc_wire_macros as macros;

// Convenience re-exports of the most commonly used items
pub use jsonrpc_wire_core::{
    codec, params_decoder, Error, ErrorCode, ErrorObject, FromParams, Message, Params, ParamsDecoder,
    RequestId, Response, Result,
};
