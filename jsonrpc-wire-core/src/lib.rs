//! Core JSON-RPC 2.0 message codec for jsonrpc-wire
//!
//! This crate provides the wire layer of JSON-RPC 2.0, without any transport:
//!
//! - **Types**: [`Message`], [`RequestId`], [`Params`] and the request and
//!   response bodies
//! - **Codec**: strict decoding and encoding of single messages
//! - **Params**: typed decoding of params that reconciles positional and
//!   named calls with the destination type
//! - **Error handling**: the [`ErrorCode`] catalog, wire [`ErrorObject`]s and
//!   the crate [`Error`]
//! - **Observability**: `tracing` subscriber setup with optional OTLP export
//!
//! Payloads (`params`, `result`, `error.data`) are kept as raw JSON text, so
//! numbers keep their full precision and nothing is decoded twice.
//!
//! # Example
//!
//! ```rust
//! use jsonrpc_wire_core::{codec, FromParams};
//!
//! #[derive(Default, FromParams)]
//! struct Subtract {
//!     minuend: i64,
//!     subtrahend: i64,
//! }
//!
//! let call = codec::decode(r#"{"jsonrpc":"2.0","method":"subtract","params":{"minuend":42,"subtrahend":23},"id":1}"#).unwrap();
//! let args: Subtract = call.as_request().unwrap().decode_params().unwrap();
//!
//! let reply = call.respond(&(args.minuend - args.subtrahend));
//! assert_eq!(codec::encode(&reply).unwrap(), r#"{"jsonrpc":"2.0","id":1,"result":19}"#);
//! ```

// lets `#[derive(FromParams)]` expand to `::jsonrpc_wire_core::...` inside this crate
extern crate self as jsonrpc_wire_core;

pub mod code;
pub mod codec;
pub mod error;
pub mod observability;
pub mod params;
pub mod types;

pub use code::ErrorCode;
pub use error::{Error, ErrorObject, FieldError, Result, Violation};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use params::{params_decoder, FromParams, ParamsDecoder, RecordPlan, Shape};
pub use types::{Body, Message, Params, ParamsKind, Request, RequestId, Response, Version, MAX_ID_LENGTH};

pub use jsonrpc_wire_macros::FromParams;
