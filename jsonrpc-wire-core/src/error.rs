//! Error types for jsonrpc-wire
//!
//! This module provides error handling for every stage of the codec. It
//! defines two kinds of error values:
//!
//! - **Error**: failures raised by this crate (decode, encode, params binding)
//! - **ErrorObject**: the wire-format `error` member of a JSON-RPC response
//!
//! # Error Categories
//!
//! - **Decode errors**: `Parse`, `InvalidField`, `InvalidVersion`, `InvalidId`,
//!   `InvalidMessage`
//! - **Params errors**: `InvalidParams`, `EmptyParams`, `NamedParamsIntoList`,
//!   `ParamCount`, `FieldDecode`
//! - **Encode errors**: `Encode`, `InvalidMessage` (outbound value violates an
//!   invariant)
//! - **Reply errors**: `RespondToResponse`
//!
//! Any `Error` can be turned into an `ErrorObject` with
//! [`Error::to_error_object`], so a server can answer a bad request with a
//! protocol-level error without inventing its own mapping.
//!
//! # Examples
//!
//! ```rust
//! use jsonrpc_wire_core::{Error, ErrorCode, ErrorObject};
//!
//! let err = Error::ParamCount { expected: 2, actual: 3 };
//! let obj = err.to_error_object();
//! assert_eq!(obj.code, ErrorCode::INVALID_PARAMS.code());
//! assert_eq!(obj.message, "Invalid params: expected 2 params, got 3 params");
//! ```

use crate::code::ErrorCode;
use crate::types::{deserialize_raw_some, RequestId};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::fmt;
use thiserror::Error;

/// Result type for jsonrpc-wire operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for jsonrpc-wire operations
///
/// All failures are reported through this enum; nothing in the codec panics
/// on bad input. The only panics in the crate are the programmer-error
/// checks in `Message::respond` and `Message::respond_err`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The input is not syntactically valid JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// A member has the wrong JSON type, or a required member is missing
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// The `jsonrpc` member is not exactly `"2.0"`
    #[error("Invalid JSON-RPC version: {0}")]
    InvalidVersion(String),

    /// The `id` member does not follow the id grammar
    #[error("Invalid ID: {0}")]
    InvalidId(String),

    /// A cross-field message invariant does not hold
    #[error("Invalid message: {0}")]
    InvalidMessage(Violation),

    /// Params are malformed or have a shape the destination cannot take
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Params are absent but the destination requires data
    #[error("empty params data")]
    EmptyParams,

    /// Named (object) params cannot bind to a list destination
    #[error("cannot decode named RPC params into list")]
    NamedParamsIntoList,

    /// Positional params do not match the record's field count
    #[error("expected {expected} params, got {actual} params")]
    ParamCount {
        expected: usize,
        actual: usize,
    },

    /// One or more record fields failed to decode
    #[error("{}", join_field_errors(.0))]
    FieldDecode(Vec<FieldError>),

    /// A reply was requested for a message that is itself a response
    #[error("cannot respond to a response: {0}")]
    RespondToResponse(RequestId),

    /// A value could not be serialized
    #[error("Encode error: {0}")]
    Encode(String),
}

impl Error {
    /// Wire-format error code that best describes this failure
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Error::Parse(_) => ErrorCode::PARSE_ERROR,
            Error::InvalidField(_)
            | Error::InvalidVersion(_)
            | Error::InvalidId(_)
            | Error::InvalidMessage(_) => ErrorCode::INVALID_REQUEST,
            Error::InvalidParams(_)
            | Error::EmptyParams
            | Error::NamedParamsIntoList
            | Error::ParamCount { .. }
            | Error::FieldDecode(_) => ErrorCode::INVALID_PARAMS,
            Error::RespondToResponse(_) | Error::Encode(_) => ErrorCode::INTERNAL_ERROR,
        }
    }

    /// Convert into a wire error object annotated with this error's text
    pub fn to_error_object(&self) -> ErrorObject {
        ErrorObject::annotated(self.error_code(), self)
    }

    /// Whether the error came from params binding
    pub fn is_params_error(&self) -> bool {
        self.error_code() == ErrorCode::INVALID_PARAMS
    }

    /// Classify a `serde_json` failure on inbound data
    pub(crate) fn from_inbound(err: serde_json::Error) -> Self {
        use serde_json::error::Category;
        match err.classify() {
            Category::Data => Error::InvalidField(err.to_string()),
            Category::Io | Category::Syntax | Category::Eof => Error::Parse(err.to_string()),
        }
    }
}

impl From<Violation> for Error {
    fn from(v: Violation) -> Self {
        Error::InvalidMessage(v)
    }
}

/// Cross-field invariants of a JSON-RPC message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The object carries request members and response members
    RequestAndResponse,
    /// The object carries neither a method nor a result/error
    NeitherRequestNorResponse,
    /// A response carries both `result` and `error`
    ResultAndError,
    /// A response has no id (responses never answer notifications)
    ResponseWithoutId,
    /// `params` appeared without `method`
    ParamsWithoutMethod,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Violation::RequestAndResponse => "message is both a request and a response",
            Violation::NeitherRequestNorResponse => "message is neither a request nor a response",
            Violation::ResultAndError => "response has both result and error",
            Violation::ResponseWithoutId => "response must have an id",
            Violation::ParamsWithoutMethod => "params present without method",
        };
        f.write_str(msg)
    }
}

/// A single record field that failed to bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Position of the field in declaration order
    pub index: usize,
    /// Bound name of the field
    pub name: &'static str,
    /// Decoder error text
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to decode field {} ({}): {}",
            self.index, self.name, self.message
        )
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// JSON-RPC 2.0 error object
///
/// The `error` member of a failed response. `data` is carried as raw JSON
/// and passed through without interpretation.
///
/// # Examples
///
/// ```rust
/// use jsonrpc_wire_core::{ErrorCode, ErrorObject};
///
/// let plain = ErrorObject::from_code(ErrorCode::METHOD_NOT_FOUND);
/// assert_eq!(plain.message, "Method not found");
///
/// let annotated = ErrorObject::annotated(ErrorCode::INTERNAL_ERROR, "disk full");
/// assert_eq!(annotated.message, "Internal error: disk full");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Numeric error code
    pub code: i64,

    /// Short description of the error
    pub message: String,

    /// Additional opaque information about the error
    #[serde(
        default,
        deserialize_with = "deserialize_raw_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Box<RawValue>>,
}

impl ErrorObject {
    /// Create an error object with an explicit message
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error object carrying the catalog message verbatim
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code.code(), code.message())
    }

    /// Create an error object whose message is `"<catalog message>: <detail>"`
    ///
    /// Used to surface an internal failure as a JSON-RPC error without losing
    /// the cause text.
    pub fn annotated(code: ErrorCode, detail: impl fmt::Display) -> Self {
        Self::new(code.code(), format!("{}: {}", code.message(), detail))
    }

    /// Create an error object with opaque data attached
    pub fn with_data(code: i64, message: impl Into<String>, data: Box<RawValue>) -> Self {
        Self {
            data: Some(data),
            ..Self::new(code, message)
        }
    }

    /// The code as a catalog entry
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode(self.code)
    }
}

impl From<ErrorCode> for ErrorObject {
    fn from(code: ErrorCode) -> Self {
        Self::from_code(code)
    }
}

impl PartialEq for ErrorObject {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
            && self.message == other.message
            && self.data.as_deref().map(RawValue::get) == other.data.as_deref().map(RawValue::get)
    }
}

impl Eq for ErrorObject {}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorObject {}
