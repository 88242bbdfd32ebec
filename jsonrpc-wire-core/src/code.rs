//! JSON-RPC error code catalog
//!
//! Error codes are plain signed integers on the wire. This module gives the
//! well-known ones a name and a canonical message:
//!
//! - `-32700..=-32600`: the standard JSON-RPC 2.0 codes
//! - `-32099..-32000`: reserved for implementation-defined server errors
//! - `-32000..=-32006`: EIP-1474 extensions (Ethereum JSON-RPC)
//! - `4001..=4901`: EIP-1193 provider errors
//!
//! Any other integer is still a valid `ErrorCode`; its message falls back to
//! `"Non-standard error-code N"`.
//!
//! # Examples
//!
//! ```rust
//! use jsonrpc_wire_core::ErrorCode;
//!
//! assert_eq!(ErrorCode::METHOD_NOT_FOUND.message(), "Method not found");
//! assert!(ErrorCode(-32050).is_server_error());
//! assert!(ErrorCode(999999).message().contains("999999"));
//! ```

use std::borrow::Cow;
use std::fmt;

/// A JSON-RPC error code.
///
/// The wrapped integer is public so received codes that are not in the
/// catalog can be carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorCode(pub i64);

impl ErrorCode {
    /// Invalid JSON was received by the server.
    pub const PARSE_ERROR: ErrorCode = ErrorCode(-32700);
    /// The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: ErrorCode = ErrorCode(-32600);
    /// The method does not exist / is not available.
    pub const METHOD_NOT_FOUND: ErrorCode = ErrorCode(-32601);
    /// Invalid method parameter(s).
    pub const INVALID_PARAMS: ErrorCode = ErrorCode(-32602);
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: ErrorCode = ErrorCode(-32603);

    /// (EIP-1474) Missing or invalid parameters
    pub const INVALID_INPUT: ErrorCode = ErrorCode(-32000);
    /// (EIP-1474) Requested resource not found
    pub const RESOURCE_NOT_FOUND: ErrorCode = ErrorCode(-32001);
    /// (EIP-1474) Requested resource not available
    pub const RESOURCE_UNAVAILABLE: ErrorCode = ErrorCode(-32002);
    /// (EIP-1474) Transaction creation failed
    pub const TRANSACTION_REJECTED: ErrorCode = ErrorCode(-32003);
    /// (EIP-1474) Method is not implemented
    pub const METHOD_NOT_SUPPORTED: ErrorCode = ErrorCode(-32004);
    /// (EIP-1474) Request exceeds defined limit
    pub const LIMIT_EXCEEDED: ErrorCode = ErrorCode(-32005);
    /// (EIP-1474) Version of JSON-RPC protocol is not supported
    pub const JSONRPC_VERSION_NOT_SUPPORTED: ErrorCode = ErrorCode(-32006);

    /// (EIP-1193) The user rejected the request.
    pub const USER_REJECTED_REQUEST: ErrorCode = ErrorCode(4001);
    /// (EIP-1193) The requested method and/or account has not been authorized by the user.
    pub const UNAUTHORIZED: ErrorCode = ErrorCode(4100);
    /// (EIP-1193) The Provider does not support the requested method.
    pub const UNSUPPORTED_METHOD: ErrorCode = ErrorCode(4200);
    /// (EIP-1193) The Provider is disconnected from all chains.
    pub const DISCONNECTED: ErrorCode = ErrorCode(4900);
    /// (EIP-1193) The Provider is not connected to the requested chain.
    pub const CHAIN_DISCONNECTED: ErrorCode = ErrorCode(4901);

    /// Numeric value of the code
    pub const fn code(self) -> i64 {
        self.0
    }

    /// Canonical message for this code
    ///
    /// Catalog codes borrow a static string; anything else gets a synthesized
    /// message that embeds the numeric code.
    pub fn message(self) -> Cow<'static, str> {
        match self.canonical_message() {
            Some(msg) => Cow::Borrowed(msg),
            None => Cow::Owned(format!("Non-standard error-code {}", self.0)),
        }
    }

    /// Whether this code is part of the catalog
    pub fn is_known(self) -> bool {
        self.canonical_message().is_some()
    }

    /// Whether the code lies in the band reserved for
    /// implementation-defined server errors (`-32099 <= code < -32000`).
    pub const fn is_server_error(self) -> bool {
        self.0 >= -32099 && self.0 < -32000
    }

    fn canonical_message(self) -> Option<&'static str> {
        let msg = match self {
            Self::PARSE_ERROR => "Parse error",
            Self::INVALID_REQUEST => "Invalid Request",
            Self::METHOD_NOT_FOUND => "Method not found",
            Self::INVALID_PARAMS => "Invalid params",
            Self::INTERNAL_ERROR => "Internal error",
            Self::INVALID_INPUT => "Invalid input",
            Self::RESOURCE_NOT_FOUND => "Resource not found",
            Self::RESOURCE_UNAVAILABLE => "Resource unavailable",
            Self::TRANSACTION_REJECTED => "Transaction rejected",
            Self::METHOD_NOT_SUPPORTED => "Method not supported",
            Self::LIMIT_EXCEEDED => "Limit exceeded",
            Self::JSONRPC_VERSION_NOT_SUPPORTED => "JSON-RPC version not supported",
            Self::USER_REJECTED_REQUEST => "User Rejected Request",
            Self::UNAUTHORIZED => "Unauthorized",
            Self::UNSUPPORTED_METHOD => "Unsupported Method",
            Self::DISCONNECTED => "Disconnected",
            Self::CHAIN_DISCONNECTED => "Chain Disconnected",
            _ => return None,
        };
        Some(msg)
    }
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        ErrorCode(code)
    }
}

impl From<ErrorCode> for i64 {
    fn from(code: ErrorCode) -> Self {
        code.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.0, self.message())
    }
}
