//! JSON-RPC 2.0 message types
//!
//! This module implements the in-memory side of the wire format. Every value
//! that must round-trip byte for byte (ids, params, results, error data) is
//! kept as raw JSON text rather than decoded:
//!
//! - **RequestId**: the exact encoding of `id`, so `1`, `"1"` and `null` stay distinct
//! - **Params**: the exact encoding of `params`, redecodable into any shape
//! - **Response**: result text or an `ErrorObject`, never both
//!
//! # Message Shapes
//!
//! A [`Message`] carries an id, the version marker and a [`Body`]:
//!
//! 1. **Request**: `Body::Request` with an id; expects a response
//! 2. **Notification**: `Body::Request` with no id; must never be answered
//! 3. **Response**: `Body::Response` with the id of the request it answers
//!
//! Because `Body` and `Response` are enums, "both request and response" and
//! "both result and error" cannot be built in memory. The remaining
//! invariant (a response always has an id) is checked by
//! [`Message::validate`], which runs on decode and again on encode.

use crate::code::ErrorCode;
use crate::error::{Error, ErrorObject, Result, Violation};
use crate::params::{FromParams, ParamsDecoder};
use serde::de::{Error as _, IgnoredAny};
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Maximum length of an id encoding: 32 hex encoded bytes, with 0x prefix, with quotes
pub const MAX_ID_LENGTH: usize = 32 * 2 + 2 + 2;

/// Skip leading JSON whitespace
pub(crate) fn trim_json_ws(raw: &str) -> &str {
    raw.trim_start_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r'))
}

/// Deserialize a member as raw JSON, keeping a literal `null` as `Some("null")`
pub(crate) fn deserialize_raw_some<'de, D>(deserializer: D) -> std::result::Result<Option<Box<RawValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

/// JSON-RPC 2.0 request ID
///
/// Holds the exact JSON text of the `id` member. An empty encoding means the
/// message has no id at all, i.e. it is a notification.
///
/// Ids are opaque correlation tokens: equality compares the stored text, so
/// `1` and `"1"` are different ids, and no numeric normalization happens.
///
/// # Grammar
///
/// A non-empty encoding must be at most [`MAX_ID_LENGTH`] bytes and be one of:
///
/// - `null`
/// - an unsigned decimal integer (`0`, `42`; no sign, fraction or exponent)
/// - a JSON string without raw control characters
///
/// Surrounding whitespace is never accepted.
///
/// # Examples
///
/// ```rust
/// use jsonrpc_wire_core::RequestId;
///
/// let id = RequestId::parse("42").unwrap();
/// assert_eq!(id.as_str(), "42");
/// assert_ne!(id, RequestId::parse("\"42\"").unwrap());
///
/// assert!(RequestId::parse("").unwrap().is_notification());
/// assert!(RequestId::parse("1.5").is_err());
/// assert!(RequestId::parse(" 1").is_err());
/// ```
#[derive(Clone, Default)]
pub struct RequestId(Option<Box<RawValue>>);

impl RequestId {
    /// Parse an id from its raw JSON encoding
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Ok(Self::notification());
        }
        check_id(raw)?;
        RawValue::from_string(raw.to_owned())
            .map(|raw| RequestId(Some(raw)))
            .map_err(|e| Error::InvalidId(e.to_string()))
    }

    pub(crate) fn from_raw(raw: Box<RawValue>) -> Result<Self> {
        check_id(raw.get())?;
        Ok(RequestId(Some(raw)))
    }

    /// The "no id" value carried by notifications
    pub fn notification() -> Self {
        RequestId(None)
    }

    /// The `null` id
    pub fn null() -> Self {
        RequestId(Some(raw_literal("null")))
    }

    /// A string id, JSON-escaped from `value`
    ///
    /// Fails if the encoded form exceeds [`MAX_ID_LENGTH`] or contains
    /// characters the grammar rejects.
    pub fn string(value: &str) -> Result<Self> {
        let raw = serde_json::value::to_raw_value(value).map_err(|e| Error::InvalidId(e.to_string()))?;
        Self::from_raw(raw)
    }

    /// True if this id denotes "no id" (a notification)
    pub fn is_notification(&self) -> bool {
        self.0.is_none()
    }

    /// True if this id is the literal `null`
    pub fn is_null(&self) -> bool {
        self.as_str() == "null"
    }

    /// The raw JSON encoding; empty for notifications
    pub fn as_str(&self) -> &str {
        self.0.as_deref().map_or("", RawValue::get)
    }

    pub(crate) fn as_raw(&self) -> Option<&RawValue> {
        self.0.as_deref()
    }
}

fn check_id(raw: &str) -> Result<()> {
    if raw.len() > MAX_ID_LENGTH {
        return Err(Error::InvalidId(format!(
            "encoding is {} bytes, limit is {}",
            raw.len(),
            MAX_ID_LENGTH
        )));
    }
    if is_valid_id(raw) {
        Ok(())
    } else {
        Err(Error::InvalidId(format!("{raw:?}")))
    }
}

/// Checks the id grammar with byte-class tests only.
fn is_valid_id(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    match bytes.first() {
        None => false,
        Some(b'n') => raw == "null",
        // any string without raw control characters or unescaped quotes
        Some(b'"') => {
            bytes.len() >= 2
                && bytes[bytes.len() - 1] == b'"'
                && serde_json::from_str::<IgnoredAny>(raw).is_ok()
        }
        // any integer number, but no "1e9", "-1", "1.0" etc.
        Some(_) => bytes.iter().all(u8::is_ascii_digit),
    }
}

fn raw_literal(text: &'static str) -> Box<RawValue> {
    RawValue::from_string(text.to_owned()).unwrap_or_else(|_| unreachable!("{text} is valid JSON"))
}

impl From<u64> for RequestId {
    fn from(n: u64) -> Self {
        RequestId(Some(raw_literal_owned(n.to_string())))
    }
}

impl From<u32> for RequestId {
    fn from(n: u32) -> Self {
        RequestId::from(u64::from(n))
    }
}

fn raw_literal_owned(text: String) -> Box<RawValue> {
    RawValue::from_string(text).unwrap_or_else(|e| unreachable!("integer literal is valid JSON: {e}"))
}

impl PartialEq for RequestId {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for RequestId {}

impl Hash for RequestId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(raw) => write!(f, "RequestId({})", raw.get()),
            None => f.write_str("RequestId(<notification>)"),
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.as_raw() {
            Some(raw) => raw.serialize(serializer),
            None => Err(S::Error::custom("a notification id has no JSON encoding")),
        }
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        RequestId::from_raw(raw).map_err(D::Error::custom)
    }
}

/// How params were sent on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamsKind {
    /// A JSON array (`[...]`)
    Positional,
    /// A JSON object (`{...}`)
    Named,
}

/// Raw JSON-RPC params
///
/// The exact text of the `params` member, validated only for shape: the
/// first non-whitespace byte must be `[` or `{`. Decoding into typed
/// arguments is deferred to [`ParamsDecoder`], so the same params can be
/// decoded into several destination shapes.
///
/// # Examples
///
/// ```rust
/// use jsonrpc_wire_core::{Params, ParamsKind};
///
/// let params = Params::parse("[42, 23]").unwrap();
/// assert_eq!(params.kind(), ParamsKind::Positional);
/// assert_eq!(params.count(), 2);
///
/// let sum: Vec<i64> = params.decode().unwrap();
/// assert_eq!(sum, vec![42, 23]);
///
/// assert!(Params::parse("\"bar\"").is_err());
/// ```
#[derive(Clone)]
pub struct Params(Box<RawValue>);

impl Params {
    /// Parse params from raw JSON, checking the array/object shape
    pub fn parse(raw: &str) -> Result<Self> {
        check_params_shape(raw)?;
        RawValue::from_string(raw.to_owned())
            .map(Params)
            .map_err(|e| Error::InvalidParams(e.to_string()))
    }

    pub(crate) fn from_raw(raw: Box<RawValue>) -> Result<Self> {
        check_params_shape(raw.get())?;
        Ok(Params(raw))
    }

    /// Serialize an application value as params
    ///
    /// The value must serialize to a JSON array or object.
    pub fn from_value<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let raw = serde_json::value::to_raw_value(value).map_err(|e| Error::Encode(e.to_string()))?;
        Self::from_raw(raw)
    }

    /// The raw JSON text
    pub fn get(&self) -> &str {
        self.0.get()
    }

    /// Whether the params are positional or named
    pub fn kind(&self) -> ParamsKind {
        match trim_json_ws(self.get()).as_bytes().first() {
            Some(b'[') => ParamsKind::Positional,
            _ => ParamsKind::Named,
        }
    }

    /// Number of top-level elements (array length or object key count)
    ///
    /// Best effort, for diagnostics only: returns 0 if the text cannot be
    /// read as either an array or an object.
    pub fn count(&self) -> usize {
        if let Ok(items) = serde_json::from_str::<Vec<IgnoredAny>>(self.get()) {
            return items.len();
        }
        if let Ok(members) = serde_json::from_str::<HashMap<String, IgnoredAny>>(self.get()) {
            return members.len();
        }
        0
    }

    /// Decode into a destination shape
    pub fn decode<E: FromParams>(&self) -> Result<E> {
        ParamsDecoder::<E>::new().decode(self.get())
    }
}

fn check_params_shape(raw: &str) -> Result<()> {
    match trim_json_ws(raw).as_bytes().first() {
        Some(b'[') | Some(b'{') => Ok(()),
        Some(_) => Err(Error::InvalidParams(
            "params must be a JSON array or object".into(),
        )),
        None => Err(Error::EmptyParams),
    }
}

impl PartialEq for Params {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl Eq for Params {}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Params({})", self.get())
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Params {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Params::from_raw(raw).map_err(D::Error::custom)
    }
}

/// The JSON-RPC version marker
///
/// A zero-sized stand-in for the literal `"2.0"`: it serializes to that
/// string and only deserializes from exactly that text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Version;

impl Version {
    /// The only supported version string
    pub const LITERAL: &'static str = "2.0";

    pub fn as_str(&self) -> &'static str {
        Self::LITERAL
    }

    /// Check the raw JSON text of a `jsonrpc` member
    pub(crate) fn from_raw(raw: &str) -> Result<Self> {
        if raw == "\"2.0\"" {
            Ok(Version)
        } else {
            Err(Error::InvalidVersion(raw.to_string()))
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::LITERAL)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(Self::LITERAL)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        Version::from_raw(raw.get()).map_err(D::Error::custom)
    }
}

/// The request half of a message: a method name and optional params
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Name of the method to invoke
    pub method: String,
    /// Raw params, if any were sent
    pub params: Option<Params>,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Option<Params>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// Decode the params into the destination shape `E`
    ///
    /// Absent params are treated as empty input.
    pub fn decode_params<E: FromParams>(&self) -> Result<E> {
        ParamsDecoder::<E>::new().decode_params(self.params.as_ref())
    }
}

/// The response half of a message: exactly one of result or error
#[derive(Debug, Clone)]
pub enum Response {
    /// Successful call; raw result JSON
    Success(Box<RawValue>),
    /// Failed call
    Failure(ErrorObject),
}

impl Response {
    /// Serialize `value` as a success result
    pub fn success<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::value::to_raw_value(value)
            .map(Response::Success)
            .map_err(|e| Error::Encode(format!("failed to encode response: {e}")))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Failure(_))
    }

    /// Raw result JSON, for success responses
    pub fn result(&self) -> Option<&RawValue> {
        match self {
            Response::Success(raw) => Some(raw),
            Response::Failure(_) => None,
        }
    }

    /// Error object, for failed responses
    pub fn error(&self) -> Option<&ErrorObject> {
        match self {
            Response::Success(_) => None,
            Response::Failure(err) => Some(err),
        }
    }
}

impl PartialEq for Response {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Response::Success(a), Response::Success(b)) => a.get() == b.get(),
            (Response::Failure(a), Response::Failure(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Response {}

impl From<ErrorObject> for Response {
    fn from(err: ErrorObject) -> Self {
        Response::Failure(err)
    }
}

/// Request or response payload of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Request(Request),
    Response(Response),
}

/// A JSON-RPC 2.0 message
///
/// Messages are built either by [`crate::codec::decode`] or by the
/// constructors below, and are not mutated afterwards: replies are new
/// messages that reuse the id of the message they answer.
///
/// # Examples
///
/// ```rust
/// use jsonrpc_wire_core::{codec, ErrorCode, ErrorObject};
///
/// let call = codec::decode(r#"{"jsonrpc":"2.0","method":"sum","params":[1,2],"id":7}"#).unwrap();
/// let args: Vec<i64> = call.as_request().unwrap().decode_params().unwrap();
///
/// let reply = call.respond(&args.iter().sum::<i64>());
/// assert_eq!(codec::encode(&reply).unwrap(), r#"{"jsonrpc":"2.0","id":7,"result":3}"#);
///
/// let failed = call.respond_err(ErrorObject::from_code(ErrorCode::METHOD_NOT_FOUND));
/// assert!(failed.as_response().unwrap().is_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub(crate) id: RequestId,
    pub(crate) jsonrpc: Version,
    pub(crate) body: Body,
}

impl Message {
    /// Build a request; with a notification id this is a notification
    pub fn request(id: RequestId, method: impl Into<String>, params: Option<Params>) -> Self {
        Self {
            id,
            jsonrpc: Version,
            body: Body::Request(Request::new(method, params)),
        }
    }

    /// Build a notification
    pub fn notification(method: impl Into<String>, params: Option<Params>) -> Self {
        Self::request(RequestId::notification(), method, params)
    }

    /// Build a response; fails for a notification id
    pub fn response(id: RequestId, response: Response) -> Result<Self> {
        let msg = Self {
            id,
            jsonrpc: Version,
            body: Body::Response(response),
        };
        msg.validate()?;
        Ok(msg)
    }

    /// Check the cross-field invariants
    ///
    /// The version marker and the request/response exclusivity are
    /// guaranteed by the types; what remains is that a response must carry
    /// an id.
    pub fn validate(&self) -> Result<()> {
        match &self.body {
            Body::Response(_) if self.id.is_notification() => {
                Err(Error::InvalidMessage(Violation::ResponseWithoutId))
            }
            _ => Ok(()),
        }
    }

    /// Correlation id; the notification id for notifications
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    /// Protocol version marker
    pub fn version(&self) -> Version {
        self.jsonrpc
    }

    /// Request or response payload
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// True for requests and notifications
    pub fn is_request(&self) -> bool {
        matches!(self.body, Body::Request(_))
    }

    /// True for requests without an id
    pub fn is_notification(&self) -> bool {
        self.is_request() && self.id.is_notification()
    }

    pub fn is_response(&self) -> bool {
        matches!(self.body, Body::Response(_))
    }

    pub fn as_request(&self) -> Option<&Request> {
        match &self.body {
            Body::Request(req) => Some(req),
            Body::Response(_) => None,
        }
    }

    pub fn as_response(&self) -> Option<&Response> {
        match &self.body {
            Body::Request(_) => None,
            Body::Response(resp) => Some(resp),
        }
    }

    /// Method name, for requests and notifications
    pub fn method(&self) -> Option<&str> {
        self.as_request().map(|req| req.method.as_str())
    }

    /// Raw params, for requests and notifications that carry them
    pub fn params(&self) -> Option<&Params> {
        self.as_request().and_then(|req| req.params.as_ref())
    }

    /// Build a success response carrying `payload`
    ///
    /// Fails if this message is already a response, or if `payload` cannot be
    /// serialized.
    pub fn respond_success<T: Serialize + ?Sized>(&self, payload: &T) -> Result<Message> {
        if self.is_response() {
            return Err(Error::RespondToResponse(self.id.clone()));
        }
        Ok(self.reply(Response::success(payload)?))
    }

    /// Build a success response, or an internal-error response if `payload`
    /// cannot be serialized
    ///
    /// Never fails for a pending request. A notification must not be
    /// answered: the reply built for one carries no id, so
    /// [`Message::validate`] and [`crate::codec::encode`] reject it.
    ///
    /// # Panics
    ///
    /// Panics if this message is already a response.
    pub fn respond<T: Serialize + ?Sized>(&self, payload: &T) -> Message {
        self.expect_pending("respond");
        match self.respond_success(payload) {
            Ok(msg) => msg,
            Err(err) => {
                tracing::warn!(
                    id = %self.id,
                    error = %err,
                    "Failed to encode result, responding with internal error"
                );
                self.reply(Response::Failure(ErrorObject::annotated(
                    ErrorCode::INTERNAL_ERROR,
                    &err,
                )))
            }
        }
    }

    /// Build an error response
    ///
    /// # Panics
    ///
    /// Panics if this message is already a response.
    pub fn respond_err(&self, error: ErrorObject) -> Message {
        self.expect_pending("respond_err");
        self.reply(Response::Failure(error))
    }

    fn reply(&self, response: Response) -> Message {
        Message {
            id: self.id.clone(),
            jsonrpc: Version,
            body: Body::Response(response),
        }
    }

    fn expect_pending(&self, operation: &'static str) {
        if self.is_response() {
            tracing::error!(id = %self.id, operation, "Attempted to respond to a response");
            panic!("{operation}: cannot respond to a response (id {})", self.id);
        }
    }
}
