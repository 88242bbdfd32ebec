//! Codec for JSON-RPC message serialization and deserialization
//!
//! A message on the wire is a single JSON object. Decoding reads it into a
//! flat view of the known members, then checks the cross-member rules before
//! producing a [`Message`]:
//!
//! - `jsonrpc` must be present and exactly `"2.0"`
//! - a missing `id` means notification; `"id": null` is the null id
//! - a message is a request (`method`, optional `params`) or a response
//!   (`result` or `error`), never both
//! - `params`, when present, must be an array or object
//! - a response must have an id
//!
//! Unknown members are ignored. Arrays (batches) are rejected.
//!
//! Encoding writes members in a fixed order: `jsonrpc`, `id`, then the body.
//!
//! # Examples
//!
//! ```rust
//! use jsonrpc_wire_core::codec;
//!
//! let msg = codec::decode(r#"{"jsonrpc": "2.0", "method": "ping", "id": 1}"#).unwrap();
//! assert_eq!(msg.method(), Some("ping"));
//!
//! let json = codec::encode(&msg).unwrap();
//! assert_eq!(json, r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#);
//!
//! assert!(codec::decode(r#"{"jsonrpc": "1.0", "method": "ping"}"#).is_err());
//! ```

use crate::error::{Error, ErrorObject, Result, Violation};
use crate::types::{deserialize_raw_some, trim_json_ws, Body, Message, Params, Request, RequestId, Response, Version};
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;
use std::fmt;
use std::str::FromStr;

/// Flat view of the members a message may carry
#[derive(Deserialize)]
struct WireMessage {
    jsonrpc: Option<Box<RawValue>>,
    #[serde(default, deserialize_with = "deserialize_raw_some")]
    id: Option<Box<RawValue>>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default, deserialize_with = "deserialize_raw_some")]
    params: Option<Box<RawValue>>,
    #[serde(default, deserialize_with = "deserialize_raw_some")]
    result: Option<Box<RawValue>>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

impl TryFrom<WireMessage> for Message {
    type Error = Error;

    fn try_from(wire: WireMessage) -> Result<Self> {
        let jsonrpc = match wire.jsonrpc {
            Some(raw) => Version::from_raw(raw.get())?,
            None => return Err(Error::InvalidVersion("missing".into())),
        };
        let id = match wire.id {
            Some(raw) => RequestId::from_raw(raw)?,
            None => RequestId::notification(),
        };

        let is_request = wire.method.is_some() || wire.params.is_some();
        let is_response = wire.result.is_some() || wire.error.is_some();
        if is_request && is_response {
            return Err(Violation::RequestAndResponse.into());
        }

        let body = match (wire.method, wire.params, wire.result, wire.error) {
            (Some(method), params, _, _) => {
                let params = params.map(Params::from_raw).transpose()?;
                Body::Request(Request { method, params })
            }
            (None, Some(_), _, _) => return Err(Violation::ParamsWithoutMethod.into()),
            (None, None, Some(_), Some(_)) => return Err(Violation::ResultAndError.into()),
            (None, None, Some(result), None) => Body::Response(Response::Success(result)),
            (None, None, None, Some(error)) => Body::Response(Response::Failure(error)),
            (None, None, None, None) => return Err(Violation::NeitherRequestNorResponse.into()),
        };

        let msg = Message { id, jsonrpc, body };
        msg.validate()?;
        Ok(msg)
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.validate().map_err(S::Error::custom)?;

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("jsonrpc", &self.jsonrpc)?;
        if let Some(id) = self.id.as_raw() {
            map.serialize_entry("id", id)?;
        }
        match &self.body {
            Body::Request(req) => {
                map.serialize_entry("method", &req.method)?;
                if let Some(params) = &req.params {
                    map.serialize_entry("params", params)?;
                }
            }
            Body::Response(Response::Success(result)) => {
                map.serialize_entry("result", result)?;
            }
            Body::Response(Response::Failure(error)) => {
                map.serialize_entry("error", error)?;
            }
        }
        map.end()
    }
}

/// Decode a single JSON-RPC message
///
/// # Errors
///
/// - `Error::Parse` if the input is not valid JSON
/// - `Error::InvalidField` if a member has the wrong JSON type, or the
///   input is not an object
/// - `Error::InvalidVersion`, `Error::InvalidId`, `Error::InvalidParams`
///   for bad member values
/// - `Error::InvalidMessage` if the members do not form a request or a
///   response
pub fn decode(data: &str) -> Result<Message> {
    decode_inner(data).map_err(|err| {
        tracing::debug!(error = %err, "Rejected inbound message");
        err
    })
}

fn decode_inner(data: &str) -> Result<Message> {
    if trim_json_ws(data).starts_with('[') {
        return Err(Error::InvalidField("batch messages are not supported".into()));
    }
    let wire: WireMessage = serde_json::from_str(data).map_err(Error::from_inbound)?;
    let msg = Message::try_from(wire)?;
    tracing::trace!(id = %msg.id, method = msg.method(), "Decoded message");
    Ok(msg)
}

/// Decode a single JSON-RPC message from bytes
pub fn decode_slice(data: &[u8]) -> Result<Message> {
    let data = std::str::from_utf8(data).map_err(|e| Error::Parse(e.to_string()))?;
    decode(data)
}

/// Encode a message to a JSON string
///
/// # Errors
///
/// Returns `Error::InvalidMessage` for a response without an id, and
/// `Error::Encode` if serialization fails.
pub fn encode(msg: &Message) -> Result<String> {
    msg.validate()?;
    let json = serde_json::to_string(msg).map_err(|e| Error::Encode(e.to_string()))?;
    tracing::trace!(id = %msg.id, len = json.len(), "Encoded message");
    Ok(json)
}

/// Encode a message to JSON bytes
pub fn encode_vec(msg: &Message) -> Result<Vec<u8>> {
    msg.validate()?;
    serde_json::to_vec(msg).map_err(|e| Error::Encode(e.to_string()))
}

impl FromStr for Message {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        decode(s)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match encode(self) {
            Ok(json) => f.write_str(&json),
            Err(err) => write!(f, "<invalid message: {err}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::ErrorCode;

    const VALID: &[&str] = &[
        r#"{"jsonrpc": "2.0", "method": "subtract", "params": [42,23], "id": 1}"#,
        r#"{"jsonrpc": "2.0", "result": 19, "id": 1}"#,
        r#"{"jsonrpc": "2.0", "method": "subtract", "params": [23,42], "id": 2}"#,
        r#"{"jsonrpc": "2.0", "result": -19, "id": 2}"#,
        r#"{"jsonrpc": "2.0", "method": "subtract", "params": {"subtrahend":23,"minuend":42}, "id": 3}"#,
        r#"{"jsonrpc": "2.0", "result": 19, "id": 3}"#,
        r#"{"jsonrpc": "2.0", "method": "subtract", "params": {"minuend":42,"subtrahend":23}, "id": 4}"#,
        r#"{"jsonrpc": "2.0", "result": 19, "id": 4}"#,
        r#"{"jsonrpc": "2.0", "method": "update", "params": [1,2,3,4,5]}"#,
        r#"{"jsonrpc": "2.0", "method": "foobar"}"#,
        r#"{"jsonrpc": "2.0", "method": "foobar", "id": "1"}"#,
        r#"{"jsonrpc": "2.0", "error": {"code": -32601, "message": "Method not found"}, "id": "1"}"#,
        r#"{"jsonrpc": "2.0", "error": {"code": -32700, "message": "Parse error"}, "id": null}"#,
        r#"{"jsonrpc": "2.0", "error": {"code": -32600, "message": "Invalid Request"}, "id": null}"#,
        r#"{"jsonrpc": "2.0", "method": "sum", "params": [1,2,4], "id": "1"}"#,
        r#"{"jsonrpc": "2.0", "method": "notify_hello", "params": [7]}"#,
        r#"{"jsonrpc": "2.0", "result": 7, "id": "1"}"#,
        r#"{"jsonrpc": "2.0", "result": null, "id": 5}"#,
        r#"{"jsonrpc": "2.0", "result": ["hello", 5], "id": "9"}"#,
        r#"{"jsonrpc": "2.0", "error": {"code": -32000, "message": "Server error", "data": {"why": "busy"}}, "id": 6}"#,
    ];

    const INVALID: &[&str] = &[
        r#"{"jsonrpc": "2.0", "method": "foobar, "params": "bar", "baz]"#,
        r#"{"jsonrpc": "2.0", "method": 1, "params": "bar"}"#,
        r#"{"jsonrpc": "2.0", "method": "foobar", "params": "bar"}"#,
        r#"{"jsonrpc": "1.0", "method": "foobar", "params": []}"#,
        r#"{"jsonrpc": "2.0"}"#,
        r#"{"jsonrpc": "2.0", "result": 1}"#,
        r#"{"method": "foobar", "id": 1}"#,
        r#"{"jsonrpc": "2.0", "method": "foobar", "params": null}"#,
        r#"{"jsonrpc": "2.0", "method": "foobar", "id": 1.5}"#,
        r#"{"jsonrpc": "2.0", "method": "foobar", "id": -1}"#,
        r#"{"jsonrpc": "2.0", "method": "foobar", "id": {}}"#,
        r#"{"jsonrpc": "2.0", "params": [1]}"#,
        r#"{"jsonrpc": "2.0", "method": "foobar", "result": 1, "id": 1}"#,
        r#"{"jsonrpc": "2.0", "result": 1, "error": {"code": 1, "message": "x"}, "id": 1}"#,
        r#"[{"jsonrpc": "2.0", "method": "foobar", "id": 1}]"#,
        r#"[]"#,
        r#""2.0""#,
        "",
    ];

    #[test]
    fn test_valid_messages() {
        for (i, input) in VALID.iter().enumerate() {
            let msg = decode(input).unwrap_or_else(|e| panic!("case {i}: {e}"));
            let encoded = encode(&msg).unwrap_or_else(|e| panic!("case {i}: {e}"));
            let again = decode(&encoded).unwrap_or_else(|e| panic!("case {i}: {e}"));
            assert_eq!(msg, again, "case {i} changed after a round trip");
            assert_eq!(encoded, encode(&again).unwrap(), "case {i} is not stable");
        }
    }

    #[test]
    fn test_invalid_messages() {
        for (i, input) in INVALID.iter().enumerate() {
            assert!(decode(input).is_err(), "case {i} should fail: {input}");
        }
    }

    #[test]
    fn test_error_categories() {
        assert!(matches!(decode(r#"{"jsonrpc": "2.0", "method": "x"#), Err(Error::Parse(_))));
        assert!(matches!(decode(r#"{"jsonrpc": "2.0", "method": 1}"#), Err(Error::InvalidField(_))));
        assert!(matches!(decode(r#"{"jsonrpc": "1.0", "method": "x"}"#), Err(Error::InvalidVersion(_))));
        assert!(matches!(decode(r#"{"jsonrpc": 2.0, "method": "x"}"#), Err(Error::InvalidVersion(_))));
        assert!(matches!(decode(r#"{"method": "x"}"#), Err(Error::InvalidVersion(_))));
        assert!(matches!(decode(r#"{"jsonrpc": "2.0", "method": "x", "id": 1.0}"#), Err(Error::InvalidId(_))));
        assert!(matches!(
            decode(r#"{"jsonrpc": "2.0", "method": "x", "params": 5}"#),
            Err(Error::InvalidParams(_))
        ));
        assert_eq!(
            decode(r#"{"jsonrpc": "2.0"}"#),
            Err(Error::InvalidMessage(Violation::NeitherRequestNorResponse))
        );
        assert_eq!(
            decode(r#"{"jsonrpc": "2.0", "result": 1}"#),
            Err(Error::InvalidMessage(Violation::ResponseWithoutId))
        );
        assert_eq!(
            decode(r#"{"jsonrpc": "2.0", "params": {}}"#),
            Err(Error::InvalidMessage(Violation::ParamsWithoutMethod))
        );
        assert_eq!(
            decode(r#"{"jsonrpc": "2.0", "method": "x", "error": {"code": 1, "message": ""}, "id": 1}"#),
            Err(Error::InvalidMessage(Violation::RequestAndResponse))
        );
        assert_eq!(
            decode(r#"{"jsonrpc": "2.0", "result": 1, "error": {"code": 1, "message": ""}, "id": 1}"#),
            Err(Error::InvalidMessage(Violation::ResultAndError))
        );
    }

    #[test]
    fn test_decode_errors_map_to_codes() {
        let err = decode("{").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::PARSE_ERROR);
        let err = decode(r#"{"jsonrpc": "2.0"}"#).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::INVALID_REQUEST);
        let err = decode(r#"[{"jsonrpc": "2.0", "method": "x"}]"#).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::INVALID_REQUEST);
    }

    #[test]
    fn test_notification_vs_null_id() {
        let notification = decode(r#"{"jsonrpc": "2.0", "method": "x"}"#).unwrap();
        assert!(notification.is_notification());
        assert!(notification.id().is_notification());

        let null_id = decode(r#"{"jsonrpc": "2.0", "method": "x", "id": null}"#).unwrap();
        assert!(!null_id.is_notification());
        assert!(null_id.id().is_null());
        assert_eq!(
            encode(&null_id).unwrap(),
            r#"{"jsonrpc":"2.0","id":null,"method":"x"}"#
        );
        assert_eq!(encode(&notification).unwrap(), r#"{"jsonrpc":"2.0","method":"x"}"#);
    }

    #[test]
    fn test_null_result_is_kept() {
        let msg = decode(r#"{"jsonrpc": "2.0", "result": null, "id": 1}"#).unwrap();
        let resp = msg.as_response().unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.result().map(RawValue::get), Some("null"));
        assert_eq!(encode(&msg).unwrap(), r#"{"jsonrpc":"2.0","id":1,"result":null}"#);
    }

    #[test]
    fn test_unknown_members_ignored() {
        let msg = decode(r#"{"jsonrpc": "2.0", "method": "x", "id": 1, "extra": [1, 2]}"#).unwrap();
        assert_eq!(msg.method(), Some("x"));
        assert!(!encode(&msg).unwrap().contains("extra"));
    }

    #[test]
    fn test_params_text_is_preserved() {
        let msg = decode(r#"{"jsonrpc":"2.0","method":"x","params":[1.000, 123456789012345678901234567890],"id":1}"#)
            .unwrap();
        assert_eq!(msg.params().unwrap().get(), "[1.000, 123456789012345678901234567890]");
    }

    #[test]
    fn test_error_data_is_preserved() {
        let msg = decode(
            r#"{"jsonrpc":"2.0","error":{"code":-32000,"message":"Server error","data":{"retry":true}},"id":"a"}"#,
        )
        .unwrap();
        let err = msg.as_response().unwrap().error().unwrap();
        assert_eq!(err.code, -32000);
        assert_eq!(err.data.as_ref().map(|d| d.get()), Some(r#"{"retry":true}"#));
    }

    #[test]
    fn test_encode_rejects_response_without_id() {
        let msg = Message {
            id: RequestId::notification(),
            jsonrpc: Version,
            body: Body::Response(Response::success(&1).unwrap()),
        };
        assert_eq!(encode(&msg), Err(Error::InvalidMessage(Violation::ResponseWithoutId)));
        assert!(encode_vec(&msg).is_err());
        assert!(msg.to_string().starts_with("<invalid message"));
    }

    #[test]
    fn test_bytes_and_from_str() {
        let input = r#"{"jsonrpc":"2.0","id":"abc","method":"echo","params":["hi"]}"#;
        let msg: Message = input.parse().unwrap();
        assert_eq!(decode_slice(input.as_bytes()).unwrap(), msg);
        assert_eq!(encode_vec(&msg).unwrap(), input.as_bytes());
        assert_eq!(msg.to_string(), input);

        assert!(matches!(decode_slice(&[0xff, 0xfe]), Err(Error::Parse(_))));
    }

    #[test]
    fn test_respond_round_trip() {
        let call = decode(r#"{"jsonrpc": "2.0", "method": "subtract", "params": [42, 23], "id": 1}"#).unwrap();
        let args: Vec<i64> = call.as_request().unwrap().decode_params().unwrap();
        let reply = call.respond(&(args[0] - args[1]));
        assert_eq!(encode(&reply).unwrap(), r#"{"jsonrpc":"2.0","id":1,"result":19}"#);

        let failed = call.respond_err(ErrorObject::from_code(ErrorCode::METHOD_NOT_FOUND));
        assert_eq!(
            encode(&failed).unwrap(),
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found"}}"#
        );
    }
}
