//! End-to-end message handling: decode a call, bind its params, reply

use jsonrpc_wire_core::{
    codec, Error, ErrorCode, ErrorObject, FromParams, Message, Params, ParamsKind, RequestId, Response,
};
use serde::Serialize;

#[derive(Debug, Default, PartialEq, FromParams)]
struct Subtract {
    minuend: i64,
    subtrahend: i64,
}

/// Minimal dispatcher used by the tests below
fn handle(raw: &str) -> Option<String> {
    let call = match codec::decode(raw) {
        Ok(call) => call,
        Err(err) => {
            let reply = Message::response(RequestId::null(), Response::Failure(err.to_error_object()))
                .expect("null id is a valid response id");
            return Some(codec::encode(&reply).expect("encodable"));
        }
    };

    let reply = match call.method() {
        Some("subtract") => match call.as_request().unwrap().decode_params::<Subtract>() {
            Ok(args) => call.respond(&(args.minuend - args.subtrahend)),
            Err(err) => call.respond_err(err.to_error_object()),
        },
        Some("sum") => match call.as_request().unwrap().decode_params::<Vec<i64>>() {
            Ok(args) => call.respond(&args.iter().sum::<i64>()),
            Err(err) => call.respond_err(err.to_error_object()),
        },
        _ => call.respond_err(ErrorObject::from_code(ErrorCode::METHOD_NOT_FOUND)),
    };

    if call.is_notification() {
        return None;
    }
    Some(codec::encode(&reply).expect("encodable"))
}

#[test]
fn test_positional_and_named_calls_agree() {
    let by_position = handle(r#"{"jsonrpc": "2.0", "method": "subtract", "params": [42, 23], "id": 1}"#);
    assert_eq!(by_position.as_deref(), Some(r#"{"jsonrpc":"2.0","id":1,"result":19}"#));

    let by_name = handle(r#"{"jsonrpc": "2.0", "method": "subtract", "params": {"subtrahend": 23, "minuend": 42}, "id": 3}"#);
    assert_eq!(by_name.as_deref(), Some(r#"{"jsonrpc":"2.0","id":3,"result":19}"#));

    let reversed = handle(r#"{"jsonrpc": "2.0", "method": "subtract", "params": [23, 42], "id": 2}"#);
    assert_eq!(reversed.as_deref(), Some(r#"{"jsonrpc":"2.0","id":2,"result":-19}"#));
}

#[test]
fn test_params_errors_become_invalid_params() {
    let reply = handle(r#"{"jsonrpc": "2.0", "method": "subtract", "params": [42], "id": 4}"#).unwrap();
    let msg = codec::decode(&reply).unwrap();
    let err = msg.as_response().unwrap().error().unwrap();
    assert_eq!(err.error_code(), ErrorCode::INVALID_PARAMS);
    assert!(err.message.contains("expected 2 params, got 1 params"));

    let reply = handle(r#"{"jsonrpc": "2.0", "method": "sum", "params": {"a": 1}, "id": 5}"#).unwrap();
    let msg = codec::decode(&reply).unwrap();
    let err = msg.as_response().unwrap().error().unwrap();
    assert_eq!(err.code, -32602);
    assert!(err.message.contains("cannot decode named RPC params into list"));
}

#[test]
fn test_unknown_method() {
    let reply = handle(r#"{"jsonrpc": "2.0", "method": "foobar", "id": "1"}"#);
    assert_eq!(
        reply.as_deref(),
        Some(r#"{"jsonrpc":"2.0","id":"1","error":{"code":-32601,"message":"Method not found"}}"#)
    );
}

#[test]
fn test_notifications_get_no_reply() {
    assert_eq!(handle(r#"{"jsonrpc": "2.0", "method": "sum", "params": [1, 2]}"#), None);
    assert_eq!(handle(r#"{"jsonrpc": "2.0", "method": "foobar"}"#), None);
}

#[test]
fn test_garbage_gets_null_id_error() {
    let reply = handle(r#"{"jsonrpc": "2.0", "method": "foobar, "params": "bar", "baz]"#).unwrap();
    let msg = codec::decode(&reply).unwrap();
    assert!(msg.id().is_null());
    assert_eq!(msg.as_response().unwrap().error().unwrap().code, -32700);

    let reply = handle(r#"{"jsonrpc": "2.0", "method": 1, "params": "bar"}"#).unwrap();
    let msg = codec::decode(&reply).unwrap();
    assert_eq!(msg.as_response().unwrap().error().unwrap().code, -32600);

    let reply = handle(r#"{"jsonrpc": "2.0", "method": "sum", "params": "bar", "id": 1}"#).unwrap();
    let msg = codec::decode(&reply).unwrap();
    assert_eq!(msg.as_response().unwrap().error().unwrap().code, -32602);
}

#[test]
fn test_build_and_send_request() {
    #[derive(Serialize)]
    struct Args<'a> {
        minuend: i64,
        #[serde(rename = "subtrahend")]
        sub: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<&'a str>,
    }

    let params = Params::from_value(&Args { minuend: 10, sub: 4, note: None }).unwrap();
    assert_eq!(params.kind(), ParamsKind::Named);
    assert_eq!(params.count(), 2);

    let call = Message::request(RequestId::string("req-1").unwrap(), "subtract", Some(params));
    let wire = codec::encode(&call).unwrap();
    assert_eq!(
        wire,
        r#"{"jsonrpc":"2.0","id":"req-1","method":"subtract","params":{"minuend":10,"subtrahend":4}}"#
    );

    let reply = handle(&wire).unwrap();
    assert_eq!(reply, r#"{"jsonrpc":"2.0","id":"req-1","result":6}"#);

    // the client correlates by id text
    let reply = codec::decode(&reply).unwrap();
    assert_eq!(reply.id(), call.id());
    let value: i64 = serde_json::from_str(reply.as_response().unwrap().result().unwrap().get()).unwrap();
    assert_eq!(value, 6);
}

#[test]
fn test_scalar_params_are_rejected_at_decode() {
    assert!(matches!(Params::from_value(&5), Err(Error::InvalidParams(_))));
    assert!(matches!(Params::from_value("x"), Err(Error::InvalidParams(_))));
    assert!(Params::from_value(&[1, 2, 3]).is_ok());
}

#[test]
fn test_error_reply_with_data() {
    let call = codec::decode(r#"{"jsonrpc":"2.0","method":"eth_sendTransaction","id":9}"#).unwrap();
    let data = serde_json::value::to_raw_value(&serde_json::json!({"reason": "nonce too low"})).unwrap();
    let reply = call.respond_err(ErrorObject::with_data(
        ErrorCode::TRANSACTION_REJECTED.code(),
        ErrorCode::TRANSACTION_REJECTED.message(),
        data,
    ));
    assert_eq!(
        reply.to_string(),
        r#"{"jsonrpc":"2.0","id":9,"error":{"code":-32003,"message":"Transaction rejected","data":{"reason":"nonce too low"}}}"#
    );
}
