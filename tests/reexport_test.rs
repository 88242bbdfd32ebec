//! The umbrella crate exposes the codec and derive without a direct
//! dependency on jsonrpc-wire-core

use jsonrpc_wire::{codec, ErrorCode, FromParams, ParamsDecoder};

#[derive(Debug, Default, PartialEq, FromParams)]
#[params(crate = "jsonrpc_wire::core")]
struct Transfer {
    to: String,
    amount: u64,
}

#[test]
fn test_derive_through_reexport() {
    let decoder = ParamsDecoder::<Transfer>::new();
    let transfer = decoder.decode(r#"{"to": "bob", "amount": 5}"#).unwrap();
    assert_eq!(transfer, Transfer { to: "bob".into(), amount: 5 });
}

#[test]
fn test_rejections_are_logged_at_debug() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let err = codec::decode(r#"{"jsonrpc": "2.0"}"#).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::INVALID_REQUEST);

        let err = ParamsDecoder::<Transfer>::new().decode("[1]").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::INVALID_PARAMS);
    });
}

#[test]
fn test_reply_serializes_with_serde_json() {
    let call = codec::decode(r#"{"jsonrpc":"2.0","method":"balance","id":"b"}"#).unwrap();
    let reply = call.respond(&serde_json::json!({"amount": "1000000000000000000000"}));
    let value = serde_json::to_value(&reply).unwrap();
    assert_eq!(value["id"], "b");
    assert_eq!(value["result"]["amount"], "1000000000000000000000");
}
