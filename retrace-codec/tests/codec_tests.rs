use pretty_assertions::assert_eq;
use proptest::prelude::*;
use retrace_codec::{CodecError, JsonSnapshotCodec, SnapshotCodec};
use retrace_types::Attributes;
use serde_json::{Value, json};

fn attrs(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

// ── Decode ───────────────────────────────────────────────────────

#[test]
fn decodes_attribute_mapping() {
    let codec = JsonSnapshotCodec;
    let decoded = codec.decode(r#"{"title":"Hello","views":3}"#).unwrap();
    assert_eq!(decoded.get("title"), Some(&json!("Hello")));
    assert_eq!(decoded.get("views"), Some(&json!(3)));
}

#[test]
fn malformed_input_fails_loudly() {
    let codec = JsonSnapshotCodec;
    let err = codec.decode(r#"{"title": "#).unwrap_err();
    assert!(matches!(err, CodecError::Malformed(_)));
}

#[test]
fn non_mapping_payload_is_rejected() {
    let codec = JsonSnapshotCodec;
    let err = codec.decode(r#"[1, 2, 3]"#).unwrap_err();
    assert!(matches!(err, CodecError::NotAMapping));
}

#[test]
fn empty_mapping_decodes_to_empty_attrs() {
    let codec = JsonSnapshotCodec;
    assert!(codec.decode("{}").unwrap().is_empty());
}

// ── Round trip ───────────────────────────────────────────────────

#[test]
fn encode_then_decode_preserves_values() {
    let codec = JsonSnapshotCodec;
    let original = attrs(json!({
        "title": "A post",
        "views": 12,
        "score": 4.5,
        "published": true,
        "deleted_at": null,
    }));
    let encoded = codec.encode(&original).unwrap();
    assert_eq!(codec.decode(&encoded).unwrap(), original);
}

fn primitive_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 _-]{0,24}".prop_map(Value::from),
    ]
}

proptest! {
    #[test]
    fn round_trip_holds_for_primitive_mappings(
        entries in proptest::collection::btree_map("[a-z_]{1,12}", primitive_value(), 0..8)
    ) {
        let codec = JsonSnapshotCodec;
        let original: Attributes = entries.into_iter().collect();
        let encoded = codec.encode(&original).unwrap();
        prop_assert_eq!(codec.decode(&encoded).unwrap(), original);
    }
}
