use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use retrace_codec::JsonSnapshotCodec;
use retrace_engine::{Changeset, ChangesetDecoder, EngineError};
use retrace_store::{SqliteVersionStore, StoreOptions};
use retrace_types::{Event, SequenceId, VersionRecord};
use serde_json::json;
use std::sync::Arc;

fn record(changeset: Option<&str>) -> VersionRecord {
    VersionRecord {
        sequence_id: SequenceId::new(1),
        entity_type: "Post".to_string(),
        entity_id: "42".to_string(),
        event: Event::Update,
        actor: None,
        recorded_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        snapshot: None,
        changeset: changeset.map(String::from),
    }
}

fn decoder(supported: bool) -> ChangesetDecoder {
    ChangesetDecoder::new(Arc::new(JsonSnapshotCodec), supported)
}

// ── Capability ───────────────────────────────────────────────────

#[test]
fn unsupported_store_always_yields_the_sentinel() {
    let decoder = decoder(false);
    let with_diff = record(Some(r#"{"title":["a","b"]}"#));
    let without = record(None);
    assert!(decoder.decode(&with_diff).unwrap().is_unsupported());
    assert!(decoder.decode(&without).unwrap().is_unsupported());
}

#[test]
fn capability_mirrors_the_store() {
    let codec = Arc::new(JsonSnapshotCodec);
    let untracked = SqliteVersionStore::open_in_memory(StoreOptions {
        track_changesets: false,
    })
    .unwrap();
    let decoder = ChangesetDecoder::for_store(codec, &untracked);
    assert!(decoder.decode(&record(None)).unwrap().is_unsupported());
}

// ── Decoding ─────────────────────────────────────────────────────

#[test]
fn absent_payload_decodes_to_empty_map() {
    match decoder(true).decode(&record(None)).unwrap() {
        Changeset::Recorded(map) => assert!(map.is_empty()),
        Changeset::Unsupported => panic!("capability is present"),
    }
}

#[test]
fn decodes_before_after_pairs() {
    let decoded = decoder(true)
        .decode(&record(Some(
            r#"{"title":["old","new"],"views":[1,2]}"#,
        )))
        .unwrap();
    let Changeset::Recorded(map) = decoded else {
        panic!("expected recorded changeset");
    };
    assert_eq!(map.len(), 2);
    let title = map.get("title").unwrap();
    assert_eq!(title.before, json!("old"));
    assert_eq!(title.after, json!("new"));
    let views = map.get(String::from("views")).unwrap();
    assert_eq!(views.before, json!(1));
    assert_eq!(views.after, json!(2));
}

#[test]
fn null_before_marks_first_assignment() {
    let decoded = decoder(true)
        .decode(&record(Some(r#"{"title":[null,"Hi"]}"#)))
        .unwrap();
    let Changeset::Recorded(map) = decoded else {
        panic!("expected recorded changeset");
    };
    assert_eq!(map.get("title").unwrap().before, json!(null));
}

// ── Malformed payloads ───────────────────────────────────────────

#[test]
fn non_pair_entry_is_rejected() {
    let err = decoder(true)
        .decode(&record(Some(r#"{"title":["only-one"]}"#)))
        .unwrap_err();
    assert!(matches!(err, EngineError::MalformedChangeset(ref name) if name == "title"));
}

#[test]
fn non_array_entry_is_rejected() {
    let err = decoder(true)
        .decode(&record(Some(r#"{"title":"not-a-pair"}"#)))
        .unwrap_err();
    assert!(matches!(err, EngineError::MalformedChangeset(ref name) if name == "title"));
}

#[test]
fn malformed_json_surfaces_codec_error() {
    let err = decoder(true)
        .decode(&record(Some(r#"{"title":"#)))
        .unwrap_err();
    assert!(matches!(err, EngineError::Codec(_)));
}
