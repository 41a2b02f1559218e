use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use retrace_engine::ChainNavigator;
use retrace_store::{SqliteVersionStore, StoreOptions, VersionStore};
use retrace_types::{Event, NewVersionRecord, SequenceId, VersionRecord};
use std::sync::Arc;

fn ts(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, minute, 0).unwrap()
}

struct Fixture {
    navigator: ChainNavigator,
    store: Arc<dyn VersionStore>,
}

impl Fixture {
    fn new() -> Self {
        let store: Arc<dyn VersionStore> =
            Arc::new(SqliteVersionStore::open_in_memory(StoreOptions::default()).unwrap());
        Self {
            navigator: ChainNavigator::new(Arc::clone(&store)),
            store,
        }
    }

    fn append(&self, entity_id: &str, event: Event, minute: u32, actor: &str) -> VersionRecord {
        let id = self
            .store
            .append(
                &NewVersionRecord::new("Post", entity_id, event, ts(minute)).with_actor(actor),
            )
            .unwrap();
        self.store.get("Post", entity_id, id).unwrap().unwrap()
    }

    /// The (Post, 42) chain from the design scenario: create, update, destroy.
    fn post_42(&self) -> [VersionRecord; 3] {
        [
            self.append("42", Event::Create, 0, "alice"),
            self.append("42", Event::Update, 1, "bob"),
            self.append("42", Event::Destroy, 2, "carol"),
        ]
    }
}

fn ids(records: &[VersionRecord]) -> Vec<SequenceId> {
    records.iter().map(|r| r.sequence_id).collect()
}

// ── Chain scenario ───────────────────────────────────────────────

#[test]
fn preceding_descends_and_subsequent_ascends() {
    let fx = Fixture::new();
    let [first, second, third] = fx.post_42();

    let before = fx.navigator.preceding(&third).unwrap();
    assert_eq!(ids(&before), vec![second.sequence_id, first.sequence_id]);

    let after = fx.navigator.subsequent(&first).unwrap();
    assert_eq!(ids(&after), vec![second.sequence_id, third.sequence_id]);
}

#[test]
fn index_is_zero_based_chain_rank() {
    let fx = Fixture::new();
    let [first, second, third] = fx.post_42();
    assert_eq!(fx.navigator.index(&first).unwrap(), Some(0));
    assert_eq!(fx.navigator.index(&second).unwrap(), Some(1));
    assert_eq!(fx.navigator.index(&third).unwrap(), Some(2));
}

#[test]
fn index_is_none_for_a_record_gone_from_the_store() {
    let fx = Fixture::new();
    let [first, _, _] = fx.post_42();

    // A record deleted between listing and lookup no longer ranks in its
    // chain; the sentinel is None, not an error.
    let mut ghost = first.clone();
    ghost.sequence_id = SequenceId::new(999);
    assert_eq!(fx.navigator.index(&ghost).unwrap(), None);
}

#[test]
fn index_ignores_other_chains() {
    let fx = Fixture::new();
    fx.append("7", Event::Create, 0, "zed");
    let [_, second, _] = fx.post_42();
    assert_eq!(fx.navigator.index(&second).unwrap(), Some(1));
}

#[test]
fn next_and_previous_walk_the_chain() {
    let fx = Fixture::new();
    let [first, second, third] = fx.post_42();

    assert_eq!(
        fx.navigator.next(&first).unwrap().map(|r| r.sequence_id),
        Some(second.sequence_id)
    );
    assert_eq!(
        fx.navigator.previous(&third).unwrap().map(|r| r.sequence_id),
        Some(second.sequence_id)
    );
    assert!(fx.navigator.next(&third).unwrap().is_none());
    assert!(fx.navigator.previous(&first).unwrap().is_none());
}

#[test]
fn next_skips_records_of_other_chains() {
    let fx = Fixture::new();
    let first = fx.append("42", Event::Create, 0, "alice");
    fx.append("7", Event::Create, 1, "zed");
    let second = fx.append("42", Event::Update, 2, "bob");

    assert_eq!(
        fx.navigator.next(&first).unwrap().map(|r| r.sequence_id),
        Some(second.sequence_id)
    );
}

// ── Actor attribution ────────────────────────────────────────────

#[test]
fn originator_is_previous_actor() {
    let fx = Fixture::new();
    let [first, second, third] = fx.post_42();
    assert_eq!(fx.navigator.originator(&first).unwrap(), None);
    assert_eq!(
        fx.navigator.originator(&second).unwrap().as_deref(),
        Some("alice")
    );
    assert_eq!(
        fx.navigator.originator(&third).unwrap().as_deref(),
        Some("bob")
    );
}

#[test]
fn terminator_is_the_record_actor() {
    let fx = Fixture::new();
    let [first, second, third] = fx.post_42();
    assert_eq!(first.terminator(), Some("alice"));
    assert_eq!(second.terminator(), Some("bob"));
    assert_eq!(third.terminator(), Some("carol"));
}

// ── Time windows ─────────────────────────────────────────────────

#[test]
fn between_excludes_both_bounds() {
    let fx = Fixture::new();
    fx.append("42", Event::Create, 4, "a"); // t0 - 1
    let inside = fx.append("42", Event::Update, 10, "a"); // t1
    fx.append("42", Event::Destroy, 21, "a"); // t2 + 1

    let found = fx.navigator.between(ts(5), ts(20)).unwrap();
    assert_eq!(ids(&found), vec![inside.sequence_id]);
}

#[test]
fn following_orders_by_time_then_sequence() {
    let fx = Fixture::new();
    let a = fx.append("42", Event::Create, 5, "a");
    let b = fx.append("7", Event::Create, 5, "a");
    let c = fx.append("42", Event::Update, 6, "a");

    let found = fx.navigator.following(ts(0)).unwrap();
    assert_eq!(
        ids(&found),
        vec![a.sequence_id, b.sequence_id, c.sequence_id]
    );
}

#[test]
fn following_excludes_the_timestamp_itself() {
    let fx = Fixture::new();
    fx.append("42", Event::Create, 5, "a");
    assert!(fx.navigator.following(ts(5)).unwrap().is_empty());
}

// ── Event filters ────────────────────────────────────────────────

#[test]
fn event_scopes_split_by_classification() {
    let fx = Fixture::new();
    fx.post_42();
    fx.append("7", Event::Create, 3, "zed");

    assert_eq!(fx.navigator.creates().unwrap().len(), 2);
    assert_eq!(fx.navigator.updates().unwrap().len(), 1);
    assert_eq!(fx.navigator.destroys().unwrap().len(), 1);
}

#[test]
fn with_entity_keys_returns_whole_chain_ascending() {
    let fx = Fixture::new();
    let [first, second, third] = fx.post_42();
    let chain = fx.navigator.with_entity_keys("Post", "42").unwrap();
    assert_eq!(
        ids(&chain),
        vec![first.sequence_id, second.sequence_id, third.sequence_id]
    );
}

#[test]
fn empty_chain_navigates_to_nothing() {
    let fx = Fixture::new();
    assert!(fx.navigator.with_entity_keys("Post", "404").unwrap().is_empty());
}
