//! SQLite-backed version store.

use crate::{QueryOrder, StoreResult, VersionQuery, VersionStore};
use chrono::{DateTime, SecondsFormat, Utc};
use retrace_types::{Event, NewVersionRecord, SequenceId, VersionRecord};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params, params_from_iter};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Schema options fixed at open time.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// Whether the schema carries a changeset column at all. When false the
    /// store reports no changeset capability and never persists diffs.
    pub track_changesets: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            track_changesets: true,
        }
    }
}

/// Version store backed by SQLite.
///
/// Sequence keys are the table's AUTOINCREMENT rowid, which gives the
/// strictly increasing total order the chain model requires.
pub struct SqliteVersionStore {
    conn: Arc<Mutex<Connection>>,
    options: StoreOptions,
}

impl SqliteVersionStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>, options: StoreOptions) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, options)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory(options: StoreOptions) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, options)
    }

    fn with_connection(conn: Connection, options: StoreOptions) -> StoreResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            options,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let changeset_column = if self.options.track_changesets {
            ",\n                changeset TEXT"
        } else {
            ""
        };
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS versions (
                sequence_id INTEGER PRIMARY KEY AUTOINCREMENT,
                entity_type TEXT NOT NULL,
                entity_id TEXT NOT NULL,
                event TEXT NOT NULL,
                actor TEXT,
                recorded_at TEXT NOT NULL,
                snapshot TEXT{changeset_column}
            );

            CREATE INDEX IF NOT EXISTS idx_versions_chain
                ON versions (entity_type, entity_id, sequence_id);
            CREATE INDEX IF NOT EXISTS idx_versions_recorded
                ON versions (recorded_at, sequence_id);
            ",
        ))?;
        Ok(())
    }

    fn select_columns(&self) -> &'static str {
        if self.options.track_changesets {
            "sequence_id, entity_type, entity_id, event, actor, recorded_at, snapshot, changeset"
        } else {
            "sequence_id, entity_type, entity_id, event, actor, recorded_at, snapshot, NULL"
        }
    }
}

/// Fixed-width RFC 3339 with microseconds, so text comparison in SQL matches
/// chronological order.
fn fmt_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(raw: &str) -> StoreResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

type RawRow = (
    i64,
    String,
    String,
    String,
    Option<String>,
    String,
    Option<String>,
    Option<String>,
);

fn materialize(row: RawRow) -> StoreResult<VersionRecord> {
    let (sequence_id, entity_type, entity_id, event, actor, recorded_at, snapshot, changeset) = row;
    Ok(VersionRecord {
        sequence_id: SequenceId::new(sequence_id),
        entity_type,
        entity_id,
        event: Event::from_str(&event)?,
        actor,
        recorded_at: parse_ts(&recorded_at)?,
        snapshot,
        changeset,
    })
}

impl VersionStore for SqliteVersionStore {
    fn select(&self, query: &VersionQuery) -> StoreResult<Vec<VersionRecord>> {
        let mut clauses: Vec<&'static str> = Vec::new();
        let mut bind: Vec<SqlValue> = Vec::new();

        if let Some(entity_type) = &query.entity_type {
            clauses.push("entity_type = ?");
            bind.push(SqlValue::Text(entity_type.clone()));
        }
        if let Some(entity_id) = &query.entity_id {
            clauses.push("entity_id = ?");
            bind.push(SqlValue::Text(entity_id.clone()));
        }
        if let Some(event) = query.event {
            clauses.push("event = ?");
            bind.push(SqlValue::Text(event.as_str().to_string()));
        }
        if let Some(bound) = query.sequence_above {
            clauses.push("sequence_id > ?");
            bind.push(SqlValue::Integer(bound.as_i64()));
        }
        if let Some(bound) = query.sequence_below {
            clauses.push("sequence_id < ?");
            bind.push(SqlValue::Integer(bound.as_i64()));
        }
        if let Some(bound) = &query.recorded_after {
            clauses.push("recorded_at > ?");
            bind.push(SqlValue::Text(fmt_ts(bound)));
        }
        if let Some(bound) = &query.recorded_before {
            clauses.push("recorded_at < ?");
            bind.push(SqlValue::Text(fmt_ts(bound)));
        }

        let mut sql = format!("SELECT {} FROM versions", self.select_columns());
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(match query.order {
            QueryOrder::SequenceAsc => " ORDER BY sequence_id ASC",
            QueryOrder::SequenceDesc => " ORDER BY sequence_id DESC",
            QueryOrder::RecordedThenSequenceAsc => " ORDER BY recorded_at ASC, sequence_id ASC",
        });
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind.push(SqlValue::Integer(limit as i64));
        }
        debug!(sql = %sql, "selecting versions");

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bind), |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
                row.get(7)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(materialize(row?)?);
        }
        Ok(records)
    }

    fn get(
        &self,
        entity_type: &str,
        entity_id: &str,
        sequence_id: SequenceId,
    ) -> StoreResult<Option<VersionRecord>> {
        let sql = format!(
            "SELECT {} FROM versions
             WHERE entity_type = ?1 AND entity_id = ?2 AND sequence_id = ?3",
            self.select_columns()
        );
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(
            params![entity_type, entity_id, sequence_id.as_i64()],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                ))
            },
        )?;
        match rows.next() {
            Some(row) => Ok(Some(materialize(row?)?)),
            None => Ok(None),
        }
    }

    fn append(&self, record: &NewVersionRecord) -> StoreResult<SequenceId> {
        let conn = self.conn.lock().unwrap();
        if self.options.track_changesets {
            conn.execute(
                "INSERT INTO versions (entity_type, entity_id, event, actor, recorded_at, snapshot, changeset)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.entity_type,
                    record.entity_id,
                    record.event.as_str(),
                    record.actor,
                    fmt_ts(&record.recorded_at),
                    record.snapshot,
                    record.changeset,
                ],
            )?;
        } else {
            conn.execute(
                "INSERT INTO versions (entity_type, entity_id, event, actor, recorded_at, snapshot)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.entity_type,
                    record.entity_id,
                    record.event.as_str(),
                    record.actor,
                    fmt_ts(&record.recorded_at),
                    record.snapshot,
                ],
            )?;
        }
        Ok(SequenceId::new(conn.last_insert_rowid()))
    }

    fn supports_changesets(&self) -> bool {
        self.options.track_changesets
    }
}
