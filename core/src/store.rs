//! SQLite persistence layer for payment records.
//!
//! RULE: Only store.rs talks to the database.
//! The engine reads records through the RecordStore trait and never
//! executes SQL directly.

use crate::{
    clock::{ReportClock, SystemClock},
    error::{ReportError, ReportResult},
    record::{Metadata, Record},
    types::{Amount, RecordId},
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

/// The record source a report is built from.
///
/// Implementations must hand back a consistent snapshot: no record may
/// be observed with a torn amount/metadata pair.
pub trait RecordStore {
    /// All records in insertion order.
    fn list_records(&self) -> ReportResult<Vec<Record>>;

    /// Remove every record. Returns how many were deleted.
    fn delete_all(&self) -> ReportResult<usize>;

    /// Append a record, stamping it with the store's clock.
    fn insert_record(&self, amount: Amount, metadata: &Metadata) -> ReportResult<RecordId>;
}

pub struct LedgerStore {
    conn: Connection,
    clock: Box<dyn ReportClock>,
}

impl LedgerStore {
    pub fn open(path: &str) -> ReportResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self {
            conn,
            clock: Box::new(SystemClock),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> ReportResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn,
            clock: Box::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: impl ReportClock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> ReportResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_records.sql"))?;
        Ok(())
    }

    /// Append a record with an explicit creation time (None for an
    /// unknown one, as with imported legacy rows).
    pub fn insert_record_at(
        &self,
        amount: Amount,
        metadata: &Metadata,
        created_at: Option<DateTime<Utc>>,
    ) -> ReportResult<RecordId> {
        let blob = metadata.to_json()?;
        self.insert_row(amount, Some(&blob), created_at)
    }

    /// Append a record whose metadata blob is stored verbatim, without
    /// validation. Malformed blobs surface on read, not here.
    pub fn insert_raw_record(&self, amount: Amount, blob: Option<&str>) -> ReportResult<RecordId> {
        self.insert_row(amount, blob, None)
    }

    fn insert_row(
        &self,
        amount: Amount,
        blob: Option<&str>,
        created_at: Option<DateTime<Utc>>,
    ) -> ReportResult<RecordId> {
        let record_id = uuid::Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO record (record_id, amount, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record_id,
                amount,
                blob,
                created_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(record_id)
    }

    pub fn record_count(&self) -> ReportResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM record", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl RecordStore for LedgerStore {
    fn list_records(&self) -> ReportResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT record_id, amount, metadata, created_at
             FROM record ORDER BY id ASC",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let records = raw
            .into_iter()
            .map(|(record_id, amount, blob, created_at)| {
                let metadata = parse_metadata(&record_id, blob.as_deref());
                let created_at = created_at.and_then(|s| parse_timestamp(&record_id, &s));
                Record {
                    record_id,
                    amount,
                    metadata,
                    created_at,
                }
            })
            .collect();
        Ok(records)
    }

    fn delete_all(&self) -> ReportResult<usize> {
        let deleted = self.conn.execute("DELETE FROM record", [])?;
        log::info!("deleted {deleted} record(s)");
        Ok(deleted)
    }

    fn insert_record(&self, amount: Amount, metadata: &Metadata) -> ReportResult<RecordId> {
        self.insert_record_at(amount, metadata, Some(self.clock.now()))
    }
}

/// One corrupt record must not deny reporting on the rest: a blob that
/// fails to parse is reported and treated as empty metadata.
fn parse_metadata(record_id: &str, blob: Option<&str>) -> Metadata {
    let result = match blob {
        Some(blob) => Metadata::from_json(record_id, blob),
        None => Err(ReportError::MalformedMetadata {
            record_id: record_id.to_string(),
            reason: "metadata is NULL".into(),
        }),
    };
    result.unwrap_or_else(|e| {
        log::warn!("{e}; treating as empty metadata");
        Metadata::new()
    })
}

fn parse_timestamp(record_id: &str, raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(e) => {
            log::warn!("record {record_id}: unreadable created_at '{raw}': {e}");
            None
        }
    }
}
