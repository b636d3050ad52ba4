//! Projection of records onto a discovered schema.

use crate::{
    record::Record,
    schema::{effective_metadata, ExtensionColumn, Schema},
    types::{Amount, RecordId},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single cell of the wide view. `None` is the absent marker and is
/// distinct from `Some("")`.
pub type Cell = Option<String>;

/// A record laid out over the schema: exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WideRow {
    pub record_id: RecordId,
    /// Minor units, kept exact for aggregation.
    pub amount: Amount,
    pub created_at: Option<DateTime<Utc>>,
    pub cells: Vec<Cell>,
}

impl WideRow {
    /// The amount as a float, for display arithmetic only.
    pub fn amount_f64(&self) -> f64 {
        self.amount as f64
    }

    /// Cell for `column`, or `None` when the column is not in `schema`.
    /// A present column whose value is absent returns `Some(None)`.
    pub fn cell<'a>(&'a self, schema: &Schema, column: &str) -> Option<&'a Cell> {
        schema.position(column).and_then(|i| self.cells.get(i))
    }
}

/// Project `records` onto `schema`, one row per record, order-preserving.
pub fn project(records: &[Record], schema: &Schema, extensions: &[ExtensionColumn]) -> Vec<WideRow> {
    records
        .iter()
        .map(|record| {
            let effective = effective_metadata(record, extensions);
            let cells = schema
                .iter()
                .map(|column| effective.get(column).map(str::to_string))
                .collect();
            WideRow {
                record_id: record.record_id.clone(),
                amount: record.amount,
                created_at: record.created_at,
                cells,
            }
        })
        .collect()
}
