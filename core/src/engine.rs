//! The reporting engine — schema-on-read over the record store.
//!
//! PIPELINE (per request, nothing cached between requests):
//!   1. Load     — one snapshot of every record from the store
//!   2. Discover — union of effective-metadata keys, first-seen order
//!   3. Project  — one wide row per record over that schema
//!   4. Aggregate or present
//!
//! RULES:
//!   - An empty batch is NoData, checked before any grouping validation.
//!   - Grouping columns are validated against the discovered schema
//!     before any row is grouped.
//!   - The engine holds no mutable state; the store owns consistency.

use crate::{
    aggregate::{aggregate, AggregateRow},
    clock::{ReportClock, SystemClock},
    config::ReportConfig,
    error::{ReportError, ReportResult},
    presenter::{Listing, Presenter, ReportLine},
    record::Record,
    schema::{discover, ExtensionColumn, Schema},
    store::RecordStore,
    wide_view::project,
};
use serde::Serialize;

/// The grouped result of one report request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub schema: Schema,
    /// The grouping actually applied.
    pub grouping_columns: Vec<String>,
    pub rows: Vec<AggregateRow>,
}

pub struct ReportEngine<'s, S: RecordStore + ?Sized> {
    store: &'s S,
    config: ReportConfig,
    clock: Box<dyn ReportClock>,
}

impl<'s, S: RecordStore + ?Sized> ReportEngine<'s, S> {
    pub fn new(store: &'s S, config: ReportConfig) -> Self {
        Self {
            store,
            config,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl ReportClock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    fn load_batch(&self) -> ReportResult<Vec<Record>> {
        let records = self.store.list_records()?;
        if records.is_empty() {
            return Err(ReportError::NoData);
        }
        Ok(records)
    }

    /// Group every record by `grouping_columns` and total each group.
    pub fn build_report(
        &self,
        grouping_columns: &[String],
        extensions: &[ExtensionColumn],
    ) -> ReportResult<Report> {
        let records = self.load_batch()?;
        let schema = discover(&records, extensions);
        let rows = project(&records, &schema, extensions);
        let rows = aggregate(&rows, &schema, grouping_columns)?;

        log::info!(
            "report over {} record(s): {} group(s) by {:?}",
            records.len(),
            rows.len(),
            grouping_columns
        );

        Ok(Report {
            schema,
            grouping_columns: grouping_columns.to_vec(),
            rows,
        })
    }

    /// Like build_report, but an unknown grouping column drops the whole
    /// grouping and re-issues the report unfiltered. Never honours a
    /// grouping partially.
    pub fn build_report_or_unfiltered(
        &self,
        grouping_columns: &[String],
        extensions: &[ExtensionColumn],
    ) -> ReportResult<Report> {
        match self.build_report(grouping_columns, extensions) {
            Err(ReportError::InvalidGroupingColumn { column }) => {
                log::warn!("unknown grouping column '{column}'; falling back to unfiltered report");
                self.build_report(&[], extensions)
            }
            other => other,
        }
    }

    /// Every record, most recent first, laid out over the discovered schema.
    pub fn build_listing(&self, extensions: &[ExtensionColumn]) -> ReportResult<Listing> {
        let records = self.load_batch()?;
        let schema = discover(&records, extensions);
        let rows = project(&records, &schema, extensions);
        let presenter = Presenter::new(&self.config.presentation, self.clock.now());
        Ok(presenter.present_listing(&rows, &schema))
    }

    /// Format a report's groups for display.
    pub fn present_report(&self, report: &Report) -> Vec<ReportLine> {
        Presenter::new(&self.config.presentation, self.clock.now()).present_report(&report.rows)
    }
}
