//! Grouped count/sum aggregation over the wide view.
//!
//! Grouping columns are validated against the schema before any row is
//! touched, so an unknown column never yields a partial result.
//! Groups come back ordered by key, component-wise, with the absent
//! marker sorting before every string. Callers render in this order.

use crate::{
    error::{ReportError, ReportResult},
    schema::Schema,
    types::Amount,
    wide_view::{Cell, WideRow},
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Values of the grouping columns for one group, in request order.
pub type GroupKey = Vec<Cell>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateRow {
    pub group_key: GroupKey,
    pub transaction_count: u64,
    /// Exact sum in minor units.
    pub total_amount: Amount,
}

#[derive(Default)]
struct Accumulator {
    count: u64,
    total: Amount,
}

impl Accumulator {
    fn add(&mut self, amount: Amount) -> ReportResult<()> {
        self.count += 1;
        self.total = self
            .total
            .checked_add(amount)
            .ok_or_else(|| anyhow::anyhow!("total amount overflowed after {} rows", self.count))?;
        Ok(())
    }
}

/// Resolve every grouping column to its schema position.
/// Fails on the first name that is not in the schema.
pub fn resolve_grouping(schema: &Schema, grouping_columns: &[String]) -> ReportResult<Vec<usize>> {
    grouping_columns
        .iter()
        .map(|column| {
            schema
                .position(column)
                .ok_or_else(|| ReportError::InvalidGroupingColumn {
                    column: column.clone(),
                })
        })
        .collect()
}

pub fn aggregate(
    rows: &[WideRow],
    schema: &Schema,
    grouping_columns: &[String],
) -> ReportResult<Vec<AggregateRow>> {
    let positions = resolve_grouping(schema, grouping_columns)?;

    if rows.is_empty() {
        return Err(ReportError::NoData);
    }

    let mut groups: BTreeMap<GroupKey, Accumulator> = BTreeMap::new();
    for row in rows {
        let key: GroupKey = positions
            .iter()
            .map(|&i| row.cells.get(i).cloned().flatten())
            .collect();
        groups.entry(key).or_default().add(row.amount)?;
    }

    log::debug!(
        "aggregated {} row(s) into {} group(s) by {:?}",
        rows.len(),
        groups.len(),
        grouping_columns
    );

    Ok(groups
        .into_iter()
        .map(|(group_key, acc)| AggregateRow {
            group_key,
            transaction_count: acc.count,
            total_amount: acc.total,
        })
        .collect())
}
