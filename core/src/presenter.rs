//! Tabular output: money and date formatting, listing layout.
//!
//! Listings are most-recent-first. The date column is the record's
//! stored creation time; rows without one get a synthetic stamp of
//! `now - i * interval`, `i` being the row's position in the listing.

use crate::{
    aggregate::AggregateRow,
    config::{DateSource, PresentationConfig},
    schema::Schema,
    types::Amount,
    wide_view::WideRow,
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

pub const AMOUNT_HEADER: &str = "Amount";
pub const DATE_HEADER: &str = "Date";

/// One rendered cell. `text` is None for an absent attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayCell {
    pub text: Option<String>,
}

impl DisplayCell {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn absent() -> Self {
        Self { text: None }
    }
}

pub type DisplayRow = Vec<DisplayCell>;

/// Headers and rows of a transaction listing, aligned by position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub headers: Vec<String>,
    pub rows: Vec<DisplayRow>,
}

/// An aggregate row ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportLine {
    pub group: Vec<DisplayCell>,
    pub transactions: u64,
    pub total: String,
}

pub struct Presenter<'a> {
    config: &'a PresentationConfig,
    now: DateTime<Utc>,
}

impl<'a> Presenter<'a> {
    pub fn new(config: &'a PresentationConfig, now: DateTime<Utc>) -> Self {
        Self { config, now }
    }

    /// `£1,234.50` for 123450 minor units at 100 per major unit.
    pub fn format_amount(&self, minor: Amount) -> String {
        let units = u64::from(self.config.minor_units_per_major.max(1));
        let abs = minor.unsigned_abs();
        let mut whole = abs / units;
        let mut hundredths = ((abs % units) * 100 + units / 2) / units;
        if hundredths == 100 {
            whole += 1;
            hundredths = 0;
        }
        let sign = if minor < 0 { "-" } else { "" };
        format!(
            "{sign}{}{}.{hundredths:02}",
            self.config.currency_symbol,
            group_thousands(whole)
        )
    }

    pub fn format_date(&self, at: DateTime<Utc>) -> String {
        at.format(&self.config.date_format).to_string()
    }

    /// Placeholder date for the row at listing position `index`.
    /// Clamps to the earliest representable time instead of overflowing.
    pub fn synthetic_date(&self, index: usize) -> DateTime<Utc> {
        let index = i64::try_from(index).unwrap_or(i64::MAX);
        self.config
            .synthetic_interval_secs
            .checked_mul(index)
            .and_then(TimeDelta::try_seconds)
            .and_then(|step| self.now.checked_sub_signed(step))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn headers(schema: &Schema) -> Vec<String> {
        [AMOUNT_HEADER, DATE_HEADER]
            .into_iter()
            .map(str::to_string)
            .chain(schema.iter().map(str::to_string))
            .collect()
    }

    /// Lay out `rows` (in insertion order) as a most-recent-first listing.
    pub fn present_listing(&self, rows: &[WideRow], schema: &Schema) -> Listing {
        let display_rows = rows
            .iter()
            .rev()
            .enumerate()
            .map(|(index, row)| {
                let date = match (self.config.date_source, row.created_at) {
                    (DateSource::Stored, Some(at)) => at,
                    _ => self.synthetic_date(index),
                };
                let mut cells = Vec::with_capacity(row.cells.len() + 2);
                cells.push(DisplayCell::text(self.format_amount(row.amount)));
                cells.push(DisplayCell::text(self.format_date(date)));
                cells.extend(row.cells.iter().map(|c| DisplayCell { text: c.clone() }));
                cells
            })
            .collect();

        Listing {
            headers: Self::headers(schema),
            rows: display_rows,
        }
    }

    pub fn present_report(&self, rows: &[AggregateRow]) -> Vec<ReportLine> {
        rows.iter()
            .map(|row| ReportLine {
                group: row
                    .group_key
                    .iter()
                    .map(|c| DisplayCell { text: c.clone() })
                    .collect(),
                transactions: row.transaction_count,
                total: self.format_amount(row.total_amount),
            })
            .collect()
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SYNTHETIC_INTERVAL_SECS;
    use chrono::{Duration, TimeZone};

    fn presenter(config: &PresentationConfig) -> Presenter<'_> {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 0).unwrap();
        Presenter::new(config, now)
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn amounts_format_with_symbol_and_two_decimals() {
        let config = PresentationConfig::default();
        let p = presenter(&config);
        assert_eq!(p.format_amount(0), "£0.00");
        assert_eq!(p.format_amount(5), "£0.05");
        assert_eq!(p.format_amount(123_450), "£1,234.50");
        assert_eq!(p.format_amount(-250), "-£2.50");
    }

    #[test]
    fn amounts_round_for_finer_minor_units() {
        let config = PresentationConfig {
            currency_symbol: "$".into(),
            minor_units_per_major: 1000,
            ..PresentationConfig::default()
        };
        let p = presenter(&config);
        assert_eq!(p.format_amount(1_234_567), "$1,234.57");
        assert_eq!(p.format_amount(1_999_999), "$2,000.00");
    }

    #[test]
    fn date_format_matches_listing_style() {
        let config = PresentationConfig::default();
        let p = presenter(&config);
        assert_eq!(p.format_date(p.synthetic_date(0)), "05 Mar 2024 at 2:07PM");
        assert_eq!(
            p.synthetic_date(2),
            p.synthetic_date(0) - Duration::seconds(2 * SYNTHETIC_INTERVAL_SECS)
        );
    }

    #[test]
    fn oversized_interval_clamps_instead_of_panicking() {
        let config = PresentationConfig {
            synthetic_interval_secs: 10_000_000_000_000,
            date_source: DateSource::Synthetic,
            ..PresentationConfig::default()
        };
        let p = presenter(&config);
        assert_eq!(p.synthetic_date(0), p.now);
        assert_eq!(p.synthetic_date(1), DateTime::<Utc>::MIN_UTC);
        assert_eq!(p.synthetic_date(usize::MAX), DateTime::<Utc>::MIN_UTC);

        let schema = Schema::from_names(["k"]);
        let rows = vec![
            WideRow {
                record_id: "a".into(),
                amount: 1,
                created_at: None,
                cells: vec![Some("x".into())],
            },
            WideRow {
                record_id: "b".into(),
                amount: 2,
                created_at: None,
                cells: vec![None],
            },
        ];
        let listing = p.present_listing(&rows, &schema);
        assert_eq!(listing.rows.len(), 2);
        assert_eq!(listing.rows[1][2], DisplayCell::text("x"));
        assert_eq!(listing.rows[0][2], DisplayCell::absent());
    }
}
