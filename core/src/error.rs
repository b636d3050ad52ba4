use crate::types::RecordId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No records to report on")]
    NoData,

    #[error("Grouping column '{column}' is not present in the discovered schema")]
    InvalidGroupingColumn { column: String },

    #[error("Malformed metadata on record {record_id}: {reason}")]
    MalformedMetadata { record_id: RecordId, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReportError {
    /// True for the outcomes a caller is expected to handle at the engine
    /// boundary (empty state, re-issued query, skipped metadata) rather
    /// than surface as a fault.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoData | Self::InvalidGroupingColumn { .. } | Self::MalformedMetadata { .. }
        )
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
