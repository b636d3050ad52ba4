//! Shared primitive types used across the reporting engine.

/// A monetary amount in minor currency units (pence, cents).
pub type Amount = i64;

/// A stable, store-assigned identifier for a record.
pub type RecordId = String;

/// A metadata attribute name, as supplied by the payer or an extension.
pub type AttributeName = String;
