//! Schema discovery over schemaless records.
//!
//! The schema of a batch is the union of attribute names in every
//! record's effective metadata, in first-seen order. It is rebuilt for
//! every query; nothing here is persisted.

use crate::{
    record::{Metadata, Record},
    types::AttributeName,
};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

/// A constant attribute applied to every record of a batch before
/// discovery, e.g. tagging a whole ledger with the service it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionColumn {
    pub name: AttributeName,
    pub value: String,
}

impl ExtensionColumn {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Extensions first, in the order given, then the record's own keys.
/// The first occurrence of a key wins both position and value, so a
/// constant extension label overrides a record's own value for that key.
/// Callers wanting the record's value must pick extension names that do
/// not collide with metadata keys.
pub fn effective_metadata(record: &Record, extensions: &[ExtensionColumn]) -> Metadata {
    let mut effective = Metadata::new();
    for ext in extensions {
        effective.insert_if_absent(&ext.name, &ext.value);
    }
    for (key, value) in record.metadata.iter() {
        effective.insert_if_absent(key, value);
    }
    effective
}

/// Ordered set of attribute names discovered in a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<AttributeName>,
    positions: HashMap<AttributeName, usize>,
}

impl Schema {
    /// Build from names in order; empty and repeated names are skipped.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut schema = Schema::default();
        for name in names {
            schema.push(name.as_ref());
        }
        schema
    }

    fn push(&mut self, name: &str) {
        if name.is_empty() || self.positions.contains_key(name) {
            return;
        }
        self.positions.insert(name.to_string(), self.columns.len());
        self.columns.push(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Column index of `name`, if it is part of the schema.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn columns(&self) -> &[AttributeName] {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.columns.serialize(serializer)
    }
}

/// Discover the schema of `records` under `extensions`.
///
/// An empty batch yields an empty schema even when extensions are given;
/// callers treat that as "no data".
pub fn discover(records: &[Record], extensions: &[ExtensionColumn]) -> Schema {
    let mut schema = Schema::default();
    for record in records {
        for key in effective_metadata(record, extensions).keys() {
            schema.push(key);
        }
    }
    log::debug!(
        "discovered {} column(s) across {} record(s)",
        schema.len(),
        records.len()
    );
    schema
}
