//! payreport-core: grouped reporting over payment records whose
//! attributes live in free-form, per-record metadata.

pub mod aggregate;
pub mod clock;
pub mod config;
pub mod demo;
pub mod engine;
pub mod error;
pub mod presenter;
pub mod record;
pub mod rng;
pub mod schema;
pub mod store;
pub mod types;
pub mod wide_view;
