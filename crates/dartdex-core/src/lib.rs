//! # dartdex Core
//!
//! Pure logic for dartdex: record models, periods, the three-tier
//! company-name resolver, multi-period report enumeration, record
//! post-processing, and the store abstraction.
//!
//! This crate performs no filesystem I/O and carries no async runtime.
//! Storage is reached only through the [`store::RecordStore`] trait, so the
//! same resolver runs against the on-disk layout and the in-memory store
//! used in tests.

pub mod error;
pub mod models;
pub mod period;
pub mod postprocess;
pub mod reports;
pub mod resolve;
pub mod sections;
pub mod similarity;
pub mod store;

pub use error::LookupError;
pub use period::Period;
