//! # dartdex
//!
//! Local-first lookup over collected periodic-disclosure records.
//!
//! A collector writes one JSON file per company per quarter under
//! `{base_path}/{year}/Q{quarter}/companies/{stock_code}_{company_name}.json`.
//! dartdex resolves a free-text company name to one of those files
//! (exact, then substring, then fuzzy), turns its heterogeneous section rows
//! into uniform tables, and lists every quarter a company has data for.
//! The same operations are exposed through a CLI and a JSON HTTP server.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌───────────────────┐
//! │  FsStore    │──▶│ IndexedStore │──▶│ DisclosureLookup  │
//! │ year/Qn/... │   │ period cache │   │ resolve + process │
//! └─────────────┘   └──────────────┘   └─────────┬─────────┘
//!                                                │
//!                              ┌─────────────────┤
//!                              ▼                 ▼
//!                         ┌──────────┐     ┌──────────┐
//!                         │   CLI    │     │   HTTP   │
//!                         │(dartdex) │     │  (axum)  │
//!                         └──────────┘     └──────────┘
//! ```
//!
//! Matching, report enumeration and rendering live in [`dartdex_core`],
//! which performs no I/O of its own.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`store_fs`] | On-disk record store |
//! | [`index`] | Cached per-period listings |
//! | [`lookup`] | Lookup service shared by CLI and server |
//! | [`show`] | `resolve` / `show` commands |
//! | [`reports`] | `reports` command |
//! | [`process`] | `process` command |
//! | [`periods`] | `periods` / `sections` commands |
//! | [`server`] | HTTP server |

pub mod config;
pub mod index;
pub mod lookup;
pub mod periods;
pub mod process;
pub mod reports;
pub mod server;
pub mod show;
pub mod store_fs;

pub use dartdex_core;
