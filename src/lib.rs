//! # Tabloid - batch analytics over object-stored tabular files
//!
//! Tabloid drains an input namespace of uploaded CSV, TSV, JSON and
//! JSON-lines files into a single analytics report: row and column totals,
//! numeric/categorical classification, missing values, duplicate rows and a
//! summary of the `Identifier` column.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tabloid::config::PlatformConfig;
//! use tabloid::storage::FsStore;
//!
//! # fn example() -> tabloid::error::Result<()> {
//! let config = PlatformConfig::resolve(None)?;
//! let store = FsStore::new(&config.storage_root);
//!
//! let report = tabloid::batch::run_batch(&store, &config)?;
//! println!("{} rows across {} columns", report.total_rows, report.total_columns);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`loader`]: format detection and permissive parsing of raw bytes
//! - [`dataset`]: the in-memory table and its closed cell type
//! - [`analyser`]: per-column descriptors and duplicate-row detection
//! - [`batch`]: the aggregator, the report document and its writer
//! - [`storage`]: the object storage interface and its implementations
//! - [`config`], [`error`], [`logging`]: process plumbing

#![warn(clippy::all, rust_2018_idioms)]

pub mod analyser;
pub mod batch;
pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod logging;
pub mod storage;
