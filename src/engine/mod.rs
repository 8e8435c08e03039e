// Protocol Analyzer Engine
// Catalog validation, matching, tracking, reporting and diagnosis

//! # Protocol Analyzer Engine Module
//!
//! The engine turns an ordered sequence of [`LogRecord`](crate::models::LogRecord)s
//! into an [`AnalysisReport`](crate::models::AnalysisReport) and a
//! [`Diagnosis`](crate::models::Diagnosis). The domain types live in `models/`;
//! everything here is behavior.
//!
//! ## Pipeline
//!
//! ```text
//!              FlowCatalog (validated, immutable, shared)
//!                   │
//! records ──> AnalysisRun ──> report::generate ──> locator::diagnose
//!              │ uses
//!              └── matcher::matches
//! ```
//!
//! ## Engine Components
//!
//! ### Catalog (`catalog` module)
//! - Validates flow definitions once: unique names, known prerequisites, no cycles
//! - Ships the standard 5G attach catalog
//! - Loads alternative catalogs from JSON
//!
//! ### Matcher (`matcher` module)
//! - Decides whether one record satisfies one expected step
//! - Explains mismatches for the `explain` command
//!
//! ### Tracker (`tracker` module)
//! - Per-run state machine; one [`AnalysisRun`](tracker::AnalysisRun) per analysis
//! - Enforces prerequisite gating and strictly sequential step matching
//!
//! ### Report and Locator (`report`, `locator` modules)
//! - Aggregate the final run state
//! - Pick the first flow in canonical order that did not complete
//!
//! ### Analyzer (`analyzer` module)
//! - Facade running the full pipeline, sequentially or over concurrent batches
//!
//! ## Rust Learning Notes:
//!
//! ### Borrowing the Catalog
//! `AnalysisRun<'a>` holds `&'a FlowCatalog`. The lifetime ties every run to a
//! catalog that outlives it, so the tracker never copies flow definitions.

/// Validated flow catalog and the built-in 5G attach flows
pub mod catalog;

/// Fuzzy record-to-step matching
pub mod matcher;

/// Per-run flow state machine
pub mod tracker;

/// Completeness report generation
pub mod report;

/// First blocking flow lookup
pub mod locator;

/// One-call pipeline facade
pub mod analyzer;

pub use analyzer::{AnalysisOutcome, ProtocolAnalyzer};
pub use catalog::{CatalogDocument, FlowCatalog, STANDARD_CATALOG_VERSION};
pub use locator::{diagnose, locate_first_blocker};
pub use matcher::StepMatchEvaluation;
pub use tracker::AnalysisRun;
