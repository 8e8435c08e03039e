// Protocol Analyzer
// Signaling-flow completeness analysis for 5G NAS/RRC/SIP protocol logs

//! # Protocol Analyzer Library
//!
//! Given an ordered sequence of already-parsed protocol log records, this crate
//! works out which signaling procedures ("flows") completed, which are stuck part
//! way, which never started, and which single flow is the earliest blocker of
//! end-to-end success.
//!
//! ## Core Components
//!
//! ### Domain Models
//! - [`StepSpec`]: One expected message (pattern, protocol tag, direction tag)
//! - [`FlowDefinition`]: A named, ordered list of steps plus prerequisite flows
//! - [`LogRecord`]: One observed protocol event
//! - [`AnalysisReport`] / [`Diagnosis`]: The outputs of a run
//!
//! ### Engine
//! - [`FlowCatalog`]: Validated, immutable registry of flows (no unknown
//!   prerequisites, no cycles, no duplicates)
//! - [`engine::matcher`]: Ordered fuzzy token matching of a record against a step
//! - [`AnalysisRun`]: The per-run state machine, advanced one record at a time
//! - [`engine::report`]: Turns a finished run into an [`AnalysisReport`]
//! - [`engine::locator`]: Finds the first unmet flow in canonical order
//! - [`ProtocolAnalyzer`]: Facade that wires the pieces together
//!
//! **Usage Example:**
//! ```rust
//! use protocol_analyzer::ProtocolAnalyzer;
//!
//! let analyzer = ProtocolAnalyzer::standard().expect("built-in catalog is valid");
//! let outcome = analyzer.analyze(&[]);
//!
//! // Nothing observed: the first flow of the attach sequence is the blocker
//! assert_eq!(outcome.report.summary.completed, 0);
//! assert_eq!(outcome.diagnosis.blocking_flow(), Some("Registration Request"));
//! ```
//!
//! ## Rust Learning Notes:
//!
//! ### Public vs Private
//! - `pub mod` makes modules accessible to external crates
//! - `pub use` re-exports create a flat API, so users can write
//!   `use protocol_analyzer::FlowCatalog` instead of the full module path

// Core domain models (flows, steps, records, reports)
pub mod models;

// Catalog, matcher, tracker, report generator and locator
pub mod engine;

// Runtime configuration (config file + environment)
pub mod settings;

// Re-export core domain types for easy access
pub use models::{
    AnalysisReport, Diagnosis, Direction, DirectionTag, FlowDefinition, FlowState, FlowStatus,
    LogRecord, StepSpec,
};

// Re-export engine types for convenience
pub use engine::{
    analyzer::{AnalysisOutcome, ProtocolAnalyzer},
    catalog::{CatalogDocument, FlowCatalog, STANDARD_CATALOG_VERSION},
    matcher::StepMatchEvaluation,
    tracker::AnalysisRun,
};

pub use settings::{AnalyzerConfig, OutputFormat};

// Core error types
use thiserror::Error;

/// Errors raised by the protocol analyzer
///
/// Only catalog construction and configuration loading can fail. Once a catalog
/// is built, analysis runs never return an error: a record that matches nothing
/// is routine, not a failure.
///
/// ## Rust Learning Notes:
///
/// ### The `thiserror` Crate
/// - `#[derive(Error)]` implements `std::error::Error`
/// - `#[error("...")]` provides the `Display` message, with `{field}` interpolation
/// - `#[from]` generates `From` conversions so `?` can lift foreign errors
/// - `#[source]` marks the underlying cause without generating `From`
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// A flow names a prerequisite that is not in the catalog
    #[error("Flow '{flow}' declares unknown prerequisite '{prerequisite}'")]
    UnknownPrerequisite { flow: String, prerequisite: String },

    /// The prerequisite graph contains a cycle (listed in traversal order)
    #[error("Prerequisite cycle detected: {}", .cycle.join(" -> "))]
    DependencyCycle { cycle: Vec<String> },

    /// Two flows share the same name
    #[error("Duplicate flow definition: {name}")]
    DuplicateFlow { name: String },

    /// A flow has no steps and could never complete
    #[error("Flow '{name}' defines no steps")]
    EmptyFlow { name: String },

    /// A catalog document could not be read from disk
    #[error("Failed to read catalog from {path}: {source}")]
    CatalogRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration file or environment could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Internal error (e.g. a batch worker panicked)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalyzerError {
    /// Whether this error rejects the flow catalog itself
    pub fn is_catalog_error(&self) -> bool {
        matches!(
            self,
            AnalyzerError::UnknownPrerequisite { .. }
                | AnalyzerError::DependencyCycle { .. }
                | AnalyzerError::DuplicateFlow { .. }
                | AnalyzerError::EmptyFlow { .. }
                | AnalyzerError::CatalogRead { .. }
        )
    }
}

/// Type alias for Results that use our custom error type
pub type Result<T> = std::result::Result<T, AnalyzerError>;
