// Core domain models for the protocol analyzer
// Plain data: flows, steps, records, per-run state and the report/diagnosis outputs

//! # Domain Models Module
//!
//! This module contains the data structures every other layer works with. None
//! of them perform analysis on their own; the algorithms live in
//! [`crate::engine`].
//!
//! ## Rust Learning Notes:
//!
//! ### Module Organization
//! This `mod.rs` file is the **module root** for the `models` directory. Each
//! `pub mod` line pulls in the sibling file of the same name.
//!
//! ### Re-exports for Clean APIs
//! The `pub use` statements at the bottom let users write
//! `use protocol_analyzer::models::FlowDefinition` instead of
//! `use protocol_analyzer::models::flow::FlowDefinition`.

// StepSpec, DirectionTag and Direction - the smallest building blocks
pub mod step;

// FlowDefinition - a named, ordered list of steps with prerequisites
pub mod flow;

// LogRecord - one observed protocol event
pub mod record;

// FlowState and friends - per-run mutable progress
pub mod state;

// AnalysisReport - the structured completeness report
pub mod report;

// Diagnosis - the first blocking flow and why it is blocked
pub mod diagnosis;

pub use step::{Direction, DirectionTag, StepSpec};
pub use flow::FlowDefinition;
pub use record::LogRecord;
pub use state::{ActiveFlow, FlowState, FlowStatus, MatchedStep};
pub use report::{
    AnalysisReport, CompletedFlowReport, InProgressFlowReport, ProblematicFlowReport,
    ReportSummary, FULLY_COMPLETED, NOT_STARTED_ISSUE,
};
pub use diagnosis::{
    Diagnosis, PrerequisiteDetails, ProblematicDetails, ProgressDetails, UnknownDetails,
};
