// Diagnosis - the single root-cause signal for a run

//! # Diagnosis
//!
//! Instead of a raw list of unfinished flows, the analyzer reports the earliest
//! flow (in canonical order) that is not complete, together with the reason.
//!
//! ## Wire Shape
//!
//! The enum is internally tagged on `status`, so a blocking flow serializes as
//!
//! ```text
//! { "status": "in_progress", "blocking_flow": "NAS SMC", "status_details": { ... } }
//! ```
//!
//! and a clean run as `{ "status": "all_flows_completed" }`.
//!
//! ## Rust Learning Notes:
//!
//! ### Enums Carrying Data
//! Each variant carries exactly the details that make sense for it. A caller that
//! `match`es on a `Diagnosis` cannot read "missing prerequisites" out of an
//! in-progress diagnosis by accident; the compiler rules it out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Details for a flow that started but did not finish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressDetails {
    /// `"completed/total"`
    pub progress: String,
    /// Patterns of the steps not yet observed
    pub missing_steps: Vec<String>,
    pub last_step_time: Option<DateTime<Utc>>,
}

/// Details for a flow that could start but shows no progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblematicDetails {
    pub issue: String,
    /// Pattern of the step the flow is waiting on
    pub expected_first_step: String,
}

/// Details for a flow gated by unfinished prerequisites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteDetails {
    pub missing_prerequisites: Vec<String>,
}

/// Details when no known reason explains why a flow did not start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownDetails {
    pub reason: String,
}

/// Root-cause summary produced by the blocking-flow locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Diagnosis {
    /// The blocking flow matched some but not all of its steps
    InProgress {
        blocking_flow: String,
        status_details: ProgressDetails,
    },

    /// The blocking flow was ready to start but no step matched
    Problematic {
        blocking_flow: String,
        status_details: ProblematicDetails,
    },

    /// The blocking flow is waiting on prerequisites that never completed
    PrerequisitesNotMet {
        blocking_flow: String,
        status_details: PrerequisiteDetails,
    },

    /// Fallback, unreachable while catalog invariants hold
    #[serde(rename = "not_started")]
    NotStartedUnknown {
        blocking_flow: String,
        status_details: UnknownDetails,
    },

    /// Every flow in the canonical order completed
    AllFlowsCompleted,
}

impl Diagnosis {
    /// Name of the blocking flow, `None` when everything completed
    pub fn blocking_flow(&self) -> Option<&str> {
        match self {
            Diagnosis::InProgress { blocking_flow, .. }
            | Diagnosis::Problematic { blocking_flow, .. }
            | Diagnosis::PrerequisitesNotMet { blocking_flow, .. }
            | Diagnosis::NotStartedUnknown { blocking_flow, .. } => Some(blocking_flow),
            Diagnosis::AllFlowsCompleted => None,
        }
    }

    pub fn is_all_completed(&self) -> bool {
        matches!(self, Diagnosis::AllFlowsCompleted)
    }

    /// The `status` string used on the wire
    pub fn status_label(&self) -> &'static str {
        match self {
            Diagnosis::InProgress { .. } => "in_progress",
            Diagnosis::Problematic { .. } => "problematic",
            Diagnosis::PrerequisitesNotMet { .. } => "prerequisites_not_met",
            Diagnosis::NotStartedUnknown { .. } => "not_started",
            Diagnosis::AllFlowsCompleted => "all_flows_completed",
        }
    }

    /// One-line human-readable explanation
    pub fn describe(&self) -> String {
        match self {
            Diagnosis::InProgress { blocking_flow, status_details } => format!(
                "'{}' stalled at {} (missing: {})",
                blocking_flow,
                status_details.progress,
                status_details.missing_steps.join(", ")
            ),
            Diagnosis::Problematic { blocking_flow, status_details } => format!(
                "'{}' never started: {} (expected first step: {})",
                blocking_flow, status_details.issue, status_details.expected_first_step
            ),
            Diagnosis::PrerequisitesNotMet { blocking_flow, status_details } => format!(
                "'{}' is waiting on: {}",
                blocking_flow,
                status_details.missing_prerequisites.join(", ")
            ),
            Diagnosis::NotStartedUnknown { blocking_flow, status_details } => format!(
                "'{}' did not start ({})",
                blocking_flow, status_details.reason
            ),
            Diagnosis::AllFlowsCompleted => "all flows completed".to_string(),
        }
    }
}
