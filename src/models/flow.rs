// Flow definitions - named multi-step signaling procedures

//! # Flow Definitions
//!
//! A `FlowDefinition` describes one signaling procedure the analyzer tracks:
//! - A unique name ("RRC Connection Setup", "NAS SMC", ...)
//! - The ordered steps that must all be observed for the flow to complete
//! - The prerequisite flows that must complete before any step can match
//!
//! Definitions are plain immutable data. Structural checks that need the whole
//! set of flows (unknown prerequisites, cycles, duplicates) live in
//! [`crate::engine::catalog`].

use serde::{Deserialize, Serialize};

use super::step::StepSpec;

/// Static definition of one tracked flow
///
/// ## Rust Learning Notes:
///
/// ### `#[serde(default)]` on a Field
/// Catalog documents may omit `prerequisites` for root flows. The attribute makes
/// serde fill in `Vec::default()` (an empty list) instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDefinition {
    /// Unique flow name, also the key used by reports and diagnoses
    pub name: String,

    /// Expected messages, in the order they must be observed
    pub steps: Vec<StepSpec>,

    /// Flows that must reach `Completed` before this flow can start matching
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

impl FlowDefinition {
    /// Create a new flow definition
    pub fn new<N, P>(name: N, steps: Vec<StepSpec>, prerequisites: Vec<P>) -> Self
    where
        N: Into<String>,
        P: Into<String>,
    {
        FlowDefinition {
            name: name.into(),
            steps,
            prerequisites: prerequisites.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a flow without prerequisites
    pub fn root<N: Into<String>>(name: N, steps: Vec<StepSpec>) -> Self {
        Self::new::<N, String>(name, steps, Vec::new())
    }

    /// Number of steps required to complete the flow
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// The step at `index`, if the flow has that many steps
    pub fn step(&self, index: usize) -> Option<&StepSpec> {
        self.steps.get(index)
    }

    /// The first expected step, used as a hint for flows that never started
    pub fn first_step(&self) -> Option<&StepSpec> {
        self.steps.first()
    }

    /// Steps not yet covered when `matched` steps have been observed
    pub fn remaining_steps(&self, matched: usize) -> &[StepSpec] {
        let start = matched.min(self.steps.len());
        &self.steps[start..]
    }

    /// Check whether every prerequisite appears in `completed`
    pub fn prerequisites_met<S: AsRef<str>>(&self, completed: &[S]) -> bool {
        self.prerequisites
            .iter()
            .all(|p| completed.iter().any(|c| c.as_ref() == p))
    }

    /// Prerequisites that do not appear in `completed`, in declaration order
    pub fn unmet_prerequisites<S: AsRef<str>>(&self, completed: &[S]) -> Vec<String> {
        self.prerequisites
            .iter()
            .filter(|p| !completed.iter().any(|c| c.as_ref() == p.as_str()))
            .cloned()
            .collect()
    }
}
