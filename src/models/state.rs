// Flow state - per-run progress of a single flow

//! # Flow State
//!
//! Every analysis run owns one [`FlowState`] per catalog flow. A state only ever
//! moves forward:
//!
//! ```text
//! NotStarted --first step matched--> InProgress --last step matched--> Completed
//! ```
//!
//! There is no failure state. A flow that never finishes simply stays
//! `NotStarted` or `InProgress` for the rest of the run.
//!
//! ## Rust Learning Notes:
//!
//! ### Encapsulated Mutation
//! The fields are public for reading and serialization, but the tracker only
//! advances a state through [`FlowState::record_match`], which refuses to touch a
//! completed flow. Keeping the one mutating method small makes the "completed
//! states never change" invariant easy to check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::step::StepSpec;

/// Lifecycle position of a flow within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// A step that was observed, with the timestamp of the record that matched it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedStep {
    pub step: StepSpec,
    pub timestamp: DateTime<Utc>,
}

/// Mutable progress of one flow, owned by exactly one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowState {
    pub flow_name: String,
    pub matched_steps: Vec<MatchedStep>,
    pub completed: bool,
}

impl FlowState {
    /// Fresh, not-started state for the named flow
    pub fn new<S: Into<String>>(flow_name: S) -> Self {
        FlowState {
            flow_name: flow_name.into(),
            matched_steps: Vec::new(),
            completed: false,
        }
    }

    /// Index of the next step that has to be observed
    pub fn next_step_index(&self) -> usize {
        self.matched_steps.len()
    }

    pub fn status(&self) -> FlowStatus {
        if self.completed {
            FlowStatus::Completed
        } else if self.matched_steps.is_empty() {
            FlowStatus::NotStarted
        } else {
            FlowStatus::InProgress
        }
    }

    /// Timestamp of the most recently matched step
    pub fn last_matched_at(&self) -> Option<DateTime<Utc>> {
        self.matched_steps.last().map(|m| m.timestamp)
    }

    /// Record a matched step and report whether it completed the flow
    ///
    /// Completed states and states that already hold `total_steps` matches are
    /// left untouched and return `false`.
    pub fn record_match(&mut self, step: StepSpec, timestamp: DateTime<Utc>, total_steps: usize) -> bool {
        if self.completed || self.matched_steps.len() >= total_steps {
            return false;
        }

        self.matched_steps.push(MatchedStep { step, timestamp });

        if self.matched_steps.len() == total_steps {
            self.completed = true;
        }
        self.completed
    }
}

/// Partial progress of a flow that started but did not finish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFlow {
    pub flow_name: String,
    pub progress: Vec<MatchedStep>,
    pub total_steps: usize,
}
