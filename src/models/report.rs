// Analysis report - structured completeness summary of one run

//! # Analysis Report
//!
//! The report is the main output of an analysis run. Its JSON shape is the one
//! consumers of the analyzer already read:
//!
//! ```text
//! {
//!   "summary": { "total_flows", "completed", "in_progress", "not_started" },
//!   "completed_flows":   [ { "flow_name", "steps", "status" } ],
//!   "in_progress_flows": [ { "flow_name", "completed_steps", "total_steps",
//!                            "last_step_time", "missing_steps" } ],
//!   "problematic_flows": [ { "flow_name", "issue", "missing_initial_step" } ]
//! }
//! ```
//!
//! plus the catalog version/fingerprint and the number of records evaluated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::step::StepSpec;

/// Status literal attached to every completed flow
pub const FULLY_COMPLETED: &str = "fully completed";

/// Issue text attached to flows that could start but never did
pub const NOT_STARTED_ISSUE: &str = "Prerequisites met but flow not started";

/// Flow counts for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_flows: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
}

/// A flow whose every step was observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedFlowReport {
    pub flow_name: String,
    pub steps: Vec<StepSpec>,
    pub status: String,
}

/// A flow with at least one, but not all, steps observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InProgressFlowReport {
    pub flow_name: String,
    pub completed_steps: usize,
    pub total_steps: usize,
    pub last_step_time: Option<DateTime<Utc>>,
    pub missing_steps: Vec<StepSpec>,
}

impl InProgressFlowReport {
    /// Progress as `"completed/total"`
    pub fn progress(&self) -> String {
        format!("{}/{}", self.completed_steps, self.total_steps)
    }
}

/// A flow that was ready to start but shows zero progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblematicFlowReport {
    pub flow_name: String,
    pub issue: String,
    pub missing_initial_step: StepSpec,
}

/// Completeness report for one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: ReportSummary,
    pub completed_flows: Vec<CompletedFlowReport>,
    pub in_progress_flows: Vec<InProgressFlowReport>,
    pub problematic_flows: Vec<ProblematicFlowReport>,

    /// Version string of the catalog the run was evaluated against
    pub catalog_version: String,

    /// SHA-256 fingerprint of that catalog
    pub catalog_fingerprint: String,

    /// Number of log records the run consumed
    pub records_evaluated: usize,
}

impl AnalysisReport {
    /// Whether the named flow completed during the run
    pub fn is_completed(&self, flow_name: &str) -> bool {
        self.completed_flows.iter().any(|f| f.flow_name == flow_name)
    }

    /// Names of completed flows, in completion order
    pub fn completed_flow_names(&self) -> Vec<&str> {
        self.completed_flows.iter().map(|f| f.flow_name.as_str()).collect()
    }

    pub fn in_progress(&self, flow_name: &str) -> Option<&InProgressFlowReport> {
        self.in_progress_flows.iter().find(|f| f.flow_name == flow_name)
    }

    pub fn problematic(&self, flow_name: &str) -> Option<&ProblematicFlowReport> {
        self.problematic_flows.iter().find(|f| f.flow_name == flow_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_in_progress_wire_shape() {
        let ts = Utc.with_ymd_and_hms(2025, 4, 7, 9, 42, 30).unwrap();
        let flow = InProgressFlowReport {
            flow_name: "RRC Connection Setup".to_string(),
            completed_steps: 1,
            total_steps: 3,
            last_step_time: Some(ts),
            missing_steps: vec![
                StepSpec::downlink("rrcSetup", "nrrrc"),
                StepSpec::uplink("rrcSetupComplete", "nrrrc"),
            ],
        };

        assert_eq!(flow.progress(), "1/3");

        let json = serde_json::to_value(&flow).unwrap();
        assert_eq!(json["flow_name"], "RRC Connection Setup");
        assert_eq!(json["missing_steps"][0]["msg"], "rrcSetup");
        assert_eq!(json["last_step_time"], "2025-04-07T09:42:30Z");
    }

    #[test]
    fn test_lookup_helpers() {
        let report = AnalysisReport {
            summary: ReportSummary { total_flows: 2, completed: 1, in_progress: 0, not_started: 1 },
            completed_flows: vec![CompletedFlowReport {
                flow_name: "A".to_string(),
                steps: vec![StepSpec::uplink("alpha", "nas")],
                status: FULLY_COMPLETED.to_string(),
            }],
            in_progress_flows: Vec::new(),
            problematic_flows: vec![ProblematicFlowReport {
                flow_name: "B".to_string(),
                issue: NOT_STARTED_ISSUE.to_string(),
                missing_initial_step: StepSpec::uplink("beta", "nas"),
            }],
            catalog_version: "test".to_string(),
            catalog_fingerprint: String::new(),
            records_evaluated: 1,
        };

        assert!(report.is_completed("A"));
        assert!(!report.is_completed("B"));
        assert_eq!(report.completed_flow_names(), vec!["A"]);
        assert!(report.problematic("B").is_some());
        assert!(report.in_progress("B").is_none());
    }
}
