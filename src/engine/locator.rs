// Blocking-flow locator - the earliest unmet flow and why it is unmet

//! # Blocking-Flow Locator
//!
//! Walks the canonical flow order and stops at the first flow that did not
//! complete. The reason is classified, in this order of precedence:
//!
//! 1. **In progress**: some steps matched; report progress and missing steps
//! 2. **Problematic**: ready to start, nothing matched; report the first step
//! 3. **Prerequisites not met**: report the prerequisites that never completed
//! 4. **Not started (unknown)**: defensive fallback
//!
//! If every flow in the order completed, the diagnosis is
//! [`Diagnosis::AllFlowsCompleted`].

use tracing::warn;

use crate::models::{
    AnalysisReport, Diagnosis, PrerequisiteDetails, ProblematicDetails, ProgressDetails,
    UnknownDetails,
};

use super::catalog::FlowCatalog;

/// Find the first flow of `canonical_order` that did not complete
///
/// `catalog` supplies prerequisite lists. Names that are not in the catalog are
/// skipped with a warning.
pub fn locate_first_blocker<S: AsRef<str>>(
    report: &AnalysisReport,
    catalog: &FlowCatalog,
    canonical_order: &[S],
) -> Diagnosis {
    for name in canonical_order.iter().map(AsRef::as_ref) {
        if report.is_completed(name) {
            continue;
        }

        if let Some(in_progress) = report.in_progress(name) {
            return Diagnosis::InProgress {
                blocking_flow: name.to_string(),
                status_details: ProgressDetails {
                    progress: in_progress.progress(),
                    missing_steps: in_progress.missing_steps.iter().map(|s| s.pattern.clone()).collect(),
                    last_step_time: in_progress.last_step_time,
                },
            };
        }

        if let Some(problematic) = report.problematic(name) {
            return Diagnosis::Problematic {
                blocking_flow: name.to_string(),
                status_details: ProblematicDetails {
                    issue: problematic.issue.clone(),
                    expected_first_step: problematic.missing_initial_step.pattern.clone(),
                },
            };
        }

        let Some(definition) = catalog.get(name) else {
            warn!(flow = name, "canonical order names a flow that is not in the catalog");
            continue;
        };

        let missing_prerequisites = definition.unmet_prerequisites(&report.completed_flow_names());
        if !missing_prerequisites.is_empty() {
            return Diagnosis::PrerequisitesNotMet {
                blocking_flow: name.to_string(),
                status_details: PrerequisiteDetails { missing_prerequisites },
            };
        }

        return Diagnosis::NotStartedUnknown {
            blocking_flow: name.to_string(),
            status_details: UnknownDetails {
                reason: "unknown".to_string(),
            },
        };
    }

    Diagnosis::AllFlowsCompleted
}

/// [`locate_first_blocker`] over the catalog's own definition order
pub fn diagnose(report: &AnalysisReport, catalog: &FlowCatalog) -> Diagnosis {
    locate_first_blocker(report, catalog, &catalog.canonical_order())
}
