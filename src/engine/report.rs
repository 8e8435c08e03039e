// Report generator - turns a finished run into an AnalysisReport

use crate::models::{
    AnalysisReport, CompletedFlowReport, InProgressFlowReport, ProblematicFlowReport,
    ReportSummary, FULLY_COMPLETED, NOT_STARTED_ISSUE,
};

use super::tracker::AnalysisRun;

/// Aggregate the final state of `run` into a completeness report
///
/// - Completed flows are listed in completion order
/// - In-progress and problematic flows are listed in catalog order
/// - A flow is *problematic* when it is neither completed nor in progress but
///   all of its prerequisites completed, i.e. it could have started and did not
pub fn generate(run: &AnalysisRun<'_>) -> AnalysisReport {
    let catalog = run.catalog();

    let completed_flows: Vec<CompletedFlowReport> = run
        .completed_flows()
        .iter()
        .filter_map(|name| catalog.get(name))
        .map(|definition| CompletedFlowReport {
            flow_name: definition.name.clone(),
            steps: definition.steps.clone(),
            status: FULLY_COMPLETED.to_string(),
        })
        .collect();

    let in_progress_flows: Vec<InProgressFlowReport> = run
        .active_flows()
        .iter()
        .map(|active| {
            let matched = active.progress.len();
            let missing_steps = catalog
                .get(&active.flow_name)
                .map(|definition| definition.remaining_steps(matched).to_vec())
                .unwrap_or_default();

            InProgressFlowReport {
                flow_name: active.flow_name.clone(),
                completed_steps: matched,
                total_steps: active.total_steps,
                last_step_time: active.progress.last().map(|m| m.timestamp),
                missing_steps,
            }
        })
        .collect();

    let problematic_flows: Vec<ProblematicFlowReport> = catalog
        .flows()
        .iter()
        .filter(|definition| {
            !run.is_completed(&definition.name) && run.active_flow(&definition.name).is_none()
        })
        .filter(|definition| definition.prerequisites_met(run.completed_flows()))
        .filter_map(|definition| {
            definition.first_step().map(|step| ProblematicFlowReport {
                flow_name: definition.name.clone(),
                issue: NOT_STARTED_ISSUE.to_string(),
                missing_initial_step: step.clone(),
            })
        })
        .collect();

    let total_flows = catalog.len();
    let completed = completed_flows.len();
    let in_progress = in_progress_flows.len();

    AnalysisReport {
        summary: ReportSummary {
            total_flows,
            completed,
            in_progress,
            not_started: total_flows.saturating_sub(completed + in_progress),
        },
        completed_flows,
        in_progress_flows,
        problematic_flows,
        catalog_version: catalog.version().to_string(),
        catalog_fingerprint: catalog.fingerprint().to_string(),
        records_evaluated: run.records_evaluated(),
    }
}
