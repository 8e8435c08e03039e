// Flow tracker - the per-run state machine

//! # Flow Tracker
//!
//! An [`AnalysisRun`] holds one [`FlowState`] per catalog flow and advances them
//! one [`LogRecord`] at a time. For every record, each flow that is not yet
//! completed is considered in catalog order:
//!
//! 1. **Gate**: skip the flow unless all of its prerequisites had completed
//!    *before* this record (a prerequisite completed by the same record only
//!    unlocks dependents from the next record on)
//! 2. **Pending step**: look only at the next unmatched step, no look-ahead
//! 3. **Match**: run the fuzzy matcher; on success record `(step, timestamp)`
//! 4. **Complete**: after the final step the flow joins `completed_flows`
//!
//! One record can advance several *different* flows, but never more than one
//! step of the same flow.
//!
//! After the last record, [`AnalysisRun::finish`] collects every flow with partial
//! progress into `active_flows`.
//!
//! ## Run Isolation
//!
//! A run is a disposable value: build one per record sequence, read its results,
//! drop it. Nothing is shared between runs except the immutable catalog.
//!
//! ## Rust Learning Notes:
//!
//! ### Lifetime Parameters on Structs
//! `AnalysisRun<'a>` borrows the catalog instead of cloning it. The `'a` says
//! the run cannot outlive the catalog it was built from, which the compiler
//! checks for us.
//!
//! ### Disjoint Field Borrows
//! `observe` iterates `states` mutably while reading `completed_flows`. Rust
//! allows this because the two borrows touch different fields of `self`.

use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::models::{ActiveFlow, FlowState, LogRecord};

use super::catalog::FlowCatalog;
use super::matcher;

/// Progress of every catalog flow over one record sequence
#[derive(Debug, Clone)]
pub struct AnalysisRun<'a> {
    run_id: Uuid,
    catalog: &'a FlowCatalog,
    states: Vec<FlowState>,
    completed_flows: Vec<String>,
    active_flows: Vec<ActiveFlow>,
    records_evaluated: usize,
    last_key: Option<(DateTime<Utc>, u64)>,
}

impl<'a> AnalysisRun<'a> {
    /// Fresh run with every flow `NotStarted`
    pub fn new(catalog: &'a FlowCatalog) -> Self {
        AnalysisRun {
            run_id: Uuid::new_v4(),
            catalog,
            states: catalog.flows().iter().map(|f| FlowState::new(f.name.clone())).collect(),
            completed_flows: Vec::new(),
            active_flows: Vec::new(),
            records_evaluated: 0,
            last_key: None,
        }
    }

    /// Build a run, feed it every record in order and finish it
    pub fn track(catalog: &'a FlowCatalog, records: &[LogRecord]) -> Self {
        let mut run = Self::new(catalog);
        let span = info_span!("analysis_run", run_id = %run.run_id, records = records.len());
        let _guard = span.enter();

        for record in records {
            run.observe(record);
        }
        run.finish();

        info!(
            completed = run.completed_flows.len(),
            in_progress = run.active_flows.len(),
            "analysis run finished"
        );
        run
    }

    /// Advance every eligible flow by at most one step using `record`
    pub fn observe(&mut self, record: &LogRecord) {
        let key = record.ordering_key();
        if let Some(previous) = self.last_key {
            if key < previous {
                warn!(
                    seq = record.sequence_number,
                    timestamp = %record.timestamp,
                    "record is out of order; evaluating it in the given position"
                );
            }
        }
        self.last_key = Some(key);
        self.records_evaluated += 1;

        let catalog = self.catalog;
        let settled = self.completed_flows.len();
        let mut newly_completed = Vec::new();

        for (definition, state) in catalog.flows().iter().zip(self.states.iter_mut()) {
            if state.completed {
                continue;
            }

            // Prerequisites must have completed on an earlier record
            if !definition.prerequisites_met(&self.completed_flows[..settled]) {
                continue;
            }

            let Some(expected) = definition.step(state.next_step_index()) else {
                continue;
            };

            if !matcher::matches(record, expected) {
                continue;
            }

            debug!(
                flow = %definition.name,
                step = state.next_step_index() + 1,
                total = definition.total_steps(),
                seq = record.sequence_number,
                "step matched"
            );

            if state.record_match(expected.clone(), record.timestamp, definition.total_steps()) {
                newly_completed.push(definition.name.clone());
            }
        }

        for name in newly_completed {
            debug!(flow = %name, seq = record.sequence_number, "flow completed");
            self.active_flows.retain(|active| active.flow_name != name);
            self.completed_flows.push(name);
        }
    }

    /// Record partial progress of every unfinished flow in `active_flows`
    ///
    /// Safe to call more than once; existing entries are refreshed in place.
    pub fn finish(&mut self) {
        for (definition, state) in self.catalog.flows().iter().zip(&self.states) {
            if state.completed || state.matched_steps.is_empty() {
                continue;
            }

            let entry = ActiveFlow {
                flow_name: definition.name.clone(),
                progress: state.matched_steps.clone(),
                total_steps: definition.total_steps(),
            };

            match self.active_flows.iter_mut().find(|a| a.flow_name == definition.name) {
                Some(existing) => *existing = entry,
                None => self.active_flows.push(entry),
            }
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn catalog(&self) -> &'a FlowCatalog {
        self.catalog
    }

    /// Per-flow states, in catalog order
    pub fn states(&self) -> &[FlowState] {
        &self.states
    }

    pub fn state(&self, flow_name: &str) -> Option<&FlowState> {
        self.states.iter().find(|s| s.flow_name == flow_name)
    }

    /// Completed flow names, in completion order
    pub fn completed_flows(&self) -> &[String] {
        &self.completed_flows
    }

    /// Flows with partial progress, in catalog order (populated by `finish`)
    pub fn active_flows(&self) -> &[ActiveFlow] {
        &self.active_flows
    }

    pub fn active_flow(&self, flow_name: &str) -> Option<&ActiveFlow> {
        self.active_flows.iter().find(|a| a.flow_name == flow_name)
    }

    pub fn is_completed(&self, flow_name: &str) -> bool {
        self.completed_flows.iter().any(|c| c == flow_name)
    }

    pub fn records_evaluated(&self) -> usize {
        self.records_evaluated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FlowDefinition, FlowStatus, StepSpec};
    use chrono::TimeZone;

    fn at(seq: u64, protocol: &str, direction: &str, message: &str) -> LogRecord {
        let base = Utc.with_ymd_and_hms(2025, 4, 7, 9, 42, 30).unwrap();
        LogRecord::new(seq, base + chrono::Duration::milliseconds(seq as i64 * 10), protocol, direction, message)
    }

    fn two_flow_catalog() -> FlowCatalog {
        FlowCatalog::build(
            "test",
            vec![
                FlowDefinition::root("A", vec![StepSpec::uplink("alpha start", "nas")]),
                FlowDefinition::new("B", vec![StepSpec::downlink("beta accept", "nas")], vec!["A"]),
            ],
        )
        .unwrap()
    }

    fn assert_invariants(run: &AnalysisRun<'_>) {
        for (definition, state) in run.catalog().flows().iter().zip(run.states()) {
            assert!(state.matched_steps.len() <= definition.total_steps());
            assert_eq!(state.completed, state.matched_steps.len() == definition.total_steps());
        }
    }

    #[test]
    fn test_dependent_step_before_prerequisite_is_ignored() {
        let catalog = two_flow_catalog();
        let mut run = AnalysisRun::new(&catalog);

        run.observe(&at(1, "nas", "d", "beta accept"));
        assert_eq!(run.state("B").unwrap().status(), FlowStatus::NotStarted);

        run.observe(&at(2, "nas", "u", "alpha start"));
        assert!(run.is_completed("A"));
        assert!(!run.is_completed("B"));

        run.observe(&at(3, "nas", "d", "beta accept"));
        assert!(run.is_completed("B"));
        assert_eq!(run.completed_flows(), &["A".to_string(), "B".to_string()]);
        assert_invariants(&run);
    }

    #[test]
    fn test_prerequisite_completed_by_same_record_does_not_unlock() {
        // A single record that satisfies both A's and B's only step
        let catalog = FlowCatalog::build(
            "test",
            vec![
                FlowDefinition::root("A", vec![StepSpec::uplink("attach", "nas")]),
                FlowDefinition::new("B", vec![StepSpec::uplink("attach", "nas")], vec!["A"]),
            ],
        )
        .unwrap();

        let run = AnalysisRun::track(&catalog, &[at(1, "nas", "u", "attach request")]);
        assert!(run.is_completed("A"));
        assert_eq!(run.state("B").unwrap().status(), FlowStatus::NotStarted);

        let run = AnalysisRun::track(
            &catalog,
            &[at(1, "nas", "u", "attach request"), at(2, "nas", "u", "attach request")],
        );
        assert!(run.is_completed("B"));
    }

    #[test]
    fn test_one_record_advances_independent_flows() {
        let catalog = FlowCatalog::build(
            "test",
            vec![
                FlowDefinition::root("X", vec![StepSpec::downlink("auth request", "nas"), StepSpec::uplink("auth response", "nas")]),
                FlowDefinition::root("Y", vec![StepSpec::downlink("auth request", "nas")]),
            ],
        )
        .unwrap();

        let run = AnalysisRun::track(&catalog, &[at(1, "nas", "d", "auth request")]);
        assert!(run.is_completed("Y"));
        assert_eq!(run.state("X").unwrap().matched_steps.len(), 1);
        assert_eq!(run.active_flows().len(), 1);
        assert_eq!(run.active_flow("X").unwrap().total_steps, 2);
    }

    #[test]
    fn test_no_look_ahead_or_skipping() {
        let catalog = FlowCatalog::build(
            "test",
            vec![FlowDefinition::root(
                "RRC Connection Setup",
                vec![
                    StepSpec::new("rrcSetupRequest", "nrrrc", "u"),
                    StepSpec::new("rrcSetup", "nrrrc", "d"),
                    StepSpec::new("rrcSetupComplete", "nrrrc", "u"),
                ],
            )],
        )
        .unwrap();

        // Completion arrives before the setup itself: cannot jump ahead
        let run = AnalysisRun::track(
            &catalog,
            &[
                at(1, "nrrrc", "u", "rrcsetuprequest"),
                at(2, "nrrrc", "u", "rrcsetupcomplete"),
                at(3, "nrrrc", "d", "rrcsetup"),
            ],
        );
        let state = run.state("RRC Connection Setup").unwrap();
        assert_eq!(state.matched_steps.len(), 2);
        assert_eq!(state.status(), FlowStatus::InProgress);
        assert_eq!(state.last_matched_at(), Some(at(3, "nrrrc", "d", "x").timestamp));
        assert_invariants(&run);
    }

    #[test]
    fn test_completed_flow_is_never_revisited() {
        let catalog = two_flow_catalog();
        let mut run = AnalysisRun::new(&catalog);
        run.observe(&at(1, "nas", "u", "alpha start"));
        let frozen = run.state("A").unwrap().clone();

        run.observe(&at(2, "nas", "u", "alpha start"));
        run.observe(&at(3, "nas", "u", "alpha start again"));
        assert_eq!(run.state("A").unwrap(), &frozen);
        assert_eq!(run.completed_flows().len(), 1);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let catalog = FlowCatalog::standard().unwrap();
        let mut run = AnalysisRun::new(&catalog);
        run.observe(&at(1, "nas", "u", "registration request"));
        run.observe(&at(2, "nas", "d", "authentication request"));
        run.finish();
        run.finish();

        assert_eq!(run.active_flows().len(), 1);
        assert_eq!(run.active_flows()[0].flow_name, "NAS Authentication");
        assert_eq!(run.records_evaluated(), 2);
    }

    #[test]
    fn test_out_of_order_records_are_still_consumed() {
        let catalog = two_flow_catalog();
        let run = AnalysisRun::track(
            &catalog,
            &[at(5, "nas", "u", "alpha start"), at(2, "nas", "d", "beta accept")],
        );
        // No reordering: the later-stamped record was evaluated second
        assert!(run.is_completed("B"));
        assert_eq!(run.records_evaluated(), 2);
    }

    #[test]
    fn test_runs_are_isolated() {
        let catalog = two_flow_catalog();
        let first = AnalysisRun::track(&catalog, &[at(1, "nas", "u", "alpha start")]);
        let second = AnalysisRun::track(&catalog, &[]);

        assert!(first.is_completed("A"));
        assert!(second.completed_flows().is_empty());
        assert_ne!(first.run_id(), second.run_id());
    }
}
