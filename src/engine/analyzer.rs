// Analyzer facade - catalog + tracker + report + locator in one call

//! # Protocol Analyzer
//!
//! [`ProtocolAnalyzer`] owns a validated catalog behind an `Arc` and runs the
//! whole pipeline for a record sequence:
//!
//! ```text
//! records ──> AnalysisRun (tracker) ──> AnalysisReport ──> Diagnosis
//! ```
//!
//! Every call builds a brand-new [`AnalysisRun`], so one analyzer can serve any
//! number of requests, sequentially or concurrently, without state leaking from
//! one request into the next.
//!
//! ## Rust Learning Notes:
//!
//! ### Arc for Shared Read-Only Data
//! `Arc<FlowCatalog>` is a reference-counted pointer that can be cloned cheaply
//! and sent to other threads. Since nobody mutates the catalog, no lock is needed.
//!
//! ### spawn_blocking
//! Analysis is CPU-bound and never awaits. `tokio::task::spawn_blocking` moves
//! each batch onto tokio's blocking thread pool so async callers stay responsive.

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::models::{AnalysisReport, Diagnosis, LogRecord};
use crate::{AnalyzerError, Result};

use super::catalog::FlowCatalog;
use super::locator;
use super::report;
use super::tracker::AnalysisRun;

/// Report and diagnosis of one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Identifier of the run that produced this outcome
    pub run_id: Uuid,

    pub report: AnalysisReport,

    /// First blocking flow, serialized as `first_error`
    #[serde(rename = "first_error")]
    pub diagnosis: Diagnosis,
}

/// Entry point for analyzing record sequences against a shared catalog
#[derive(Debug, Clone)]
pub struct ProtocolAnalyzer {
    catalog: Arc<FlowCatalog>,
}

impl ProtocolAnalyzer {
    pub fn new(catalog: FlowCatalog) -> Self {
        Self::with_shared_catalog(Arc::new(catalog))
    }

    /// Reuse a catalog that is already shared elsewhere
    pub fn with_shared_catalog(catalog: Arc<FlowCatalog>) -> Self {
        ProtocolAnalyzer { catalog }
    }

    /// Analyzer over the built-in 5G attach catalog
    pub fn standard() -> Result<Self> {
        Ok(Self::new(FlowCatalog::standard()?))
    }

    pub fn catalog(&self) -> &FlowCatalog {
        &self.catalog
    }

    pub fn shared_catalog(&self) -> Arc<FlowCatalog> {
        Arc::clone(&self.catalog)
    }

    /// Analyze one ordered record sequence
    ///
    /// Never fails: an empty or entirely unmatched sequence yields a report in
    /// which nothing completed.
    pub fn analyze(&self, records: &[LogRecord]) -> AnalysisOutcome {
        run_pipeline(&self.catalog, records)
    }

    /// Analyze independent record sequences concurrently
    ///
    /// Each batch gets its own run on tokio's blocking pool. Outcomes are
    /// returned in the same order as `batches`.
    ///
    /// ## Errors
    /// [`AnalyzerError::Internal`] if a worker task panicked or was cancelled.
    pub async fn analyze_batches(&self, batches: Vec<Vec<LogRecord>>) -> Result<Vec<AnalysisOutcome>> {
        debug!(batches = batches.len(), "dispatching analysis batches");

        let handles = batches.into_iter().map(|records| {
            let catalog = Arc::clone(&self.catalog);
            tokio::task::spawn_blocking(move || run_pipeline(&catalog, &records))
        });

        join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.map_err(|e| AnalyzerError::Internal(format!("analysis task failed: {}", e))))
            .collect()
    }
}

fn run_pipeline(catalog: &FlowCatalog, records: &[LogRecord]) -> AnalysisOutcome {
    let run = AnalysisRun::track(catalog, records);
    let report = report::generate(&run);
    let diagnosis = locator::diagnose(&report, catalog);

    debug!(run_id = %run.run_id(), status = diagnosis.status_label(), "diagnosis ready");

    AnalysisOutcome {
        run_id: run.run_id(),
        report,
        diagnosis,
    }
}
