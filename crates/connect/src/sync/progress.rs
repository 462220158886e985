//! Progress reporting for dashboard sync runs.
//!
//! The orchestrator reports lifecycle events through [`SyncProgressReporter`]
//! so the host (HTTP server, CLI, tests) decides how to surface them.

use serde::{Deserialize, Serialize};

use super::SyncOutcome;
use crate::catalog::OmieService;

/// Stage of a sync run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Starting,
    /// Re-issuing the batch through the proxy tunnel.
    Retrying,
    Complete,
    Failed,
    Skipped,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Starting => write!(f, "starting"),
            SyncStatus::Retrying => write!(f, "retrying"),
            SyncStatus::Complete => write!(f, "complete"),
            SyncStatus::Failed => write!(f, "failed"),
            SyncStatus::Skipped => write!(f, "skipped"),
        }
    }
}

impl From<&SyncOutcome> for SyncStatus {
    fn from(outcome: &SyncOutcome) -> Self {
        match outcome {
            SyncOutcome::Skipped { .. } => SyncStatus::Skipped,
            SyncOutcome::Synced { .. } => SyncStatus::Complete,
            SyncOutcome::Failed { .. } => SyncStatus::Failed,
        }
    }
}

/// Trait for reporting sync progress.
pub trait SyncProgressReporter: Send + Sync {
    /// A batch is about to be issued.
    fn report_sync_start(&self, services: &[OmieService]);

    /// The first batch hit a network failure and is being re-issued through
    /// the proxy.
    fn report_fallback(&self, proxy_url: &str);

    /// Sync finished, whatever the outcome.
    fn report_sync_complete(&self, outcome: &SyncOutcome);
}

/// A no-op progress reporter for contexts where progress reporting is not needed.
#[derive(Debug, Clone, Default)]
pub struct NoOpProgressReporter;

impl SyncProgressReporter for NoOpProgressReporter {
    fn report_sync_start(&self, _services: &[OmieService]) {}

    fn report_fallback(&self, _proxy_url: &str) {}

    fn report_sync_complete(&self, _outcome: &SyncOutcome) {}
}
