// Pass report

use crate::application::dispatcher::DispatchReport;
use crate::domain::{LocationId, SnapshotAnomaly};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationSummary {
    pub location_id: LocationId,
    pub active_providers: usize,
    pub evaluated_entries: usize,
    /// Evaluated entries not yet notified; differs only under `WithNotified`
    pub pending_entries: usize,
    pub decisions: usize,
}

/// Outcome of one pass, for logs and the process exit status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: String,
    pub anomalies: Vec<SnapshotAnomaly>,
    pub locations: Vec<LocationSummary>,
    pub dispatch: DispatchReport,
}

impl RunReport {
    pub fn decision_count(&self) -> usize {
        self.locations.iter().map(|l| l.decisions).sum()
    }

    /// No transport or mark failures. Anomalies do not count.
    pub fn is_clean(&self) -> bool {
        self.dispatch.is_clean()
    }
}
