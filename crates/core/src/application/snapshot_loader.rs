// Snapshot assembly from the queue store

use crate::domain::{QueueSnapshot, SnapshotScope};
use crate::error::Result;
use crate::port::{EntryFilter, QueueStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Reads one consistent-enough view of the queue for a pass.
///
/// Any read failure aborts the load; no partial snapshot is ever returned.
pub struct SnapshotLoader {
    store: Arc<dyn QueueStore>,
    scope: SnapshotScope,
}

impl SnapshotLoader {
    pub fn new(store: Arc<dyn QueueStore>, scope: SnapshotScope) -> Self {
        Self { store, scope }
    }

    pub async fn load(&self) -> Result<QueueSnapshot> {
        let entries = self
            .store
            .fetch_waiting_entries(EntryFilter::from(self.scope))
            .await?;
        let providers = self.store.fetch_active_providers().await?;
        let locations = self.store.fetch_locations().await?;

        let fetched_entries = entries.len();
        let snapshot = QueueSnapshot::assemble(self.scope, entries, &providers, locations);

        for anomaly in &snapshot.anomalies {
            warn!(anomaly = %anomaly, "Snapshot anomaly, entry skipped");
        }

        info!(
            fetched_entries = fetched_entries,
            evaluated_entries = snapshot.entry_count(),
            active_providers = providers.len(),
            locations = snapshot.locations.len(),
            anomalies = snapshot.anomalies.len(),
            "Queue snapshot loaded"
        );

        Ok(snapshot)
    }
}
