// Notify Service - one evaluation pass: load -> decide -> dispatch

pub mod report;
pub mod watch;

pub use report::{LocationSummary, RunReport};
pub use watch::NotifyScheduler;

use crate::application::dispatcher::{DispatchReport, NotificationDispatcher};
use crate::application::policy::NotificationPolicyEngine;
use crate::application::snapshot_loader::SnapshotLoader;
use crate::domain::{LocationId, NotificationDecision, SnapshotScope};
use crate::error::Result;
use crate::port::{IdProvider, MessageTransport, QueueStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, Instrument};

/// Use case wiring the snapshot loader, the policy engine and the dispatcher.
///
/// All collaborators are injected by the composition root.
pub struct NotifyService {
    loader: SnapshotLoader,
    engine: NotificationPolicyEngine,
    dispatcher: NotificationDispatcher,
    id_provider: Arc<dyn IdProvider>,
}

impl NotifyService {
    pub fn new(
        store: Arc<dyn QueueStore>,
        transport: Arc<dyn MessageTransport>,
        id_provider: Arc<dyn IdProvider>,
        engine: NotificationPolicyEngine,
        scope: SnapshotScope,
    ) -> Self {
        Self {
            loader: SnapshotLoader::new(Arc::clone(&store), scope),
            engine,
            dispatcher: NotificationDispatcher::new(store, transport),
            id_provider,
        }
    }

    /// Run one full pass.
    ///
    /// Fails only when the snapshot cannot be read; per-entry delivery
    /// problems are recorded in the returned report.
    pub async fn run_pass(&self) -> Result<RunReport> {
        let run_id = self.id_provider.generate_id();
        let span = tracing::info_span!("notify_pass", run_id = %run_id);

        async move {
            let snapshot = self.loader.load().await?;
            let decided = self.engine.decide_all(&snapshot);

            let mut locations = Vec::with_capacity(decided.len());
            let mut dispatch = DispatchReport::default();
            for (location_id, decisions) in &decided {
                let queue = &snapshot.locations[location_id];
                locations.push(LocationSummary {
                    location_id: location_id.clone(),
                    active_providers: queue.active_providers,
                    evaluated_entries: queue.entries.len(),
                    pending_entries: queue.pending_count(),
                    decisions: decisions.len(),
                });
                dispatch.extend(self.dispatcher.dispatch(decisions).await);
            }

            let report = RunReport {
                run_id: run_id.clone(),
                anomalies: snapshot.anomalies,
                locations,
                dispatch,
            };

            info!(
                decisions = report.decision_count(),
                delivered = report.dispatch.delivered(),
                failures = report.dispatch.failures(),
                anomalies = report.anomalies.len(),
                "Notification pass finished"
            );

            Ok(report)
        }
        .instrument(span)
        .await
    }

    /// Evaluate the policy without sending or writing anything
    pub async fn preview(&self) -> Result<BTreeMap<LocationId, Vec<NotificationDecision>>> {
        let snapshot = self.loader.load().await?;
        Ok(self.engine.decide_all(&snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dispatcher::DispatchOutcome;
    use crate::application::policy::PolicyConfig;
    use crate::domain::{EntryStatus, Location, Provider, QueueEntry};
    use crate::error::AppError;
    use crate::port::id_provider::SequentialIdProvider;
    use crate::port::message_transport::mocks::RecordingTransport;
    use crate::port::queue_store::mocks::InMemoryQueueStore;
    use chrono::{Duration, TimeZone, Utc};

    fn entry(id: &str, phone: &str, location: &str, minute: i64) -> QueueEntry {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        QueueEntry::new(id, id, phone, location, base + Duration::minutes(minute))
    }

    fn service(
        store: Arc<InMemoryQueueStore>,
        transport: Arc<RecordingTransport>,
    ) -> NotifyService {
        NotifyService::new(
            store,
            transport,
            Arc::new(SequentialIdProvider::default()),
            NotificationPolicyEngine::new(PolicyConfig::default()),
            SnapshotScope::PendingOnly,
        )
    }

    #[tokio::test]
    async fn test_run_pass_sends_and_marks() {
        let store = Arc::new(InMemoryQueueStore::new(
            vec![
                entry("e1", "+1001", "shop", 0),
                entry("e2", "+1002", "shop", 1).with_requested_provider("b1"),
                entry("e3", "+1003", "shop", 2),
            ],
            vec![Provider::active("b1", "shop")],
            vec![Location::new("shop")],
        ));
        let transport = Arc::new(RecordingTransport::new());

        let report = service(store.clone(), transport.clone())
            .run_pass()
            .await
            .unwrap();

        assert_eq!(report.run_id, "run-1");
        assert_eq!(transport.sent_to(), vec!["+1001", "+1002"]);
        assert!(store.entry("e1").unwrap().notified);
        assert!(store.entry("e2").unwrap().notified);
        assert!(!store.entry("e3").unwrap().notified);
        assert!(report.is_clean());
        assert_eq!(report.locations[0].decisions, 2);
    }

    #[tokio::test]
    async fn test_second_pass_advances_any_bucket() {
        let store = Arc::new(InMemoryQueueStore::new(
            vec![
                entry("e1", "+1001", "shop", 0),
                entry("e2", "+1002", "shop", 1),
            ],
            vec![Provider::active("b1", "shop")],
            vec![Location::new("shop")],
        ));
        let transport = Arc::new(RecordingTransport::new());
        let service = service(store.clone(), transport.clone());

        service.run_pass().await.unwrap();
        service.run_pass().await.unwrap();

        // e1 is filtered out once notified, so e2 becomes index 0
        assert_eq!(transport.sent_to(), vec!["+1001", "+1002"]);
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_entry_for_next_pass() {
        let store = Arc::new(InMemoryQueueStore::new(
            vec![entry("e1", "+1001", "shop", 0)],
            vec![],
            vec![Location::new("shop")],
        ));
        let transport = Arc::new(RecordingTransport::new());
        transport.fail_for("+1001");

        let report = service(store.clone(), transport.clone())
            .run_pass()
            .await
            .unwrap();

        assert!(!report.is_clean());
        assert!(matches!(
            report.dispatch.records[0].outcome,
            DispatchOutcome::TransportFailed { .. }
        ));
        assert!(!store.entry("e1").unwrap().notified);
        assert!(store.mark_calls().is_empty());
    }

    #[tokio::test]
    async fn test_mark_failure_is_reported_and_resent_next_pass() {
        let store = Arc::new(InMemoryQueueStore::new(
            vec![entry("e1", "+1001", "shop", 0)],
            vec![],
            vec![Location::new("shop")],
        ));
        store.fail_mark_for("e1");
        let transport = Arc::new(RecordingTransport::new());
        let service = service(store.clone(), transport.clone());

        let report = service.run_pass().await.unwrap();
        assert!(matches!(
            report.dispatch.records[0].outcome,
            DispatchOutcome::MarkFailed { .. }
        ));
        assert!(!store.entry("e1").unwrap().notified);

        // Flag never written, so the next pass texts again
        service.run_pass().await.unwrap();
        assert_eq!(transport.sent_to(), vec!["+1001", "+1001"]);
    }

    #[tokio::test]
    async fn test_new_walk_in_is_picked_up_on_next_pass() {
        let store = Arc::new(InMemoryQueueStore::new(
            vec![entry("e1", "+1001", "shop", 0).with_requested_provider("b1")],
            vec![Provider::active("b1", "shop")],
            vec![Location::new("shop")],
        ));
        let transport = Arc::new(RecordingTransport::new());
        let service = NotifyService::new(
            store.clone(),
            transport.clone(),
            Arc::new(SequentialIdProvider::default()),
            NotificationPolicyEngine::new(PolicyConfig::default()),
            SnapshotScope::WithNotified,
        );

        service.run_pass().await.unwrap();
        store.push_entry(entry("e2", "+1002", "shop", 5));

        let report = service.run_pass().await.unwrap();
        assert_eq!(transport.sent_to(), vec!["+1001", "+1002"]);
        assert_eq!(report.locations[0].evaluated_entries, 2);
        assert_eq!(report.locations[0].pending_entries, 1);
    }

    #[tokio::test]
    async fn test_snapshot_failure_is_fatal() {
        let store = Arc::new(InMemoryQueueStore::default());
        store.fail_reads();
        let transport = Arc::new(RecordingTransport::new());

        let result = service(store, transport.clone()).run_pass().await;
        assert!(matches!(result, Err(AppError::Store(_))));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_preview_has_no_side_effects() {
        let store = Arc::new(InMemoryQueueStore::new(
            vec![entry("e1", "+1001", "shop", 0)],
            vec![],
            vec![Location::new("shop")],
        ));
        let transport = Arc::new(RecordingTransport::new());

        let preview = service(store.clone(), transport.clone())
            .preview()
            .await
            .unwrap();

        assert_eq!(preview["shop"].len(), 1);
        assert!(transport.sent().is_empty());
        assert!(!store.entry("e1").unwrap().notified);
    }

    #[tokio::test]
    async fn test_served_upstream_entry_is_not_notified() {
        let store = Arc::new(InMemoryQueueStore::new(
            vec![
                entry("e1", "+1001", "shop", 0),
                entry("e2", "+1002", "shop", 1),
            ],
            vec![],
            vec![Location::new("shop")],
        ));
        store.set_status("e1", EntryStatus::Serving);
        let transport = Arc::new(RecordingTransport::new());

        service(store, transport.clone()).run_pass().await.unwrap();
        assert_eq!(transport.sent_to(), vec!["+1002"]);
    }
}
