// Notification dispatch: send, then mark notified

use crate::domain::{EntryId, LocationId, NotificationDecision};
use crate::port::{MarkOutcome, MessageTransport, QueueStore};
use std::sync::Arc;
use tracing::{error, info, warn};

/// What happened to one decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Message accepted and entry marked notified
    Delivered { message_id: Option<String> },
    /// Message accepted but the conditional update matched no row
    AlreadyMarked,
    /// Transport refused or failed; entry stays unnotified
    TransportFailed { reason: String },
    /// Message accepted but the store write failed; may be re-sent next pass
    MarkFailed { reason: String },
}

impl DispatchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            DispatchOutcome::TransportFailed { .. } | DispatchOutcome::MarkFailed { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRecord {
    pub entry_id: EntryId,
    pub location_id: LocationId,
    pub outcome: DispatchOutcome,
}

/// Per-entry results of a dispatch batch, in dispatch order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub records: Vec<DispatchRecord>,
}

impl DispatchReport {
    pub fn delivered(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, DispatchOutcome::Delivered { .. }))
            .count()
    }

    pub fn failures(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_failure()).count()
    }

    pub fn is_clean(&self) -> bool {
        self.failures() == 0
    }

    pub fn extend(&mut self, other: DispatchReport) {
        self.records.extend(other.records);
    }
}

/// Delivers decisions one at a time and records the notified flag.
///
/// The flag is written strictly after the transport accepted the message.
/// Failures never abort the batch and are never retried within a pass.
pub struct NotificationDispatcher {
    store: Arc<dyn QueueStore>,
    transport: Arc<dyn MessageTransport>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn QueueStore>, transport: Arc<dyn MessageTransport>) -> Self {
        Self { store, transport }
    }

    pub async fn dispatch(&self, decisions: &[NotificationDecision]) -> DispatchReport {
        let mut report = DispatchReport::default();
        for decision in decisions {
            let outcome = self.dispatch_one(decision).await;
            report.records.push(DispatchRecord {
                entry_id: decision.entry.id.clone(),
                location_id: decision.entry.location_id.clone(),
                outcome,
            });
        }
        report
    }

    async fn dispatch_one(&self, decision: &NotificationDecision) -> DispatchOutcome {
        let entry = &decision.entry;

        info!(
            entry_id = %entry.id,
            customer = %entry.customer_name,
            location_id = %entry.location_id,
            kind = decision.kind.label(),
            "Notifying customer"
        );

        let receipt = match self
            .transport
            .send(&entry.phone_number, &decision.message)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                error!(
                    entry_id = %entry.id,
                    to = %entry.phone_number,
                    error = %e,
                    "Failed to send SMS"
                );
                return DispatchOutcome::TransportFailed {
                    reason: e.to_string(),
                };
            }
        };

        match self.store.mark_notified(&entry.id).await {
            Ok(MarkOutcome::Marked) => {
                info!(
                    entry_id = %entry.id,
                    message_id = ?receipt.message_id,
                    "SMS sent and entry marked notified"
                );
                DispatchOutcome::Delivered {
                    message_id: receipt.message_id,
                }
            }
            Ok(MarkOutcome::NotMarked) => {
                warn!(
                    entry_id = %entry.id,
                    "SMS sent but entry was already marked or no longer exists"
                );
                DispatchOutcome::AlreadyMarked
            }
            Err(e) => {
                error!(
                    entry_id = %entry.id,
                    error = %e,
                    "Could not mark entry as notified"
                );
                DispatchOutcome::MarkFailed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
