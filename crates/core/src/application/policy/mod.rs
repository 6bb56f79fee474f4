// Notification eligibility policy (pure, no I/O)

pub mod position;

pub use position::notify_position;

use crate::domain::{
    LocationId, LocationQueue, MessageTemplates, NotificationDecision, NotificationKind,
    QueueSnapshot, RequestedProvider,
};
use crate::error::{AppError, Result};
use std::collections::BTreeMap;
use tracing::debug;

use super::constants::DEFAULT_BUSINESS_NAME;

/// How the "any provider" bucket is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnyProviderRule {
    /// Notify only the entry at the notify position `p`
    #[default]
    FixedIndex,
    /// Notify every entry whose estimated wait is within the window.
    ///
    /// Estimated wait of the entry at index `i` with `c` active providers is
    /// `(i / max(c, 1)) * minutes_per_customer`. Location thresholds do not
    /// apply to this rule.
    EstimatedWait {
        minutes_per_customer: u32,
        notify_within_minutes: u32,
    },
}

/// Policy configuration
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    pub any_provider_rule: AnyProviderRule,
    pub templates: MessageTemplates,
    /// Used in messages for locations without a name
    pub business_name: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            any_provider_rule: AnyProviderRule::FixedIndex,
            templates: MessageTemplates::default(),
            business_name: DEFAULT_BUSINESS_NAME.to_string(),
        }
    }
}

impl PolicyConfig {
    pub fn validate(&self) -> Result<()> {
        if let AnyProviderRule::EstimatedWait {
            minutes_per_customer,
            ..
        } = self.any_provider_rule
        {
            if minutes_per_customer == 0 {
                return Err(AppError::Validation(
                    "minutes_per_customer must be greater than zero".to_string(),
                ));
            }
        }
        if self.business_name.trim().is_empty() {
            return Err(AppError::Validation(
                "business name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Decides which entries of a location get notified on this pass.
///
/// Partitions the FIFO queue into one bucket per requested provider plus one
/// "any provider" bucket:
/// - the head of every specific-provider bucket is eligible
/// - in the "any provider" bucket only the entry at the notify position is
///   eligible (see [`notify_position`])
///
/// Entries already marked `notified` are never emitted and never skipped
/// over: if the selected slot holds a notified entry, that bucket yields
/// nothing on this pass.
///
/// # Example
/// ```text
/// let engine = NotificationPolicyEngine::new(PolicyConfig::default());
/// for decision in engine.decide(&location_queue) {
///     println!("{} -> {}", decision.entry.phone_number, decision.message);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct NotificationPolicyEngine {
    config: PolicyConfig,
}

impl NotificationPolicyEngine {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Evaluate one location. Decisions come out in FIFO order of the entries.
    pub fn decide(&self, queue: &LocationQueue) -> Vec<NotificationDecision> {
        let entries = &queue.entries;

        let mut specific: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        let mut any: Vec<usize> = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            match &entry.requested_provider {
                RequestedProvider::Specific(provider_id) => {
                    specific.entry(provider_id.as_str()).or_default().push(index)
                }
                RequestedProvider::Any => any.push(index),
            }
        }

        // index into `entries` -> reason; BTreeMap keeps FIFO order
        let mut selected: BTreeMap<usize, NotificationKind> = BTreeMap::new();

        for (provider_id, bucket) in &specific {
            if let Some(&head) = bucket.first() {
                if entries[head].notified {
                    debug!(
                        location_id = %queue.location.id,
                        provider_id = %provider_id,
                        entry_id = %entries[head].id,
                        "Head of provider bucket already notified"
                    );
                    continue;
                }
                selected.insert(
                    head,
                    NotificationKind::NextForRequestedProvider {
                        provider_id: provider_id.to_string(),
                    },
                );
            }
        }

        match self.config.any_provider_rule {
            AnyProviderRule::FixedIndex => {
                let p = notify_position(queue.location.notify_threshold, queue.active_providers);
                match any.get(p) {
                    Some(&index) if !entries[index].notified => {
                        selected.insert(index, NotificationKind::AlmostUp { position: p });
                    }
                    Some(&index) => debug!(
                        location_id = %queue.location.id,
                        position = p,
                        entry_id = %entries[index].id,
                        "Entry at notify position already notified"
                    ),
                    None => debug!(
                        location_id = %queue.location.id,
                        position = p,
                        bucket_len = any.len(),
                        "Any-provider bucket shorter than notify position"
                    ),
                }
            }
            AnyProviderRule::EstimatedWait {
                minutes_per_customer,
                notify_within_minutes,
            } => {
                let lanes = queue.active_providers.max(1);
                for (position, &index) in any.iter().enumerate() {
                    let wait = (position / lanes) as u64 * u64::from(minutes_per_customer);
                    if wait > u64::from(notify_within_minutes) {
                        break;
                    }
                    if !entries[index].notified {
                        selected.insert(index, NotificationKind::AlmostUp { position });
                    }
                }
            }
        }

        let location_name = queue.location.display_name(&self.config.business_name);
        selected
            .into_iter()
            .map(|(index, kind)| {
                let entry = entries[index].clone();
                let message = self.config.templates.render(&kind, location_name);
                debug!(
                    location_id = %queue.location.id,
                    entry_id = %entry.id,
                    kind = kind.label(),
                    "Entry eligible for notification"
                );
                NotificationDecision {
                    entry,
                    kind,
                    message,
                }
            })
            .collect()
    }

    /// Evaluate every location of a snapshot, in location-id order
    pub fn decide_all(
        &self,
        snapshot: &QueueSnapshot,
    ) -> BTreeMap<LocationId, Vec<NotificationDecision>> {
        snapshot
            .locations
            .iter()
            .map(|(location_id, queue)| (location_id.clone(), self.decide(queue)))
            .collect()
    }
}
