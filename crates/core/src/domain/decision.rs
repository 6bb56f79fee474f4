// Notification decisions emitted by the policy engine

use super::entry::QueueEntry;
use super::provider::ProviderId;
use serde::{Deserialize, Serialize};

/// Why an entry was selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationKind {
    /// Head of a specific-provider bucket
    NextForRequestedProvider { provider_id: ProviderId },
    /// Selected from the "any provider" bucket at `position` (zero-based)
    AlmostUp { position: usize },
}

impl NotificationKind {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationKind::NextForRequestedProvider { .. } => "requested_provider",
            NotificationKind::AlmostUp { .. } => "any_provider",
        }
    }
}

/// One (entry, message) pair to deliver on this pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDecision {
    pub entry: QueueEntry,
    pub kind: NotificationKind,
    pub message: String,
}

/// Customer-facing message text. `{location}` is replaced by the location name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplates {
    pub next_for_requested_provider: String,
    pub almost_up: String,
}

pub const LOCATION_PLACEHOLDER: &str = "{location}";

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            next_for_requested_provider: "You're next in line for your barber at {location}!"
                .to_string(),
            almost_up: "You're almost up at {location} – get ready!".to_string(),
        }
    }
}

impl MessageTemplates {
    pub fn render(&self, kind: &NotificationKind, location_name: &str) -> String {
        let template = match kind {
            NotificationKind::NextForRequestedProvider { .. } => &self.next_for_requested_provider,
            NotificationKind::AlmostUp { .. } => &self.almost_up,
        };
        template.replace(LOCATION_PLACEHOLDER, location_name)
    }
}
