// Queue Entry Domain Model

use super::location::LocationId;
use super::provider::ProviderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Queue entry ID (opaque, assigned by the store)
pub type EntryId = String;

/// Entry status as stored in `queue_entries.status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Waiting,
    Serving,
    Served,
    Cancelled,
    NoShow,
    /// Any status this build does not know about. Never eligible.
    #[serde(untagged)]
    Other(String),
}

impl EntryStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "waiting" => EntryStatus::Waiting,
            "serving" => EntryStatus::Serving,
            "served" => EntryStatus::Served,
            "cancelled" => EntryStatus::Cancelled,
            "no_show" => EntryStatus::NoShow,
            other => EntryStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntryStatus::Waiting => "waiting",
            EntryStatus::Serving => "serving",
            EntryStatus::Served => "served",
            EntryStatus::Cancelled => "cancelled",
            EntryStatus::NoShow => "no_show",
            EntryStatus::Other(s) => s,
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which provider the customer asked for when joining the queue
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "provider_id", rename_all = "snake_case")]
pub enum RequestedProvider {
    /// A specific barber; the customer is never reassigned.
    Specific(ProviderId),
    /// First available barber
    Any,
}

impl RequestedProvider {
    /// Build from a nullable store column. Empty strings count as "any".
    pub fn from_column(value: Option<String>) -> Self {
        match value {
            Some(id) if !id.trim().is_empty() => RequestedProvider::Specific(id),
            _ => RequestedProvider::Any,
        }
    }
}

/// One customer's place in line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: EntryId,
    pub customer_name: String,
    pub phone_number: String,
    pub status: EntryStatus,
    pub joined_at: DateTime<Utc>,
    pub requested_provider: RequestedProvider,
    pub location_id: LocationId,
    pub notified: bool,
}

impl QueueEntry {
    /// Create a waiting, not-yet-notified entry for "any provider"
    pub fn new(
        id: impl Into<String>,
        customer_name: impl Into<String>,
        phone_number: impl Into<String>,
        location_id: impl Into<String>,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            customer_name: customer_name.into(),
            phone_number: phone_number.into(),
            status: EntryStatus::Waiting,
            joined_at,
            requested_provider: RequestedProvider::Any,
            location_id: location_id.into(),
            notified: false,
        }
    }

    pub fn with_requested_provider(mut self, provider_id: impl Into<String>) -> Self {
        self.requested_provider = RequestedProvider::Specific(provider_id.into());
        self
    }

    pub fn with_notified(mut self, notified: bool) -> Self {
        self.notified = notified;
        self
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_waiting(&self) -> bool {
        self.status == EntryStatus::Waiting
    }

    /// FIFO ordering key: join time, then id for equal timestamps
    pub fn fifo_key(&self) -> (DateTime<Utc>, &str) {
        (self.joined_at, self.id.as_str())
    }
}
