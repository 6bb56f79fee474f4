// Domain Layer - Queue entities, snapshot and decisions (no I/O)

pub mod decision;
pub mod entry;
pub mod error;
pub mod location;
pub mod provider;
pub mod snapshot;

// Re-exports
pub use decision::{MessageTemplates, NotificationDecision, NotificationKind};
pub use entry::{EntryId, EntryStatus, QueueEntry, RequestedProvider};
pub use error::DomainError;
pub use location::{Location, LocationId};
pub use provider::{Provider, ProviderId, ProviderStatus};
pub use snapshot::{LocationQueue, QueueSnapshot, SnapshotAnomaly, SnapshotScope};
