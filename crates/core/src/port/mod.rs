// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod message_transport;
pub mod queue_store;

// Re-exports
pub use id_provider::IdProvider;
pub use message_transport::{DeliveryReceipt, LogOnlyTransport, MessageTransport, TransportError};
pub use queue_store::{EntryFilter, MarkOutcome, QueueStore};
