// Walk-in Infrastructure - SQLite Adapter
// Implements: QueueStore

mod connection;
mod error;
mod migration;
mod queue_store;

pub use connection::create_pool;
pub use migration::run_migrations;
pub use queue_store::SqliteQueueStore;
