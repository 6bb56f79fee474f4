// Application Layer - Use Cases

pub mod constants;
pub mod dispatcher;
pub mod notify;
pub mod policy;
pub mod shutdown;
pub mod snapshot_loader;

// Re-exports
pub use dispatcher::{DispatchOutcome, DispatchReport, NotificationDispatcher};
pub use notify::{NotifyScheduler, NotifyService, RunReport};
pub use policy::{AnyProviderRule, NotificationPolicyEngine, PolicyConfig};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use snapshot_loader::SnapshotLoader;
