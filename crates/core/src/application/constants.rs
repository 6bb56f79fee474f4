// Notifier constants (no magic values)
use std::time::Duration;

/// Business name used in messages when a location has no name
pub const DEFAULT_BUSINESS_NAME: &str = "Fade Lab";

/// Default period between passes in watch mode (60s)
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(60);

/// Shortest watch period accepted (5s)
pub const MIN_WATCH_INTERVAL: Duration = Duration::from_secs(5);

/// Default per-customer service time for the estimated-wait rule (minutes)
pub const DEFAULT_MINUTES_PER_CUSTOMER: u32 = 20;

/// Default notification window for the estimated-wait rule (minutes)
pub const DEFAULT_NOTIFY_WITHIN_MINUTES: u32 = 15;
