// Prober constants (no magic values)
use std::time::Duration;

/// Grace period between spawning a backend attempt and its liveness probe (2s)
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Graceful process shutdown timeout before escalating to a forced kill (5s)
pub const GRACEFUL_SHUTDOWN_TIMEOUT_MS: i64 = 5000;

/// Poll interval while waiting for a terminated child to exit (100ms)
pub const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(100);
