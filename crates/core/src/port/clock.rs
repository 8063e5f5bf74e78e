// Clock Port (for testability)
// The grace period must be an exact, injectable suspension, so sleeping
// goes through this port instead of tokio::time directly.

use std::time::Duration;

use async_trait::async_trait;

/// Clock interface (allows mocking in tests)
#[async_trait]
pub trait Clock: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;

    /// Suspend the calling flow for exactly `duration`.
    async fn sleep(&self, duration: Duration);
}

/// System clock (production)
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Manual clock: sleeps return immediately and are recorded, so tests
    /// can assert the exact grace durations requested.
    pub struct ManualClock {
        now: Mutex<i64>,
        sleeps: Arc<Mutex<Vec<Duration>>>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            Self {
                now: Mutex::new(1_000),
                sleeps: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn recorded_sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            let mut now = self.now.lock().unwrap();
            *now += 1_000;
            *now
        }

        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }
}
