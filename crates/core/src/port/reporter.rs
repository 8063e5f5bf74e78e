// Progress Reporter Port
// The pass/fail lines on stdout are product behavior, not logging, so they
// go through this port. tracing stays ambient.

/// Progress reporting interface.
///
/// One `attempt_started` per table entry, then exactly one of
/// `attempt_failed` / `backend_adopted`. `fallback_started` fires once, only
/// when the whole table failed liveness.
pub trait ProgressReporter: Send + Sync {
    fn attempt_started(&self, label: &str);
    fn attempt_failed(&self, label: &str);
    fn backend_adopted(&self, label: &str);
    fn fallback_started(&self);
}

/// Reporter that discards everything.
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn attempt_started(&self, _label: &str) {}
    fn attempt_failed(&self, _label: &str) {}
    fn backend_adopted(&self, _label: &str) {}
    fn fallback_started(&self) {}
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ReportedEvent {
        Started(String),
        Failed(String),
        Adopted(String),
        Fallback,
    }

    /// Reporter that records events for assertions.
    #[derive(Default)]
    pub struct RecordingReporter {
        events: Arc<Mutex<Vec<ReportedEvent>>>,
    }

    impl RecordingReporter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<ReportedEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ProgressReporter for RecordingReporter {
        fn attempt_started(&self, label: &str) {
            self.events
                .lock()
                .unwrap()
                .push(ReportedEvent::Started(label.to_string()));
        }

        fn attempt_failed(&self, label: &str) {
            self.events
                .lock()
                .unwrap()
                .push(ReportedEvent::Failed(label.to_string()));
        }

        fn backend_adopted(&self, label: &str) {
            self.events
                .lock()
                .unwrap()
                .push(ReportedEvent::Adopted(label.to_string()));
        }

        fn fallback_started(&self) {
            self.events.lock().unwrap().push(ReportedEvent::Fallback);
        }
    }
}
