// Domain Layer - Pure business logic and entities

pub mod backend;
pub mod error;
pub mod verdict;

// Re-exports
pub use backend::{builtin_backends, BackendConfig, LaunchPlan};
pub use error::DomainError;
pub use verdict::{AttemptOutcome, AttemptRecord, LaunchReport, LaunchVerdict};
