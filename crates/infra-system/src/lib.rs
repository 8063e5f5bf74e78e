// glaunch Infrastructure - System Adapters
// Implements: ProcessRunner; hosts ICD discovery and the doctor report

pub mod system_report;
pub mod tokio_process_runner;
pub mod vulkan_icd;

pub use system_report::{RenderEnvironment, SystemReporter};
pub use tokio_process_runner::TokioProcessRunner;
