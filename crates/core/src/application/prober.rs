// Backend Prober - sequential strategy selection and liveness checking
//
// Walks the backend table in declared order. Each attempt: spawn without
// blocking, suspend for the grace period, take one non-blocking liveness
// probe. First survivor is adopted and waited on until natural exit; the
// exhausted table falls back to one unconditional foreground run.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::{AttemptOutcome, AttemptRecord, LaunchPlan, LaunchReport, LaunchVerdict};
use crate::error::Result;
use crate::port::{Clock, ProcessHandle, ProcessRunner, ProgressReporter, SpawnSpec};

/// What to do with a child that failed its liveness probe.
///
/// `Abandon` reproduces the historical behavior of leaving rejected
/// processes running in the background. `Reap` terminates them before the
/// next attempt, so at most one child ever outlives its probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReapPolicy {
    #[default]
    Reap,
    Abandon,
}

/// Backend prober/launcher.
///
/// At most one child process is being probed or adopted at any time;
/// sequencing is a single control flow with no internal parallelism.
pub struct Prober {
    runner: Arc<dyn ProcessRunner>,
    clock: Arc<dyn Clock>,
    reporter: Arc<dyn ProgressReporter>,
    reap_policy: ReapPolicy,
}

impl Prober {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        clock: Arc<dyn Clock>,
        reporter: Arc<dyn ProgressReporter>,
        reap_policy: ReapPolicy,
    ) -> Self {
        Self {
            runner,
            clock,
            reporter,
            reap_policy,
        }
    }

    /// Attempt each backend in order until one survives its grace period,
    /// then block on it until exit; otherwise run the unconditional
    /// no-override fallback in the foreground.
    ///
    /// A spawn failure and a child dying within the grace period are
    /// indistinguishable in the report: both advance to the next backend.
    pub async fn launch(&self, plan: &LaunchPlan) -> Result<LaunchReport> {
        let mut attempts = Vec::with_capacity(plan.backends.len());

        for backend in &plan.backends {
            self.reporter.attempt_started(&backend.label);

            let spec = SpawnSpec::new(&plan.executable, backend.env.clone());
            let mut handle = match self.runner.spawn(&spec) {
                Ok(handle) => handle,
                Err(e) => {
                    debug!(
                        backend = %backend.label,
                        error = %e,
                        "Spawn failed, treated as liveness failure"
                    );
                    self.reporter.attempt_failed(&backend.label);
                    attempts.push(AttemptRecord {
                        label: backend.label.clone(),
                        outcome: AttemptOutcome::FailedLiveness,
                    });
                    continue;
                }
            };

            if self.survives_grace(handle.as_mut(), plan.grace).await {
                self.reporter.backend_adopted(&backend.label);
                attempts.push(AttemptRecord {
                    label: backend.label.clone(),
                    outcome: AttemptOutcome::Adopted,
                });

                info!(
                    backend = %backend.label,
                    pid = ?handle.id(),
                    "Backend adopted, waiting for process exit"
                );
                let exit_code = handle.wait().await?;
                info!(backend = %backend.label, exit_code = %exit_code, "Adopted process exited");

                return Ok(LaunchReport {
                    attempts,
                    verdict: LaunchVerdict::Adopted {
                        label: backend.label.clone(),
                        exit_code,
                    },
                });
            }

            debug!(backend = %backend.label, "Process died within grace period");
            self.reporter.attempt_failed(&backend.label);
            attempts.push(AttemptRecord {
                label: backend.label.clone(),
                outcome: AttemptOutcome::FailedLiveness,
            });

            if self.reap_policy == ReapPolicy::Reap {
                handle.shutdown().await;
            }
        }

        self.fallback(plan, attempts).await
    }

    /// Liveness heuristic, isolated from the sequencing: suspend for exactly
    /// the grace period, then one non-blocking status probe. "Still running"
    /// is a proxy for "initialized", nothing stronger.
    async fn survives_grace(&self, handle: &mut dyn ProcessHandle, grace: Duration) -> bool {
        self.clock.sleep(grace).await;
        matches!(handle.poll_exit(), Ok(None))
    }

    /// Final unconditional attempt: no overrides, no probe, foreground wait.
    /// Its outcome, success or failure, is final.
    async fn fallback(
        &self,
        plan: &LaunchPlan,
        attempts: Vec<AttemptRecord>,
    ) -> Result<LaunchReport> {
        self.reporter.fallback_started();
        info!("All backends failed liveness, launching with default environment");

        let spec = SpawnSpec::bare(&plan.executable);
        let verdict = match self.runner.spawn(&spec) {
            Ok(mut handle) => {
                let exit_code = handle.wait().await?;
                LaunchVerdict::FallbackExited { exit_code }
            }
            Err(e) => {
                warn!(error = %e, "Fallback attempt could not be spawned");
                LaunchVerdict::FallbackSpawnFailed
            }
        };

        Ok(LaunchReport { attempts, verdict })
    }
}
