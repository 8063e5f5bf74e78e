// Process Runner Port
// Abstraction over OS process lifecycles (spawn / liveness probe / wait)

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Everything needed to start one child process.
///
/// Environment overrides travel with the spec and are applied per-spawn;
/// the launcher's own environment block is never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnSpec {
    pub executable: PathBuf,
    pub env: Vec<(String, String)>,
}

impl SpawnSpec {
    pub fn new(executable: impl Into<PathBuf>, env: Vec<(String, String)>) -> Self {
        Self {
            executable: executable.into(),
            env,
        }
    }

    /// Spec with no overrides, for the unconditional fallback attempt.
    pub fn bare(executable: impl Into<PathBuf>) -> Self {
        Self::new(executable, Vec::new())
    }
}

/// Process runner errors
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Wait failed: {0}")]
    WaitFailed(String),
}

/// Handle to a spawned child process.
///
/// Implementations:
/// - TokioProcessHandle: real OS child (infra-system)
/// - ScriptedProcess: deterministic fake for tests (mocks below)
#[async_trait]
pub trait ProcessHandle: Send {
    /// OS process id, if the process is (or was) running.
    fn id(&self) -> Option<u32>;

    /// Non-blocking status probe. `Ok(None)` means still running.
    /// Must not terminate the child.
    fn poll_exit(&mut self) -> Result<Option<i32>, SpawnError>;

    /// Block until the process exits naturally. Unbounded.
    async fn wait(&mut self) -> Result<i32, SpawnError>;

    /// Terminate and reap the process (graceful, then forced).
    /// Used on children that failed their liveness probe.
    async fn shutdown(&mut self);
}

/// Process Runner trait
pub trait ProcessRunner: Send + Sync {
    /// Start `spec` as a child process without blocking on its execution.
    ///
    /// # Errors
    /// - SpawnError::SpawnFailed if the executable cannot be started
    ///   (missing, not executable). Callers treat this like an immediate
    ///   death of the child.
    fn spawn(&self, spec: &SpawnSpec) -> Result<Box<dyn ProcessHandle>, SpawnError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Scripted behavior for one spawn call, consumed in order.
    #[derive(Debug, Clone)]
    pub enum ScriptedSpawn {
        /// spawn() itself fails (missing binary).
        FailsToSpawn,
        /// Process is already dead at the first probe.
        DiesWithin { exit_code: i32 },
        /// Process survives the probe; wait() then returns this code.
        Survives { exit_code: i32 },
    }

    /// Shared observation of one scripted process, for post-hoc assertions.
    #[derive(Debug, Default)]
    pub struct ProcessObservation {
        pub polled: usize,
        pub waited: bool,
        pub shutdown: bool,
    }

    /// Deterministic fake process driven by a [`ScriptedSpawn`].
    pub struct ScriptedProcess {
        pid: u32,
        alive: bool,
        exit_code: i32,
        observation: Arc<Mutex<ProcessObservation>>,
    }

    #[async_trait]
    impl ProcessHandle for ScriptedProcess {
        fn id(&self) -> Option<u32> {
            Some(self.pid)
        }

        fn poll_exit(&mut self) -> Result<Option<i32>, SpawnError> {
            self.observation.lock().unwrap().polled += 1;
            if self.alive {
                Ok(None)
            } else {
                Ok(Some(self.exit_code))
            }
        }

        async fn wait(&mut self) -> Result<i32, SpawnError> {
            self.observation.lock().unwrap().waited = true;
            Ok(self.exit_code)
        }

        async fn shutdown(&mut self) {
            self.alive = false;
            self.observation.lock().unwrap().shutdown = true;
        }
    }

    /// Fake runner replaying a fixed script of spawn outcomes.
    ///
    /// Records every [`SpawnSpec`] it receives so tests can assert attempt
    /// order and environment overrides. Spawns beyond the script fail.
    pub struct ScriptedRunner {
        script: Mutex<std::collections::VecDeque<ScriptedSpawn>>,
        specs: Mutex<Vec<SpawnSpec>>,
        observations: Mutex<Vec<Arc<Mutex<ProcessObservation>>>>,
    }

    impl ScriptedRunner {
        pub fn new(script: Vec<ScriptedSpawn>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                specs: Mutex::new(Vec::new()),
                observations: Mutex::new(Vec::new()),
            }
        }

        /// Specs received so far, in spawn order.
        pub fn spawned_specs(&self) -> Vec<SpawnSpec> {
            self.specs.lock().unwrap().clone()
        }

        /// Observation handles, one per successful spawn.
        pub fn observations(&self) -> Vec<Arc<Mutex<ProcessObservation>>> {
            self.observations.lock().unwrap().clone()
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn spawn(&self, spec: &SpawnSpec) -> Result<Box<dyn ProcessHandle>, SpawnError> {
            self.specs.lock().unwrap().push(spec.clone());

            let step = self.script.lock().unwrap().pop_front();
            let step = match step {
                Some(step) => step,
                None => {
                    return Err(SpawnError::SpawnFailed(
                        "scripted runner exhausted".to_string(),
                    ))
                }
            };

            match step {
                ScriptedSpawn::FailsToSpawn => Err(SpawnError::SpawnFailed(
                    "No such file or directory".to_string(),
                )),
                ScriptedSpawn::DiesWithin { exit_code } => {
                    Ok(self.track(ScriptedProcess {
                        pid: 1000 + self.specs.lock().unwrap().len() as u32,
                        alive: false,
                        exit_code,
                        observation: Arc::new(Mutex::new(ProcessObservation::default())),
                    }))
                }
                ScriptedSpawn::Survives { exit_code } => {
                    Ok(self.track(ScriptedProcess {
                        pid: 1000 + self.specs.lock().unwrap().len() as u32,
                        alive: true,
                        exit_code,
                        observation: Arc::new(Mutex::new(ProcessObservation::default())),
                    }))
                }
            }
        }
    }

    impl ScriptedRunner {
        fn track(&self, process: ScriptedProcess) -> Box<dyn ProcessHandle> {
            self.observations
                .lock()
                .unwrap()
                .push(Arc::clone(&process.observation));
            Box::new(process)
        }
    }
}
