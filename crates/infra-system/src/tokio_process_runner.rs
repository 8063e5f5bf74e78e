// Tokio process runner
// reason: tokio for async process management; nix for unix signal plumbing

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use glaunch_core::application::constants::{GRACEFUL_SHUTDOWN_TIMEOUT_MS, SHUTDOWN_POLL_INTERVAL};
use glaunch_core::port::{ProcessHandle, ProcessRunner, SpawnError, SpawnSpec};

/// Process runner backed by `tokio::process`.
///
/// Environment overrides are applied per-spawn with `Command::envs`; the
/// launcher's own environment block is never touched. Stdio is inherited:
/// the child owns the terminal and display, and the launcher's progress
/// lines interleave with its output.
pub struct TokioProcessRunner;

impl ProcessRunner for TokioProcessRunner {
    fn spawn(&self, spec: &SpawnSpec) -> Result<Box<dyn ProcessHandle>, SpawnError> {
        let mut command = Command::new(&spec.executable);
        command
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = command
            .spawn()
            .map_err(|e| SpawnError::SpawnFailed(e.to_string()))?;

        debug!(
            executable = %spec.executable.display(),
            pid = ?child.id(),
            overrides = spec.env.len(),
            "Spawned child process"
        );

        Ok(Box::new(TokioProcessHandle { child }))
    }
}

/// Handle to a real OS child process.
pub struct TokioProcessHandle {
    child: Child,
}

#[async_trait]
impl ProcessHandle for TokioProcessHandle {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn poll_exit(&mut self) -> Result<Option<i32>, SpawnError> {
        match self.child.try_wait() {
            Ok(Some(status)) => Ok(Some(exit_code(status))),
            Ok(None) => Ok(None),
            Err(e) => Err(SpawnError::WaitFailed(e.to_string())),
        }
    }

    async fn wait(&mut self) -> Result<i32, SpawnError> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| SpawnError::WaitFailed(e.to_string()))?;
        Ok(exit_code(status))
    }

    // SIGTERM first, then SIGKILL if the child does not exit in time.
    async fn shutdown(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let raw_pid = match self.child.id() {
                Some(pid) => pid as i32,
                // Already reaped.
                None => return,
            };
            let pid = Pid::from_raw(raw_pid);

            info!(pid = %pid, "Sending SIGTERM to rejected child");
            if let Err(e) = kill(pid, Signal::SIGTERM) {
                debug!(pid = %pid, error = %e, "SIGTERM failed, child likely already gone");
            }

            let deadline = Duration::from_millis(GRACEFUL_SHUTDOWN_TIMEOUT_MS as u64);
            let start = tokio::time::Instant::now();
            loop {
                match self.child.try_wait() {
                    Ok(Some(status)) => {
                        info!(pid = %pid, exit_code = %exit_code(status), "Rejected child exited");
                        return;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(pid = %pid, error = %e, "Status probe failed during shutdown");
                        return;
                    }
                }

                if start.elapsed() >= deadline {
                    warn!(pid = %pid, "Child did not exit after SIGTERM, sending SIGKILL");
                    let _ = kill(pid, Signal::SIGKILL);
                    let _ = self.child.wait().await;
                    return;
                }

                tokio::time::sleep(SHUTDOWN_POLL_INTERVAL).await;
            }
        }

        #[cfg(not(unix))]
        {
            let _ = self.child.kill().await;
        }
    }
}

/// Map an exit status to a single code, shell-style: natural exits keep
/// their code, signal deaths become 128+signo.
fn exit_code(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    // The launched program takes no arguments, so test children are
    // self-contained executable scripts.
    fn script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_missing_executable_fails_to_spawn() {
        let runner = TokioProcessRunner;
        let spec = SpawnSpec::bare(PathBuf::from("/nonexistent/binary/path"));

        let result = runner.spawn(&spec);
        assert!(matches!(result, Err(SpawnError::SpawnFailed(_))));
    }

    #[tokio::test]
    async fn test_exit_code_of_short_lived_child() {
        let dir = TempDir::new().unwrap();
        let runner = TokioProcessRunner;
        let mut handle = runner
            .spawn(&SpawnSpec::bare(script(&dir, "dies", "exit 7")))
            .unwrap();

        assert_eq!(handle.wait().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_poll_exit_sees_dead_child_without_blocking() {
        let dir = TempDir::new().unwrap();
        let runner = TokioProcessRunner;
        let mut handle = runner
            .spawn(&SpawnSpec::bare(script(&dir, "dies", "exit 3")))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(handle.poll_exit().unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_poll_exit_leaves_live_child_running() {
        let dir = TempDir::new().unwrap();
        let runner = TokioProcessRunner;
        let mut handle = runner
            .spawn(&SpawnSpec::bare(script(&dir, "lives", "exec sleep 30")))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(handle.poll_exit().unwrap(), None);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_env_overrides_reach_the_child() {
        let dir = TempDir::new().unwrap();
        let runner = TokioProcessRunner;
        let spec = SpawnSpec::new(
            script(&dir, "echoes", "exit \"${PROBE_CODE:-0}\""),
            vec![("PROBE_CODE".to_string(), "11".to_string())],
        );
        let mut handle = runner.spawn(&spec).unwrap();

        assert_eq!(handle.wait().await.unwrap(), 11);
    }

    #[tokio::test]
    async fn test_signal_death_maps_to_128_plus_signo() {
        let dir = TempDir::new().unwrap();
        let runner = TokioProcessRunner;
        let mut handle = runner
            .spawn(&SpawnSpec::bare(script(&dir, "suicides", "kill -9 $$")))
            .unwrap();

        assert_eq!(handle.wait().await.unwrap(), 137);
    }

    #[tokio::test]
    async fn test_shutdown_terminates_and_reaps_live_child() {
        let dir = TempDir::new().unwrap();
        let runner = TokioProcessRunner;
        let mut handle = runner
            .spawn(&SpawnSpec::bare(script(&dir, "lives", "exec sleep 30")))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.shutdown().await;

        // SIGTERM death, already reaped.
        assert_eq!(handle.poll_exit().unwrap(), Some(128 + 15));
    }
}
