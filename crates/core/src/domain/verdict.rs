// Launch Outcome Domain Model

use serde::{Deserialize, Serialize};

/// Per-attempt outcome, as surfaced in the progress output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptOutcome {
    /// Process survived the grace period and was adopted.
    Adopted,
    /// Process died within the grace period, or never spawned.
    /// The two cases are deliberately indistinguishable here.
    FailedLiveness,
}

impl std::fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptOutcome::Adopted => write!(f, "ADOPTED"),
            AttemptOutcome::FailedLiveness => write!(f, "FAILED_LIVENESS"),
        }
    }
}

/// Record of one probing attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub label: String,
    pub outcome: AttemptOutcome,
}

/// Terminal result of a launch.
///
/// Exit codes are already signal-mapped (128+signo on Unix) by the process
/// runner, so callers can hand them straight to `process::exit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchVerdict {
    /// A backend from the table survived its grace period; the launcher
    /// blocked until the process exited naturally.
    Adopted { label: String, exit_code: i32 },
    /// Every backend failed liveness; the unconditional no-override attempt
    /// ran in the foreground and exited with this code.
    FallbackExited { exit_code: i32 },
    /// The unconditional attempt could not even be spawned.
    FallbackSpawnFailed,
}

impl LaunchVerdict {
    /// Exit code the launcher itself should terminate with.
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchVerdict::Adopted { exit_code, .. } => *exit_code,
            LaunchVerdict::FallbackExited { exit_code } => *exit_code,
            LaunchVerdict::FallbackSpawnFailed => 1,
        }
    }
}

/// Full result of a launch: the terminal verdict plus the per-config
/// attempt trail, in the order the table was walked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub attempts: Vec<AttemptRecord>,
    pub verdict: LaunchVerdict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adopted_exit_code_propagates() {
        let verdict = LaunchVerdict::Adopted {
            label: "Software OpenGL".to_string(),
            exit_code: 0,
        };
        assert_eq!(verdict.exit_code(), 0);
    }

    #[test]
    fn test_fallback_exit_code_propagates_failure() {
        let verdict = LaunchVerdict::FallbackExited { exit_code: 127 };
        assert_eq!(verdict.exit_code(), 127);
    }

    #[test]
    fn test_fallback_spawn_failure_is_nonzero() {
        assert_ne!(LaunchVerdict::FallbackSpawnFailed.exit_code(), 0);
    }
}
