// Backend Configuration Domain Model

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{DomainError, Result};

/// Conventional lavapipe ICD manifest location, used when discovery finds nothing.
pub const DEFAULT_LAVAPIPE_ICD: &str = "/usr/share/vulkan/icd.d/lvp_icd.x86_64.json";

/// One step of the probing sequence: a human-readable label plus the
/// environment overrides applied to the spawned process.
///
/// Overrides are an ordered list, not a map, so the spawn order is stable
/// and settings files round-trip without reshuffling. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub label: String,
    #[serde(default)]
    pub env: Vec<(String, String)>,
}

impl BackendConfig {
    pub fn new(label: impl Into<String>, env: Vec<(String, String)>) -> Result<Self> {
        let config = Self {
            label: label.into(),
            env,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(DomainError::EmptyLabel);
        }
        for (i, (key, _)) in self.env.iter().enumerate() {
            if self.env[..i].iter().any(|(k, _)| k == key) {
                return Err(DomainError::DuplicateOverride(
                    key.clone(),
                    self.label.clone(),
                ));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Built-in probing sequence, in attempt order.
///
/// The final no-override attempt is not part of this table; it is the
/// unconditional fallback the prober runs after the table is exhausted.
pub fn builtin_backends(lavapipe_icd: Option<&Path>) -> Vec<BackendConfig> {
    let icd = lavapipe_icd
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_LAVAPIPE_ICD.to_string());

    vec![
        BackendConfig {
            label: "Software OpenGL".to_string(),
            env: vec![("LIBGL_ALWAYS_SOFTWARE".to_string(), "1".to_string())],
        },
        BackendConfig {
            label: "Vulkan (lavapipe)".to_string(),
            env: vec![
                ("WGPU_BACKEND".to_string(), "vulkan".to_string()),
                ("VK_ICD_FILENAMES".to_string(), icd),
            ],
        },
    ]
}

/// Everything the prober needs for one launch: the target executable, the
/// ordered backend table and the grace period applied to every probe.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub executable: PathBuf,
    pub backends: Vec<BackendConfig>,
    pub grace: Duration,
}

impl LaunchPlan {
    pub fn new(
        executable: impl Into<PathBuf>,
        backends: Vec<BackendConfig>,
        grace: Duration,
    ) -> Result<Self> {
        let executable = executable.into();
        if executable.as_os_str().is_empty() {
            return Err(DomainError::EmptyExecutable);
        }
        for backend in &backends {
            backend.validate()?;
        }
        Ok(Self {
            executable,
            backends,
            grace,
        })
    }
}
