// Settings - layered configuration
// defaults < config file (ProjectDirs) < GLAUNCH_* environment variables;
// CLI flags override the lot at the call site.

use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;

use glaunch_core::application::constants::DEFAULT_GRACE_PERIOD;
use glaunch_core::domain::BackendConfig;

const DEFAULT_EXECUTABLE: &str = "ivsg";
const DEFAULT_GRACE_SECS: i64 = DEFAULT_GRACE_PERIOD.as_secs() as i64;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Target executable, looked up on PATH when not absolute.
    pub executable: PathBuf,
    /// Grace period before each liveness probe, in seconds.
    pub grace_secs: u64,
    /// Terminate children that failed their liveness probe.
    pub reap_rejected: bool,
    /// Replaces the built-in backend table when present.
    pub backends: Option<Vec<BackendConfig>>,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;

        if let Some(path) = config_file() {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder
            .add_source(Environment::with_prefix("GLAUNCH"))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("executable", DEFAULT_EXECUTABLE)?
            .set_default("grace_secs", DEFAULT_GRACE_SECS)?
            .set_default("reap_rejected", true)
    }
}

fn config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "glaunch").map(|dirs| dirs.config_dir().join("config.toml"))
}
