//! Ambient configuration for embedding the controller.
//!
//! This is not a configuration-file-parsing feature in its own right — it is the
//! minimal knob set the controller needs wherever it is embedded, loaded from TOML
//! the same way as the daemon this crate was built from (`toml::from_str` with
//! `serde(default = ...)` fallbacks), just scaled down to four fields.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_stop_grace_seconds() -> u64 {
    10
}

/// Ambient controller configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Configuration {
    /// Directory `TaskStore::load` reads `*.json` task definitions from.
    pub task_directory: PathBuf,

    /// Whether newly loaded tasks should have their image pulled before first use.
    #[serde(default)]
    pub initialize_tasks: bool,

    /// Supervisor poll interval, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Grace period given to a container between `stop` and a forced `remove`.
    #[serde(default = "default_stop_grace_seconds")]
    pub stop_grace_seconds: u64,
}

impl Configuration {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config: Configuration =
            toml::from_str(&content).with_context(|| "failed to parse configuration")?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_omitted() {
        let toml = r#"task_directory = "/tmp/tasks""#;
        let config: Configuration = toml::from_str(toml).unwrap();
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.stop_grace_seconds, 10);
        assert!(!config.initialize_tasks);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let toml = r#"
            task_directory = "/tmp/tasks"
            initialize_tasks = true
            poll_interval_ms = 50
            stop_grace_seconds = 2
        "#;
        let config: Configuration = toml::from_str(toml).unwrap();
        assert!(config.initialize_tasks);
        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.stop_grace_seconds, 2);
    }
}
