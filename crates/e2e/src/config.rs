//! Harness configuration
//!
//! Defaults, then an optional YAML file, then `GRIDCHECK_*` environment
//! variables. Command-line flags are applied last by the caller.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{E2eError, E2eResult};
use crate::playwright::PlaywrightConfig;

pub const ENV_BASE_URL: &str = "GRIDCHECK_BASE_URL";
pub const ENV_STORAGE_STATE: &str = "GRIDCHECK_STORAGE_STATE";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub playwright: PlaywrightConfig,

    /// Directory searched for suite files
    pub suites_dir: PathBuf,

    /// Where grid-results.json is written
    pub output_dir: PathBuf,

    /// How long to wait for the admin panel before giving up
    pub probe_timeout_secs: u64,

    /// Run suites against the in-memory grid instead of a browser.
    /// On unless a live admin panel is configured.
    pub dry_run: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            playwright: PlaywrightConfig::default(),
            suites_dir: PathBuf::from("suites"),
            output_dir: PathBuf::from("test-results"),
            probe_timeout_secs: 30,
            dry_run: true,
        }
    }
}

impl HarnessConfig {
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| E2eError::SuiteParse(format!("{}: {}", path.display(), e)))
    }

    /// Load the file if given, otherwise start from defaults, then apply
    /// the environment.
    pub fn load(path: Option<&Path>) -> E2eResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.playwright.base_url = url;
        }
        if let Some(path) = lookup(ENV_STORAGE_STATE).filter(|v| !v.is_empty()) {
            self.playwright.storage_state = Some(PathBuf::from(path));
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}
