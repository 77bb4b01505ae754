//! Layered configuration for infsweep
//!
//! Settings merge in priority order: embedded defaults, then `infsweep.toml`
//! in the working directory (or an explicit `--config` file), then
//! `INFSWEEP_*` environment variables with nested keys split on `__`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    pub discovery: DiscoveryConfig,
    pub installer: InstallerConfig,
    pub workers: WorkerConfig,
    pub log: LogConfig,
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Descriptor extension, matched case-insensitively and without the dot
    pub extension: String,
    pub follow_symlinks: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallerConfig {
    /// External utility invoked once per descriptor file
    pub program: String,
    /// Argument template; `{path}` expands to the descriptor path
    pub args: Vec<String>,
    /// Per-task time limit in seconds, 0 disables
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    pub mode: WorkerMode,
    /// Hard cap on worker threads, 0 derives the cap from CPU count
    pub max_threads: usize,
    /// Percentage of available CPU cores to use
    pub thread_percentage: u8,
    /// Auto mode runs sequentially below this many tasks
    pub min_tasks_for_parallel: usize,
}

/// Execution mode selection for the worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerMode {
    Auto,
    Sequential,
    Parallel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Exit non-zero when any driver fails to install
    pub strict_exit: bool,
}

impl SweepConfig {
    /// Load the merged configuration, optionally pinned to a custom file.
    pub fn load(custom_config: Option<&str>) -> Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        // A custom config replaces the working-directory lookup entirely
        if let Some(custom_path) = custom_config {
            figment = figment.merge(Toml::file(custom_path));
        } else {
            figment = figment.merge(Toml::file("infsweep.toml"));
        }

        // Environment variables always have highest priority
        figment = figment.merge(Env::prefixed("INFSWEEP_").split("__"));

        figment
            .extract()
            .context("failed to load infsweep configuration")
    }
}
