//! Configuration for the debug command.
//!
//! Values are layered with the following precedence (highest first):
//!
//! 1. Command-line flags
//! 2. Environment variables (`TKN_DEBUG_*`)
//! 3. Config file (`--config <path>` or the global `config.toml`)
//! 4. Built-in defaults

use crate::error::{DebugError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod loader;

pub use loader::ConfigLoader;

/// Container the breakpoint step runs in.
pub const DEFAULT_CONTAINER: &str = "step-breakpoint";

/// Number of TaskRuns offered by the picker.
pub const DEFAULT_LIMIT: i64 = 5;

/// Get the directory holding the global `config.toml`
pub fn get_global_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("dev", "tekton", "tkn-debug")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| DebugError::Config("Could not determine home directory".to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Namespace to look for TaskRuns in. Falls back to the kubeconfig context.
    #[serde(default)]
    pub namespace: Option<String>,

    #[serde(default = "default_limit")]
    pub limit: i64,

    #[serde(default = "default_container")]
    pub container: String,

    /// Command started inside the container.
    #[serde(default = "default_shell")]
    pub shell: Vec<String>,

    /// How long `--rerun` waits for the new TaskRun to get a pod.
    #[serde(default = "default_rerun_timeout")]
    pub rerun_timeout_secs: u64,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_millis: u64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

fn default_container() -> String {
    DEFAULT_CONTAINER.to_string()
}

fn default_shell() -> Vec<String> {
    vec!["sh".to_string()]
}

fn default_rerun_timeout() -> u64 {
    120
}

fn default_poll_interval() -> u64 {
    1000
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            limit: default_limit(),
            container: default_container(),
            shell: default_shell(),
            rerun_timeout_secs: default_rerun_timeout(),
            poll_interval_millis: default_poll_interval(),
        }
    }
}

impl DebugConfig {
    pub fn merge_env_vars(&mut self) {
        self.merge_env_with(|key| std::env::var(key).ok());
    }

    /// Apply `TKN_DEBUG_*` overrides read through `lookup`.
    pub fn merge_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(namespace) = lookup("TKN_DEBUG_NAMESPACE") {
            if !namespace.is_empty() {
                self.namespace = Some(namespace);
            }
        }

        if let Some(limit) = lookup("TKN_DEBUG_LIMIT") {
            match limit.parse::<i64>() {
                Ok(value) => self.limit = value,
                Err(_) => tracing::warn!("Ignoring TKN_DEBUG_LIMIT={limit}: not a number"),
            }
        }

        if let Some(container) = lookup("TKN_DEBUG_CONTAINER") {
            if !container.is_empty() {
                self.container = container;
            }
        }

        if let Some(shell) = lookup("TKN_DEBUG_SHELL") {
            match shell_words::split(&shell) {
                Ok(words) if !words.is_empty() => self.shell = words,
                Ok(_) => tracing::warn!("Ignoring empty TKN_DEBUG_SHELL"),
                Err(e) => tracing::warn!("Ignoring TKN_DEBUG_SHELL={shell}: {e}"),
            }
        }
    }
}
