use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DebugError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Kubeconfig error: {0}")]
    Kubeconfig(String),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Exec error: {0}")]
    Exec(String),

    #[error("limit was {0} but must be a positive number")]
    InvalidLimit(i64),

    #[error("No TaskRuns found in namespace {0}")]
    NoTaskRuns(String),

    #[error("TaskRun {name} not found in namespace {namespace}")]
    TaskRunNotFound { name: String, namespace: String },

    #[error("TaskRun {0} has no pod yet")]
    NoPod(String),

    #[error("container {container} not found in pod {pod} (available: {})", .available.join(", "))]
    ContainerNotFound {
        pod: String,
        container: String,
        available: Vec<String>,
    },

    #[error("container {container} in pod {pod} is not running: {state}")]
    ContainerNotRunning {
        pod: String,
        container: String,
        state: String,
    },

    #[error("Timed out after {0:?} waiting for TaskRun {1} to be ready to attach")]
    Timeout(Duration, String),

    #[error("Multiple TaskRuns found and stdin is not a terminal; pass a TaskRun name or --last")]
    NotInteractive,

    #[error("Selection cancelled")]
    Cancelled,

    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl From<dialoguer::Error> for DebugError {
    fn from(err: dialoguer::Error) -> Self {
        DebugError::Prompt(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DebugError>;
