//! Cluster connection
//!
//! Builds a kube client from an explicit kubeconfig, a named context or the
//! usual inference (`$KUBECONFIG`, `~/.kube/config`, in-cluster service account).

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::PathBuf;

use crate::error::{DebugError, Result};

#[derive(Debug, Clone, Default)]
pub struct ClusterOptions {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
}

pub struct Cluster {
    pub client: Client,
    /// Namespace of the selected kubeconfig context
    pub default_namespace: String,
}

pub async fn connect(opts: &ClusterOptions) -> Result<Cluster> {
    let config = load_config(opts).await?;
    let default_namespace = config.default_namespace.clone();
    tracing::debug!(
        "Using cluster {} (namespace {default_namespace})",
        config.cluster_url
    );

    let client = Client::try_from(config)?;
    Ok(Cluster {
        client,
        default_namespace,
    })
}

pub async fn load_config(opts: &ClusterOptions) -> Result<Config> {
    let options = KubeConfigOptions {
        context: opts.context.clone(),
        cluster: None,
        user: None,
    };

    match &opts.kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                DebugError::Kubeconfig(format!("failed to read {}: {e}", path.display()))
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .map_err(|e| DebugError::Kubeconfig(e.to_string()))
        }
        None if opts.context.is_some() => Config::from_kubeconfig(&options)
            .await
            .map_err(|e| DebugError::Kubeconfig(e.to_string())),
        None => Config::infer()
            .await
            .map_err(|e| DebugError::Kubeconfig(e.to_string())),
    }
}

/// Flag, then configured value, then the kubeconfig context.
pub fn resolve_namespace(
    flag: Option<&str>,
    configured: Option<&str>,
    context_default: &str,
) -> String {
    flag.filter(|ns| !ns.is_empty())
        .or(configured.filter(|ns| !ns.is_empty()))
        .unwrap_or(context_default)
        .to_string()
}
