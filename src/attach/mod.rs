//! Remote shell sessions in a pod container
//!
//! The exec subresource itself (websocket upgrade, stream multiplexing) is
//! handled by kube. This module checks the target container, wires the local
//! terminal to the remote streams and turns the final status into an exit code.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use kube::api::{Api, AttachParams};
use kube::Client;
use std::fmt::Display;
use std::io::IsTerminal;

use crate::error::{DebugError, Result};

pub mod mock;
pub mod terminal;

pub use mock::MockAttacher;
pub use terminal::{pump, RawModeGuard};

/// Where and what to exec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecTarget {
    pub namespace: String,
    pub pod: String,
    pub container: String,
    pub command: Vec<String>,
}

/// Whether a container can take an exec session yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Running,
    /// Not started yet, with the reported state
    Pending(String),
}

#[async_trait]
pub trait ShellAttacher: Send + Sync {
    /// Current state of the target container.
    async fn readiness(&self, target: &ExecTarget) -> Result<Readiness>;

    /// Run an interactive session and return the remote exit code.
    async fn attach(&self, target: &ExecTarget) -> Result<i32>;
}

pub struct KubeAttacher {
    client: Client,
}

impl KubeAttacher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ShellAttacher for KubeAttacher {
    async fn readiness(&self, target: &ExecTarget) -> Result<Readiness> {
        let pod = self.pods(&target.namespace).get(&target.pod).await?;
        container_readiness(&pod, &target.pod, &target.container)
    }

    async fn attach(&self, target: &ExecTarget) -> Result<i32> {
        let pods = self.pods(&target.namespace);

        let pod = pods.get(&target.pod).await?;
        check_container(&pod, &target.pod, &target.container)?;

        tracing::debug!(
            namespace = %target.namespace,
            pod = %target.pod,
            container = %target.container,
            command = ?target.command,
            "exec request"
        );
        tracing::info!(
            "Attaching to container {} in pod {}",
            target.container,
            target.pod
        );

        let params = AttachParams::interactive_tty().container(target.container.clone());

        let raw_mode = if std::io::stdin().is_terminal() {
            Some(RawModeGuard::enable()?)
        } else {
            None
        };

        let mut attached = pods
            .exec(&target.pod, target.command.clone(), &params)
            .await?;

        let remote_in = attached
            .stdin()
            .ok_or_else(|| DebugError::Exec("session has no stdin".to_string()))?;
        let remote_out = attached
            .stdout()
            .ok_or_else(|| DebugError::Exec("session has no stdout".to_string()))?;
        let status = attached.take_status();

        let resize = attached
            .terminal_size()
            .map(|sizes| tokio::spawn(terminal::forward_terminal_size(sizes)));

        let copied = pump(
            tokio::io::stdin(),
            tokio::io::stdout(),
            remote_in,
            remote_out,
        )
        .await;

        if let Some(task) = resize {
            task.abort();
        }

        let status = match status {
            Some(status) => status.await,
            None => None,
        };

        drop(raw_mode);

        let joined = attached.join().await;

        let copied = copied?;
        tracing::debug!("Session ended after {copied} bytes of output");

        session_result(joined, status.as_ref())
    }
}

/// Where a container stands for an exec session.
///
/// A container missing from the pod or already terminated is an error; one
/// that has not started yet is [`Readiness::Pending`].
pub fn container_readiness(pod: &Pod, pod_name: &str, container: &str) -> Result<Readiness> {
    let available: Vec<String> = pod
        .spec
        .as_ref()
        .map(|spec| spec.containers.iter().map(|c| c.name.clone()).collect())
        .unwrap_or_default();

    if !available.iter().any(|name| name == container) {
        return Err(DebugError::ContainerNotFound {
            pod: pod_name.to_string(),
            container: container.to_string(),
            available,
        });
    }

    let state = pod
        .status
        .as_ref()
        .and_then(|status| status.container_statuses.as_ref())
        .and_then(|statuses| statuses.iter().find(|s| s.name == container))
        .and_then(|status| status.state.as_ref());

    let Some(state) = state else {
        return Ok(Readiness::Pending("no status reported".to_string()));
    };

    if state.running.is_some() {
        return Ok(Readiness::Running);
    }

    if let Some(terminated) = &state.terminated {
        return Err(DebugError::ContainerNotRunning {
            pod: pod_name.to_string(),
            container: container.to_string(),
            state: format!(
                "terminated ({})",
                terminated
                    .reason
                    .clone()
                    .unwrap_or_else(|| format!("exit code {}", terminated.exit_code))
            ),
        });
    }

    match &state.waiting {
        Some(waiting) => Ok(Readiness::Pending(format!(
            "waiting ({})",
            waiting.reason.clone().unwrap_or_default()
        ))),
        None => Ok(Readiness::Pending("unknown".to_string())),
    }
}

/// The container must be part of the pod and currently running.
pub fn check_container(pod: &Pod, pod_name: &str, container: &str) -> Result<()> {
    match container_readiness(pod, pod_name, container)? {
        Readiness::Running => Ok(()),
        Readiness::Pending(state) => Err(DebugError::ContainerNotRunning {
            pod: pod_name.to_string(),
            container: container.to_string(),
            state,
        }),
    }
}

/// Outcome of a finished session.
///
/// A broken stream, or one that closed without the final status from the API
/// server, is an error rather than a clean exit.
pub fn session_result<E: Display>(
    joined: std::result::Result<(), E>,
    status: Option<&Status>,
) -> Result<i32> {
    if let Err(e) = joined {
        return Err(DebugError::Exec(format!("error in stream: {e}")));
    }

    status.map(exit_code).ok_or_else(|| {
        DebugError::Exec("stream closed without an exit status".to_string())
    })
}

/// Exit code of the remote command from the status the API server sends when the stream closes.
pub fn exit_code(status: &Status) -> i32 {
    if status.status.as_deref() == Some("Success") {
        return 0;
    }

    status
        .details
        .as_ref()
        .and_then(|details| details.causes.as_ref())
        .and_then(|causes| {
            causes
                .iter()
                .find(|cause| cause.reason.as_deref() == Some("ExitCode"))
        })
        .and_then(|cause| cause.message.as_deref())
        .and_then(|message| message.trim().parse::<i32>().ok())
        .unwrap_or(1)
}
