//! TaskRun access
//!
//! TaskRuns are Tekton custom resources, so they are read through kube's dynamic
//! object API and parsed into the small [`TaskRun`] view this tool needs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kube::api::{Api, ListParams, PostParams};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use kube::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{DebugError, Result};

pub mod display;
pub mod mock;

pub use display::{format_option, TaskRunDisplay, TaskRunList};
pub use mock::{MockTaskRunSource, SourceCall};

pub const TEKTON_GROUP: &str = "tekton.dev";
pub const TEKTON_VERSION: &str = "v1beta1";
pub const TASKRUN_KIND: &str = "TaskRun";

/// Suffix appended to a TaskRun name for its debug rerun.
pub const DEBUG_SUFFIX: &str = "-debug";

pub fn taskrun_resource() -> ApiResource {
    ApiResource::from_gvk(&GroupVersionKind::gvk(
        TEKTON_GROUP,
        TEKTON_VERSION,
        TASKRUN_KIND,
    ))
}

/// Status condition as reported by Tekton (`Succeeded` is the one that matters).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRun {
    pub name: String,
    pub namespace: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub condition: Option<Condition>,
    pub pod_name: Option<String>,
    #[serde(skip)]
    pub spec: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    #[serde(default)]
    pod_name: Option<String>,
    #[serde(default)]
    start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    completion_time: Option<DateTime<Utc>>,
    #[serde(default)]
    conditions: Vec<Condition>,
}

#[derive(Debug, Default, Deserialize)]
struct TaskRunBody {
    #[serde(default)]
    spec: Value,
    #[serde(default)]
    status: Option<StatusBody>,
}

impl TaskRun {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            started_at: None,
            completed_at: None,
            condition: None,
            pod_name: None,
            spec: Value::Null,
        }
    }

    pub fn from_dynamic(obj: DynamicObject) -> Result<Self> {
        let name = obj.metadata.name.clone().unwrap_or_default();
        let namespace = obj.metadata.namespace.clone();
        let body: TaskRunBody = serde_json::from_value(obj.data)?;
        let status = body.status.unwrap_or_default();

        let condition = status
            .conditions
            .into_iter()
            .find(|c| c.type_ == "Succeeded");

        Ok(Self {
            name,
            namespace,
            started_at: status.start_time,
            completed_at: status.completion_time,
            condition,
            pod_name: status.pod_name,
            spec: body.spec,
        })
    }

    /// Pod backing this TaskRun, once Tekton has scheduled one.
    pub fn pod_name(&self) -> Option<&str> {
        self.pod_name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn status_label(&self) -> String {
        match &self.condition {
            None => "---".to_string(),
            Some(c) => match c.status.as_str() {
                "True" => "Succeeded".to_string(),
                "False" => c.reason.clone().unwrap_or_else(|| "Failed".to_string()),
                _ => c.reason.clone().unwrap_or_else(|| "Running".to_string()),
            },
        }
    }

    /// Spec for a rerun of this TaskRun that pauses on failure.
    ///
    /// `spec.status` is dropped so a cancelled run does not produce a cancelled copy.
    pub fn debug_spec(&self) -> Value {
        let mut spec = match &self.spec {
            Value::Object(map) => Value::Object(map.clone()),
            _ => json!({}),
        };

        if let Value::Object(map) = &mut spec {
            map.remove("status");
            map.insert("debug".to_string(), json!({ "breakpoint": ["onFailure"] }));
        }

        spec
    }
}

pub fn debug_name(name: &str) -> String {
    format!("{name}{DEBUG_SUFFIX}")
}

/// Order newest first. Runs that have not started yet come after started ones.
pub fn sort_by_start_time(runs: &mut [TaskRun]) {
    runs.sort_by(|a, b| match (a.started_at, b.started_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    });
}

/// Newest `limit` runs.
pub fn recent(mut runs: Vec<TaskRun>, limit: usize) -> Vec<TaskRun> {
    sort_by_start_time(&mut runs);
    runs.truncate(limit);
    runs
}

#[async_trait]
pub trait TaskRunSource: Send + Sync {
    async fn list(&self, namespace: &str) -> Result<Vec<TaskRun>>;
    async fn get(&self, namespace: &str, name: &str) -> Result<TaskRun>;
    async fn create(&self, namespace: &str, name: &str, spec: Value) -> Result<TaskRun>;
}

pub struct KubeTaskRunSource {
    client: Client,
}

impl KubeTaskRunSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &taskrun_resource())
    }
}

#[async_trait]
impl TaskRunSource for KubeTaskRunSource {
    async fn list(&self, namespace: &str) -> Result<Vec<TaskRun>> {
        let objects = self.api(namespace).list(&ListParams::default()).await?;
        tracing::debug!(
            "Listed {} TaskRuns in namespace {namespace}",
            objects.items.len()
        );
        objects.items.into_iter().map(TaskRun::from_dynamic).collect()
    }

    async fn get(&self, namespace: &str, name: &str) -> Result<TaskRun> {
        match self.api(namespace).get(name).await {
            Ok(obj) => TaskRun::from_dynamic(obj),
            Err(kube::Error::Api(resp)) if resp.code == 404 => Err(DebugError::TaskRunNotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn create(&self, namespace: &str, name: &str, spec: Value) -> Result<TaskRun> {
        let mut obj = DynamicObject::new(name, &taskrun_resource()).within(namespace);
        obj.data = json!({ "spec": spec });

        let created = self
            .api(namespace)
            .create(&PostParams::default(), &obj)
            .await?;
        tracing::debug!("Created TaskRun {name} in namespace {namespace}");
        TaskRun::from_dynamic(created)
    }
}
