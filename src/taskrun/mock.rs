use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use super::{TaskRun, TaskRunSource};
use crate::error::{DebugError, Result};

/// Recorded call against a [`MockTaskRunSource`]
#[derive(Debug, Clone, PartialEq)]
pub enum SourceCall {
    List { namespace: String },
    Get { namespace: String, name: String },
    Create { namespace: String, name: String, spec: Value },
}

/// In-memory TaskRun source for tests.
///
/// `get` answers come from a per-name queue first (so tests can model a run
/// that gains a pod over time), then from the listed runs.
#[derive(Clone, Default)]
pub struct MockTaskRunSource {
    runs: Arc<Mutex<Vec<TaskRun>>>,
    get_responses: Arc<Mutex<HashMap<String, VecDeque<TaskRun>>>>,
    call_history: Arc<Mutex<Vec<SourceCall>>>,
}

impl MockTaskRunSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runs(runs: Vec<TaskRun>) -> Self {
        let source = Self::new();
        *source.runs.lock().unwrap() = runs;
        source
    }

    /// Queue a response for the next `get(name)`
    pub fn push_get_response(&self, run: TaskRun) {
        self.get_responses
            .lock()
            .unwrap()
            .entry(run.name.clone())
            .or_default()
            .push_back(run);
    }

    pub fn get_call_history(&self) -> Vec<SourceCall> {
        self.call_history.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<(String, Value)> {
        self.get_call_history()
            .into_iter()
            .filter_map(|call| match call {
                SourceCall::Create { name, spec, .. } => Some((name, spec)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl TaskRunSource for MockTaskRunSource {
    async fn list(&self, namespace: &str) -> Result<Vec<TaskRun>> {
        self.call_history.lock().unwrap().push(SourceCall::List {
            namespace: namespace.to_string(),
        });
        Ok(self.runs.lock().unwrap().clone())
    }

    async fn get(&self, namespace: &str, name: &str) -> Result<TaskRun> {
        self.call_history.lock().unwrap().push(SourceCall::Get {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });

        {
            let mut responses = self.get_responses.lock().unwrap();
            if let Some(queue) = responses.get_mut(name) {
                // The last queued answer sticks once the rest are consumed
                if queue.len() > 1 {
                    if let Some(run) = queue.pop_front() {
                        return Ok(run);
                    }
                } else if let Some(run) = queue.front() {
                    return Ok(run.clone());
                }
            }
        }

        self.runs
            .lock()
            .unwrap()
            .iter()
            .find(|run| run.name == name)
            .cloned()
            .ok_or_else(|| DebugError::TaskRunNotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            })
    }

    async fn create(&self, namespace: &str, name: &str, spec: Value) -> Result<TaskRun> {
        self.call_history.lock().unwrap().push(SourceCall::Create {
            namespace: namespace.to_string(),
            name: name.to_string(),
            spec: spec.clone(),
        });

        let mut run = TaskRun::new(name);
        run.namespace = Some(namespace.to_string());
        run.spec = spec;
        Ok(run)
    }
}
