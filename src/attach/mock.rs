use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{ExecTarget, Readiness, ShellAttacher};
use crate::error::{DebugError, Result};

/// Records exec targets instead of opening a session.
///
/// Containers report [`Readiness::Running`] unless a sequence of states was
/// scripted with [`MockAttacher::with_readiness`]; the last one sticks.
#[derive(Clone)]
pub struct MockAttacher {
    exit_code: i32,
    failure: Option<String>,
    readiness: Arc<Mutex<VecDeque<Readiness>>>,
    readiness_checks: Arc<Mutex<Vec<ExecTarget>>>,
    targets: Arc<Mutex<Vec<ExecTarget>>>,
}

impl MockAttacher {
    pub fn new() -> Self {
        Self::exiting_with(0)
    }

    pub fn exiting_with(exit_code: i32) -> Self {
        Self {
            exit_code,
            failure: None,
            readiness: Arc::new(Mutex::new(VecDeque::new())),
            readiness_checks: Arc::new(Mutex::new(Vec::new())),
            targets: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::exiting_with(1)
        }
    }

    pub fn with_readiness(self, states: Vec<Readiness>) -> Self {
        *self.readiness.lock().unwrap() = states.into();
        self
    }

    pub fn readiness_checks(&self) -> Vec<ExecTarget> {
        self.readiness_checks.lock().unwrap().clone()
    }

    pub fn targets(&self) -> Vec<ExecTarget> {
        self.targets.lock().unwrap().clone()
    }
}

impl Default for MockAttacher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShellAttacher for MockAttacher {
    async fn readiness(&self, target: &ExecTarget) -> Result<Readiness> {
        self.readiness_checks.lock().unwrap().push(target.clone());

        let mut states = self.readiness.lock().unwrap();
        if states.len() > 1 {
            if let Some(state) = states.pop_front() {
                return Ok(state);
            }
        }
        Ok(states.front().cloned().unwrap_or(Readiness::Running))
    }

    async fn attach(&self, target: &ExecTarget) -> Result<i32> {
        self.targets.lock().unwrap().push(target.clone());
        match &self.failure {
            Some(message) => Err(DebugError::Exec(message.clone())),
            None => Ok(self.exit_code),
        }
    }
}
