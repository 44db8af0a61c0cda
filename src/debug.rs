//! Debug session orchestration
//!
//! Picks the TaskRun, finds its pod and hands the exec target to a
//! [`ShellAttacher`]. Every cluster interaction goes through the
//! [`TaskRunSource`], [`Prompt`] and [`ShellAttacher`] seams so the whole flow
//! runs against mocks in tests.

use chrono::Utc;
use std::time::Duration;

use crate::attach::{ExecTarget, Readiness, ShellAttacher};
use crate::cli::validation::validate_limit;
use crate::config::DebugConfig;
use crate::error::{DebugError, Result};
use crate::prompt::Prompt;
use crate::taskrun::{debug_name, format_option, recent, TaskRunSource};

/// Resource name used in the picker message.
pub const RESOURCE_NAME_TASKRUN: &str = "taskrun";

#[derive(Debug, Clone, PartialEq)]
pub struct DebugOptions {
    pub namespace: String,
    pub taskrun_name: Option<String>,
    /// Name for a `--rerun` copy of the selected TaskRun
    pub debug_taskrun_name: Option<String>,
    pub last: bool,
    pub limit: i64,
    pub container: String,
    pub command: Vec<String>,
    pub rerun: bool,
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl DebugOptions {
    pub fn new(namespace: impl Into<String>, config: &DebugConfig) -> Self {
        Self {
            namespace: namespace.into(),
            taskrun_name: None,
            debug_taskrun_name: None,
            last: false,
            limit: config.limit,
            container: config.container.clone(),
            command: config.shell.clone(),
            rerun: false,
            timeout: Duration::from_secs(config.rerun_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_millis),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_limit(self.limit)
    }

    pub fn set_taskrun(&mut self, name: &str) {
        self.taskrun_name = Some(name.to_string());
        self.debug_taskrun_name = Some(debug_name(name));
    }

    pub fn exec_target(&self, pod: String) -> ExecTarget {
        ExecTarget {
            namespace: self.namespace.clone(),
            pod,
            container: self.container.clone(),
            command: self.command.clone(),
        }
    }

    /// Take the TaskRun name from a picker entry (its first field).
    pub fn select(&mut self, answer: &str) -> Result<()> {
        let name = answer
            .split_whitespace()
            .next()
            .ok_or_else(|| DebugError::Prompt(format!("empty {RESOURCE_NAME_TASKRUN} selection")))?;
        self.set_taskrun(name);
        Ok(())
    }
}

/// Fill in `taskrun_name` from the most recent TaskRuns.
///
/// A single candidate or `--last` skips the picker.
pub async fn resolve_taskrun(
    opts: &mut DebugOptions,
    source: &dyn TaskRunSource,
    prompt: &dyn Prompt,
) -> Result<()> {
    let limit = usize::try_from(opts.limit).map_err(|_| DebugError::InvalidLimit(opts.limit))?;
    let runs = recent(source.list(&opts.namespace).await?, limit);

    if runs.is_empty() {
        return Err(DebugError::NoTaskRuns(opts.namespace.clone()));
    }

    let now = Utc::now();
    let options: Vec<String> = runs.iter().map(|run| format_option(run, now)).collect();

    if options.len() == 1 || opts.last {
        return opts.select(&options[0]);
    }

    if !prompt.is_interactive() {
        return Err(DebugError::NotInteractive);
    }

    let message = format!("Select {RESOURCE_NAME_TASKRUN}:");
    let index = prompt.select(&message, &options)?;
    let answer = options
        .get(index)
        .ok_or_else(|| DebugError::Prompt(format!("selection {index} out of range")))?;
    opts.select(answer)
}

/// Resolve the TaskRun and attach to its breakpoint container.
///
/// Returns the exit code of the remote shell.
pub async fn run_debug(
    mut opts: DebugOptions,
    source: &dyn TaskRunSource,
    prompt: &dyn Prompt,
    attacher: &dyn ShellAttacher,
) -> Result<i32> {
    if opts.taskrun_name.is_none() {
        opts.validate()?;
        resolve_taskrun(&mut opts, source, prompt).await?;
    }

    let name = opts
        .taskrun_name
        .clone()
        .ok_or_else(|| DebugError::Prompt(format!("no {RESOURCE_NAME_TASKRUN} selected")))?;
    tracing::debug!("Debugging TaskRun {name} in namespace {}", opts.namespace);

    let target = if opts.rerun {
        let debug_run = opts
            .debug_taskrun_name
            .clone()
            .unwrap_or_else(|| debug_name(&name));
        let original = source.get(&opts.namespace, &name).await?;
        source
            .create(&opts.namespace, &debug_run, original.debug_spec())
            .await?;
        println!("Started TaskRun {debug_run} with a breakpoint on failure");
        wait_until_ready(source, attacher, &opts, &debug_run).await?
    } else {
        let run = source.get(&opts.namespace, &name).await?;
        let pod = run
            .pod_name()
            .map(str::to_string)
            .ok_or(DebugError::NoPod(name))?;
        opts.exec_target(pod)
    };

    attacher.attach(&target).await
}

/// Poll until the TaskRun has a pod whose target container is running, or
/// `opts.timeout` runs out.
async fn wait_until_ready(
    source: &dyn TaskRunSource,
    attacher: &dyn ShellAttacher,
    opts: &DebugOptions,
    name: &str,
) -> Result<ExecTarget> {
    let poll = async {
        loop {
            let run = source.get(&opts.namespace, name).await?;
            match run.pod_name() {
                Some(pod) => {
                    let target = opts.exec_target(pod.to_string());
                    match attacher.readiness(&target).await? {
                        Readiness::Running => return Ok::<_, DebugError>(target),
                        Readiness::Pending(state) => {
                            tracing::debug!("Container {} in pod {pod} is {state}", opts.container)
                        }
                    }
                }
                None => tracing::debug!("TaskRun {name} has no pod yet"),
            }
            tokio::time::sleep(opts.poll_interval).await;
        }
    };

    tokio::time::timeout(opts.timeout, poll)
        .await
        .map_err(|_| DebugError::Timeout(opts.timeout, name.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attach::MockAttacher;
    use crate::prompt::MockPrompt;
    use crate::taskrun::{MockTaskRunSource, SourceCall, TaskRun};
    use serde_json::json;

    fn options() -> DebugOptions {
        let mut opts = DebugOptions::new("ci", &DebugConfig::default());
        opts.poll_interval = Duration::from_millis(1);
        opts.timeout = Duration::from_secs(5);
        opts
    }

    fn run(name: &str, minutes_ago: i64, pod: Option<&str>) -> TaskRun {
        let mut run = TaskRun::new(name);
        run.started_at = Some(Utc::now() - chrono::Duration::minutes(minutes_ago));
        run.pod_name = pod.map(str::to_string);
        run
    }

    fn three_runs() -> MockTaskRunSource {
        MockTaskRunSource::with_runs(vec![
            run("build-old", 30, Some("build-old-pod")),
            run("build-new", 1, Some("build-new-pod")),
            run("build-mid", 10, Some("build-mid-pod")),
        ])
    }

    #[test]
    fn test_validate_limit() {
        let mut opts = options();
        assert!(opts.validate().is_ok());

        opts.limit = 0;
        assert_eq!(
            opts.validate().unwrap_err().to_string(),
            "limit was 0 but must be a positive number"
        );

        opts.limit = -2;
        assert_eq!(
            opts.validate().unwrap_err().to_string(),
            "limit was -2 but must be a positive number"
        );
    }

    #[test]
    fn test_select_takes_first_field() {
        let mut opts = options();
        opts.select("build-x7k2p started 5m ago").unwrap();

        assert_eq!(opts.taskrun_name.as_deref(), Some("build-x7k2p"));
        assert_eq!(opts.debug_taskrun_name.as_deref(), Some("build-x7k2p-debug"));
    }

    #[test]
    fn test_select_rejects_blank_answer() {
        let mut opts = options();
        assert!(opts.select("   ").is_err());
        assert_eq!(opts.taskrun_name, None);
    }

    #[tokio::test]
    async fn test_named_taskrun_skips_listing() {
        let source = three_runs();
        let prompt = MockPrompt::answering(0);
        let attacher = MockAttacher::new();

        let mut opts = options();
        opts.set_taskrun("build-mid");
        // A bad limit only matters when listing
        opts.limit = 0;

        let code = run_debug(opts, &source, &prompt, &attacher).await.unwrap();

        assert_eq!(code, 0);
        assert!(prompt.asked().is_empty());
        assert_eq!(
            source.get_call_history(),
            vec![SourceCall::Get {
                namespace: "ci".to_string(),
                name: "build-mid".to_string()
            }]
        );
        assert_eq!(
            attacher.targets(),
            vec![ExecTarget {
                namespace: "ci".to_string(),
                pod: "build-mid-pod".to_string(),
                container: "step-breakpoint".to_string(),
                command: vec!["sh".to_string()],
            }]
        );
    }

    #[tokio::test]
    async fn test_invalid_limit_without_name() {
        let source = three_runs();
        let attacher = MockAttacher::new();
        let mut opts = options();
        opts.limit = 0;

        let err = run_debug(opts, &source, &MockPrompt::answering(0), &attacher)
            .await
            .unwrap_err();

        assert!(matches!(err, DebugError::InvalidLimit(0)));
        assert!(source.get_call_history().is_empty());
        assert!(attacher.targets().is_empty());
    }

    #[tokio::test]
    async fn test_no_taskruns() {
        let source = MockTaskRunSource::new();
        let err = run_debug(
            options(),
            &source,
            &MockPrompt::answering(0),
            &MockAttacher::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "No TaskRuns found in namespace ci");
    }

    #[tokio::test]
    async fn test_single_taskrun_is_picked_without_prompt() {
        let source = MockTaskRunSource::with_runs(vec![run("only", 3, Some("only-pod"))]);
        let prompt = MockPrompt::answering(0);
        let attacher = MockAttacher::new();

        run_debug(options(), &source, &prompt, &attacher)
            .await
            .unwrap();

        assert!(prompt.asked().is_empty());
        assert_eq!(attacher.targets()[0].pod, "only-pod");
    }

    #[tokio::test]
    async fn test_last_picks_most_recent() {
        let source = three_runs();
        let prompt = MockPrompt::answering(2);
        let attacher = MockAttacher::new();

        let mut opts = options();
        opts.last = true;
        run_debug(opts, &source, &prompt, &attacher).await.unwrap();

        assert!(prompt.asked().is_empty());
        assert_eq!(attacher.targets()[0].pod, "build-new-pod");
    }

    #[tokio::test]
    async fn test_prompt_offers_recent_runs_in_order() {
        let source = three_runs();
        let prompt = MockPrompt::answering(1);
        let attacher = MockAttacher::new();

        let mut opts = options();
        opts.limit = 2;
        run_debug(opts, &source, &prompt, &attacher).await.unwrap();

        let asked = prompt.asked();
        assert_eq!(asked.len(), 1);
        let (message, choices) = &asked[0];
        assert_eq!(message, "Select taskrun:");
        assert_eq!(
            choices,
            &vec![
                "build-new started 1m ago".to_string(),
                "build-mid started 10m ago".to_string()
            ]
        );
        assert_eq!(attacher.targets()[0].pod, "build-mid-pod");
    }

    #[tokio::test]
    async fn test_prompt_cancelled() {
        let source = three_runs();
        let attacher = MockAttacher::new();

        let err = run_debug(options(), &source, &MockPrompt::cancelling(), &attacher)
            .await
            .unwrap_err();

        assert!(matches!(err, DebugError::Cancelled));
        assert!(attacher.targets().is_empty());
    }

    #[tokio::test]
    async fn test_multiple_runs_without_terminal() {
        let source = three_runs();
        let err = run_debug(
            options(),
            &source,
            &MockPrompt::non_interactive(),
            &MockAttacher::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DebugError::NotInteractive));
    }

    #[tokio::test]
    async fn test_taskrun_without_pod() {
        let source = MockTaskRunSource::with_runs(vec![run("queued", 0, None)]);
        let mut opts = options();
        opts.set_taskrun("queued");

        let err = run_debug(opts, &source, &MockPrompt::answering(0), &MockAttacher::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "TaskRun queued has no pod yet");
    }

    #[tokio::test]
    async fn test_unknown_taskrun() {
        let source = three_runs();
        let mut opts = options();
        opts.set_taskrun("missing");

        let err = run_debug(opts, &source, &MockPrompt::answering(0), &MockAttacher::new())
            .await
            .unwrap_err();

        assert!(matches!(err, DebugError::TaskRunNotFound { .. }));
    }

    #[tokio::test]
    async fn test_custom_container_and_command() {
        let source = three_runs();
        let attacher = MockAttacher::exiting_with(7);
        let mut opts = options();
        opts.set_taskrun("build-old");
        opts.container = "step-test".to_string();
        opts.command = vec!["bash".to_string(), "-l".to_string()];

        let code = run_debug(opts, &source, &MockPrompt::answering(0), &attacher)
            .await
            .unwrap();

        assert_eq!(code, 7);
        let target = &attacher.targets()[0];
        assert_eq!(target.container, "step-test");
        assert_eq!(target.command, vec!["bash", "-l"]);
    }

    #[tokio::test]
    async fn test_attach_failure_propagates() {
        let source = three_runs();
        let mut opts = options();
        opts.set_taskrun("build-old");

        let err = run_debug(
            opts,
            &source,
            &MockPrompt::answering(0),
            &MockAttacher::failing("upgrade refused"),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Exec error: upgrade refused");
    }

    #[tokio::test]
    async fn test_rerun_creates_debug_copy_and_waits_for_pod() {
        let mut original = run("build-old", 30, Some("build-old-pod"));
        original.spec = json!({ "taskRef": { "name": "build" } });
        let source = MockTaskRunSource::with_runs(vec![original]);

        source.push_get_response(TaskRun::new("build-old-debug"));
        source.push_get_response(TaskRun::new("build-old-debug"));
        let mut scheduled = TaskRun::new("build-old-debug");
        scheduled.pod_name = Some("build-old-debug-pod".to_string());
        source.push_get_response(scheduled);

        let attacher = MockAttacher::new();
        let mut opts = options();
        opts.set_taskrun("build-old");
        opts.rerun = true;

        run_debug(opts, &source, &MockPrompt::answering(0), &attacher)
            .await
            .unwrap();

        let created = source.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].0, "build-old-debug");
        assert_eq!(created[0].1["taskRef"]["name"], "build");
        assert_eq!(created[0].1["debug"]["breakpoint"], json!(["onFailure"]));
        assert_eq!(attacher.targets()[0].pod, "build-old-debug-pod");
    }

    #[tokio::test]
    async fn test_rerun_waits_for_container_to_start() {
        let source = MockTaskRunSource::with_runs(vec![run("build-old", 30, Some("build-old-pod"))]);
        let mut scheduled = TaskRun::new("build-old-debug");
        scheduled.pod_name = Some("build-old-debug-pod".to_string());
        source.push_get_response(scheduled);

        let attacher = MockAttacher::new().with_readiness(vec![
            Readiness::Pending("no status reported".to_string()),
            Readiness::Pending("waiting (PodInitializing)".to_string()),
            Readiness::Running,
        ]);
        let mut opts = options();
        opts.set_taskrun("build-old");
        opts.rerun = true;

        let code = run_debug(opts, &source, &MockPrompt::answering(0), &attacher)
            .await
            .unwrap();

        assert_eq!(code, 0);
        let checks = attacher.readiness_checks();
        assert_eq!(checks.len(), 3);
        assert!(checks.iter().all(|t| t.pod == "build-old-debug-pod"));
        assert_eq!(attacher.targets().len(), 1);
        assert_eq!(attacher.targets()[0].container, "step-breakpoint");
    }

    #[tokio::test]
    async fn test_rerun_times_out_while_container_is_starting() {
        let source = MockTaskRunSource::with_runs(vec![run("build-old", 30, Some("build-old-pod"))]);
        let mut scheduled = TaskRun::new("build-old-debug");
        scheduled.pod_name = Some("build-old-debug-pod".to_string());
        source.push_get_response(scheduled);

        let attacher = MockAttacher::new()
            .with_readiness(vec![Readiness::Pending("waiting (PodInitializing)".to_string())]);
        let mut opts = options();
        opts.set_taskrun("build-old");
        opts.rerun = true;
        opts.timeout = Duration::from_millis(20);

        let err = run_debug(opts, &source, &MockPrompt::answering(0), &attacher)
            .await
            .unwrap_err();

        assert!(matches!(err, DebugError::Timeout(_, ref name) if name == "build-old-debug"));
        assert!(!attacher.readiness_checks().is_empty());
        assert!(attacher.targets().is_empty());
    }

    #[tokio::test]
    async fn test_attach_by_name_skips_readiness_polling() {
        let source = MockTaskRunSource::with_runs(vec![run("build-old", 30, Some("build-old-pod"))]);
        let attacher = MockAttacher::new();
        let mut opts = options();
        opts.set_taskrun("build-old");

        run_debug(opts, &source, &MockPrompt::answering(0), &attacher)
            .await
            .unwrap();

        assert!(attacher.readiness_checks().is_empty());
        assert_eq!(attacher.targets()[0].pod, "build-old-pod");
    }

    #[tokio::test]
    async fn test_rerun_times_out_without_pod() {
        let source = MockTaskRunSource::with_runs(vec![run("build-old", 30, None)]);
        source.push_get_response(TaskRun::new("build-old-debug"));

        let attacher = MockAttacher::new();
        let mut opts = options();
        opts.set_taskrun("build-old");
        opts.rerun = true;
        opts.timeout = Duration::from_millis(20);

        let err = run_debug(opts, &source, &MockPrompt::answering(0), &attacher)
            .await
            .unwrap_err();

        assert!(matches!(err, DebugError::Timeout(_, ref name) if name == "build-old-debug"));
        assert!(attacher.targets().is_empty());
    }
}
