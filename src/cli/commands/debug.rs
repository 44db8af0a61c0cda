//! Debug command implementation
//!
//! Builds the options from config and flags, connects to the cluster and runs
//! the debug session against the real TaskRun source, prompt and attacher.

use anyhow::Result;
use std::time::Duration;

use crate::attach::KubeAttacher;
use crate::cli::router::GlobalOptions;
use crate::cli::validation::{parse_shell, validate_poll_interval, validate_timeout};
use crate::cluster::{connect, resolve_namespace};
use crate::config::ConfigLoader;
use crate::debug::{run_debug, DebugOptions};
use crate::prompt::DialoguerPrompt;
use crate::taskrun::KubeTaskRunSource;

/// Flags of `taskrun debug`
#[derive(Debug, Clone, Default)]
pub struct DebugArgs {
    pub name: Option<String>,
    pub last: bool,
    pub limit: Option<i64>,
    pub container: Option<String>,
    pub shell: Option<String>,
    pub rerun: bool,
    pub timeout: Option<u64>,
}

/// Build debug options from the loaded config with flags applied on top.
///
/// The namespace is left empty; it is only known after connecting.
pub fn build_options(args: &DebugArgs, config: &crate::config::DebugConfig) -> Result<DebugOptions> {
    let mut opts = DebugOptions::new(String::new(), config);

    if let Some(name) = &args.name {
        opts.set_taskrun(name);
    }
    opts.last = args.last;
    opts.rerun = args.rerun;

    if let Some(limit) = args.limit {
        opts.limit = limit;
    }
    if let Some(container) = &args.container {
        opts.container = container.clone();
    }
    if let Some(shell) = &args.shell {
        opts.command = parse_shell(shell)?;
    }
    let timeout = args.timeout.unwrap_or(config.rerun_timeout_secs);
    validate_timeout(timeout)?;
    opts.timeout = Duration::from_secs(timeout);

    validate_poll_interval(config.poll_interval_millis)?;

    Ok(opts)
}

/// Execute `taskrun debug`, returning the remote shell's exit code
pub async fn run_debug_command(global: &GlobalOptions, args: DebugArgs) -> Result<i32> {
    let config = ConfigLoader::load(global.config.as_deref()).await?;
    let mut opts = build_options(&args, &config)?;

    // Fail on bad input before touching the cluster
    if opts.taskrun_name.is_none() {
        opts.validate()?;
    }

    let cluster = connect(&global.cluster()).await?;
    opts.namespace = resolve_namespace(
        global.namespace.as_deref(),
        config.namespace.as_deref(),
        &cluster.default_namespace,
    );

    let source = KubeTaskRunSource::new(cluster.client.clone());
    let attacher = KubeAttacher::new(cluster.client);

    let code = run_debug(opts, &source, &DialoguerPrompt, &attacher).await?;
    Ok(code)
}
