//! List command implementation

use anyhow::Result;
use chrono::Utc;

use crate::cli::args::OutputFormat;
use crate::cli::router::GlobalOptions;
use crate::cli::validation::validate_limit;
use crate::cluster::{connect, resolve_namespace};
use crate::config::ConfigLoader;
use crate::taskrun::{recent, KubeTaskRunSource, TaskRunDisplay, TaskRunList, TaskRunSource};

/// Execute `taskrun list`
pub async fn run_list_command(
    global: &GlobalOptions,
    limit: Option<i64>,
    output: OutputFormat,
) -> Result<()> {
    let config = ConfigLoader::load(global.config.as_deref()).await?;
    let limit = limit.unwrap_or(config.limit);
    validate_limit(limit)?;

    let cluster = connect(&global.cluster()).await?;
    let namespace = resolve_namespace(
        global.namespace.as_deref(),
        config.namespace.as_deref(),
        &cluster.default_namespace,
    );

    let source = KubeTaskRunSource::new(cluster.client);
    let list = list_taskruns(&source, &namespace, limit).await?;

    match output {
        OutputFormat::Text => println!("{}", list.format_default(Utc::now())),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&list.format_json())?),
    }

    Ok(())
}

/// Most recent `limit` TaskRuns of a namespace
pub async fn list_taskruns(
    source: &dyn TaskRunSource,
    namespace: &str,
    limit: i64,
) -> crate::error::Result<TaskRunList> {
    validate_limit(limit)?;
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    let taskruns = recent(source.list(namespace).await?, limit);

    Ok(TaskRunList {
        namespace: namespace.to_string(),
        taskruns,
    })
}
