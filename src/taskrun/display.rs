use chrono::{DateTime, Utc};
use serde::Serialize;

use super::TaskRun;

/// TaskRuns as shown by `taskrun list`
#[derive(Serialize, Debug, Clone)]
pub struct TaskRunList {
    pub namespace: String,
    pub taskruns: Vec<TaskRun>,
}

/// Formatting trait for TaskRun output
pub trait TaskRunDisplay {
    fn format_default(&self, now: DateTime<Utc>) -> String;
    fn format_json(&self) -> serde_json::Value;
}

impl TaskRunDisplay for TaskRunList {
    fn format_default(&self, now: DateTime<Utc>) -> String {
        if self.taskruns.is_empty() {
            return format!("No TaskRuns found in namespace {}", self.namespace);
        }

        let rows: Vec<(String, String, String)> = self
            .taskruns
            .iter()
            .map(|run| {
                (
                    run.name.clone(),
                    format_started(run.started_at.as_ref(), now),
                    run.status_label(),
                )
            })
            .collect();

        let name_width = rows
            .iter()
            .map(|(name, _, _)| name.len())
            .chain(std::iter::once("NAME".len()))
            .max()
            .unwrap_or(0);
        let started_width = rows
            .iter()
            .map(|(_, started, _)| started.len())
            .chain(std::iter::once("STARTED".len()))
            .max()
            .unwrap_or(0);

        let mut output = format!(
            "{:<name_width$}   {:<started_width$}   STATUS",
            "NAME", "STARTED"
        );
        for (name, started, status) in rows {
            output.push_str(&format!(
                "\n{:<name_width$}   {:<started_width$}   {}",
                name, started, status
            ));
        }

        output
    }

    fn format_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }
}

/// Picker entry for a TaskRun: `<name> started <age>`.
///
/// The name must stay the first whitespace-separated field.
pub fn format_option(run: &TaskRun, now: DateTime<Utc>) -> String {
    format!(
        "{} started {}",
        run.name,
        format_started(run.started_at.as_ref(), now)
    )
}

fn format_started(started: Option<&DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match started {
        Some(started) => format_duration(now.signed_duration_since(*started)),
        None => "---".to_string(),
    }
}

/// Format duration in a human-readable way
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().abs();

    if total_seconds < 60 {
        format!("{}s ago", total_seconds)
    } else if total_seconds < 3600 {
        format!("{}m ago", total_seconds / 60)
    } else if total_seconds < 86400 {
        format!("{}h ago", total_seconds / 3600)
    } else {
        format!("{}d ago", total_seconds / 86400)
    }
}
