//! CLI argument structures
//!
//! This module defines the command-line interface: global cluster flags and
//! the `taskrun` subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const DEBUG_EXAMPLES: &str = "\
Examples:
  Debug a TaskRun named 'foo' from the namespace 'bar':

    tkn taskrun debug foo -n bar

  Pick from the 10 most recent TaskRuns:

    tkn taskrun debug --limit 10

  Rerun 'foo' as 'foo-debug' with a breakpoint on failure and attach to it:

    tkn taskrun debug foo --rerun";

/// Debug Tekton TaskRuns from the command line
#[derive(Parser)]
#[command(name = "tkn")]
#[command(about = "tkn - Attach a shell to paused Tekton TaskRun steps", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Namespace to use (defaults to the kubeconfig context's namespace)
    #[arg(short = 'n', long, global = true)]
    pub namespace: Option<String>,

    /// Path to the kubeconfig file
    #[arg(long, value_name = "PATH", global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Path to a configuration file (.toml or .yaml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage TaskRuns
    #[command(name = "taskrun", visible_alias = "tr", alias = "taskruns")]
    TaskRun {
        #[command(subcommand)]
        command: TaskRunCommands,
    },
}

#[derive(Subcommand)]
pub enum TaskRunCommands {
    /// Debug TaskRuns in a namespace
    #[command(name = "debug", after_help = DEBUG_EXAMPLES)]
    Debug {
        /// TaskRun to debug (prompts when omitted)
        name: Option<String>,

        /// Debug the last TaskRun
        #[arg(short = 'L', long)]
        last: bool,

        /// Number of TaskRuns to choose from
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Container to attach to (default: step-breakpoint)
        #[arg(short = 'c', long)]
        container: Option<String>,

        /// Command to start in the container (default: sh)
        #[arg(long, value_name = "COMMAND")]
        shell: Option<String>,

        /// Rerun the TaskRun as <name>-debug with a breakpoint on failure
        #[arg(long)]
        rerun: bool,

        /// Seconds to wait for a rerun to get a pod
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,
    },

    /// List TaskRuns in a namespace
    #[command(name = "list", visible_alias = "ls")]
    List {
        /// Number of TaskRuns to show
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Output format
        #[arg(short = 'o', long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
