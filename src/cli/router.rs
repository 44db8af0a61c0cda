//! Command routing and execution
//!
//! This module handles routing CLI commands to their respective implementations.

use crate::cli::args::{Cli, Commands, TaskRunCommands};
use crate::cli::commands::*;
use crate::cluster::ClusterOptions;
use anyhow::Result;
use std::path::PathBuf;

/// Flags shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub namespace: Option<String>,
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub config: Option<PathBuf>,
}

impl GlobalOptions {
    pub fn cluster(&self) -> ClusterOptions {
        ClusterOptions {
            kubeconfig: self.kubeconfig.clone(),
            context: self.context.clone(),
        }
    }
}

/// Execute a CLI command based on the parsed arguments.
///
/// Returns the process exit code.
pub async fn execute_command(cli: Cli) -> Result<i32> {
    let global = GlobalOptions {
        namespace: cli.namespace,
        kubeconfig: cli.kubeconfig,
        context: cli.context,
        config: cli.config,
    };

    match cli.command {
        Some(Commands::TaskRun { command }) => match command {
            TaskRunCommands::Debug {
                name,
                last,
                limit,
                container,
                shell,
                rerun,
                timeout,
            } => {
                let args = DebugArgs {
                    name,
                    last,
                    limit,
                    container,
                    shell,
                    rerun,
                    timeout,
                };
                run_debug_command(&global, args).await
            }
            TaskRunCommands::List { limit, output } => {
                run_list_command(&global, limit, output).await?;
                Ok(0)
            }
        },
        None => {
            // No command provided, show help
            use crate::cli::help::generate_help;
            println!("{}", generate_help());
            Ok(0)
        }
    }
}
