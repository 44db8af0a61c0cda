//! CLI command handlers
//!
//! This module contains all CLI-related functionality including:
//! - Argument parsing structures
//! - Command implementations
//! - Help text generation
//! - Input validation

pub mod args;
pub mod commands;
pub mod help;
pub mod router;
pub mod validation;

// Re-export the main CLI structures for convenience
pub use args::{Cli, Commands, OutputFormat, TaskRunCommands};
pub use help::{generate_help, get_log_level};
pub use router::{execute_command, GlobalOptions};
pub use validation::{validate_limit, validate_poll_interval, validate_timeout};
