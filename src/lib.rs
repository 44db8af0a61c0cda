//! # tkn-debug
//!
//! Attach an interactive shell to the paused breakpoint step of a Tekton TaskRun.
//!
//! ## Usage
//!
//! ```bash
//! tkn taskrun debug [NAME] [-n namespace] [--last] [--limit N] [--container C]
//! ```
//!
//! ## Modules
//!
//! - `attach` - Exec into a pod container and bridge the local terminal
//! - `cli` - Argument parsing, routing and command handlers
//! - `cluster` - Kubeconfig loading and client construction
//! - `config` - Layered configuration (file, environment, flags)
//! - `debug` - TaskRun selection and session orchestration
//! - `prompt` - Interactive TaskRun picker
//! - `taskrun` - TaskRun model, listing and display
pub mod attach;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod debug;
pub mod error;
pub mod prompt;
pub mod taskrun;

pub use error::{DebugError, Result};
