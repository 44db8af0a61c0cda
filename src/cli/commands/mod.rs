//! Command implementation modules
//!
//! Each `taskrun` subcommand is implemented as a separate module.

pub mod debug;
pub mod list;

pub use debug::{run_debug_command, DebugArgs};
pub use list::run_list_command;
