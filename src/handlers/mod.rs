//! Console handlers module
//!
//! This module turns text commands into service calls and renders replies.

pub mod commands;

// Re-export commonly used handler functions
pub use commands::{Command, handle_command, handle_line};
