//! Command-line interface.

pub mod commands;
pub mod parser;

pub use commands::{execute, format_error};
pub use parser::{Cli, Commands};
