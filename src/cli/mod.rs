//! Command-line interface: argument parsing, command handlers and reports.

pub mod args;
mod commands;
mod exit_status;
pub mod report;
mod run;

pub use args::{Arguments, Command};
pub use exit_status::ExitStatus;
pub use run::run_cli;
