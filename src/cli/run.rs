use anyhow::Result;

use super::{
    args::{Arguments, Command},
    commands::{check::check, init::init, privatize::privatize, sync::sync},
    exit_status::ExitStatus,
};
use crate::logging::init_tracing;

/// Main entry point for the xlfsync CLI.
///
/// Dispatches to the command handler for the parsed arguments. Errors that
/// stop a command from running are returned; partial failures come back as
/// [`ExitStatus::Failure`].
pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };
    init_tracing(args.verbose());

    match args.command {
        Some(Command::Sync(cmd)) => sync(cmd),
        Some(Command::Check(cmd)) => check(cmd),
        Some(Command::Privatize(cmd)) => privatize(cmd),
        Some(Command::Init) => init(),
        None => anyhow::bail!("No command provided. Use --help to see available commands."),
    }
}
