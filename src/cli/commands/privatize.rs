use anyhow::Result;

use super::super::{
    args::PrivatizeCommand, exit_status::ExitStatus, report::print_privatize_report,
};
use crate::privatize::privatize as rewrite_members;

pub fn privatize(cmd: PrivatizeCommand) -> Result<ExitStatus> {
    let report = rewrite_members(&cmd.path, cmd.dry_run)?;
    print_privatize_report(&report);
    Ok(ExitStatus::failure_if(!report.errors.is_empty()))
}
