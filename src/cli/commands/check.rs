use std::{env, sync::Arc};

use anyhow::Result;

use super::{
    super::{args::CheckCommand, exit_status::ExitStatus, report::print_check_report},
    files::resolve_files,
};
use crate::{config::load_config, sync::LocaleSynchronizer, translate::EchoTranslator};

pub fn check(cmd: CheckCommand) -> Result<ExitStatus> {
    let config = load_config(&env::current_dir()?)?.config;
    let (master, locales) = resolve_files(&config, &cmd.files)?;

    // Planning never calls the translator.
    let synchronizer = LocaleSynchronizer::new(master, locales, Arc::new(EchoTranslator));
    let report = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(synchronizer.check())?;

    print_check_report(&report, cmd.common.verbose);
    Ok(ExitStatus::failure_if(
        report.pending() > 0 || report.has_errors(),
    ))
}
