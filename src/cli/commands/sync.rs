use std::{env, num::NonZeroUsize, sync::Arc};

use anyhow::{Result, bail};

use super::{
    super::{args::SyncCommand, exit_status::ExitStatus, report::print_sync_report},
    files::resolve_files,
};
use crate::{
    config::{CONFIG_FILE_NAME, Config, load_config},
    sync::{LocaleSynchronizer, SyncOptions},
    translate::{CommandTranslator, EchoTranslator, Translator},
};

pub fn sync(cmd: SyncCommand) -> Result<ExitStatus> {
    let config = load_config(&env::current_dir()?)?.config;
    let (master, locales) = resolve_files(&config, &cmd.files)?;
    let translator = build_translator(&cmd, &config)?;
    let options = SyncOptions {
        source_locale: cmd.source_locale.clone().or(config.source_locale.clone()),
        max_concurrency: cmd
            .max_concurrency
            .map(NonZeroUsize::get)
            .or(config.max_concurrency),
        stamp_target_language: config.stamp_target_language && !cmd.no_stamp,
    };

    let synchronizer = LocaleSynchronizer::new(master, locales, translator).with_options(options);
    let report = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(synchronizer.run())?;

    print_sync_report(&report);
    Ok(ExitStatus::failure_if(report.has_failures()))
}

fn build_translator(cmd: &SyncCommand, config: &Config) -> Result<Arc<dyn Translator>> {
    if cmd.echo {
        return Ok(Arc::new(EchoTranslator));
    }

    let timeout = config.translator.as_ref().and_then(|t| t.timeout());
    if let Some(program) = &cmd.translator_command {
        let translator =
            CommandTranslator::new(program, cmd.translator_args.clone()).with_timeout(timeout);
        return Ok(Arc::new(translator));
    }

    match &config.translator {
        Some(translator) => Ok(Arc::new(
            CommandTranslator::new(&translator.command, translator.args.clone())
                .with_timeout(timeout),
        )),
        None => bail!(
            "No translator configured. Pass --translator-command or --echo, or add \"translator\" to {}",
            CONFIG_FILE_NAME
        ),
    }
}
