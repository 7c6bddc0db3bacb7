use std::path::PathBuf;

use anyhow::{Result, bail};

use super::super::args::LocaleArgs;
use crate::{
    config::{CONFIG_FILE_NAME, Config, validate_locale_files},
    locale::{LocaleFile, parse_locale_arg},
};

/// Master path and locale files, command line flags taking precedence over
/// the config file.
pub fn resolve_files(config: &Config, args: &LocaleArgs) -> Result<(PathBuf, Vec<LocaleFile>)> {
    let master = args.master.clone().unwrap_or_else(|| config.master.clone());

    let locales = if args.locales.is_empty() {
        Config {
            master: master.clone(),
            ..config.clone()
        }
        .locale_files()
    } else {
        args.locales
            .iter()
            .map(|value| parse_locale_arg(value, &master))
            .collect::<Result<Vec<_>>>()?
    };

    if locales.is_empty() {
        bail!(
            "No target locales. Pass --locale or add \"locales\" to {}",
            CONFIG_FILE_NAME
        );
    }
    validate_locale_files(&master, &locales)?;

    Ok((master, locales))
}
