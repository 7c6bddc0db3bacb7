//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `sync`: Bring every locale file in line with the master file
//! - `check`: Report what `sync` would translate, without changing files
//! - `privatize`: Turn TypeScript `private` members into `#private` members
//! - `init`: Initialize the xlfsync configuration file

use std::{num::NonZeroUsize, path::PathBuf};

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::locale::Locale;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Sync(cmd)) => cmd.common.verbose,
            Some(Command::Check(cmd)) => cmd.common.verbose,
            Some(Command::Privatize(cmd)) => cmd.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Which files to synchronize.
#[derive(Debug, Clone, Args)]
pub struct LocaleArgs {
    /// Master XLIFF file (overrides config file)
    #[arg(long)]
    pub master: Option<PathBuf>,

    /// Target locale, optionally with its file: `de-DE` or `de-DE=path/de.xlf`
    /// (overrides config file, repeatable)
    #[arg(long = "locale", value_name = "TAG[=PATH]")]
    pub locales: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(flatten)]
    pub files: LocaleArgs,

    /// Locale of the master file, passed to the translator
    #[arg(long)]
    pub source_locale: Option<Locale>,

    /// Program that reads text on stdin and prints the translation
    #[arg(long, conflicts_with = "echo")]
    pub translator_command: Option<String>,

    /// Argument for the translator program; `{target}` and `{source}` are
    /// replaced by the locales (repeatable)
    #[arg(long = "translator-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub translator_args: Vec<String>,

    /// Copy source text into new targets instead of translating
    #[arg(long)]
    pub echo: bool,

    /// Maximum number of translations in flight per locale
    #[arg(long)]
    pub max_concurrency: Option<NonZeroUsize>,

    /// Do not set `target-language` on the `<file>` element
    #[arg(long)]
    pub no_stamp: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub files: LocaleArgs,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct PrivatizeCommand {
    /// Directory (searched recursively) or single `.ts` file
    pub path: PathBuf,

    /// Report the renames without writing files
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Translate missing units and write every locale file
    Sync(SyncCommand),
    /// Report missing translations without changing any file
    Check(CheckCommand),
    /// Convert TypeScript `private` members to `#private` members
    Privatize(PrivatizeCommand),
    /// Initialize a new .xlfsyncrc.json configuration file
    Init,
}
