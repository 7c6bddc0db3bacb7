use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Ok, Result, bail};
use serde::{Deserialize, Serialize};

use crate::locale::{Locale, LocaleFile};

pub const CONFIG_FILE_NAME: &str = ".xlfsyncrc.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_master")]
    pub master: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_locale: Option<Locale>,
    #[serde(default)]
    pub locales: Vec<LocaleEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translator: Option<TranslatorConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,
    #[serde(default = "default_stamp_target_language")]
    pub stamp_target_language: bool,
}

/// One target locale. Without `path` the file sits next to the master.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleEntry {
    pub locale: Locale,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// External program used as translator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatorConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl TranslatorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_master() -> PathBuf {
    PathBuf::from("src/locale/messages.xlf")
}

fn default_stamp_target_language() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            master: default_master(),
            source_locale: None,
            locales: Vec::new(),
            translator: None,
            max_concurrency: None,
            stamp_target_language: default_stamp_target_language(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error for a blank translator command, a zero concurrency
    /// limit, two locales sharing a file or a locale using the master file.
    pub fn validate(&self) -> Result<()> {
        if let Some(translator) = &self.translator
            && translator.command.trim().is_empty()
        {
            bail!("'translator.command' must not be empty");
        }

        if self.max_concurrency == Some(0) {
            bail!("'maxConcurrency' must be at least 1");
        }

        validate_locale_files(&self.master, &self.locale_files())
    }

    /// Locale files as configured, with derived paths filled in.
    pub fn locale_files(&self) -> Vec<LocaleFile> {
        self.locales
            .iter()
            .map(|entry| match &entry.path {
                Some(path) => LocaleFile::new(entry.locale.clone(), path),
                None => LocaleFile::derived_from(&self.master, entry.locale.clone()),
            })
            .collect()
    }

    /// Make relative paths relative to `base` instead of the working directory.
    fn resolve_paths(&mut self, base: &Path) {
        if self.master.is_relative() {
            self.master = base.join(&self.master);
        }
        for entry in &mut self.locales {
            if let Some(path) = &mut entry.path
                && path.is_relative()
            {
                *path = base.join(&*path);
            }
        }
    }
}

/// Reject two locales pointing at the same file, or a locale pointing at
/// the master.
pub fn validate_locale_files(master: &Path, files: &[LocaleFile]) -> Result<()> {
    let mut seen = HashSet::new();
    for file in files {
        if file.path == master {
            bail!(
                "Locale {} uses {} which is the master file",
                file.locale,
                file.path.display()
            );
        }
        if !seen.insert(&file.path) {
            bail!(
                "Locale {} uses {} which is already used by another locale",
                file.locale,
                file.path.display()
            );
        }
    }
    Ok(())
}

pub fn default_config_json() -> Result<String> {
    let config = Config {
        source_locale: Locale::new("en-US").ok(),
        locales: vec![LocaleEntry {
            locale: Locale::new("de-DE")?,
            path: None,
        }],
        ..Default::default()
    };
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// The file the config came from, `None` when using defaults.
    pub path: Option<PathBuf>,
}

impl ConfigLoadResult {
    pub fn from_file(&self) -> bool {
        self.path.is_some()
    }
}

/// Load the nearest config file, resolving its relative paths against the
/// directory that holds it.
pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let mut config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            if let Some(base) = path.parent() {
                config.resolve_paths(base);
            }
            config.validate()?;
            tracing::debug!(event = "config_loaded", path = %path.display());
            Ok(ConfigLoadResult {
                config,
                path: Some(path),
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            path: None,
        }),
    }
}
