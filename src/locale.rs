//! Locale tags and the files they map to.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    sync::LazyLock,
};

use anyhow::{Result, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Language subtag followed by at least one region/script/variant subtag.
static LOCALE_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2,3}(?:-[A-Za-z0-9]{2,8})+$").unwrap());

/// A validated language-region tag such as `de-DE` or `zh-Hant-TW`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    pub fn new(tag: impl Into<String>) -> Result<Self> {
        let tag = tag.into();
        if !LOCALE_TAG_REGEX.is_match(&tag) {
            bail!(
                "Invalid locale \"{}\": expected a language-region tag like \"de-DE\"",
                tag
            );
        }
        Ok(Self(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

/// A locale paired with the XLIFF file that holds its translations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleFile {
    pub locale: Locale,
    pub path: PathBuf,
}

impl LocaleFile {
    pub fn new(locale: Locale, path: impl Into<PathBuf>) -> Self {
        Self {
            locale,
            path: path.into(),
        }
    }

    /// Locale file next to the master, named after it.
    ///
    /// `messages.xlf` with `de-DE` becomes `messages.de-DE.xlf`.
    pub fn derived_from(master: &Path, locale: Locale) -> Self {
        let path = derive_locale_path(master, &locale);
        Self { locale, path }
    }
}

/// Parses a `TAG` or `TAG=PATH` command line value.
///
/// Without an explicit path the file is derived from the master path.
pub fn parse_locale_arg(value: &str, master: &Path) -> Result<LocaleFile> {
    match value.split_once('=') {
        Some((tag, path)) => {
            if path.trim().is_empty() {
                bail!("Missing path after '=' in \"{}\"", value);
            }
            Ok(LocaleFile::new(Locale::new(tag.trim())?, path.trim()))
        }
        None => Ok(LocaleFile::derived_from(master, Locale::new(value.trim())?)),
    }
}

fn derive_locale_path(master: &Path, locale: &Locale) -> PathBuf {
    let stem = master
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_name = match master.extension() {
        Some(ext) => format!("{}.{}.{}", stem, locale, ext.to_string_lossy()),
        None => format!("{}.{}", stem, locale),
    };
    master.with_file_name(file_name)
}
