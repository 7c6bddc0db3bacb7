use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{locale::Locale, xliff::XliffError};

/// Why synchronizing a file failed.
///
/// Messages carry the underlying cause, so callers print them with `{}`.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("cannot access {}: {error}", path.display())]
    FileAccess { path: PathBuf, error: io::Error },
    #[error("cannot parse {}: {error}", path.display())]
    Parse { path: PathBuf, error: XliffError },
    #[error("translating \"{id}\" to {locale} failed: {error:#}")]
    Translation {
        id: String,
        locale: Locale,
        error: anyhow::Error,
    },
    #[error("locale {locale} points at the master file {}", path.display())]
    MasterTarget { locale: Locale, path: PathBuf },
    #[error("task for {locale} stopped unexpectedly: {message}")]
    Task { locale: Locale, message: String },
}

impl SyncError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            error,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, error: XliffError) -> Self {
        Self::Parse {
            path: path.into(),
            error,
        }
    }

    /// Short label for reports.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::FileAccess { .. } => "file access",
            SyncError::Parse { .. } => "parse",
            SyncError::Translation { .. } => "translation",
            SyncError::MasterTarget { .. } => "master file",
            SyncError::Task { .. } => "task",
        }
    }
}
