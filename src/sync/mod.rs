//! Locale synchronization.
//!
//! Propagates the units of a master XLIFF file into one file per locale:
//!
//! ```text
//! master.xlf ──parse──> TermsMap ─┬─> de-DE: ensure file → parse → plan → translate → write
//!                                 ├─> fr-FR: ...
//!                                 └─> ...
//! ```
//!
//! Locales run as concurrent tasks, and so do the translations inside a
//! locale. A failing locale never stops the others; every locale gets a
//! [`LocaleOutcome`] in the returned [`SyncReport`].

mod error;
pub mod plan;

pub use error::SyncError;
pub use plan::{LocalePlan, PlanAction};

use std::{
    io,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use tokio::{fs, sync::Semaphore, task::JoinHandle};

use crate::{
    locale::{Locale, LocaleFile},
    translate::{TranslationRequest, Translator},
    xliff::{Segment, TermsMap, TransUnit, XliffDocument},
};

/// Log a progress line every this many processed units.
const PROGRESS_INTERVAL: usize = 50;

/// Knobs for a synchronization run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Passed to the translator along with each text.
    pub source_locale: Option<Locale>,
    /// Upper bound on in-flight translations per locale. `None` is unbounded.
    pub max_concurrency: Option<usize>,
    /// Set `target-language` on the first `<file>` element.
    pub stamp_target_language: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            source_locale: None,
            max_concurrency: None,
            stamp_target_language: true,
        }
    }
}

/// Counters for one successfully synchronized locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleStats {
    /// The file did not exist and was copied from the master.
    pub created: bool,
    pub translated: usize,
    pub kept: usize,
    pub removed: usize,
    pub stale: usize,
}

#[derive(Debug)]
pub struct LocaleOutcome {
    pub locale: Locale,
    pub path: PathBuf,
    pub result: Result<LocaleStats, SyncError>,
}

/// Per-locale outcomes, in the order the locales were given.
#[derive(Debug)]
pub struct SyncReport {
    pub master: PathBuf,
    pub terms: usize,
    pub outcomes: Vec<LocaleOutcome>,
}

impl SyncReport {
    pub fn failures(&self) -> impl Iterator<Item = (&LocaleOutcome, &SyncError)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().err().map(|err| (outcome, err)))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn translated(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
            .map(|stats| stats.translated)
            .sum()
    }
}

/// What `sync` would do for one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanSummary {
    /// The locale file exists already.
    pub exists: bool,
    /// Ids that would be sent to the translator, in master order.
    pub pending: Vec<String>,
    pub kept: usize,
    pub removed: Vec<String>,
    pub stale: Vec<String>,
}

#[derive(Debug)]
pub struct LocaleCheck {
    pub locale: Locale,
    pub path: PathBuf,
    pub result: Result<PlanSummary, SyncError>,
}

#[derive(Debug)]
pub struct CheckReport {
    pub master: PathBuf,
    pub terms: usize,
    pub locales: Vec<LocaleCheck>,
}

impl CheckReport {
    pub fn pending(&self) -> usize {
        self.locales
            .iter()
            .filter_map(|check| check.result.as_ref().ok())
            .map(|summary| summary.pending.len())
            .sum()
    }

    pub fn has_errors(&self) -> bool {
        self.locales.iter().any(|check| check.result.is_err())
    }
}

/// Reconciles locale files with a master XLIFF file.
pub struct LocaleSynchronizer {
    master: PathBuf,
    locales: Vec<LocaleFile>,
    translator: Arc<dyn Translator>,
    options: SyncOptions,
}

impl LocaleSynchronizer {
    pub fn new(
        master: impl Into<PathBuf>,
        locales: Vec<LocaleFile>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            master: master.into(),
            locales,
            translator,
            options: SyncOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Synchronize every locale file.
    ///
    /// Only a missing or malformed master file is an error; per-locale
    /// failures are logged and reported in the returned [`SyncReport`].
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        tracing::info!(
            event = "sync_start",
            master = %self.master.display(),
            locales = ?self.locales.iter().map(|l| l.locale.as_str()).collect::<Vec<_>>(),
            translator = self.translator.name(),
        );

        let terms = Arc::new(load_terms(&self.master).await?);
        tracing::info!(event = "master_loaded", terms = terms.len());

        let handles: Vec<(LocaleFile, JoinHandle<Result<LocaleStats, SyncError>>)> = self
            .locales
            .iter()
            .map(|file| {
                let job = LocaleJob {
                    master: self.master.clone(),
                    file: file.clone(),
                    terms: Arc::clone(&terms),
                    translator: Arc::clone(&self.translator),
                    options: self.options.clone(),
                };
                (file.clone(), tokio::spawn(job.run()))
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (file, handle) in handles {
            let result = handle.await.unwrap_or_else(|join_error| {
                Err(SyncError::Task {
                    locale: file.locale.clone(),
                    message: join_error.to_string(),
                })
            });
            match &result {
                Ok(stats) => tracing::info!(
                    event = "locale_synced",
                    locale = %file.locale,
                    path = %file.path.display(),
                    translated = stats.translated,
                    kept = stats.kept,
                ),
                Err(err) => tracing::error!(
                    event = "locale_failed",
                    locale = %file.locale,
                    path = %file.path.display(),
                    error = %err,
                ),
            }
            outcomes.push(LocaleOutcome {
                locale: file.locale,
                path: file.path,
                result,
            });
        }

        Ok(SyncReport {
            master: self.master.clone(),
            terms: terms.len(),
            outcomes,
        })
    }

    /// Report what [`run`](Self::run) would do without translating or
    /// writing anything.
    ///
    /// A missing locale file is planned as the copy of the master it would
    /// become.
    pub async fn check(&self) -> Result<CheckReport, SyncError> {
        let terms = load_terms(&self.master).await?;

        let mut locales = Vec::with_capacity(self.locales.len());
        for file in &self.locales {
            let result = check_locale(&self.master, &terms, file).await;
            if let Err(err) = &result {
                tracing::error!(event = "locale_check_failed", locale = %file.locale, error = %err);
            }
            locales.push(LocaleCheck {
                locale: file.locale.clone(),
                path: file.path.clone(),
                result,
            });
        }

        Ok(CheckReport {
            master: self.master.clone(),
            terms: terms.len(),
            locales,
        })
    }
}

async fn load_terms(path: &Path) -> Result<TermsMap, SyncError> {
    let document = load_document(path).await?;
    Ok(document.into_units())
}

async fn load_document(path: &Path) -> Result<XliffDocument, SyncError> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|err| SyncError::file_access(path, err))?;
    XliffDocument::parse(text).map_err(|err| SyncError::parse(path, err))
}

async fn check_locale(
    master: &Path,
    terms: &TermsMap,
    file: &LocaleFile,
) -> Result<PlanSummary, SyncError> {
    ensure_not_master(master, file).await?;
    let exists = fs::try_exists(&file.path)
        .await
        .map_err(|err| SyncError::file_access(&file.path, err))?;

    let document;
    let existing = if exists {
        document = load_document(&file.path).await?;
        document.units()
    } else {
        terms
    };

    let plan = plan::plan(terms, existing);
    Ok(PlanSummary {
        exists,
        pending: plan.pending().map(|unit| unit.id.clone()).collect(),
        kept: plan.kept_count(),
        removed: plan.removed.iter().map(|id| id.to_string()).collect(),
        stale: plan.stale.iter().map(|id| id.to_string()).collect(),
    })
}

/// Everything one locale task owns.
struct LocaleJob {
    master: PathBuf,
    file: LocaleFile,
    terms: Arc<TermsMap>,
    translator: Arc<dyn Translator>,
    options: SyncOptions,
}

impl LocaleJob {
    async fn run(self) -> Result<LocaleStats, SyncError> {
        let LocaleFile { locale, path } = &self.file;

        ensure_not_master(&self.master, &self.file).await?;
        let created = ensure_locale_file(&self.master, path).await?;
        let document = load_document(path).await?;
        tracing::info!(
            event = "locale_loaded",
            locale = %locale,
            terms = document.units().len(),
            created,
        );

        let plan = plan::plan(&self.terms, document.units());
        let units = self.execute(&plan).await?;

        let stamp = self.options.stamp_target_language.then_some(locale);
        let rendered = document.render(&units, stamp);
        fs::write(path, rendered)
            .await
            .map_err(|err| SyncError::file_access(path, err))?;
        tracing::info!(event = "locale_written", locale = %locale, path = %path.display());

        Ok(LocaleStats {
            created,
            translated: plan.pending_count(),
            kept: plan.kept_count(),
            removed: plan.removed.len(),
            stale: plan.stale.len(),
        })
    }

    /// Resolve every planned action into a unit, translating concurrently.
    ///
    /// All translations are awaited before the first error is returned.
    async fn execute(&self, plan: &LocalePlan<'_>) -> Result<TermsMap, SyncError> {
        let semaphore = self
            .options
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));
        let processed = Arc::new(AtomicUsize::new(0));

        let mut pending = Vec::new();
        for unit in plan.pending() {
            let task = UnitTask {
                unit: unit.clone(),
                locale: self.file.locale.clone(),
                source_locale: self.options.source_locale.clone(),
                translator: Arc::clone(&self.translator),
                semaphore: semaphore.clone(),
                processed: Arc::clone(&processed),
            };
            pending.push(tokio::spawn(task.run()));
        }

        let mut translated = Vec::with_capacity(pending.len());
        let mut first_error = None;
        for handle in pending {
            let result = handle.await.unwrap_or_else(|join_error| {
                Err(SyncError::Task {
                    locale: self.file.locale.clone(),
                    message: join_error.to_string(),
                })
            });
            match result {
                Ok(unit) => translated.push(unit),
                Err(err) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        assemble(plan, translated, &self.file.locale)
    }
}

/// Merge kept units and fresh translations back into plan order.
fn assemble(
    plan: &LocalePlan<'_>,
    translated: Vec<TransUnit>,
    locale: &Locale,
) -> Result<TermsMap, SyncError> {
    let mut translated = translated.into_iter();
    let mut units = TermsMap::new();
    for action in &plan.actions {
        let unit = match action {
            PlanAction::Keep(unit) => (*unit).clone(),
            PlanAction::Translate(unit) => translated.next().ok_or_else(|| SyncError::Task {
                locale: locale.clone(),
                message: format!("no translation for \"{}\"", unit.id),
            })?,
        };
        units.insert(unit);
    }
    if translated.next().is_some() {
        return Err(SyncError::Task {
            locale: locale.clone(),
            message: "more translations than planned units".to_string(),
        });
    }
    Ok(units)
}

/// One translation in flight.
struct UnitTask {
    unit: TransUnit,
    locale: Locale,
    source_locale: Option<Locale>,
    translator: Arc<dyn Translator>,
    semaphore: Option<Arc<Semaphore>>,
    processed: Arc<AtomicUsize>,
}

impl UnitTask {
    async fn run(self) -> Result<TransUnit, SyncError> {
        let _permit = match &self.semaphore {
            Some(semaphore) => Some(Arc::clone(semaphore).acquire_owned().await.map_err(|err| {
                SyncError::Translation {
                    id: self.unit.id.clone(),
                    locale: self.locale.clone(),
                    error: err.into(),
                }
            })?),
            None => None,
        };

        let text = self.unit.source.text().into_owned();
        let request = TranslationRequest {
            text: &text,
            target: &self.locale,
            source: self.source_locale.as_ref(),
        };
        let target = self
            .translator
            .translate(request)
            .await
            .and_then(|translated| target_segment(&self.unit.source, &translated))
            .map_err(|error| SyncError::Translation {
                id: self.unit.id.clone(),
                locale: self.locale.clone(),
                error,
            })?;

        tracing::debug!(
            event = "unit_translated",
            locale = %self.locale,
            id = %self.unit.id,
            source = %text,
            translation = %target.text(),
        );

        let count = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        if count % PROGRESS_INTERVAL == 0 {
            tracing::info!(event = "progress", locale = %self.locale, processed = count);
        }

        Ok(self.unit.with_target(target))
    }
}

/// Wrap a translator's answer the way the source segment is stored.
fn target_segment(source: &Segment, translated: &str) -> anyhow::Result<Segment> {
    if translated.trim().is_empty() {
        anyhow::bail!("translator returned an empty string");
    }
    if source.has_markup() {
        Ok(Segment::from_markup(translated)?)
    } else {
        Ok(Segment::from_text(translated))
    }
}

/// Fail when a locale file resolves to the master file itself.
async fn ensure_not_master(master: &Path, file: &LocaleFile) -> Result<(), SyncError> {
    let same = master == file.path
        || match (fs::canonicalize(master).await, fs::canonicalize(&file.path).await) {
            (Ok(master), Ok(path)) => master == path,
            _ => false,
        };
    if same {
        return Err(SyncError::MasterTarget {
            locale: file.locale.clone(),
            path: file.path.clone(),
        });
    }
    Ok(())
}

/// Copy the master to `path` when no locale file exists yet.
///
/// Returns whether the file was created.
async fn ensure_locale_file(master: &Path, path: &Path) -> Result<bool, SyncError> {
    match fs::metadata(path).await {
        Ok(_) => Ok(false),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(event = "locale_file_missing", path = %path.display());
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|err| SyncError::file_access(parent, err))?;
            }
            fs::copy(master, path)
                .await
                .map_err(|err| SyncError::file_access(path, err))?;
            Ok(true)
        }
        Err(err) => Err(SyncError::file_access(path, err)),
    }
}
