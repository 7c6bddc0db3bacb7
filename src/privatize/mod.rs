//! Rewrites TypeScript `private` class members to ECMAScript `#private`
//! members and drops redundant `public` modifiers.
//!
//! Each `.ts` file is parsed with swc and the collected edits are applied to
//! the original text. Formatting and comments outside the touched members
//! stay as they were.

mod visitor;

pub use visitor::{MemberKind, Rename, SkippedMember};

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, anyhow, bail};
use rayon::prelude::*;
use swc_common::{FileName, GLOBALS, Globals, SourceMap};
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};
use walkdir::WalkDir;

use visitor::{MemberRewriter, apply_edits};

/// Result of rewriting one source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub output: String,
    pub renames: Vec<Rename>,
    pub skipped: Vec<SkippedMember>,
}

impl Rewrite {
    pub fn is_changed(&self) -> bool {
        !self.renames.is_empty()
    }
}

/// A file that had members renamed or private members left alone.
#[derive(Debug)]
pub struct FileChange {
    pub path: PathBuf,
    pub renames: Vec<Rename>,
    pub skipped: Vec<SkippedMember>,
}

/// A file that could not be read, parsed or written.
#[derive(Debug)]
pub struct FileError {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct PrivatizeReport {
    pub files_scanned: usize,
    pub changed: Vec<FileChange>,
    pub errors: Vec<FileError>,
    /// Changes were only reported, not written.
    pub dry_run: bool,
}

impl PrivatizeReport {
    pub fn rename_count(&self) -> usize {
        self.changed.iter().map(|change| change.renames.len()).sum()
    }

    /// Files with at least one rename.
    pub fn changed_files(&self) -> usize {
        self.changed
            .iter()
            .filter(|change| !change.renames.is_empty())
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.changed.iter().map(|change| change.skipped.len()).sum()
    }
}

/// Rewrite TypeScript source text.
pub fn rewrite_source(code: &str, file_path: &str) -> Result<Rewrite> {
    GLOBALS.set(&Globals::new(), || {
        let source_map = Arc::new(SourceMap::default());
        let source_file =
            source_map.new_source_file(FileName::Real(file_path.into()).into(), code.to_string());

        let syntax = Syntax::Typescript(TsSyntax {
            decorators: true,
            ..Default::default()
        });
        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);
        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("Failed to parse {}: {}", file_path, e.kind().msg()))?;

        let found = MemberRewriter::new(code, source_file.start_pos).rewrite(&module);
        let output = apply_edits(code, found.edits);
        Ok(Rewrite {
            output,
            renames: found.renames,
            skipped: found.skipped,
        })
    })
}

/// Collect the `.ts` files under `root`, skipping declaration files and
/// `node_modules`.
pub fn collect_ts_files(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        if !is_rewritable_file(root) {
            bail!("{} is not a TypeScript source file", root.display());
        }
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        bail!("Path does not exist: {}", root.display());
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != "node_modules");
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(event = "scan_skipped", error = %e);
                continue;
            }
        };
        if entry.file_type().is_file() && is_rewritable_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_rewritable_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".ts") && !name.ends_with(".d.ts")
}

/// Rewrite every TypeScript file under `root`.
///
/// Files are processed in parallel. A file is written only when it changed
/// and `dry_run` is false; failures are collected per file.
pub fn privatize(root: &Path, dry_run: bool) -> Result<PrivatizeReport> {
    let files = collect_ts_files(root)?;
    tracing::info!(event = "privatize_start", root = %root.display(), files = files.len(), dry_run);

    let results: Vec<Result<Option<FileChange>, FileError>> = files
        .par_iter()
        .map(|path| {
            process_file(path, dry_run).map_err(|err| FileError {
                path: path.clone(),
                message: format!("{:#}", err),
            })
        })
        .collect();

    let mut report = PrivatizeReport {
        files_scanned: files.len(),
        dry_run,
        ..Default::default()
    };
    for result in results {
        match result {
            Ok(Some(change)) => report.changed.push(change),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(event = "file_failed", path = %err.path.display(), error = %err.message);
                report.errors.push(err);
            }
        }
    }
    Ok(report)
}

fn process_file(path: &Path, dry_run: bool) -> Result<Option<FileChange>> {
    let code =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let rewrite = rewrite_source(&code, &path.to_string_lossy())?;
    for skipped in &rewrite.skipped {
        tracing::warn!(
            event = "member_kept",
            path = %path.display(),
            line = skipped.line,
            name = %skipped.name,
        );
    }
    if !rewrite.is_changed() {
        if rewrite.skipped.is_empty() {
            return Ok(None);
        }
        return Ok(Some(FileChange {
            path: path.to_path_buf(),
            renames: Vec::new(),
            skipped: rewrite.skipped,
        }));
    }

    for rename in &rewrite.renames {
        tracing::info!(
            event = "member_renamed",
            path = %path.display(),
            line = rename.line,
            from = %rename.from_text(),
            to = %rename.to_text(),
        );
    }

    if !dry_run {
        fs::write(path, &rewrite.output)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(Some(FileChange {
        path: path.to_path_buf(),
        renames: rewrite.renames,
        skipped: rewrite.skipped,
    }))
}
