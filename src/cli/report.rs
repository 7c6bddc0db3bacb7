//! Report formatting and printing.
//!
//! Kept apart from the synchronizer so xlfsync can be used as a library.
//! Every `print_*` function has a `*_to` twin writing to any [`Write`] for
//! tests.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::{
    privatize::PrivatizeReport,
    sync::{CheckReport, LocaleStats, SyncReport},
};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Maximum number of pending ids listed per locale without `-v`.
const MAX_IDS_DISPLAY: usize = 5;

fn plural(count: usize, singular: &'static str, plural: &'static str) -> &'static str {
    if count == 1 { singular } else { plural }
}

fn locale_width<'a>(locales: impl Iterator<Item = &'a str>) -> usize {
    locales.map(UnicodeWidthStr::width).max().unwrap_or(0)
}

fn pad(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(UnicodeWidthStr::width(text));
    format!("{}{}", text, " ".repeat(padding))
}

pub fn print_sync_report(report: &SyncReport) {
    print_sync_report_to(report, &mut io::stdout().lock());
}

pub fn print_sync_report_to<W: Write>(report: &SyncReport, writer: &mut W) {
    let width = locale_width(report.outcomes.iter().map(|o| o.locale.as_str()));

    for outcome in &report.outcomes {
        let locale = pad(outcome.locale.as_str(), width);
        match &outcome.result {
            Ok(stats) => {
                let _ = writeln!(
                    writer,
                    "{} {}  {}  {}",
                    SUCCESS_MARK.green(),
                    locale.bold(),
                    outcome.path.display(),
                    describe_stats(stats).dimmed()
                );
            }
            Err(err) => {
                let _ = writeln!(
                    writer,
                    "{} {}  {}  {}: {}",
                    FAILURE_MARK.red(),
                    locale.bold(),
                    outcome.path.display(),
                    err.kind().red(),
                    err
                );
            }
        }
    }

    let failed = report.failures().count();
    let total = report.outcomes.len();
    if failed == 0 {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!(
                "Synchronized {} {} with {} ({} {}, {} translated)",
                total,
                plural(total, "locale", "locales"),
                report.master.display(),
                report.terms,
                plural(report.terms, "unit", "units"),
                report.translated()
            )
            .green()
        );
    } else {
        let _ = writeln!(
            writer,
            "\n{} {} of {} {} failed",
            FAILURE_MARK.red(),
            failed,
            total,
            plural(total, "locale", "locales")
        );
    }
}

fn describe_stats(stats: &LocaleStats) -> String {
    let mut parts = vec![
        format!("{} translated", stats.translated),
        format!("{} kept", stats.kept),
    ];
    if stats.removed > 0 {
        parts.push(format!("{} removed", stats.removed));
    }
    if stats.stale > 0 {
        parts.push(format!("{} stale", stats.stale));
    }
    if stats.created {
        parts.push("created".to_string());
    }
    parts.join(", ")
}

pub fn print_check_report(report: &CheckReport, verbose: bool) {
    print_check_report_to(report, verbose, &mut io::stdout().lock());
}

pub fn print_check_report_to<W: Write>(report: &CheckReport, verbose: bool, writer: &mut W) {
    let width = locale_width(report.locales.iter().map(|c| c.locale.as_str()));

    for check in &report.locales {
        let locale = pad(check.locale.as_str(), width);
        let summary = match &check.result {
            Ok(summary) => summary,
            Err(err) => {
                let _ = writeln!(
                    writer,
                    "{} {}  {}: {}",
                    FAILURE_MARK.red(),
                    locale.bold(),
                    err.kind().red(),
                    err
                );
                continue;
            }
        };

        let missing = if summary.exists { "" } else { " (file missing)" };
        if summary.pending.is_empty() {
            let _ = writeln!(
                writer,
                "{} {}  up to date{}",
                SUCCESS_MARK.green(),
                locale.bold(),
                missing
            );
        } else {
            let _ = writeln!(
                writer,
                "{} {}  {} pending{}",
                FAILURE_MARK.red(),
                locale.bold(),
                summary.pending.len(),
                missing
            );
            print_ids(&summary.pending, verbose, width, writer);
        }
        if !summary.removed.is_empty() {
            let _ = writeln!(
                writer,
                "  {} {} obsolete {} will be removed",
                pad("", width),
                summary.removed.len(),
                plural(summary.removed.len(), "unit", "units")
            );
        }
        if !summary.stale.is_empty() {
            let _ = writeln!(
                writer,
                "  {} {} {} changed in the master since translation",
                pad("", width),
                summary.stale.len(),
                plural(summary.stale.len(), "source", "sources")
            );
        }
    }

    let pending = report.pending();
    if pending == 0 && !report.has_errors() {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!(
                "All {} {} up to date with {}",
                report.locales.len(),
                plural(report.locales.len(), "locale", "locales"),
                report.master.display()
            )
            .green()
        );
    } else if pending > 0 {
        let _ = writeln!(
            writer,
            "\n{} {} {} to translate (run {} to translate them)",
            FAILURE_MARK.red(),
            pending,
            plural(pending, "unit", "units"),
            "xlfsync sync".cyan()
        );
    }
}

fn print_ids<W: Write>(ids: &[String], verbose: bool, width: usize, writer: &mut W) {
    let shown = if verbose {
        ids.len()
    } else {
        ids.len().min(MAX_IDS_DISPLAY)
    };
    for id in &ids[..shown] {
        let _ = writeln!(writer, "  {} {} {}", pad("", width), "-".dimmed(), id);
    }
    if shown < ids.len() {
        let _ = writeln!(
            writer,
            "  {} {} (use {} to list all)",
            pad("", width),
            format!("... and {} more", ids.len() - shown).dimmed(),
            "-v".cyan()
        );
    }
}

pub fn print_privatize_report(report: &PrivatizeReport) {
    print_privatize_report_to(report, &mut io::stdout().lock());
}

pub fn print_privatize_report_to<W: Write>(report: &PrivatizeReport, writer: &mut W) {
    let line_width = report
        .changed
        .iter()
        .flat_map(|change| {
            let renamed = change.renames.iter().map(|rename| rename.line);
            renamed.chain(change.skipped.iter().map(|skipped| skipped.line))
        })
        .max()
        .map(|n| n.to_string().len())
        .unwrap_or(1);

    for change in &report.changed {
        let _ = writeln!(writer, "{}", change.path.display().to_string().bold());
        for rename in &change.renames {
            let _ = writeln!(
                writer,
                "  {} {} {}",
                format!("{:>width$}", rename.line, width = line_width).blue(),
                "|".blue(),
                rename
            );
        }
        for skipped in &change.skipped {
            let _ = writeln!(
                writer,
                "  {} {} {}",
                format!("{:>width$}", skipped.line, width = line_width).blue(),
                "|".blue(),
                skipped.to_string().yellow()
            );
        }
    }

    for error in &report.errors {
        let _ = writeln!(
            writer,
            "{} {}: {}",
            "warning:".bold().yellow(),
            error.path.display(),
            error.message
        );
    }

    let renames = report.rename_count();
    let files = report.changed_files();
    if renames == 0 {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!(
                "Checked {} {} - nothing to rename",
                report.files_scanned,
                plural(report.files_scanned, "file", "files")
            )
            .green()
        );
    } else if report.dry_run {
        let _ = writeln!(
            writer,
            "{} {} {} in {} {}. Run without {} to write them.",
            "Would rename".yellow().bold(),
            renames,
            plural(renames, "member", "members"),
            files,
            plural(files, "file", "files"),
            "--dry-run".cyan()
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {} {} in {} {}",
            "Renamed".green().bold(),
            renames,
            plural(renames, "member", "members"),
            files,
            plural(files, "file", "files")
        );
    }
}
