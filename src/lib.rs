//! xlfsync - keep per-locale XLIFF files in sync with a master file
//!
//! The master XLIFF file (as produced by `ng extract-i18n`) is the single
//! source of truth. For every target locale, xlfsync creates the locale file
//! when it is missing, keeps existing translations, translates new units
//! through a pluggable [`translate::Translator`] and writes the units back in
//! master order.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (arguments, commands, reports)
//! - `config`: Configuration file loading and validation
//! - `locale`: Locale tags and locale file paths
//! - `logging`: `tracing` subscriber setup
//! - `privatize`: TypeScript `private` to `#private` member rewriter
//! - `sync`: Locale synchronization engine
//! - `translate`: Translator trait and built-in translators
//! - `xliff`: XLIFF 1.2 reading and byte-preserving writing

pub mod cli;
pub mod config;
pub mod locale;
pub mod logging;
pub mod privatize;
pub mod sync;
pub mod translate;
pub mod xliff;
