//! Pluggable translation backends.
//!
//! The synchronizer only knows the [`Translator`] trait. Implementations:
//!
//! - [`FnTranslator`]: wraps an async closure (library callers, tests)
//! - [`EchoTranslator`]: copies the source text verbatim
//! - [`CommandTranslator`]: pipes text through an external program

mod command;

pub use command::CommandTranslator;

use std::{future::Future, pin::Pin};

use anyhow::Result;

use crate::locale::Locale;

/// Boxed future returned by [`Translator::translate`].
pub type TranslateFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// One piece of text to translate.
#[derive(Debug, Clone, Copy)]
pub struct TranslationRequest<'a> {
    pub text: &'a str,
    pub target: &'a Locale,
    pub source: Option<&'a Locale>,
}

/// Turns source text into text for the target locale.
///
/// Calls for one locale are issued concurrently, so implementations must be
/// usable from several tasks at once.
pub trait Translator: Send + Sync {
    fn translate<'a>(&'a self, request: TranslationRequest<'a>) -> TranslateFuture<'a>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "custom"
    }
}

/// Adapter for an async closure `(text, target, source) -> Result<String>`.
pub struct FnTranslator<F> {
    func: F,
}

/// Build a translator from an async closure.
///
/// ```
/// use xlfsync::translate::{Translator, from_fn};
///
/// let shout = from_fn(|text: String, _target, _source| async move {
///     anyhow::Ok(text.to_uppercase())
/// });
/// assert_eq!(shout.name(), "custom");
/// ```
pub fn from_fn<F, Fut>(func: F) -> FnTranslator<F>
where
    F: Fn(String, Locale, Option<Locale>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    FnTranslator { func }
}

impl<F, Fut> Translator for FnTranslator<F>
where
    F: Fn(String, Locale, Option<Locale>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    fn translate<'a>(&'a self, request: TranslationRequest<'a>) -> TranslateFuture<'a> {
        Box::pin((self.func)(
            request.text.to_string(),
            request.target.clone(),
            request.source.cloned(),
        ))
    }
}

/// Returns the source text unchanged.
///
/// Useful to seed new locale files before real translations exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoTranslator;

impl Translator for EchoTranslator {
    fn translate<'a>(&'a self, request: TranslationRequest<'a>) -> TranslateFuture<'a> {
        let text = request.text.to_string();
        Box::pin(async move { Ok(text) })
    }

    fn name(&self) -> &str {
        "echo"
    }
}
