use std::{io, process::Stdio, time::Duration};

use anyhow::{Context, Result, anyhow, bail};
use tokio::{
    io::AsyncWriteExt,
    process::{ChildStdin, Command},
};

use super::{TranslateFuture, TranslationRequest, Translator};

const TARGET_PLACEHOLDER: &str = "{target}";
const SOURCE_PLACEHOLDER: &str = "{source}";

/// Translates by running an external program.
///
/// The text is written to the program's stdin and the trimmed stdout is the
/// translation. `{target}` and `{source}` in the arguments are replaced by
/// the target and source locale (an empty string when no source locale is
/// configured).
#[derive(Debug, Clone)]
pub struct CommandTranslator {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandTranslator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn expand_args(&self, request: &TranslationRequest<'_>) -> Vec<String> {
        let source = request.source.map(|l| l.as_str()).unwrap_or_default();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(TARGET_PLACEHOLDER, request.target.as_str())
                    .replace(SOURCE_PLACEHOLDER, source)
            })
            .collect()
    }

    async fn run(&self, request: TranslationRequest<'_>) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(self.expand_args(&request))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start translator command `{}`", self.program))?;

        let stdin = child
            .stdin
            .take()
            .context("Translator command has no stdin")?;
        let writer = tokio::spawn(write_input(stdin, request.text.to_owned()));

        // Input is written while the output is drained.
        let exchange = async {
            let output = child
                .wait_with_output()
                .await
                .context("Failed to wait for translator command")?;
            writer.await.context("Translator input task failed")??;
            anyhow::Ok(output)
        };
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| anyhow!("`{}` timed out after {:?}", self.program, limit))??,
            None => exchange.await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "`{}` exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            );
        }

        let stdout =
            String::from_utf8(output.stdout).context("Translator output is not valid UTF-8")?;
        let translated = stdout.trim();
        if translated.is_empty() {
            bail!("`{}` produced no output", self.program);
        }
        Ok(translated.to_string())
    }
}

/// Feed `text` to the program and close its stdin.
///
/// A program that exits without reading its input is judged by its exit
/// status and output, not by the broken pipe.
async fn write_input(mut stdin: ChildStdin, text: String) -> Result<()> {
    match stdin.write_all(text.as_bytes()).await {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        result => result.context("Failed to write to translator command"),
    }
}

impl Translator for CommandTranslator {
    fn translate<'a>(&'a self, request: TranslationRequest<'a>) -> TranslateFuture<'a> {
        Box::pin(self.run(request))
    }

    fn name(&self) -> &str {
        &self.program
    }
}
