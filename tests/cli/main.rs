use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Ok, Result};
use insta::Settings;
use insta_cmd::get_cargo_bin;
use tempfile::TempDir;

mod check;
mod init;
mod privatize;
mod sync;

const BIN_NAME: &str = "xlfsync";

/// Master file with two units, as written by `ng extract-i18n`.
pub const MASTER: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<xliff version="1.2" xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file source-language="en-US" datatype="plaintext" original="ng2.template">
    <body>
      <trans-unit id="greeting" datatype="html">
        <source>Hello</source>
      </trans-unit>
      <trans-unit id="farewell" datatype="html">
        <source>Bye</source>
      </trans-unit>
    </body>
  </file>
</xliff>
"#;

pub struct CliTest {
    _temp_dir: TempDir,
    project_dir: PathBuf,
}

impl CliTest {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().canonicalize()?;
        // Stop the config file search at the project root
        fs::create_dir(project_dir.join(".git"))?;
        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    pub fn with_file(path: &str, content: &str) -> Result<Self> {
        let test = Self::new()?;
        test.write_file(path, content)?;
        Ok(test)
    }

    /// Project with [`MASTER`] at `src/locale/messages.xlf`.
    pub fn with_master() -> Result<Self> {
        Self::with_file("src/locale/messages.xlf", MASTER)
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.project_dir.join(path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory:{}", parent.display()))?;
        }

        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.project_dir
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(get_cargo_bin(BIN_NAME));
        cmd.current_dir(&self.project_dir);
        cmd.env_clear();
        cmd.env("NO_COLOR", "1"); // Disable colors for consistent test output
        if let Some(path) = std::env::var_os("PATH") {
            cmd.env("PATH", path); // Translator programs are looked up on PATH
        }
        cmd
    }

    pub fn sync_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("sync");
        cmd
    }

    pub fn check_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("check");
        cmd
    }

    pub fn privatize_command(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("privatize");
        cmd
    }

    /// Snapshot settings hiding the temp directory and log timestamps.
    ///
    /// Bind them for the rest of a test with
    /// `let _guard = test.snapshot_settings().bind_to_scope();`.
    pub fn snapshot_settings(&self) -> Settings {
        let mut settings = Settings::clone_current();
        settings.add_filter(&regex::escape(&self.project_dir.to_string_lossy()), "[TEMP]");
        settings.add_filter(r"(?m)^\S+\s+(ERROR|WARN|INFO|DEBUG)\s.*$", "[${1}]");
        settings
    }

    pub fn read_file(&self, path: &str) -> Result<String> {
        let file_path = self.project_dir.join(path);
        fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))
    }
}
