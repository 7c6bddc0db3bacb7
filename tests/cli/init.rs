use anyhow::{Context, Result};
use insta_cmd::assert_cmd_snapshot;
use serde_json::Value;

use crate::CliTest;

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert_eq!(
        parsed.get("master").and_then(Value::as_str),
        Some("src/locale/messages.xlf")
    );
    assert!(
        parsed.get("locales").is_some_and(Value::is_array),
        "Config should have a 'locales' list"
    );
    assert_eq!(
        parsed.get("stampTargetLanguage").and_then(Value::as_bool),
        Some(true)
    );
    assert!(
        content.contains("\n  \""),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let mut cmd = test.command();
    cmd.arg("init");
    assert_cmd_snapshot!(cmd, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Created .xlfsyncrc.json
    Set master and locales to match your project, then run xlfsync sync.

    ----- stderr -----
    ");

    let content = test.read_file(".xlfsyncrc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".xlfsyncrc.json", "{}")?;

    let mut cmd = test.command();
    cmd.arg("init");
    assert_cmd_snapshot!(cmd, @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    Error: .xlfsyncrc.json already exists
    ");

    assert_eq!(test.read_file(".xlfsyncrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_no_command_prints_help() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    Keep XLIFF locale files in sync with a master file and convert TypeScript private members

    Usage: xlfsync [COMMAND]

    Commands:
      sync       Translate missing units and write every locale file
      check      Report missing translations without changing any file
      privatize  Convert TypeScript `private` members to `#private` members
      init       Initialize a new .xlfsyncrc.json configuration file
      help       Print this message or the help of the given subcommand(s)

    Options:
      -h, --help     Print help
      -V, --version  Print version

    ----- stderr -----
    ");

    Ok(())
}
