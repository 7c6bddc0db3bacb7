use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;

use crate::{CliTest, MASTER};

const DE_PATH: &str = "src/locale/messages.de-DE.xlf";

#[test]
fn test_sync_creates_missing_locale_file() -> Result<()> {
    let test = CliTest::with_master()?;

    let mut cmd = test.sync_command();
    cmd.args(["--locale", "de-DE", "--echo"]);
    assert_cmd_snapshot!(cmd, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ de-DE  src/locale/messages.de-DE.xlf  2 translated, 0 kept, created
    ✓ Synchronized 1 locale with src/locale/messages.xlf (2 units, 2 translated)

    ----- stderr -----
    ");

    let written = test.read_file(DE_PATH)?;
    assert!(written.contains("<target>Hello</target>"));
    assert!(written.contains("<target>Bye</target>"));
    assert!(written.contains(r#"target-language="de-DE""#));
    assert_eq!(test.read_file("src/locale/messages.xlf")?, MASTER);

    Ok(())
}

#[test]
fn test_sync_twice_is_idempotent() -> Result<()> {
    let test = CliTest::with_master()?;

    let status = test
        .sync_command()
        .args(["--locale", "de-DE", "--echo"])
        .status()?;
    assert!(status.success());
    let first = test.read_file(DE_PATH)?;

    let mut cmd = test.sync_command();
    cmd.args(["--locale", "de-DE", "--echo"]);
    assert_cmd_snapshot!(cmd, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ de-DE  src/locale/messages.de-DE.xlf  0 translated, 2 kept
    ✓ Synchronized 1 locale with src/locale/messages.xlf (2 units, 0 translated)

    ----- stderr -----
    ");
    assert_eq!(test.read_file(DE_PATH)?, first);

    Ok(())
}

#[test]
fn test_sync_keeps_existing_translations() -> Result<()> {
    let test = CliTest::with_master()?;
    test.write_file(
        DE_PATH,
        &MASTER.replace(
            "<source>Bye</source>",
            "<source>Bye</source>\n        <target>Tschüss</target>",
        ),
    )?;

    let mut cmd = test.sync_command();
    cmd.args(["--locale", "de-DE", "--echo"]);
    assert_cmd_snapshot!(cmd, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ de-DE  src/locale/messages.de-DE.xlf  1 translated, 1 kept
    ✓ Synchronized 1 locale with src/locale/messages.xlf (2 units, 1 translated)

    ----- stderr -----
    ");

    let written = test.read_file(DE_PATH)?;
    assert!(written.contains("<target>Tschüss</target>"));
    assert!(written.contains("<target>Hello</target>"));

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_sync_with_translator_command_and_explicit_path() -> Result<()> {
    let test = CliTest::with_master()?;

    let mut cmd = test.sync_command();
    cmd.args([
        "--locale",
        "fr-FR=i18n/fr.xlf",
        "--translator-command",
        "sh",
        "--translator-arg",
        "-c",
        "--translator-arg",
        r#"printf '[%s] ' "$1"; cat"#,
        "--translator-arg",
        "sh",
        "--translator-arg",
        "{target}",
    ]);
    assert_cmd_snapshot!(cmd, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ fr-FR  i18n/fr.xlf  2 translated, 0 kept, created
    ✓ Synchronized 1 locale with src/locale/messages.xlf (2 units, 2 translated)

    ----- stderr -----
    ");

    let written = test.read_file("i18n/fr.xlf")?;
    assert!(written.contains("<target>[fr-FR] Hello</target>"));
    assert!(written.contains("<target>[fr-FR] Bye</target>"));

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_sync_from_config_file() -> Result<()> {
    let test = CliTest::with_master()?;
    let _guard = test.snapshot_settings().bind_to_scope();
    test.write_file(
        ".xlfsyncrc.json",
        r#"{
          "sourceLocale": "en-US",
          "locales": [{ "locale": "de-DE" }, { "locale": "it-IT", "path": "out/it.xlf" }],
          "translator": { "command": "sh", "args": ["-c", "printf '%s:' \"$1\"; cat", "sh", "{source}"] },
          "stampTargetLanguage": false
        }"#,
    )?;

    assert_cmd_snapshot!(test.sync_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ de-DE  [TEMP]/src/locale/messages.de-DE.xlf  2 translated, 0 kept, created
    ✓ it-IT  [TEMP]/out/it.xlf  2 translated, 0 kept, created
    ✓ Synchronized 2 locales with [TEMP]/src/locale/messages.xlf (2 units, 4 translated)

    ----- stderr -----
    ");

    let de = test.read_file(DE_PATH)?;
    assert!(de.contains("<target>en-US:Hello</target>"));
    assert!(!de.contains("target-language"));
    assert!(test.read_file("out/it.xlf")?.contains("<target>en-US:Bye</target>"));

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_sync_failing_translator_exits_with_failure() -> Result<()> {
    let test = CliTest::with_master()?;
    let _guard = test.snapshot_settings().bind_to_scope();

    let mut cmd = test.sync_command();
    cmd.args([
        "--locale",
        "de-DE",
        "--translator-command",
        "sh",
        "--translator-arg",
        "-c",
        "--translator-arg",
        "cat >/dev/null; echo 'service down' >&2; exit 1",
    ]);
    assert_cmd_snapshot!(cmd, @r#"
    success: false
    exit_code: 1
    ----- stdout -----
    ✘ de-DE  src/locale/messages.de-DE.xlf  translation: translating "greeting" to de-DE failed: `sh` exited with exit status: 1: service down

    ✘ 1 of 1 locale failed

    ----- stderr -----
    [ERROR]
    "#);

    // The fresh copy of the master is left in place
    assert_eq!(test.read_file(DE_PATH)?, MASTER);

    Ok(())
}

#[test]
fn test_sync_locale_on_master_path_is_an_error() -> Result<()> {
    let test = CliTest::with_master()?;

    let mut cmd = test.sync_command();
    cmd.args(["--locale", "de-DE=src/locale/messages.xlf", "--echo"]);
    assert_cmd_snapshot!(cmd, @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Error: Locale de-DE uses src/locale/messages.xlf which is the master file
    ");

    assert_eq!(test.read_file("src/locale/messages.xlf")?, MASTER);

    Ok(())
}

#[test]
fn test_sync_missing_master_is_an_error() -> Result<()> {
    let test = CliTest::new()?;

    let mut cmd = test.sync_command();
    cmd.args(["--locale", "de-DE", "--echo"]);
    assert_cmd_snapshot!(cmd, @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Error: cannot access src/locale/messages.xlf: No such file or directory (os error 2)
    ");

    assert!(!test.root().join(DE_PATH).exists());

    Ok(())
}

#[test]
fn test_sync_without_locales_is_an_error() -> Result<()> {
    let test = CliTest::with_master()?;

    let mut cmd = test.sync_command();
    cmd.arg("--echo");
    assert_cmd_snapshot!(cmd, @r#"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Error: No target locales. Pass --locale or add "locales" to .xlfsyncrc.json
    "#);

    Ok(())
}

#[test]
fn test_sync_without_translator_is_an_error() -> Result<()> {
    let test = CliTest::with_master()?;

    let mut cmd = test.sync_command();
    cmd.args(["--locale", "de-DE"]);
    assert_cmd_snapshot!(cmd, @r#"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Error: No translator configured. Pass --translator-command or --echo, or add "translator" to .xlfsyncrc.json
    "#);

    Ok(())
}
