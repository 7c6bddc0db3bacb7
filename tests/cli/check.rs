use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;

use crate::CliTest;

#[test]
fn test_check_reports_pending_units_without_writing() -> Result<()> {
    let test = CliTest::with_master()?;

    let mut cmd = test.check_command();
    cmd.args(["--locale", "de-DE"]);
    assert_cmd_snapshot!(cmd, @r"
    success: false
    exit_code: 1
    ----- stdout -----
    ✘ de-DE  2 pending (file missing)
            - greeting
            - farewell

    ✘ 2 units to translate (run xlfsync sync to translate them)

    ----- stderr -----
    ");

    assert!(!test.root().join("src/locale/messages.de-DE.xlf").exists());

    Ok(())
}

#[test]
fn test_check_after_sync_is_clean() -> Result<()> {
    let test = CliTest::with_master()?;

    let status = test
        .sync_command()
        .args(["--locale", "de-DE", "--echo"])
        .status()?;
    assert!(status.success());

    let mut cmd = test.check_command();
    cmd.args(["--locale", "de-DE"]);
    assert_cmd_snapshot!(cmd, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ de-DE  up to date
    ✓ All 1 locale up to date with src/locale/messages.xlf

    ----- stderr -----
    ");

    Ok(())
}

#[test]
fn test_check_malformed_locale_file() -> Result<()> {
    let test = CliTest::with_master()?;
    let _guard = test.snapshot_settings().bind_to_scope();
    test.write_file("src/locale/messages.de-DE.xlf", "<catalog/>")?;

    let mut cmd = test.check_command();
    cmd.args(["--locale", "de-DE"]);
    assert_cmd_snapshot!(cmd, @r"
    success: false
    exit_code: 1
    ----- stdout -----
    ✘ de-DE  parse: cannot parse src/locale/messages.de-DE.xlf: expected <xliff> as the root element, found <catalog>

    ----- stderr -----
    [ERROR]
    ");

    Ok(())
}

#[test]
fn test_check_invalid_locale_flag() -> Result<()> {
    let test = CliTest::with_master()?;

    let mut cmd = test.check_command();
    cmd.args(["--locale", "german"]);
    assert_cmd_snapshot!(cmd, @r#"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Error: Invalid locale "german": expected a language-region tag like "de-DE"
    "#);

    Ok(())
}
