use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;

use crate::CliTest;

const COUNTER: &str = r#"export class Counter {
  private count = 0;

  public increment() {
    this.count++;
  }
}
"#;

#[test]
fn test_privatize_rewrites_files() -> Result<()> {
    let test = CliTest::with_file("src/app/counter.ts", COUNTER)?;
    test.write_file("src/app/plain.ts", "export const answer = 42;\n")?;

    let mut cmd = test.privatize_command();
    cmd.arg("src");
    assert_cmd_snapshot!(cmd, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    src/app/counter.ts
      2 | 'private count' -> '#count'
      4 | 'public increment' -> 'increment'
    Renamed 2 members in 1 file

    ----- stderr -----
    ");

    assert_eq!(
        test.read_file("src/app/counter.ts")?,
        r#"export class Counter {
  #count = 0;

  increment() {
    this.#count++;
  }
}
"#
    );
    assert_eq!(
        test.read_file("src/app/plain.ts")?,
        "export const answer = 42;\n"
    );

    Ok(())
}

#[test]
fn test_privatize_dry_run() -> Result<()> {
    let test = CliTest::with_file("counter.ts", COUNTER)?;

    let mut cmd = test.privatize_command();
    cmd.args(["counter.ts", "--dry-run"]);
    assert_cmd_snapshot!(cmd, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    counter.ts
      2 | 'private count' -> '#count'
      4 | 'public increment' -> 'increment'
    Would rename 2 members in 1 file. Run without --dry-run to write them.

    ----- stderr -----
    ");

    assert_eq!(test.read_file("counter.ts")?, COUNTER);

    Ok(())
}

#[test]
fn test_privatize_keeps_members_read_through_other_objects() -> Result<()> {
    let money = r#"export class Money {
  private amount = 0;

  equals(other: Money) {
    return this.amount === other.amount;
  }
}
"#;
    let test = CliTest::with_file("src/money.ts", money)?;
    let _guard = test.snapshot_settings().bind_to_scope();

    let mut cmd = test.privatize_command();
    cmd.arg("src");
    assert_cmd_snapshot!(cmd, @r"
    success: true
    exit_code: 0
    ----- stdout -----
    src/money.ts
      2 | 'private amount' kept: accessed outside `this`
    ✓ Checked 1 file - nothing to rename

    ----- stderr -----
    [WARN]
    ");

    assert_eq!(test.read_file("src/money.ts")?, money);

    Ok(())
}

#[test]
fn test_privatize_reports_unparsable_files() -> Result<()> {
    let test = CliTest::with_file("src/counter.ts", COUNTER)?;
    test.write_file("src/broken.ts", "class {")?;
    let mut settings = test.snapshot_settings();
    settings.add_filter(r"Failed to parse (\S+): .*", "Failed to parse $1: [MESSAGE]");
    let _guard = settings.bind_to_scope();

    let mut cmd = test.privatize_command();
    cmd.arg("src");
    assert_cmd_snapshot!(cmd, @r"
    success: false
    exit_code: 1
    ----- stdout -----
    src/counter.ts
      2 | 'private count' -> '#count'
      4 | 'public increment' -> 'increment'
    warning: src/broken.ts: Failed to parse src/broken.ts: [MESSAGE]
    Renamed 2 members in 1 file

    ----- stderr -----
    [WARN]
    ");

    assert!(test.read_file("src/counter.ts")?.contains("#count = 0;"));

    Ok(())
}

#[test]
fn test_privatize_missing_path() -> Result<()> {
    let test = CliTest::new()?;

    let mut cmd = test.privatize_command();
    cmd.arg("nowhere");
    assert_cmd_snapshot!(cmd, @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Error: Path does not exist: nowhere
    ");

    Ok(())
}
