use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// `<tmp>/home` is both `$HOME` and the watched root; state, config and
/// backups live beside it.
struct Sandbox {
    temp_dir: TempDir,
    home: PathBuf,
}

impl Sandbox {
    fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let home = temp_dir.path().canonicalize()?.join("home");
        fs::create_dir_all(&home)?;

        let backups = temp_dir.path().join("backups");
        fs::write(
            temp_dir.path().join("config.toml"),
            format!("[core]\nbackup_parent = {:?}\n", backups.display().to_string()),
        )?;

        Ok(Self { temp_dir, home })
    }

    fn state_path(&self) -> PathBuf {
        self.temp_dir.path().join("state.json")
    }

    fn sws(&self) -> Result<Command> {
        let mut cmd = Command::cargo_bin("sws")?;
        cmd.env("HOME", &self.home)
            .env("SWS_ROOT", &self.home)
            .env("SWS_STATE_PATH", self.state_path())
            .env("SWS_CONFIG_PATH", self.temp_dir.path().join("config.toml"))
            .env("NO_COLOR", "1")
            .env_remove("SWS_LOG");
        Ok(cmd)
    }

    fn file(&self, relative: &str) -> PathBuf {
        self.home.join(relative)
    }
}

fn write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

#[test]
fn test_start_reports_tracked_files() -> Result<()> {
    let sb = Sandbox::new()?;
    write(&sb.file("notes.txt"), "A")?;
    write(&sb.file("docs/plan.md"), "plan")?;

    sb.sws()?
        .arg("start")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Secure workspace started - tracking 2 files",
        ));

    assert!(sb.state_path().exists());
    Ok(())
}

#[test]
fn test_stop_without_session_fails() -> Result<()> {
    let sb = Sandbox::new()?;

    sb.sws()?
        .args(["stop", "--discard-all"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: No active session"));
    Ok(())
}

#[test]
fn test_start_then_discard_all() -> Result<()> {
    let sb = Sandbox::new()?;
    write(&sb.file("notes.txt"), "A")?;

    sb.sws()?.arg("start").assert().success();

    write(&sb.file("notes.txt"), "AB")?;
    write(&sb.file("scratch.tmp"), "new")?;

    sb.sws()?
        .args(["stop", "--discard-all"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Removed"))
        .stderr(predicate::str::contains("1 new file"))
        .stderr(predicate::str::contains("1 modified file"))
        .stderr(predicate::str::contains("Secure workspace stopped successfully"));

    assert_eq!(fs::read_to_string(sb.file("notes.txt"))?, "A");
    assert!(!sb.file("scratch.tmp").exists());
    assert!(!sb.state_path().exists());
    Ok(())
}

#[test]
fn test_stop_with_preserve_keeps_file() -> Result<()> {
    let sb = Sandbox::new()?;
    write(&sb.file("notes.txt"), "A")?;

    sb.sws()?.arg("start").assert().success();
    write(&sb.file("scratch.tmp"), "keep")?;

    sb.sws()?
        .args(["stop", "--preserve", "scratch.tmp"])
        .assert()
        .success()
        .stderr(predicate::str::contains("+ scratch.tmp"));

    assert_eq!(fs::read_to_string(sb.file("scratch.tmp"))?, "keep");
    Ok(())
}

#[test]
fn test_interactive_stop_reads_selection() -> Result<()> {
    let sb = Sandbox::new()?;
    write(&sb.file("notes.txt"), "A")?;

    sb.sws()?.arg("start").assert().success();
    write(&sb.file("a.new"), "1")?;
    write(&sb.file("b.new"), "2")?;
    write(&sb.file("notes.txt"), "AB")?;

    // Keep b.new, then refuse to keep the modification
    sb.sws()?
        .arg("stop")
        .write_stdin("2\nq\nnone\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("The following new files were detected:"))
        .stderr(predicate::str::contains("The following modified files were detected:"));

    assert!(!sb.file("a.new").exists());
    assert!(sb.file("b.new").exists());
    assert_eq!(fs::read_to_string(sb.file("notes.txt"))?, "A");
    Ok(())
}

#[test]
fn test_enter_after_picks_keeps_them() -> Result<()> {
    let sb = Sandbox::new()?;
    write(&sb.file("notes.txt"), "A")?;

    sb.sws()?.arg("start").assert().success();
    write(&sb.file("a.new"), "1")?;
    write(&sb.file("b.new"), "2")?;

    sb.sws()?.arg("stop").write_stdin("1\n\n").assert().success();

    assert!(sb.file("a.new").exists());
    assert!(!sb.file("b.new").exists());
    Ok(())
}

#[test]
fn test_clean_stop() -> Result<()> {
    let sb = Sandbox::new()?;
    write(&sb.file("notes.txt"), "A")?;

    sb.sws()?.arg("start").assert().success();
    sb.sws()?
        .arg("stop")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "No changes detected - workspace is clean",
        ));
    Ok(())
}

#[test]
fn test_status_lists_changes_without_applying() -> Result<()> {
    let sb = Sandbox::new()?;
    write(&sb.file("notes.txt"), "A")?;
    write(&sb.file("old.txt"), "old")?;

    sb.sws()?.arg("start").assert().success();
    fs::remove_file(sb.file("old.txt"))?;
    write(&sb.file("scratch.tmp"), "new")?;

    sb.sws()?
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("+ scratch.tmp"))
        .stdout(predicate::str::contains("- old.txt"));

    sb.sws()?
        .args(["status", "--short"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 new"))
        .stdout(predicate::str::contains("0 modified"))
        .stdout(predicate::str::contains("1 deleted"));

    assert!(sb.file("scratch.tmp").exists());
    assert!(sb.state_path().exists());
    Ok(())
}

#[test]
fn test_quiet_start_prints_nothing() -> Result<()> {
    let sb = Sandbox::new()?;
    write(&sb.file("notes.txt"), "A")?;

    sb.sws()?
        .args(["--quiet", "start"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
    Ok(())
}

#[test]
fn test_missing_root_fails() -> Result<()> {
    let sb = Sandbox::new()?;

    sb.sws()?
        .args(["--root"])
        .arg(sb.temp_dir.path().join("nope"))
        .arg("start")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Watched root unavailable"));
    Ok(())
}

#[test]
fn test_completion_needs_no_session() -> Result<()> {
    let sb = Sandbox::new()?;

    sb.sws()?
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sws"));
    Ok(())
}
