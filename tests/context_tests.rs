mod common;

use anyhow::Result;
use common::TestWorkspace;
use secure_workspace::WorkspaceContext;
use secure_workspace::commands::{start, status, stop};
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

#[test]
#[serial]
fn test_context_reads_config_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let home = temp_dir.path().join("home");
    let config_path = temp_dir.path().join("config.toml");
    fs::create_dir(&home)?;
    fs::write(
        &config_path,
        format!(
            "[core]\nwatched_root = {:?}\nstate_path = {:?}\nmmap_threshold = 4096\n\n[filter]\nextra_patterns = [\"secrets\"]\n",
            home.display().to_string(),
            temp_dir.path().join("state.json").display().to_string(),
        ),
    )?;

    unsafe {
        std::env::set_var("SWS_CONFIG_PATH", &config_path);
    }
    let ctx = WorkspaceContext::new(None, None);
    unsafe {
        std::env::remove_var("SWS_CONFIG_PATH");
    }
    let ctx = ctx?;

    assert_eq!(ctx.watched_root, home);
    assert_eq!(ctx.state_path, temp_dir.path().join("state.json"));
    assert_eq!(ctx.config.core.mmap_threshold, 4096);
    assert!(
        ctx.config
            .filter
            .extra_patterns
            .contains(&"secrets".to_string())
    );
    Ok(())
}

#[test]
#[serial]
fn test_overrides_beat_config() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[core]\nwatched_root = \"/from/config\"\n")?;

    unsafe {
        std::env::set_var("SWS_CONFIG_PATH", &config_path);
    }
    let ctx = WorkspaceContext::new(
        Some(temp_dir.path().to_path_buf()),
        Some(temp_dir.path().join("override.json")),
    );
    unsafe {
        std::env::remove_var("SWS_CONFIG_PATH");
    }
    let ctx = ctx?;

    assert_eq!(ctx.watched_root, temp_dir.path());
    assert_eq!(ctx.state_path, temp_dir.path().join("override.json"));
    Ok(())
}

#[test]
#[serial]
fn test_invalid_config_is_an_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[core]\nmmap_threshold = 0\n")?;

    unsafe {
        std::env::set_var("SWS_CONFIG_PATH", &config_path);
    }
    let result = WorkspaceContext::new(Some(temp_dir.path().to_path_buf()), None);
    unsafe {
        std::env::remove_var("SWS_CONFIG_PATH");
    }

    assert!(result.is_err());
    Ok(())
}

#[test]
fn test_commands_round_trip_through_context() -> Result<()> {
    let tw = TestWorkspace::new()?;
    tw.write("notes.txt", "A")?;
    let ctx = tw.context();

    start::execute(&ctx)?;
    assert!(tw.state_path.exists());

    tw.write("notes.txt", "changed")?;
    tw.write("scratch.tmp", "keep")?;
    status::execute(&ctx, true)?;

    stop::execute(
        &ctx,
        stop::StopMode::Preserve(vec!["scratch.tmp".into()]),
    )?;
    assert_eq!(tw.read("notes.txt")?, "A");
    assert_eq!(tw.read("scratch.tmp")?, "keep");
    assert!(!tw.state_path.exists());
    assert_eq!(tw.backup_dirs()?, 0);
    Ok(())
}

#[test]
fn test_status_without_session_fails() -> Result<()> {
    let tw = TestWorkspace::new()?;
    assert!(status::execute(&tw.context(), false).is_err());
    Ok(())
}
