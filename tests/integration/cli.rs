//! Tests for the `launchpad` command line

use super::common::{launchpad_command, TestContext};
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    launchpad_command()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("download")
                .and(predicate::str::contains("launch"))
                .and(predicate::str::contains("remove")),
        );
}

#[test]
fn test_config_path_honors_env() {
    let ctx = TestContext::new();
    ctx.launchpad()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            ctx.config_path.to_string_lossy().to_string(),
        ));
}

#[test]
fn test_config_show_fills_defaults() {
    let ctx = TestContext::new();
    ctx.launchpad()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("update_endpoint:")
                .and(predicate::str::contains("conflict_policy: skip"))
                .and(predicate::str::contains("delete_archive_after_download: true")),
        );
}

#[test]
fn test_config_created_when_missing() {
    let ctx = TestContext::new();
    let fresh = ctx.temp.path().join("fresh").join("config.yaml");
    launchpad_command()
        .env("LAUNCHPAD_CONFIG", &fresh)
        .args(["config", "show"])
        .assert()
        .success();
    assert!(fresh.exists());
}

#[test]
fn test_status_of_missing_version() {
    let ctx = TestContext::new();
    ctx.launchpad()
        .args(["status", "1.20.0"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("not installed")
                .and(predicate::str::contains("Minecraft-1.20.0"))
                .and(predicate::str::contains("Microsoft.MinecraftUWP_8wekyb3d8bbwe")),
        );
}

#[test]
fn test_status_reports_staged_backup() {
    let ctx = TestContext::new();
    std::fs::create_dir_all(ctx.temp.path().join("TmpLocalState")).unwrap();
    std::fs::create_dir_all(ctx.temp.path().join("versions").join("Minecraft-Preview-1.21.0")).unwrap();

    ctx.launchpad()
        .args(["status", "1.21.0", "--kind", "preview"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("not installed")
                .not()
                .and(predicate::str::contains("Unrestored game data backup")),
        );
}

#[test]
fn test_unknown_kind_is_rejected() {
    let ctx = TestContext::new();
    ctx.launchpad()
        .args(["status", "1.0", "--kind", "nightly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown version kind"));
}

#[test]
fn test_download_without_identity_fails() {
    let ctx = TestContext::new();
    ctx.launchpad()
        .args(["download", "1.20.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be downloaded"));
    assert!(!ctx.temp.path().join("downloads").exists());
}

#[test]
fn test_launch_not_installed_fails() {
    let ctx = TestContext::new();
    ctx.launchpad()
        .args(["launch", "1.20.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not installed"));
}

#[test]
fn test_cleanup_with_nothing_installed() {
    let ctx = TestContext::new();
    ctx.launchpad()
        .args(["cleanup", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No installed versions to remove"));
}

#[test]
fn test_cleanup_lists_versions_before_asking() {
    let ctx = TestContext::new();
    let installed = ctx.temp.path().join("versions").join("Minecraft-1.20.0");
    std::fs::create_dir_all(&installed).unwrap();

    // Without a terminal the prompt cannot be answered, so nothing is removed.
    ctx.launchpad()
        .arg("cleanup")
        .assert()
        .failure()
        .stdout(predicate::str::contains("1.20.0").and(predicate::str::contains("Game data")));
    assert!(installed.exists());
}
