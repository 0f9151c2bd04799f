//! Common utilities for integration tests

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// Isolated environment: config file and every data directory in a tempdir
pub struct TestContext {
    pub temp: TempDir,
    pub config_path: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config").join("config.yaml");
        std::fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        std::fs::write(
            &config_path,
            format!(
                "versions_dir: {}\ndownload_dir: {}\nbackup_staging_dir: {}\nconflict_policy: skip\n",
                temp.path().join("versions").display(),
                temp.path().join("downloads").display(),
                temp.path().join("TmpLocalState").display(),
            ),
        )
        .unwrap();

        Self { temp, config_path }
    }

    pub fn launchpad(&self) -> Command {
        let mut cmd = launchpad_command();
        cmd.env("LAUNCHPAD_CONFIG", &self.config_path);
        cmd
    }
}

pub fn launchpad_command() -> Command {
    Command::new(env!("CARGO_BIN_EXE_launchpad"))
}
