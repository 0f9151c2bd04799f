use crate::core::{LaunchpadError, LaunchpadResult};
use crate::di::{DeploymentOptions, PackageRecord, PackageRegistry, ProcessActivator, RemovalOptions};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

const POWERSHELL: &str = "powershell";

/// Package registry driven through the Appx PowerShell cmdlets
#[derive(Debug, Default)]
pub struct PowerShellRegistry;

impl PowerShellRegistry {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AppxPackage {
    full_name: String,
    #[serde(default)]
    install_location: Option<String>,
    #[serde(default)]
    is_development_mode: bool,
}

/// `ConvertTo-Json` prints a bare object for a single result
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<AppxPackage>),
    One(AppxPackage),
}

/// Quote a value as a single-quoted PowerShell string
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn find_script(family: &str) -> String {
    format!(
        "Get-AppxPackage -PackageFamilyName {} | ForEach-Object {{ [pscustomobject]@{{ \
         FullName = $_.PackageFullName; InstallLocation = $_.InstallLocation; \
         IsDevelopmentMode = $_.IsDevelopmentMode }} }} | ConvertTo-Json -Compress",
        quote(family)
    )
}

fn register_script(manifest: &Path, options: DeploymentOptions) -> String {
    let mut script = format!(
        "Add-AppxPackage -Register {}",
        quote(&manifest.to_string_lossy())
    );
    if !options.development_mode {
        script.push_str(" -DisableDevelopmentMode");
    }
    script
}

fn remove_script(full_name: &str, options: RemovalOptions) -> String {
    let mut script = format!("Remove-AppxPackage -Package {}", quote(full_name));
    if options.preserve_application_data {
        script.push_str(" -PreserveApplicationData");
    }
    script
}

fn parse_packages(json: &str) -> LaunchpadResult<Vec<PackageRecord>> {
    let json = json.trim();
    if json.is_empty() {
        return Ok(Vec::new());
    }

    let packages = match serde_json::from_str::<OneOrMany>(json)? {
        OneOrMany::Many(packages) => packages,
        OneOrMany::One(package) => vec![package],
    };
    Ok(packages
        .into_iter()
        .map(|p| PackageRecord {
            full_name: p.full_name,
            install_location: p
                .install_location
                .filter(|l| !l.is_empty())
                .map(PathBuf::from),
            is_development_mode: p.is_development_mode,
        })
        .collect())
}

async fn run_script(script: &str) -> LaunchpadResult<String> {
    debug!("powershell: {}", script);
    let output = Command::new(POWERSHELL)
        .args(["-NoProfile", "-NonInteractive", "-Command", script])
        .output()
        .await
        .map_err(|e| LaunchpadError::PackageOperation(format!("Failed to run PowerShell: {}", e)))?;

    if !output.status.success() {
        return Err(LaunchpadError::PackageOperation(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[async_trait]
impl PackageRegistry for PowerShellRegistry {
    async fn find_packages(&self, family: &str) -> LaunchpadResult<Vec<PackageRecord>> {
        let stdout = run_script(&find_script(family)).await?;
        parse_packages(&stdout)
    }

    async fn register_package(
        &self,
        manifest: &Path,
        options: DeploymentOptions,
    ) -> LaunchpadResult<()> {
        run_script(&register_script(manifest, options)).await?;
        Ok(())
    }

    async fn remove_package(
        &self,
        full_name: &str,
        options: RemovalOptions,
    ) -> LaunchpadResult<()> {
        run_script(&remove_script(full_name, options)).await?;
        Ok(())
    }
}

/// Starts a package's app through its shell application id
#[derive(Debug, Default)]
pub struct ShellActivator;

impl ShellActivator {
    pub fn new() -> Self {
        Self
    }
}

fn app_target(family: &str) -> String {
    format!("shell:AppsFolder\\{}!App", family)
}

#[async_trait]
impl ProcessActivator for ShellActivator {
    async fn activate(&self, family: &str) -> LaunchpadResult<()> {
        let target = app_target(family);
        debug!("Activating {}", target);
        // explorer.exe reports a non-zero status even when activation succeeds.
        Command::new("explorer.exe")
            .arg(&target)
            .status()
            .await
            .map_err(|e| {
                LaunchpadError::PackageOperation(format!("Failed to activate {}: {}", family, e))
            })?;
        Ok(())
    }
}
