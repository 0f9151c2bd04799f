//! Full download/launch/remove cycles against mocked OS services

use launchpad::core::version::{
    VersionEntry, VersionIdentity, VersionKind, RELEASE_PACKAGE_FAMILY,
};
use launchpad::core::LaunchpadError;
use launchpad::di::mocks::*;
use launchpad::di::{BrokerResponse, PackageRecord, ServiceContainer};
use launchpad::install::{InstallCoordinator, InstallationState};
use std::fs;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::FileOptions;
use zip::ZipWriter;

fn archive(marker: &str) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("AppxManifest.xml", FileOptions::default())
        .unwrap();
    zip.write_all(marker.as_bytes()).unwrap();
    zip.start_file("AppxSignature.p7x", FileOptions::default())
        .unwrap();
    zip.write_all(b"sig").unwrap();
    zip.finish().unwrap().into_inner()
}

struct Harness {
    temp: TempDir,
    _server: MockServer,
    registry: MockPackageRegistry,
    coordinator: InstallCoordinator,
}

impl Harness {
    /// Update service stub knowing the identities `v1` and `v2`
    async fn start() -> Self {
        let server = MockServer::start().await;
        for id in ["v1", "v2"] {
            Mock::given(method("POST"))
                .and(body_string_contains(format!("<UpdateID>{}</UpdateID>", id)))
                .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                    "<Envelope><FileLocation><Url>{}/files/{}.appx</Url></FileLocation></Envelope>",
                    server.uri(),
                    id
                )))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path(format!("/files/{}.appx", id)))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(archive(id)))
                .mount(&server)
                .await;
        }

        let temp = TempDir::new().unwrap();
        let mut config = MockConfigProvider::in_dir(temp.path());
        config.update_endpoint = format!("{}/secured", server.uri());
        config.trusted_download_prefix = format!("{}/files/", server.uri());

        let registry = MockPackageRegistry::new();
        registry.registers_as(RELEASE_PACKAGE_FAMILY);
        let container = ServiceContainer::with_providers(
            Arc::new(config),
            Arc::new(MockIdentityBroker::new(BrokerResponse::success("tkn"))),
            Arc::new(registry.clone()),
            Arc::new(MockAppDataStore::new(temp.path().join("Packages"))),
            Arc::new(MockProcessActivator::new()),
            Arc::new(MockConflictResolver::replacing()),
        );
        let coordinator = InstallCoordinator::new(&container).unwrap();

        Self {
            temp,
            _server: server,
            registry,
            coordinator,
        }
    }

    fn entry(&self, id: &str, name: &str) -> VersionEntry {
        VersionEntry::new(
            VersionIdentity::new(id, "1", VersionKind::Release),
            name,
            &self.temp.path().join("versions"),
        )
    }

    fn game_data(&self) -> PathBuf {
        self.temp
            .path()
            .join("Packages")
            .join(RELEASE_PACKAGE_FAMILY)
            .join("LocalState")
    }
}

#[tokio::test]
async fn test_store_install_replaced_without_losing_worlds() {
    let h = Harness::start().await;
    h.registry.add_package(
        RELEASE_PACKAGE_FAMILY,
        PackageRecord {
            full_name: "Microsoft.MinecraftUWP_1.0.0.0_x64__8wekyb3d8bbwe".to_string(),
            install_location: Some(PathBuf::from("C:/Program Files/WindowsApps/mc")),
            is_development_mode: false,
        },
    );
    let worlds = h.game_data().join("games").join("com.mojang").join("minecraftWorlds");
    fs::create_dir_all(&worlds).unwrap();
    fs::write(worlds.join("level.dat"), "my world").unwrap();

    let v1 = h.entry("v1", "1.20.0");
    h.coordinator.download(&v1).await.unwrap();
    h.coordinator.launch(&v1).await.unwrap();

    assert_eq!(fs::read_to_string(worlds.join("level.dat")).unwrap(), "my world");
    assert!(!h.coordinator.backup_slot().is_occupied());
    let packages = h.registry.packages(RELEASE_PACKAGE_FAMILY);
    assert_eq!(packages.len(), 1);
    assert!(packages[0].is_development_mode);
}

#[tokio::test]
async fn test_switch_versions_then_remove() {
    let h = Harness::start().await;
    let v1 = h.entry("v1", "1.20.0");
    let v2 = h.entry("v2", "1.20.1");

    h.coordinator.download(&v1).await.unwrap();
    h.coordinator.download(&v2).await.unwrap();
    assert_eq!(
        fs::read_to_string(v2.game_directory.join("AppxManifest.xml")).unwrap(),
        "v2"
    );

    h.coordinator.launch(&v1).await.unwrap();
    h.coordinator.launch(&v2).await.unwrap();

    let packages = h.registry.packages(RELEASE_PACKAGE_FAMILY);
    assert_eq!(packages.len(), 1);
    assert_eq!(
        packages[0].install_location.as_deref(),
        Some(v2.game_directory.as_path())
    );

    // Removing the unregistered version leaves the registered one alone.
    h.coordinator.remove(&v1).await.unwrap();
    assert!(!v1.game_directory.exists());
    assert_eq!(h.registry.packages(RELEASE_PACKAGE_FAMILY).len(), 1);

    h.coordinator.remove(&v2).await.unwrap();
    assert!(h.registry.packages(RELEASE_PACKAGE_FAMILY).is_empty());
    assert_eq!(h.coordinator.state_of(&v2).state, InstallationState::Idle);
}

#[tokio::test]
async fn test_unknown_identity_leaves_no_trace() {
    let h = Harness::start().await;
    let ghost = h.entry("does-not-exist", "0.0.0");

    match h.coordinator.download(&ghost).await {
        Err(LaunchpadError::BadIdentity { id, .. }) => assert_eq!(id, "does-not-exist"),
        other => panic!("expected BadIdentity, got {:?}", other),
    }
    assert!(!h.temp.path().join("downloads").exists());
    assert!(!ghost.game_directory.exists());
    assert!(!h.coordinator.is_state_changing(&ghost));
}

#[tokio::test]
async fn test_unrecovered_backup_blocks_store_replacement() {
    let h = Harness::start().await;
    h.registry.add_package(
        RELEASE_PACKAGE_FAMILY,
        PackageRecord {
            full_name: "store".to_string(),
            install_location: Some(PathBuf::from("C:/Program Files/WindowsApps/mc")),
            is_development_mode: false,
        },
    );
    let staged = h.coordinator.backup_slot().path().to_path_buf();
    fs::create_dir_all(&staged).unwrap();
    fs::write(staged.join("old.dat"), "unrecovered").unwrap();

    let v1 = h.entry("v1", "1.20.0");
    h.coordinator.download(&v1).await.unwrap();
    let result = h.coordinator.launch(&v1).await;

    assert!(matches!(result, Err(LaunchpadError::BackupConflict(_))));
    assert_eq!(h.registry.packages(RELEASE_PACKAGE_FAMILY)[0].full_name, "store");
    assert!(staged.join("old.dat").exists());
    assert_eq!(h.coordinator.state_of(&v1).state, InstallationState::Idle);
}

#[tokio::test]
async fn test_cleanup_clears_the_way_for_store_reinstall() {
    let h = Harness::start().await;
    let worlds = h.game_data().join("games").join("com.mojang").join("minecraftWorlds");
    fs::create_dir_all(&worlds).unwrap();
    fs::write(worlds.join("level.dat"), "my world").unwrap();

    let v1 = h.entry("v1", "1.20.0");
    let v2 = h.entry("v2", "1.20.1");
    h.coordinator.download(&v1).await.unwrap();
    h.coordinator.download(&v2).await.unwrap();
    h.coordinator.launch(&v2).await.unwrap();

    let report = h.coordinator.cleanup().await.unwrap();

    assert_eq!(report.removed.len(), 2);
    assert!(report.failed.is_empty());
    assert!(!v1.game_directory.exists());
    assert!(!v2.game_directory.exists());
    assert!(h.registry.packages(RELEASE_PACKAGE_FAMILY).is_empty());
    assert_eq!(fs::read_to_string(worlds.join("level.dat")).unwrap(), "my world");
    assert!(!h.coordinator.backup_slot().is_occupied());
    assert!(h.coordinator.installed_entries().unwrap().is_empty());
}
