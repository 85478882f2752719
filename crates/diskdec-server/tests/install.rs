//! Provisioning into a scratch directory.
//!
//! The bundle's service script appends each action it receives to a log so
//! the test can see that the service was enabled and started.

#![cfg(unix)]
#![allow(clippy::unwrap_used)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use diskdec_assets::MemoryAssets;
use diskdec_server::install::{
    CONFIG_SCRIPT_ASSET, InstallConfig, SERVICE_SCRIPT_ASSET, TOOL_ASSET, run_install,
};

fn scratch_config(root: &Path) -> InstallConfig {
    InstallConfig {
        tool_path: root.join("opt/veracrypt"),
        config_script_path: root.join("tmp/uci.sh"),
        service_script_path: root.join("etc/init.d/diskdec"),
        self_path: root.join("opt/diskdec"),
        ..InstallConfig::default()
    }
}

/// Serializes tests that write a script and then execute it, so a fork in
/// one test cannot hold another test's freshly written script open.
static EXEC_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

fn mode_of(path: &Path) -> u32 {
    std::fs::metadata(path).unwrap().permissions().mode() & 0o777
}

#[tokio::test]
async fn installs_bundle_and_registers_service() {
    let _guard = EXEC_LOCK.lock().await;
    let root = tempfile::tempdir().unwrap();
    let config = scratch_config(root.path());

    let assets = MemoryAssets::new();
    assets.insert(TOOL_ASSET, b"\x7fELF fake veracrypt").await;
    assets
        .insert(
            SERVICE_SCRIPT_ASSET,
            b"#!/bin/sh\necho \"$1\" >> \"$(dirname \"$0\")/service.log\"\n",
        )
        .await;
    assets
        .insert(CONFIG_SCRIPT_ASSET, b"echo firewall configured\n")
        .await;

    run_install(&assets, &config).await.unwrap();

    assert_eq!(
        std::fs::read(&config.tool_path).unwrap(),
        b"\x7fELF fake veracrypt"
    );
    assert_eq!(mode_of(&config.tool_path), 0o700);
    assert_eq!(mode_of(&config.config_script_path), 0o700);
    assert_eq!(mode_of(&config.service_script_path), 0o700);
    assert_eq!(mode_of(&config.self_path), 0o755);

    let exe = std::env::current_exe().unwrap();
    assert_eq!(
        std::fs::metadata(&config.self_path).unwrap().len(),
        std::fs::metadata(exe).unwrap().len()
    );

    let log = std::fs::read_to_string(root.path().join("etc/init.d/service.log")).unwrap();
    assert_eq!(log, "enable\nstart\n");
}

#[tokio::test]
async fn missing_bundle_asset_writes_nothing() {
    let root = tempfile::tempdir().unwrap();
    let config = scratch_config(root.path());

    let assets = MemoryAssets::new();
    assets.insert(TOOL_ASSET, b"tool").await;
    assets.insert(CONFIG_SCRIPT_ASSET, b"true\n").await;

    let err = run_install(&assets, &config).await.unwrap_err();
    assert!(err.to_string().contains(SERVICE_SCRIPT_ASSET));
    assert!(!config.tool_path.exists());
    assert!(!config.self_path.exists());
}

#[tokio::test]
async fn failing_config_script_is_fatal() {
    let _guard = EXEC_LOCK.lock().await;
    let root = tempfile::tempdir().unwrap();
    let config = scratch_config(root.path());

    let assets = MemoryAssets::new();
    assets.insert(TOOL_ASSET, b"tool").await;
    assets.insert(SERVICE_SCRIPT_ASSET, b"#!/bin/sh\nexit 0\n").await;
    assets
        .insert(CONFIG_SCRIPT_ASSET, b"echo uci failed >&2\nexit 3\n")
        .await;

    let err = run_install(&assets, &config).await.unwrap_err();
    assert!(format!("{err:#}").contains("uci failed"));
}
