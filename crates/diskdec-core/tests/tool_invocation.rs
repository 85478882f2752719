//! What the controller actually hands to the encryption tool.
//!
//! The tool is a shell script that logs its argv and the line it reads from
//! stdin. `read -r` fails without a trailing newline, and the script then
//! exits non-zero.

#![cfg(unix)]
#![allow(clippy::unwrap_used)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use diskdec_core::controller::VolumeController;
use diskdec_core::credential::Credential;
use diskdec_core::veracrypt::{VeraCryptConfig, VeraCryptController};

const RECORDING_TOOL: &str = r#"#!/bin/sh
log="$(dirname "$0")/tool.log"
echo "ARGS $*" >> "$log"
if [ "$1" != "-u" ]; then
    read -r line || exit 7
    echo "STDIN $line" >> "$log"
fi
"#;

/// Serializes tests that write a script and then execute it.
static EXEC_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

fn install_tool(dir: &Path) -> PathBuf {
    let path = dir.join("veracrypt");
    std::fs::write(&path, RECORDING_TOOL).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn controller(program: PathBuf) -> VeraCryptController {
    VeraCryptController::new(VeraCryptConfig {
        program,
        link_path: None,
        ..VeraCryptConfig::default()
    })
}

fn logged(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("tool.log"))
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect()
}

#[tokio::test]
async fn unlock_dismounts_then_mounts_with_hash_on_stdin() {
    let _guard = EXEC_LOCK.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let ctl = controller(install_tool(dir.path()));

    let hashed = Credential::new("operator-password-1").hash();
    ctl.unlock(&hashed).await.unwrap();

    assert_eq!(
        logged(dir.path()),
        [
            "ARGS -u".to_owned(),
            "ARGS --pim=11 --stdin --non-interactive /opt/secret.vec /mnt/secret".to_owned(),
            format!("STDIN {}", hashed.expose()),
        ]
    );
}

#[tokio::test]
async fn change_sends_old_hash_on_stdin_and_new_hash_as_argument() {
    let _guard = EXEC_LOCK.lock().await;
    let dir = tempfile::tempdir().unwrap();
    let ctl = controller(install_tool(dir.path()));

    let old = Credential::new("Qwe123!@#!@#").hash();
    let new = Credential::new("operator-password-2").hash();
    ctl.change_credential(&old, &new).await.unwrap();

    assert_eq!(
        logged(dir.path()),
        [
            "ARGS -u".to_owned(),
            format!(
                "ARGS --change --pim=11 --stdin --non-interactive --new-password={} --new-pim=11 /opt/secret.vec",
                new.expose()
            ),
            format!("STDIN {}", old.expose()),
        ]
    );
}
