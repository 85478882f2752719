//! One-time device provisioning for `diskdec install`.
//!
//! Installs the encryption tool, the service script, and this binary from
//! the provisioning bundle, registers and starts the service, then applies
//! the network/firewall configuration script. This is not part of request
//! handling; it runs once on a fresh device.
//!
//! The bundle lives in the asset provider:
//!
//! | asset | installed to | mode |
//! |---|---|---|
//! | `bundle/veracrypt` | `DISKDEC_TOOL` (`/opt/veracrypt`) | `0700` |
//! | `bundle/uci.sh` | `/tmp/uci.sh` | `0700` |
//! | `bundle/diskdec.init` | `/etc/init.d/diskdec` | `0700` |
//! | current executable | `/opt/diskdec` | `0755` |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::{info, warn};

use diskdec_assets::AssetProvider;
use diskdec_core::veracrypt::DEFAULT_PROGRAM;

/// Bundle asset holding the encryption tool binary.
pub const TOOL_ASSET: &str = "bundle/veracrypt";
/// Bundle asset holding the network/firewall configuration script.
pub const CONFIG_SCRIPT_ASSET: &str = "bundle/uci.sh";
/// Bundle asset holding the init-style service script.
pub const SERVICE_SCRIPT_ASSET: &str = "bundle/diskdec.init";

/// Destination paths for provisioning.
#[derive(Debug, Clone)]
pub struct InstallConfig {
    /// Where the encryption tool is written.
    pub tool_path: PathBuf,
    /// Where the configuration script is written before it runs.
    pub config_script_path: PathBuf,
    /// Where the service script is written.
    pub service_script_path: PathBuf,
    /// Where this executable is copied.
    pub self_path: PathBuf,
    /// Shell used to run the configuration script.
    pub shell: PathBuf,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            tool_path: PathBuf::from(DEFAULT_PROGRAM),
            config_script_path: PathBuf::from("/tmp/uci.sh"),
            service_script_path: PathBuf::from("/etc/init.d/diskdec"),
            self_path: PathBuf::from("/opt/diskdec"),
            shell: PathBuf::from("/bin/sh"),
        }
    }
}

/// Provision the device.
///
/// All bundle assets are read before anything is written, so a missing
/// asset leaves the system untouched.
///
/// # Errors
///
/// Returns `Err` if a bundle asset is missing, a file cannot be written,
/// or the configuration script fails. Service registration failures are
/// logged and ignored.
pub async fn run_install(assets: &dyn AssetProvider, config: &InstallConfig) -> Result<()> {
    let tool = assets.require(TOOL_ASSET).await?;
    let config_script = assets.require(CONFIG_SCRIPT_ASSET).await?;
    let service_script = assets.require(SERVICE_SCRIPT_ASSET).await?;

    write_file(&config.tool_path, &tool, 0o700).await?;
    info!(path = %config.tool_path.display(), "encryption tool installed");

    write_file(&config.config_script_path, &config_script, 0o700).await?;
    info!(path = %config.config_script_path.display(), "configuration script written");

    write_file(&config.service_script_path, &service_script, 0o700).await?;
    info!(path = %config.service_script_path.display(), "service script installed");

    install_self(&config.self_path).await?;
    info!(path = %config.self_path.display(), "diskdec binary installed");

    for action in ["enable", "start"] {
        run_service_action(&config.service_script_path, action).await;
    }

    let output = Command::new(&config.shell)
        .arg(&config.config_script_path)
        .output()
        .await
        .with_context(|| format!("failed to run {}", config.config_script_path.display()))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "{} failed with {}: {}{}",
            config.config_script_path.display(),
            output.status,
            stdout,
            stderr
        );
    }
    info!(output = %stdout.trim_end(), "network and firewall configuration applied");

    Ok(())
}

/// Write `bytes` to `path` and set its permission bits.
async fn write_file(path: &Path, bytes: &[u8], mode: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    set_mode(path, mode).await
}

/// Copy the running executable to `dest`.
async fn install_self(dest: &Path) -> Result<()> {
    let exe = std::env::current_exe().context("failed to locate current executable")?;
    let bytes = tokio::fs::read(&exe)
        .await
        .with_context(|| format!("failed to read {}", exe.display()))?;
    write_file(dest, &bytes, 0o755).await
}

async fn run_service_action(script: &Path, action: &str) {
    match Command::new(script).arg(action).status().await {
        Ok(status) if status.success() => info!(action, "service action succeeded"),
        Ok(status) => warn!(action, %status, "service action failed"),
        Err(e) => warn!(action, error = %e, "service action could not run"),
    }
}

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .await
        .with_context(|| format!("failed to set permissions {mode:o} on {}", path.display()))
}

#[cfg(not(unix))]
async fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}
