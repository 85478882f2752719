//! Server configuration for `diskdec`.
//!
//! Loads configuration from environment variables with defaults matching a
//! stock device image. All settings can be overridden via `DISKDEC_*`
//! environment variables; unparsable values fall back to the default.

use std::net::SocketAddr;
use std::path::PathBuf;

use diskdec_core::gate::{DEFAULT_MIN_LENGTH, DEFAULT_RESERVED_PASSWORD, GatePolicy};
use diskdec_core::veracrypt::{
    DEFAULT_LINK_PATH, DEFAULT_MOUNT_POINT, DEFAULT_PIM, DEFAULT_PROGRAM, DEFAULT_VOLUME,
    VeraCryptConfig,
};

use crate::install::InstallConfig;

/// Default HTTPS listen address.
pub const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED),
    8443,
);

/// Default directory holding `www/`, `certs/`, and `bundle/`.
pub const DEFAULT_ASSET_DIR: &str = "/usr/share/diskdec";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTPS listener to.
    pub bind_addr: SocketAddr,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Root directory of the asset provider.
    pub asset_dir: PathBuf,
    /// Password policy for the credential gate.
    pub policy: GatePolicy,
    /// Encryption tool and volume locations.
    pub veracrypt: VeraCryptConfig,
    /// Maximum number of `/api` requests handled at once.
    pub api_concurrency: usize,
    /// Whether to skip `mlock` (for development without root/`CAP_IPC_LOCK`).
    pub disable_mlock: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DISKDEC_BIND_ADDR`: listen address (default: `0.0.0.0:8443`)
    /// - `DISKDEC_LOG_LEVEL`: log filter (default: `info`)
    /// - `DISKDEC_ASSET_DIR`: asset root (default: `/usr/share/diskdec`)
    /// - `DISKDEC_DEFAULT_PASSWORD`: reserved first-run password (default: `Qwe123!@#!@#`)
    /// - `DISKDEC_MIN_PASSWORD_LEN`: minimum password length (default: `12`)
    /// - `DISKDEC_TOOL`: VeraCrypt binary (default: `/opt/veracrypt`)
    /// - `DISKDEC_VOLUME`: encrypted container (default: `/opt/secret.vec`)
    /// - `DISKDEC_MOUNT_POINT`: mount directory (default: `/mnt/secret`)
    /// - `DISKDEC_LINK_PATH`: symlink to the mount, empty to disable (default: `/root/secret`)
    /// - `DISKDEC_PIM`: VeraCrypt PIM (default: `11`)
    /// - `DISKDEC_API_CONCURRENCY`: concurrent `/api` requests (default: `10`)
    /// - `DISKDEC_DISABLE_MLOCK`: skip `mlockall` for dev environments (default: `false`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = lookup("DISKDEC_BIND_ADDR")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_BIND_ADDR);

        let log_level = lookup("DISKDEC_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let asset_dir = lookup("DISKDEC_ASSET_DIR")
            .map_or_else(|| PathBuf::from(DEFAULT_ASSET_DIR), PathBuf::from);

        let policy = GatePolicy {
            reserved_default: lookup("DISKDEC_DEFAULT_PASSWORD")
                .unwrap_or_else(|| DEFAULT_RESERVED_PASSWORD.to_owned()),
            min_length: lookup("DISKDEC_MIN_PASSWORD_LEN")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MIN_LENGTH),
        };

        // An empty link path disables the symlink.
        let link_path = match lookup("DISKDEC_LINK_PATH") {
            Some(v) if v.is_empty() => None,
            Some(v) => Some(PathBuf::from(v)),
            None => Some(PathBuf::from(DEFAULT_LINK_PATH)),
        };

        let veracrypt = VeraCryptConfig {
            program: PathBuf::from(
                lookup("DISKDEC_TOOL").unwrap_or_else(|| DEFAULT_PROGRAM.to_owned()),
            ),
            volume: PathBuf::from(
                lookup("DISKDEC_VOLUME").unwrap_or_else(|| DEFAULT_VOLUME.to_owned()),
            ),
            mount_point: PathBuf::from(
                lookup("DISKDEC_MOUNT_POINT").unwrap_or_else(|| DEFAULT_MOUNT_POINT.to_owned()),
            ),
            link_path,
            pim: lookup("DISKDEC_PIM")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PIM),
        };

        let api_concurrency = lookup("DISKDEC_API_CONCURRENCY")
            .and_then(|v| v.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(10);

        let disable_mlock = lookup("DISKDEC_DISABLE_MLOCK")
            .is_some_and(|v| v == "true" || v == "1");

        Self {
            bind_addr,
            log_level,
            asset_dir,
            policy,
            veracrypt,
            api_concurrency,
            disable_mlock,
        }
    }

    /// Provisioning destinations. The tool is installed where the daemon
    /// will run it from.
    #[must_use]
    pub fn install_config(&self) -> InstallConfig {
        InstallConfig {
            tool_path: self.veracrypt.program.clone(),
            ..InstallConfig::default()
        }
    }
}
