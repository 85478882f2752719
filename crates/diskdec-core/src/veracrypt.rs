//! VeraCrypt-backed [`VolumeController`].
//!
//! Every operation follows the same shape:
//!
//! 1. Run `<tool> -u` to dismount everything, ignoring the result. This
//!    clears "already mounted" state left by an earlier unlock.
//! 2. Run the real command non-interactively with an explicit argument
//!    vector (never through a shell) and write the hashed credential plus a
//!    newline to its stdin.
//! 3. Map the exit status to success or a [`ProcessError`].
//!
//! No timeout is applied: a hung tool hangs the caller. Calls are not
//! serialized here; the tool's own lock file arbitrates concurrent runs.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::controller::VolumeController;
use crate::credential::HashedCredential;
use crate::error::ProcessError;

/// Default location of the VeraCrypt binary.
pub const DEFAULT_PROGRAM: &str = "/opt/veracrypt";
/// Default encrypted container.
pub const DEFAULT_VOLUME: &str = "/opt/secret.vec";
/// Default mount point for the unlocked volume.
pub const DEFAULT_MOUNT_POINT: &str = "/mnt/secret";
/// Default symlink exposing the mounted volume.
pub const DEFAULT_LINK_PATH: &str = "/root/secret";
/// Default personal iterations multiplier.
pub const DEFAULT_PIM: u32 = 11;

/// Where the tool lives and which volume it operates on.
#[derive(Debug, Clone)]
pub struct VeraCryptConfig {
    /// Path to the VeraCrypt executable.
    pub program: PathBuf,
    /// Encrypted container file.
    pub volume: PathBuf,
    /// Directory the volume is mounted on.
    pub mount_point: PathBuf,
    /// Symlink created to the mount point after a successful unlock.
    pub link_path: Option<PathBuf>,
    /// PIM passed for both the current and any new password.
    pub pim: u32,
}

impl Default for VeraCryptConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            volume: PathBuf::from(DEFAULT_VOLUME),
            mount_point: PathBuf::from(DEFAULT_MOUNT_POINT),
            link_path: Some(PathBuf::from(DEFAULT_LINK_PATH)),
            pim: DEFAULT_PIM,
        }
    }
}

/// Controller that shells out to VeraCrypt.
#[derive(Debug, Clone)]
pub struct VeraCryptController {
    config: VeraCryptConfig,
}

impl VeraCryptController {
    /// Create a controller for the given tool and volume.
    #[must_use]
    pub fn new(config: VeraCryptConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &VeraCryptConfig {
        &self.config
    }

    /// Arguments for the dismount-all housekeeping call.
    #[must_use]
    pub fn dismount_args(&self) -> Vec<OsString> {
        vec!["-u".into()]
    }

    /// Arguments for mounting the volume. The password arrives on stdin.
    #[must_use]
    pub fn unlock_args(&self) -> Vec<OsString> {
        vec![
            format!("--pim={}", self.config.pim).into(),
            "--stdin".into(),
            "--non-interactive".into(),
            self.config.volume.clone().into_os_string(),
            self.config.mount_point.clone().into_os_string(),
        ]
    }

    /// Arguments for rotating the volume password. The old password arrives
    /// on stdin; the new one is an argument.
    #[must_use]
    pub fn change_args(&self, new: &HashedCredential) -> Vec<OsString> {
        vec![
            "--change".into(),
            format!("--pim={}", self.config.pim).into(),
            "--stdin".into(),
            "--non-interactive".into(),
            format!("--new-password={}", new.expose()).into(),
            format!("--new-pim={}", self.config.pim).into(),
            self.config.volume.clone().into_os_string(),
        ]
    }

    fn program_name(&self) -> String {
        self.config.program.display().to_string()
    }

    /// Best-effort dismount of every VeraCrypt volume.
    async fn dismount_all(&self) {
        let status = Command::new(&self.config.program)
            .args(self.dismount_args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(s) => debug!(status = %s, "dismount finished"),
            Err(e) => debug!(error = %e, "dismount could not run"),
        }
    }

    /// Run the tool with `args`, writing `secret` and a newline to stdin.
    async fn run_with_stdin(
        &self,
        args: Vec<OsString>,
        secret: &HashedCredential,
    ) -> Result<(), ProcessError> {
        let mut child = Command::new(&self.config.program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: self.program_name(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            let mut line = Zeroizing::new(String::with_capacity(secret.expose().len() + 1));
            line.push_str(secret.expose());
            line.push('\n');

            match stdin.write_all(line.as_bytes()).await {
                Ok(()) => {}
                // The tool exited without reading; its status decides.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!("tool closed stdin before reading the password");
                }
                Err(source) => {
                    return Err(ProcessError::Io {
                        program: self.program_name(),
                        source,
                    });
                }
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| ProcessError::Io {
                program: self.program_name(),
                source,
            })?;

        let result = exit_result(output.status);
        if result.is_err() && !output.stderr.is_empty() {
            warn!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
                "encryption tool reported an error"
            );
        }
        result
    }

    /// Target of the mount symlink: the mount point as a directory path,
    /// with a trailing separator.
    #[must_use]
    pub fn link_target(&self) -> PathBuf {
        self.config.mount_point.join("")
    }

    /// Point the configured symlink at the mount point.
    ///
    /// Failure is logged only; the volume is already mounted.
    async fn expose_mount(&self) {
        let Some(link) = &self.config.link_path else {
            return;
        };

        let target = self.link_target();
        match create_symlink(&target, link).await {
            Ok(()) => info!(link = %link.display(), target = %target.display(), "mount linked"),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(link = %link.display(), "mount link already present");
            }
            Err(e) => warn!(link = %link.display(), error = %e, "failed to link mount point"),
        }
    }
}

#[async_trait::async_trait]
impl VolumeController for VeraCryptController {
    async fn unlock(&self, credential: &HashedCredential) -> Result<(), ProcessError> {
        self.dismount_all().await;
        self.run_with_stdin(self.unlock_args(), credential).await?;
        self.expose_mount().await;
        Ok(())
    }

    async fn change_credential(
        &self,
        old: &HashedCredential,
        new: &HashedCredential,
    ) -> Result<(), ProcessError> {
        self.dismount_all().await;
        self.run_with_stdin(self.change_args(new), old).await
    }
}

/// Translate an exit status into the error text operators see.
fn exit_result(status: ExitStatus) -> Result<(), ProcessError> {
    if status.success() {
        return Ok(());
    }
    if let Some(code) = status.code() {
        return Err(ProcessError::Exit { code });
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(ProcessError::Signal { signal });
        }
    }
    Err(ProcessError::Failed {
        reason: status.to_string(),
    })
}

#[cfg(unix)]
async fn create_symlink(target: &std::path::Path, link: &std::path::Path) -> std::io::Result<()> {
    tokio::fs::symlink(target, link).await
}

#[cfg(not(unix))]
async fn create_symlink(_target: &std::path::Path, _link: &std::path::Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        ErrorKind::Unsupported,
        "symlinks are only created on unix",
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::credential::Credential;

    fn controller(program: &str) -> VeraCryptController {
        VeraCryptController::new(VeraCryptConfig {
            program: PathBuf::from(program),
            link_path: None,
            ..VeraCryptConfig::default()
        })
    }

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    #[test]
    fn unlock_args_match_tool_contract() {
        let ctl = VeraCryptController::new(VeraCryptConfig::default());
        assert_eq!(
            strings(ctl.unlock_args()),
            ["--pim=11", "--stdin", "--non-interactive", "/opt/secret.vec", "/mnt/secret"]
        );
        assert_eq!(strings(ctl.dismount_args()), ["-u"]);
    }

    #[test]
    fn change_args_carry_new_hash_only() {
        let ctl = VeraCryptController::new(VeraCryptConfig::default());
        let new = Credential::new("new password here").hash();
        let args = strings(ctl.change_args(&new));
        assert_eq!(
            args,
            [
                "--change".to_owned(),
                "--pim=11".to_owned(),
                "--stdin".to_owned(),
                "--non-interactive".to_owned(),
                format!("--new-password={}", new.expose()),
                "--new-pim=11".to_owned(),
                "/opt/secret.vec".to_owned(),
            ]
        );
    }

    #[test]
    fn pim_is_configurable() {
        let ctl = VeraCryptController::new(VeraCryptConfig {
            pim: 485,
            ..VeraCryptConfig::default()
        });
        assert_eq!(strings(ctl.unlock_args())[0], "--pim=485");
    }

    #[test]
    fn argument_values_are_not_split() {
        let ctl = VeraCryptController::new(VeraCryptConfig {
            volume: PathBuf::from("/opt/my volume; rm -rf /.vec"),
            ..VeraCryptConfig::default()
        });
        let args = strings(ctl.unlock_args());
        assert_eq!(args.len(), 5);
        assert_eq!(args[3], "/opt/my volume; rm -rf /.vec");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_tool_unlocks_and_links() {
        let dir = tempfile::tempdir().unwrap();
        let mount = dir.path().join("mnt");
        std::fs::create_dir(&mount).unwrap();
        let link = dir.path().join("secret");

        let ctl = VeraCryptController::new(VeraCryptConfig {
            program: PathBuf::from("true"),
            mount_point: mount.clone(),
            link_path: Some(link.clone()),
            ..VeraCryptConfig::default()
        });

        ctl.unlock(&Credential::new("twelve-chars").hash()).await.unwrap();
        let target = std::fs::read_link(&link).unwrap();
        assert_eq!(target.as_os_str(), mount.join("").as_os_str());
        assert!(target.as_os_str().to_str().unwrap().ends_with('/'));

        // A second unlock leaves the existing link alone.
        ctl.unlock(&Credential::new("twelve-chars").hash()).await.unwrap();
        assert_eq!(std::fs::read_link(&link).unwrap().as_os_str(), target.as_os_str());
    }

    #[test]
    fn link_target_is_mount_directory() {
        let ctl = VeraCryptController::new(VeraCryptConfig::default());
        assert_eq!(ctl.link_target().as_os_str(), "/mnt/secret/");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_tool_reports_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("secret");
        let ctl = VeraCryptController::new(VeraCryptConfig {
            program: PathBuf::from("false"),
            link_path: Some(link.clone()),
            ..VeraCryptConfig::default()
        });

        let err = ctl
            .unlock(&Credential::new("twelve-chars").hash())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Exit { code: 1 }));
        assert_eq!(err.to_string(), "exit status 1");
        assert!(!link.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn change_uses_tool_status() {
        let old = Credential::new("old password!").hash();
        let new = Credential::new("new password!").hash();

        controller("true").change_credential(&old, &new).await.unwrap();
        let err = controller("false")
            .change_credential(&old, &new)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Exit { code: 1 }));
    }

    #[tokio::test]
    async fn missing_tool_is_a_spawn_error() {
        let err = controller("/nonexistent/diskdec/veracrypt")
            .unlock(&Credential::new("twelve-chars").hash())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
        assert!(err.to_string().starts_with("failed to start /nonexistent/diskdec/veracrypt"));
    }
}
