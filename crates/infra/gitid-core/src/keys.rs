//! Key provisioning.
//!
//! Keys live at a deterministic path derived from the identity and are never
//! regenerated once present.

use crate::error::{GitIdError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Key algorithm passed to the generator.
pub const KEY_ALGORITHM: &str = "ed25519";

/// Generates a keypair at a path.
pub trait KeyGenerator {
    /// Create `<path>` and `<path>.pub` using `algorithm`, tagging the key with `comment`.
    ///
    /// Implementations report any failure as [`GitIdError::KeyGenerationFailed`].
    fn generate(&self, algorithm: &str, comment: &str, path: &Path) -> Result<()>;
}

/// Generates keys by shelling out to `ssh-keygen`.
///
/// Standard streams are inherited so `ssh-keygen` handles any passphrase prompt itself.
#[derive(Debug, Clone, Default)]
pub struct SshKeygen;

impl SshKeygen {
    pub fn build_command(program: &Path, algorithm: &str, comment: &str, path: &Path) -> Command {
        let mut cmd = Command::new(program);
        cmd.arg("-t")
            .arg(algorithm)
            .arg("-C")
            .arg(comment)
            .arg("-f")
            .arg(path);
        cmd
    }
}

impl KeyGenerator for SshKeygen {
    fn generate(&self, algorithm: &str, comment: &str, path: &Path) -> Result<()> {
        let failed = |reason: String| GitIdError::KeyGenerationFailed {
            path: path.to_path_buf(),
            reason,
        };

        let program =
            which::which("ssh-keygen").map_err(|e| failed(format!("ssh-keygen not found: {e}")))?;

        let status = Self::build_command(&program, algorithm, comment, path)
            .status()
            .map_err(|e| failed(format!("failed to run ssh-keygen: {e}")))?;

        if !status.success() {
            return Err(failed(format!(
                "ssh-keygen failed with exit code {:?}",
                status.code()
            )));
        }
        Ok(())
    }
}

/// Result of [`ensure_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStatus {
    AlreadyPresent(PathBuf),
    Generated(PathBuf),
    /// No key yet; only reported by [`inspect_key`].
    Missing(PathBuf),
}

impl KeyStatus {
    pub fn path(&self) -> &Path {
        match self {
            Self::AlreadyPresent(p) | Self::Generated(p) | Self::Missing(p) => p,
        }
    }
}

/// `<path>.pub`, keeping any dot already in the key file name.
pub fn public_key_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".pub");
    PathBuf::from(name)
}

/// Report whether a key exists at `path` without generating one.
pub fn inspect_key(path: &Path) -> KeyStatus {
    if path.exists() {
        KeyStatus::AlreadyPresent(path.to_path_buf())
    } else {
        KeyStatus::Missing(path.to_path_buf())
    }
}

/// Ensure a keypair exists at `path`, generating one tagged with `comment` if absent.
pub fn ensure_key(generator: &dyn KeyGenerator, path: &Path, comment: &str) -> Result<KeyStatus> {
    if path.exists() {
        debug!("Key already present at {}", path.display());
        return Ok(KeyStatus::AlreadyPresent(path.to_path_buf()));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        crate::utils::paths::ensure_private_dir(parent).map_err(|e| {
            GitIdError::KeyGenerationFailed {
                path: path.to_path_buf(),
                reason: format!("cannot create {}: {e}", parent.display()),
            }
        })?;
    }

    info!("Generating {KEY_ALGORITHM} key at {}", path.display());
    generator.generate(KEY_ALGORITHM, comment, path)?;

    if !path.exists() {
        return Err(GitIdError::KeyGenerationFailed {
            path: path.to_path_buf(),
            reason: "generator reported success but no key was written".into(),
        });
    }
    Ok(KeyStatus::Generated(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Writes placeholder key files and records every call.
    #[derive(Default)]
    struct RecordingGenerator {
        calls: RefCell<Vec<(String, String, PathBuf)>>,
        fail: bool,
    }

    impl KeyGenerator for RecordingGenerator {
        fn generate(&self, algorithm: &str, comment: &str, path: &Path) -> Result<()> {
            self.calls
                .borrow_mut()
                .push((algorithm.into(), comment.into(), path.to_path_buf()));
            if self.fail {
                return Err(GitIdError::KeyGenerationFailed {
                    path: path.to_path_buf(),
                    reason: "mock failure".into(),
                });
            }
            std::fs::write(path, "private").unwrap();
            std::fs::write(public_key_path(path), "public").unwrap();
            Ok(())
        }
    }

    #[test]
    fn test_generates_when_missing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("id_gitid_llc");
        let generator = RecordingGenerator::default();

        let status = ensure_key(&generator, &path, "gitid-llc.github.com").unwrap();
        assert_eq!(status, KeyStatus::Generated(path.clone()));
        assert_eq!(
            *generator.calls.borrow(),
            vec![(
                "ed25519".to_string(),
                "gitid-llc.github.com".to_string(),
                path.clone()
            )]
        );
    }

    #[test]
    fn test_second_call_does_not_regenerate() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("id_gitid_llc");
        let generator = RecordingGenerator::default();

        ensure_key(&generator, &path, "c").unwrap();
        let status = ensure_key(&generator, &path, "c").unwrap();
        assert_eq!(status, KeyStatus::AlreadyPresent(path));
        assert_eq!(generator.calls.borrow().len(), 1);
    }

    #[test]
    fn test_creates_missing_key_dir() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join(".ssh").join("id_gitid_llc");
        let generator = RecordingGenerator::default();

        ensure_key(&generator, &path, "c").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_generator_failure_propagates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("id_gitid_llc");
        let generator = RecordingGenerator {
            fail: true,
            ..Default::default()
        };

        let err = ensure_key(&generator, &path, "c").unwrap_err();
        assert!(matches!(err, GitIdError::KeyGenerationFailed { .. }));
    }

    #[test]
    fn test_inspect_key_never_generates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("id_gitid_llc");
        assert_eq!(inspect_key(&path), KeyStatus::Missing(path.clone()));
        std::fs::write(&path, "k").unwrap();
        assert_eq!(inspect_key(&path), KeyStatus::AlreadyPresent(path));
    }

    #[test]
    fn test_public_key_path_appends_suffix() {
        assert_eq!(
            public_key_path(Path::new("/k/id_gitid_llc")),
            PathBuf::from("/k/id_gitid_llc.pub")
        );
        assert_eq!(
            public_key_path(Path::new("/k/id_gitid_team.v2")),
            PathBuf::from("/k/id_gitid_team.v2.pub")
        );
    }

    #[test]
    fn test_generated_pair_lands_next_to_key() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("id_gitid_team.v2");
        let generator = RecordingGenerator::default();

        ensure_key(&generator, &path, "c").unwrap();
        assert!(tmp.path().join("id_gitid_team.v2.pub").exists());
        assert!(!tmp.path().join("id_gitid_team.pub").exists());
    }

    #[test]
    fn test_ssh_keygen_command_args() {
        let cmd = SshKeygen::build_command(
            Path::new("ssh-keygen"),
            "ed25519",
            "gitid-llc.github.com",
            Path::new("/tmp/keys/id_gitid_llc"),
        );
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-t",
                "ed25519",
                "-C",
                "gitid-llc.github.com",
                "-f",
                "/tmp/keys/id_gitid_llc"
            ]
        );
    }
}
