use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitIdError {
    #[error("Invalid identity '{identity}': {reason}")]
    InvalidIdentity { identity: String, reason: String },

    #[error("Unsupported remote scheme '{scheme}' (SSH keys do not apply): {url}")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("Unrecognized remote URL format: {url}")]
    UnrecognizedFormat { url: String },

    #[error("Key generation failed for {path}: {reason}")]
    KeyGenerationFailed { path: PathBuf, reason: String },

    #[error("Failed to update SSH config {path}: {source}")]
    ConfigWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not in a git repository")]
    NotInGitRepo,

    #[error("No '{name}' remote found (or it has no URL)")]
    MissingRemote { name: String },

    #[error("Git2 error: {0}")]
    Git2(#[from] git2::Error),

    #[error(transparent)]
    Settings(#[from] anyhow::Error),
}

impl GitIdError {
    pub(crate) fn config_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigWriteFailed {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GitIdError>;
