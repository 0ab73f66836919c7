use crate::identity::DEFAULT_PREFIX;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default SSH user for git hosting services.
pub const DEFAULT_USER: &str = "git";

/// Settings loaded from `gitid.json` and the environment.
///
/// All fields use `#[serde(default)]` so partial files work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Prefix placed in front of every identity alias.
    pub prefix: String,

    /// SSH user written to new host blocks.
    pub user: String,

    /// Directory holding the SSH config and keys (`~/.ssh` when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            user: DEFAULT_USER.to_string(),
            ssh_dir: None,
        }
    }
}
