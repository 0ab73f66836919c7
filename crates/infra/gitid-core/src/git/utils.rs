use crate::error::{GitIdError, Result};
use git2::Repository;
use std::path::Path;
use tracing::debug;

/// Remote rewritten by gitid.
pub const ORIGIN: &str = "origin";

/// Check whether `path` is inside a git work tree
pub fn is_inside_work_tree(path: &Path) -> bool {
    Repository::discover(path).is_ok_and(|repo| repo.workdir().is_some())
}

/// Read the URL of remote `name`
pub fn get_remote_url(repo_path: &Path, name: &str) -> Result<String> {
    let repo = Repository::discover(repo_path).map_err(|_| GitIdError::NotInGitRepo)?;

    let remote = repo
        .find_remote(name)
        .map_err(|_| GitIdError::MissingRemote { name: name.into() })?;

    remote
        .url()
        .map(ToString::to_string)
        .ok_or_else(|| GitIdError::MissingRemote { name: name.into() })
}

/// Point remote `name` at `url`
pub fn set_remote_url(repo_path: &Path, name: &str, url: &str) -> Result<()> {
    let repo = Repository::discover(repo_path).map_err(|_| GitIdError::NotInGitRepo)?;

    if repo.find_remote(name).is_err() {
        return Err(GitIdError::MissingRemote { name: name.into() });
    }

    repo.remote_set_url(name, url)?;
    debug!("Set remote {} to {}", name, url);
    Ok(())
}
