//! End-to-end identity setup for one repository.
//!
//! Steps run in a fixed order and stop at the first error:
//! resolve the remote, rewrite it, ensure the key, reconcile the SSH config.
//! Every step is idempotent, so re-running after a failure is safe.

use crate::error::Result;
use crate::git;
use crate::identity::Identity;
use crate::keys::{self, KeyGenerator, KeyStatus};
use crate::remote::{self, AliasedHost, Resolution};
use crate::ssh_config::{self, HostEntry, ReconcileOutcome};
use crate::utils::paths;
use std::path::PathBuf;
use tracing::info;

/// Where the remote URL comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSource {
    /// URL given on the command line; the repository is not touched.
    Explicit(String),
    /// Read (and rewrite) `origin` of the repository containing this path.
    Repository(PathBuf),
}

#[derive(Debug, Clone)]
pub struct SetupRequest {
    pub identity: Identity,
    pub user: String,
    pub ssh_dir: PathBuf,
    pub remote: RemoteSource,
    pub dry_run: bool,
}

/// What happened to the remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteAction {
    /// `origin` was rewritten in the repository.
    Rewritten { from: String, to: String },
    /// A rewrite is needed but was not applied (explicit URL or dry run).
    Suggested { from: String, to: String },
    /// The remote already routes through this identity.
    Unchanged { url: String },
}

#[derive(Debug, Clone)]
pub struct SetupReport {
    pub host: AliasedHost,
    pub remote: RemoteAction,
    pub key: KeyStatus,
    pub config_path: PathBuf,
    pub config: ReconcileOutcome,
}

/// Run the full setup for `request`, generating keys with `generator`.
pub fn run(request: &SetupRequest, generator: &dyn KeyGenerator) -> Result<SetupReport> {
    let identity = &request.identity;

    let url = match &request.remote {
        RemoteSource::Explicit(url) => url.trim().to_string(),
        RemoteSource::Repository(path) => git::get_remote_url(path, git::ORIGIN)?,
    };

    let resolution = remote::resolve(&url, identity)?;
    let host = resolution.host().clone();
    info!("Aliased host for {}: {}", identity.display(), host);

    let remote = apply_remote(request, &url, &resolution)?;

    let key_path = paths::key_path(&request.ssh_dir, identity.key_file_name());
    let key = if request.dry_run {
        keys::inspect_key(&key_path)
    } else {
        keys::ensure_key(generator, &key_path, &host.hostname())?
    };

    let config_path = paths::ssh_config_path(&request.ssh_dir);
    let entry = HostEntry::new(host.clone(), request.user.clone(), key_path);
    let config = ssh_config::reconcile_file(&config_path, &entry, request.dry_run)?;

    Ok(SetupReport {
        host,
        remote,
        key,
        config_path,
        config,
    })
}

fn apply_remote(request: &SetupRequest, url: &str, resolution: &Resolution) -> Result<RemoteAction> {
    let Some(new_url) = resolution.rewritten_url() else {
        return Ok(RemoteAction::Unchanged {
            url: url.to_string(),
        });
    };

    let from = url.to_string();
    let to = new_url.to_string();
    match &request.remote {
        RemoteSource::Repository(path) if !request.dry_run => {
            git::set_remote_url(path, git::ORIGIN, &to)?;
            info!("Rewrote {} from {} to {}", git::ORIGIN, from, to);
            Ok(RemoteAction::Rewritten { from, to })
        }
        _ => Ok(RemoteAction::Suggested { from, to }),
    }
}
