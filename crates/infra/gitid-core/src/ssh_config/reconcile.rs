use super::document::SshConfigDocument;
use crate::error::{GitIdError, Result};
use crate::remote::AliasedHost;
use atomicwrites::{AllowOverwrite, AtomicFile};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// User value that leaves an existing host block untouched.
pub const SKIP_USER_SENTINEL: &str = ".git";

/// The host entry that should exist in the SSH config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    pub host: AliasedHost,
    pub user: String,
    pub identity_file: PathBuf,
}

impl HostEntry {
    pub fn new(host: AliasedHost, user: impl Into<String>, identity_file: impl Into<PathBuf>) -> Self {
        Self {
            host,
            user: user.into(),
            identity_file: identity_file.into(),
        }
    }

    fn identity_file_value(&self) -> String {
        let raw = self.identity_file.display().to_string();
        if raw.contains(char::is_whitespace) {
            format!("\"{raw}\"")
        } else {
            raw
        }
    }
}

/// What reconciliation did (or would do) to the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A new host block was appended; `with_defaults` when the `Host *` preamble was written too.
    Appended { with_defaults: bool },
    /// The block's `User` line was rewritten.
    UserUpdated { previous: String },
    /// The block had no `User` line and one was inserted.
    UserInserted,
    /// The block already had the requested user.
    Unchanged,
    /// The user was the `.git` sentinel and the existing block was left alone.
    Skipped,
}

impl ReconcileOutcome {
    pub fn changed(&self) -> bool {
        matches!(
            self,
            Self::Appended { .. } | Self::UserUpdated { .. } | Self::UserInserted
        )
    }
}

/// Compute the new config text for `entry`.
///
/// Returns the full content to write back together with the outcome. When the
/// outcome is not [`ReconcileOutcome::changed`], the returned text equals `text`.
pub fn reconcile(text: &str, entry: &HostEntry) -> (String, ReconcileOutcome) {
    let mut doc = SshConfigDocument::parse(text);
    let hostname = entry.host.hostname();

    if doc.find_host(&hostname).is_none() {
        debug!("No Host block for {hostname}, appending one");
        return append_block(text, &doc, entry);
    }

    if entry.user == SKIP_USER_SENTINEL {
        debug!("User is the '{SKIP_USER_SENTINEL}' sentinel, leaving {hostname} untouched");
        return (text.to_string(), ReconcileOutcome::Skipped);
    }

    let fallback_indent = doc.indent().to_string();
    let Some(block) = doc.find_host_mut(&hostname) else {
        return (text.to_string(), ReconcileOutcome::Unchanged);
    };

    let outcome = match block.get("User") {
        Some(current) if current == entry.user => ReconcileOutcome::Unchanged,
        Some(_) => match block.replace_value("User", &entry.user) {
            Some(previous) => ReconcileOutcome::UserUpdated { previous },
            None => ReconcileOutcome::Unchanged,
        },
        None => {
            block.insert_after_header("User", &entry.user, &fallback_indent);
            ReconcileOutcome::UserInserted
        }
    };

    if outcome.changed() {
        (doc.to_string(), outcome)
    } else {
        (text.to_string(), outcome)
    }
}

fn append_block(text: &str, doc: &SshConfigDocument, entry: &HostEntry) -> (String, ReconcileOutcome) {
    let indent = doc.indent();
    let nl = doc.newline();
    let with_defaults = doc.is_blank();

    let mut out = if with_defaults {
        String::new()
    } else {
        let mut existing = text.to_string();
        if !existing.ends_with('\n') {
            existing.push_str(nl);
        }
        existing
    };

    if with_defaults {
        out.push_str(&format!("Host *{nl}"));
        out.push_str(&format!("{indent}AddKeysToAgent yes{nl}"));
        out.push_str(&format!("{indent}IdentitiesOnly yes{nl}"));
    }

    let lines = [
        ("User", entry.user.clone()),
        ("HostName", entry.host.real_host().to_string()),
        ("PreferredAuthentications", "publickey".to_string()),
        ("IdentitiesOnly", "yes".to_string()),
        ("IdentityFile", entry.identity_file_value()),
    ];

    out.push_str(nl);
    out.push_str(&format!("Host {}{nl}", entry.host.hostname()));
    for (keyword, value) in lines {
        out.push_str(&format!("{indent}{keyword} {value}{nl}"));
    }

    (out, ReconcileOutcome::Appended { with_defaults })
}

/// Reconcile the config file at `path`, creating it when missing.
///
/// With `dry_run` the outcome is computed but nothing is created or written.
pub fn reconcile_file(path: &Path, entry: &HostEntry, dry_run: bool) -> Result<ReconcileOutcome> {
    let text = if path.exists() {
        fs::read_to_string(path).map_err(|e| GitIdError::config_write(path, e))?
    } else if dry_run {
        String::new()
    } else {
        create_empty_config(path)?;
        String::new()
    };

    let (content, outcome) = reconcile(&text, entry);
    if !outcome.changed() || dry_run {
        return Ok(outcome);
    }

    write_config(path, &content)?;
    info!("Updated {} ({:?})", path.display(), outcome);
    Ok(outcome)
}

fn create_empty_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        crate::utils::paths::ensure_private_dir(parent)
            .map_err(|e| GitIdError::config_write(parent, e))?;
    }

    fs::write(path, "").map_err(|e| GitIdError::config_write(path, e))?;
    restrict_permissions(path).map_err(|e| GitIdError::config_write(path, e))?;
    debug!("Created empty SSH config at {}", path.display());
    Ok(())
}

/// Atomically replace the config, following a symlinked config to its target.
fn write_config(path: &Path, content: &str) -> Result<()> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let permissions = fs::metadata(&target)
        .map(|m| m.permissions())
        .map_err(|e| GitIdError::config_write(&target, e))?;

    AtomicFile::new(&target, AllowOverwrite)
        .write(|f| f.write_all(content.as_bytes()))
        .map_err(|e| GitIdError::config_write(&target, e.into()))?;

    fs::set_permissions(&target, permissions).map_err(|e| GitIdError::config_write(&target, e))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
