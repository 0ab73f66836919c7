//! Per-identity SSH host aliases for git remotes.
//!
//! Given an identity label, gitid rewrites a remote such as
//! `git@github.com:acme/widget.git` to `git@gitid-work.github.com:acme/widget.git`,
//! makes sure `~/.ssh/id_gitid_work` exists, and keeps a matching `Host` block in
//! `~/.ssh/config` that maps the alias back to the real host with that key.

pub mod config;
pub mod error;
pub mod git;
pub mod identity;
pub mod keys;
pub mod remote;
pub mod setup;
pub mod ssh_config;
pub mod utils;

pub use config::{LoadedSettings, Settings, load_settings};
pub use error::{GitIdError, Result};
pub use identity::{DEFAULT_PREFIX, Identity};
pub use keys::{KeyGenerator, KeyStatus, SshKeygen, ensure_key};
pub use remote::{AliasedHost, RemoteUrl, Resolution, alias_host, resolve};
pub use setup::{RemoteAction, RemoteSource, SetupReport, SetupRequest};
pub use ssh_config::{HostEntry, ReconcileOutcome, SshConfigDocument, reconcile_file};
