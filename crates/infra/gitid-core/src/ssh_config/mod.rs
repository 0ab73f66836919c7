//! SSH client config reconciliation.

pub mod document;
pub mod reconcile;

pub use document::{Block, BlockKind, DEFAULT_INDENT, SshConfigDocument, detect_indent};
pub use reconcile::{HostEntry, ReconcileOutcome, SKIP_USER_SENTINEL, reconcile, reconcile_file};
