//! Identity normalization.
//!
//! An [`Identity`] is built once per invocation from the user-supplied label and
//! prefix, then handed to every component that needs the display form or the
//! key file name.

use crate::error::{GitIdError, Result};

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "gitid";

/// Normalized identity context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    raw: String,
    prefix: String,
    display: String,
    key_file_name: String,
}

impl Identity {
    /// Validate `raw` against `prefix` and derive the normalized forms.
    ///
    /// - display form: `<prefix>-<lowercased identity>`
    /// - key file name: `id_<prefix>_<lowercased identity with '-' replaced by '_'>`
    ///
    /// # Errors
    /// Returns [`GitIdError::InvalidIdentity`] if the identity is blank, already
    /// contains the prefix (ignoring case and hyphens), or either value has
    /// characters outside `[A-Za-z0-9_-]`.
    ///
    /// Both values end up in one hostname label, so a `.` would be read back as
    /// a label boundary and whitespace would split the `Host` line into two
    /// patterns.
    pub fn new(raw: &str, prefix: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid(raw, "identity cannot be empty"));
        }
        if !is_label_safe(trimmed) {
            return Err(invalid(
                raw,
                "identity may only contain letters, digits, '-' and '_'",
            ));
        }

        let prefix = prefix.trim();
        validate_prefix(raw, prefix)?;

        let lowered = trimmed.to_lowercase();
        let squashed_prefix = prefix.to_lowercase().replace('-', "");
        if lowered.replace('-', "").contains(&squashed_prefix) {
            return Err(invalid(
                raw,
                &format!("identity must not already contain the prefix '{prefix}'"),
            ));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            prefix: prefix.to_string(),
            display: format!("{prefix}-{lowered}"),
            key_file_name: format!("id_{prefix}_{}", lowered.replace('-', "_")),
        })
    }

    /// The identity as supplied (trimmed).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `<prefix>-<identity>`, the label placed in front of the real host.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// `id_<prefix>_<identity>`, the private key file name.
    pub fn key_file_name(&self) -> &str {
        &self.key_file_name
    }
}

fn validate_prefix(raw: &str, prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Err(invalid(raw, "prefix cannot be empty"));
    }
    if !is_label_safe(prefix) {
        return Err(invalid(
            raw,
            &format!("prefix '{prefix}' may only contain letters, digits, '-' and '_'"),
        ));
    }
    Ok(())
}

fn is_label_safe(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
}

fn invalid(raw: &str, reason: &str) -> GitIdError {
    GitIdError::InvalidIdentity {
        identity: raw.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_basic_identity() {
        let id = Identity::new("llc", "gitid").unwrap();
        assert_eq!(id.display(), "gitid-llc");
        assert_eq!(id.key_file_name(), "id_gitid_llc");
        assert_eq!(id.prefix(), "gitid");
    }

    #[test]
    fn test_mixed_case_and_hyphens() {
        let id = Identity::new("  My-Work ", "gitid").unwrap();
        assert_eq!(id.raw(), "My-Work");
        assert_eq!(id.display(), "gitid-my-work");
        assert_eq!(id.key_file_name(), "id_gitid_my_work");
    }

    #[test]
    fn test_rejects_blank() {
        for raw in ["", "   ", "\t"] {
            let err = Identity::new(raw, "gitid").unwrap_err();
            assert!(matches!(err, GitIdError::InvalidIdentity { .. }), "{raw:?}");
        }
    }

    #[test]
    fn test_rejects_double_prefix() {
        for raw in ["gitid-llc", "GitId-llc", "git-id-llc", "work-gitid", "xgitidx"] {
            let err = Identity::new(raw, "gitid").unwrap_err();
            assert!(matches!(err, GitIdError::InvalidIdentity { .. }), "{raw}");
        }
    }

    #[test]
    fn test_rejects_characters_outside_hostname_label() {
        for raw in ["my.work", "my work", "me@corp", "a:b", "a/b", "wörk", "x*"] {
            let err = Identity::new(raw, "gitid").unwrap_err();
            assert!(matches!(err, GitIdError::InvalidIdentity { .. }), "{raw:?}");
        }
        assert!(Identity::new("team_a-1", "gitid").is_ok());
    }

    #[test]
    fn test_hyphenated_prefix_checked_without_hyphens() {
        assert!(Identity::new("gitidwork", "git-id").is_err());
        assert!(Identity::new("work", "git-id").is_ok());
    }

    #[test]
    fn test_rejects_bad_prefix() {
        for prefix in ["", "a.b", "a b", "a@b", "a:b", "a/b", "a*"] {
            assert!(Identity::new("llc", prefix).is_err(), "{prefix:?}");
        }
    }

    proptest! {
        #[test]
        fn prop_normalization_is_deterministic(raw in "[a-zA-Z][a-zA-Z0-9-]{0,12}") {
            prop_assume!(!raw.to_lowercase().replace('-', "").contains("gitid"));
            let a = Identity::new(&raw, "gitid").unwrap();
            let b = Identity::new(&raw, "gitid").unwrap();
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a.display(), format!("gitid-{}", raw.to_lowercase()));
            prop_assert!(!a.key_file_name().contains('-'));
        }
    }
}
