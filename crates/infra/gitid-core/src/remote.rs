//! Remote URL parsing and per-identity host aliasing.
//!
//! Remote URLs are matched against an ordered list of grammars, first match
//! wins:
//!
//! 1. SSH scp-like shorthand: `user@host:path`
//! 2. SSH URI: `ssh://[user@]host[:port]/path`
//! 3. HTTPS/HTTP (recognized, rejected)
//! 4. AWS CodeCommit helper URLs (recognized, rejected)
//!
//! Once an SSH remote is parsed its host is checked for an existing alias
//! (`<prefix>-<label>.<real-host>`) so repeated runs never double-prefix it.

use crate::error::{GitIdError, Result};
use crate::identity::Identity;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

static SCP_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<user>[^@\s/:]+)@(?P<host>[^@\s/:]+):(?P<path>\S+)$").expect("valid regex")
});

static SSH_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<scheme>ssh|git\+ssh|ssh\+git)://(?:(?P<user>[^@\s/:]+)@)?(?P<host>[^@\s/:]+)(?::(?P<port>\d{1,5}))?/(?P<path>\S+)$",
    )
    .expect("valid regex")
});

static HTTPS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?P<scheme>https?)://\S+$").expect("valid regex"));

static CODECOMMIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^codecommit:\S+$").expect("valid regex"));

/// A parsed SSH remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteUrl {
    /// `user@host:path`
    SshShorthand {
        user: String,
        host: String,
        path: String,
    },
    /// `ssh://[user@]host[:port]/path` (path stored without the leading slash)
    SshUri {
        scheme: String,
        user: Option<String>,
        host: String,
        port: Option<u16>,
        path: String,
    },
}

impl RemoteUrl {
    /// Parse a remote URL into one of the supported SSH forms.
    ///
    /// # Errors
    /// - [`GitIdError::UnsupportedScheme`] for HTTPS and CodeCommit remotes
    /// - [`GitIdError::UnrecognizedFormat`] when no grammar matches
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();

        if let Some(remote) = parse_scp_like(url) {
            return Ok(remote);
        }
        if let Some(remote) = parse_ssh_uri(url) {
            return Ok(remote);
        }
        if let Some(scheme) = detect_https(url).or_else(|| detect_codecommit(url)) {
            return Err(GitIdError::UnsupportedScheme {
                url: url.to_string(),
                scheme,
            });
        }

        Err(GitIdError::UnrecognizedFormat {
            url: url.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        match self {
            Self::SshShorthand { host, .. } | Self::SshUri { host, .. } => host,
        }
    }

    /// Render the URL with a different host, keeping every other part as parsed.
    pub fn with_host(&self, new_host: &str) -> String {
        match self {
            Self::SshShorthand { user, path, .. } => format!("{user}@{new_host}:{path}"),
            Self::SshUri {
                scheme,
                user,
                port,
                path,
                ..
            } => {
                let mut out = format!("{scheme}://");
                if let Some(user) = user {
                    out.push_str(user);
                    out.push('@');
                }
                out.push_str(new_host);
                if let Some(port) = port {
                    out.push_str(&format!(":{port}"));
                }
                out.push('/');
                out.push_str(path);
                out
            }
        }
    }
}

impl fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.with_host(self.host()))
    }
}

/// Synthetic per-identity hostname: `<label>.<real_host>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasedHost {
    label: String,
    real_host: String,
}

impl AliasedHost {
    pub fn new(label: impl Into<String>, real_host: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            real_host: real_host.into(),
        }
    }

    /// The `<prefix>-<identity>` segment.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The host SSH should actually connect to.
    pub fn real_host(&self) -> &str {
        &self.real_host
    }

    pub fn hostname(&self) -> String {
        format!("{}.{}", self.label, self.real_host)
    }
}

impl fmt::Display for AliasedHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.label, self.real_host)
    }
}

/// Outcome of resolving a remote URL for an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The remote must be rewritten to `url`.
    Rewrite {
        url: String,
        host: AliasedHost,
        /// Alias label the remote carried before, when it belonged to another identity.
        replaced_label: Option<String>,
    },
    /// The remote already routes through this identity's alias.
    Unchanged { host: AliasedHost },
}

impl Resolution {
    pub fn host(&self) -> &AliasedHost {
        match self {
            Self::Rewrite { host, .. } | Self::Unchanged { host } => host,
        }
    }

    pub fn rewritten_url(&self) -> Option<&str> {
        match self {
            Self::Rewrite { url, .. } => Some(url),
            Self::Unchanged { .. } => None,
        }
    }
}

/// Resolve `url` for `identity`, producing either a rewritten URL or a no-op signal.
///
/// # Examples
/// ```
/// # use gitid_core::{Identity, remote::resolve};
/// let id = Identity::new("llc", "gitid").unwrap();
/// let res = resolve("git@github.com:acme/widget.git", &id).unwrap();
/// assert_eq!(res.rewritten_url(), Some("git@gitid-llc.github.com:acme/widget.git"));
///
/// let again = resolve("git@gitid-llc.github.com:acme/widget.git", &id).unwrap();
/// assert_eq!(again.rewritten_url(), None);
/// ```
pub fn resolve(url: &str, identity: &Identity) -> Result<Resolution> {
    let remote = RemoteUrl::parse(url)?;
    let current = remote.host();

    match split_alias(current, identity.prefix()) {
        Some((label, real_host)) if label.eq_ignore_ascii_case(identity.display()) => {
            debug!("Remote {} already aliased for {}", url.trim(), identity.display());
            Ok(Resolution::Unchanged {
                host: AliasedHost::new(identity.display(), real_host),
            })
        }
        Some((label, real_host)) => {
            let host = AliasedHost::new(identity.display(), real_host);
            debug!("Replacing alias {} with {}", label, identity.display());
            Ok(Resolution::Rewrite {
                url: remote.with_host(&host.hostname()),
                host,
                replaced_label: Some(label.to_string()),
            })
        }
        None => {
            let host = AliasedHost::new(identity.display(), current);
            Ok(Resolution::Rewrite {
                url: remote.with_host(&host.hostname()),
                host,
                replaced_label: None,
            })
        }
    }
}

/// Bare-hostname mode: the aliased host for `url`, whether or not it needs a rewrite.
pub fn alias_host(url: &str, identity: &Identity) -> Result<AliasedHost> {
    resolve(url, identity).map(|res| res.host().clone())
}

/// Split `<prefix>-<label>.<real-host>` into (`<prefix>-<label>`, `<real-host>`).
///
/// Returns `None` when the host does not carry an alias for `prefix`.
fn split_alias<'a>(host: &'a str, prefix: &str) -> Option<(&'a str, &'a str)> {
    let dot = host.find('.')?;
    let (label, rest) = (&host[..dot], &host[dot + 1..]);

    let marker = format!("{}-", prefix.to_lowercase());
    let lowered = label.to_lowercase();
    let tail = lowered.strip_prefix(&marker)?;
    if tail.is_empty() || rest.is_empty() {
        return None;
    }
    Some((label, rest))
}

fn parse_scp_like(url: &str) -> Option<RemoteUrl> {
    let caps = SCP_LIKE.captures(url)?;
    Some(RemoteUrl::SshShorthand {
        user: caps["user"].to_string(),
        host: caps["host"].to_string(),
        path: caps["path"].to_string(),
    })
}

fn parse_ssh_uri(url: &str) -> Option<RemoteUrl> {
    let caps = SSH_URI.captures(url)?;
    let port = match caps.name("port") {
        Some(p) => Some(p.as_str().parse::<u16>().ok()?),
        None => None,
    };
    Some(RemoteUrl::SshUri {
        scheme: caps["scheme"].to_string(),
        user: caps.name("user").map(|u| u.as_str().to_string()),
        host: caps["host"].to_string(),
        port,
        path: caps["path"].to_string(),
    })
}

fn detect_https(url: &str) -> Option<String> {
    HTTPS
        .captures(url)
        .map(|caps| caps["scheme"].to_lowercase())
}

fn detect_codecommit(url: &str) -> Option<String> {
    CODECOMMIT.is_match(url).then(|| "codecommit".to_string())
}
