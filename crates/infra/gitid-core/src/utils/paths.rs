use anyhow::Result;
use std::path::{Path, PathBuf};

/// File name of the SSH client config inside the SSH directory.
pub const SSH_CONFIG_FILE: &str = "config";

/// Expand tilde (~) in paths to home directory
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_string_lossy();

    if let Some(stripped) = path_str
        .strip_prefix("~/")
        .or_else(|| path_str.strip_prefix("~\\"))
    {
        let home = home_dir()?;
        Ok(home.join(stripped))
    } else if path_str == "~" {
        home_dir()
    } else {
        Ok(path.to_path_buf())
    }
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

/// Default SSH directory: `~/.ssh`
pub fn default_ssh_dir() -> Result<PathBuf> {
    Ok(home_dir()?.join(".ssh"))
}

/// SSH client config path inside `ssh_dir`
pub fn ssh_config_path(ssh_dir: &Path) -> PathBuf {
    ssh_dir.join(SSH_CONFIG_FILE)
}

/// Private key path for `key_file_name` inside `ssh_dir`
pub fn key_path(ssh_dir: &Path, key_file_name: &str) -> PathBuf {
    ssh_dir.join(key_file_name)
}

/// Ensure a directory exists, creating it owner-only (0700 on Unix) if missing.
pub fn ensure_private_dir(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_expand_path() {
        // Test tilde expansion
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_path(Path::new("~/.ssh")).unwrap(), home.join(".ssh"));
        assert_eq!(expand_path(Path::new("~")).unwrap(), home);

        // Test absolute path
        assert_eq!(
            expand_path(Path::new("/tmp/keys")).unwrap(),
            PathBuf::from("/tmp/keys")
        );

        // Test relative path
        assert_eq!(
            expand_path(Path::new("keys")).unwrap(),
            PathBuf::from("keys")
        );
    }

    #[test]
    fn test_derived_paths() {
        let dir = Path::new("/home/me/.ssh");
        assert_eq!(ssh_config_path(dir), dir.join("config"));
        assert_eq!(key_path(dir, "id_gitid_llc"), dir.join("id_gitid_llc"));
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_private_dir_mode() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join(".ssh");

        ensure_private_dir(&dir).unwrap();
        let mode = std::fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
