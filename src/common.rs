use directories::BaseDirs;
use std::env;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{GhlError, Result};

pub const CONFIG_DIR_ENV: &str = "GHL_CONFIG_HOME";
const CONFIG_DIR_NAME: &str = ".ghl_tui";

/// On-disk layout of the local store. Every file is a JSON document kept
/// owner-only after each write.
#[derive(Debug, Clone)]
pub struct Paths {
    pub dir: PathBuf,
    pub config: PathBuf,
    pub credentials: PathBuf,
    pub profiles: PathBuf,
    pub searches: PathBuf,
}

impl Paths {
    pub fn under(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            config: dir.join("config.json"),
            credentials: dir.join("credentials.json"),
            profiles: dir.join("profiles.json"),
            searches: dir.join("saved_searches.json"),
        }
    }
}

pub fn resolve_paths() -> Result<Paths> {
    let dir = resolve_config_dir().ok_or_else(|| GhlError::Auth(
        "Could not resolve a home directory for configuration".to_string(),
    ))?;
    Ok(Paths::under(&dir))
}

fn resolve_config_dir() -> Option<PathBuf> {
    let override_dir = env::var_os(CONFIG_DIR_ENV).map(PathBuf::from);
    let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    resolve_config_dir_with(override_dir, home)
}

fn resolve_config_dir_with(
    override_dir: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(dir) = override_dir.filter(|dir| !dir.as_os_str().is_empty()) {
        return Some(dir);
    }
    home.map(|home| home.join(CONFIG_DIR_NAME))
}

/// Create the config directory if missing and keep it owner-only.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|err| storage_err(dir, err))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
            .map_err(|err| storage_err(dir, err))?;
    }
    Ok(())
}

/// Whole-file rewrite: write a temp file next to the target, restrict it to
/// the owner, fsync, then rename over the destination.
pub fn write_secure(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .ok_or_else(|| storage_err(path, std::io::Error::other("no parent directory")))?;
    ensure_dir(parent)?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| storage_err(path, std::io::Error::other("invalid file name")))?;
    let tmp_path = parent.join(format!(".{file_name}.tmp-{}", std::process::id()));

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let result = options
        .open(&tmp_path)
        .and_then(|mut file| {
            file.write_all(contents)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                file.set_permissions(fs::Permissions::from_mode(0o600))?;
            }
            file.sync_all()
        })
        .and_then(|_| fs::rename(&tmp_path, path));
    if let Err(err) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(storage_err(path, err));
    }
    Ok(())
}

/// Remove a file if it exists; missing files are not an error.
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(storage_err(path, err)),
    }
}

/// Read and deserialize a JSON file. A missing or malformed file yields the
/// default value: the store prioritizes availability over surfacing
/// corruption, and the corrupt file is left in place until the next
/// successful write.
pub fn read_json_or_default<T>(path: &Path) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    let Ok(contents) = fs::read_to_string(path) else {
        return T::default();
    };
    serde_json::from_str(&contents).unwrap_or_default()
}

fn storage_err(path: &Path, source: std::io::Error) -> GhlError {
    GhlError::Storage {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_config_dir_prefers_override() {
        let dir = resolve_config_dir_with(
            Some(PathBuf::from("/tmp/ghl-override")),
            Some(PathBuf::from("/home/me")),
        )
        .unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/ghl-override"));
    }

    #[test]
    fn resolve_config_dir_ignores_empty_override() {
        let dir =
            resolve_config_dir_with(Some(PathBuf::from("")), Some(PathBuf::from("/home/me")))
                .unwrap();
        assert_eq!(dir, PathBuf::from("/home/me/.ghl_tui"));
    }

    #[test]
    fn resolve_config_dir_none_without_home() {
        assert!(resolve_config_dir_with(None, None).is_none());
    }

    #[test]
    fn write_secure_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("store").join("config.json");
        write_secure(&path, b"{\"a\":1}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\":1}");
    }

    #[cfg(unix)]
    #[test]
    fn write_secure_sets_owner_only_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials.json");
        write_secure(&path, b"{}").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        let dir_mode = fs::metadata(dir.path()).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o777, 0o700);
    }

    #[test]
    fn write_secure_replaces_existing_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        write_secure(&path, b"{\"location_id\":\"first\"}").unwrap();
        write_secure(&path, b"{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn remove_if_exists_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials.json");
        remove_if_exists(&path).unwrap();
        fs::write(&path, "{}").unwrap();
        remove_if_exists(&path).unwrap();
        assert!(!path.exists());
        remove_if_exists(&path).unwrap();
    }

    #[test]
    fn read_json_or_default_handles_missing_and_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("profiles.json");
        let value: serde_json::Value = read_json_or_default(&path);
        assert!(value.is_null());
        fs::write(&path, "{not json").unwrap();
        let value: serde_json::Value = read_json_or_default(&path);
        assert!(value.is_null());
    }
}
