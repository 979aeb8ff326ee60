use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use tracing::debug;

use crate::common::{self, Paths};
use crate::error::{GhlError, Result};
use crate::output::OutputFormat;

pub const TOKEN_ENV: &str = "GHL_API_TOKEN";
pub const LOCATION_ENV: &str = "GHL_LOCATION_ID";

pub const DEFAULT_API_VERSION: &str = "2021-07-28";

const KEYRING_SERVICE: &str = "ghl_tui";
const KEYRING_USER: &str = "api_token";

/// Standalone configuration, independent of profiles. Holds the legacy
/// default location when no profile is in use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location_id: None,
            api_version: default_api_version(),
            output_format: OutputFormat::default(),
        }
    }
}

/// A named token + location pair. The two are always written together so an
/// active profile can never mix credentials from different tenants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub api_token: String,
    pub location_id: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfilesFile {
    #[serde(default)]
    active: Option<String>,
    #[serde(default)]
    profiles: BTreeMap<String, Profile>,
}

/// Fields of [`Config`] that can be changed in one call; `None` leaves the
/// current value alone.
#[derive(Debug, Default)]
pub struct ConfigUpdate {
    pub location_id: Option<String>,
    pub api_version: Option<String>,
    pub output_format: Option<OutputFormat>,
}

/// Last-resort token backend. The OS keyring is optional equipment: every
/// operation reports availability instead of failing, and callers fall back
/// to file storage when it is not usable.
pub trait TokenVault {
    fn get(&self) -> Option<String>;
    /// Returns false when the backend is unavailable; the token was not stored.
    fn set(&self, token: &str) -> bool;
    /// Returns false when the backend is unavailable; nothing was deleted.
    fn delete(&self) -> bool;
}

/// `TokenVault` over the platform keyring.
pub struct OsTokenVault;

impl OsTokenVault {
    fn entry() -> Option<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).ok()
    }
}

impl TokenVault for OsTokenVault {
    fn get(&self) -> Option<String> {
        Self::entry()?.get_password().ok().filter(|t| !t.is_empty())
    }

    fn set(&self, token: &str) -> bool {
        Self::entry().is_some_and(|entry| entry.set_password(token).is_ok())
    }

    fn delete(&self) -> bool {
        Self::entry().is_some_and(|entry| entry.delete_credential().is_ok())
    }
}

/// Durable local store for configuration, legacy credentials, and named
/// profiles.
///
/// Reads are cached per instance after the first load; a process that wants
/// to observe concurrent external edits must use a fresh store. There is no
/// cross-process locking: concurrent writers race and the last writer wins,
/// which is acceptable for a single-user local tool.
pub struct ConfigStore {
    paths: Paths,
    config: Option<Config>,
    profiles: Option<ProfilesFile>,
    vault: Box<dyn TokenVault>,
}

impl ConfigStore {
    /// Open the store at the default location (`$GHL_CONFIG_HOME`, else
    /// `~/.ghl_tui`).
    pub fn open() -> Result<Self> {
        Ok(Self::with_vault(common::resolve_paths()?, Box::new(OsTokenVault)))
    }

    /// Open the store rooted at an explicit directory.
    pub fn at(dir: &Path) -> Self {
        Self::with_vault(Paths::under(dir), Box::new(OsTokenVault))
    }

    pub fn with_vault(paths: Paths, vault: Box<dyn TokenVault>) -> Self {
        Self {
            paths,
            config: None,
            profiles: None,
            vault,
        }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn config(&mut self) -> &Config {
        if self.config.is_none() {
            self.config = Some(common::read_json_or_default(&self.paths.config));
        }
        self.config
            .get_or_insert_with(Config::default)
    }

    fn profiles_data(&mut self) -> &mut ProfilesFile {
        if self.profiles.is_none() {
            self.profiles = Some(common::read_json_or_default(&self.paths.profiles));
        }
        self.profiles
            .get_or_insert_with(ProfilesFile::default)
    }

    fn save_profiles(&mut self) -> Result<()> {
        let data = self.profiles_data();
        let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
        common::write_secure(&self.paths.profiles, json.as_bytes())
    }

    fn save_config(&mut self, config: Config) -> Result<()> {
        let json = serde_json::to_string_pretty(&config).unwrap_or_else(|_| "{}".to_string());
        common::write_secure(&self.paths.config, json.as_bytes())?;
        self.config = Some(config);
        Ok(())
    }

    /// Name of the active profile, or `None`. Self-heals when the persisted
    /// pointer no longer matches a stored profile (external edits).
    pub fn active_profile_name(&mut self) -> Option<String> {
        let data = self.profiles_data();
        data.active
            .clone()
            .filter(|name| data.profiles.contains_key(name))
    }

    pub fn get_profile(&mut self, name: &str) -> Option<Profile> {
        self.profiles_data().profiles.get(name).cloned()
    }

    /// All profiles as `(name, is_active)`, sorted by name.
    pub fn list_profiles(&mut self) -> Vec<(String, bool)> {
        let active = self.active_profile_name();
        self.profiles_data()
            .profiles
            .keys()
            .map(|name| (name.clone(), active.as_deref() == Some(name)))
            .collect()
    }

    /// Upsert a profile. Becomes active when no valid active profile exists.
    pub fn add_or_update_profile(
        &mut self,
        name: &str,
        api_token: &str,
        location_id: &str,
    ) -> Result<()> {
        let active = self.active_profile_name();
        let data = self.profiles_data();
        data.profiles.insert(
            name.to_string(),
            Profile {
                api_token: api_token.to_string(),
                location_id: location_id.to_string(),
            },
        );
        if active.is_none() {
            data.active = Some(name.to_string());
        }
        self.save_profiles()
    }

    pub fn set_active_profile(&mut self, name: &str) -> Result<()> {
        let data = self.profiles_data();
        if !data.profiles.contains_key(name) {
            return Err(GhlError::ProfileNotFound(name.to_string()));
        }
        data.active = Some(name.to_string());
        self.save_profiles()
    }

    /// Remove a profile. When the removed profile was active, the
    /// lexicographically first remaining profile becomes active (or the
    /// pointer clears when none remain).
    pub fn remove_profile(&mut self, name: &str) -> Result<()> {
        let data = self.profiles_data();
        if data.profiles.remove(name).is_none() {
            return Err(GhlError::ProfileNotFound(name.to_string()));
        }
        if data.active.as_deref() == Some(name) {
            data.active = data.profiles.keys().next().cloned();
        }
        self.save_profiles()
    }

    /// Drop all profiles and the active pointer. Idempotent.
    pub fn clear_profiles(&mut self) -> Result<()> {
        self.profiles = Some(ProfilesFile::default());
        common::remove_if_exists(&self.paths.profiles)
    }

    /// Effective API token: env override, then the active profile, then the
    /// legacy credentials file, then the OS keyring. `None` on a total miss.
    pub fn get_token(&mut self) -> Option<String> {
        if let Some(token) = non_empty_env(TOKEN_ENV) {
            return Some(token);
        }
        if let Some(name) = self.active_profile_name() {
            if let Some(profile) = self.get_profile(&name) {
                return Some(profile.api_token);
            }
        }
        let credentials: serde_json::Value =
            common::read_json_or_default(&self.paths.credentials);
        if let Some(token) = credentials
            .get("api_token")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
        {
            return Some(token.to_string());
        }
        self.vault.get()
    }

    /// Effective location: env override, then the active profile's paired
    /// location, then the standalone config.
    pub fn get_location_id(&mut self) -> Option<String> {
        if let Some(location) = non_empty_env(LOCATION_ENV) {
            return Some(location);
        }
        if let Some(name) = self.active_profile_name() {
            if let Some(profile) = self.get_profile(&name) {
                return Some(profile.location_id);
            }
        }
        self.config().location_id.clone()
    }

    /// Store the API token. When a profile is active its token is rewritten
    /// in place (location untouched, so the pair never drifts apart).
    /// Otherwise the keyring is tried when requested, falling back to the
    /// legacy credentials file.
    pub fn set_token(&mut self, token: &str, use_keyring: bool) -> Result<()> {
        if let Some(name) = self.active_profile_name() {
            if let Some(profile) = self.get_profile(&name) {
                return self.add_or_update_profile(&name, token, &profile.location_id);
            }
        }
        if use_keyring && self.vault.set(token) {
            return Ok(());
        }
        if use_keyring {
            debug!("keyring unavailable, falling back to credentials file");
        }
        let credentials = serde_json::json!({ "api_token": token });
        let json =
            serde_json::to_string_pretty(&credentials).unwrap_or_else(|_| "{}".to_string());
        common::write_secure(&self.paths.credentials, json.as_bytes())
    }

    /// Remove the stored token from both the keyring and the credentials
    /// file. Idempotent.
    pub fn clear_token(&mut self) -> Result<()> {
        self.vault.delete();
        common::remove_if_exists(&self.paths.credentials)
    }

    /// Update the standalone config. A new location is also mirrored into
    /// the active profile to keep its token + location paired.
    pub fn update_config(&mut self, update: ConfigUpdate) -> Result<()> {
        if let Some(location_id) = update.location_id.as_deref() {
            if let Some(name) = self.active_profile_name() {
                if let Some(profile) = self.get_profile(&name) {
                    self.add_or_update_profile(&name, &profile.api_token, location_id)?;
                }
            }
        }
        let mut config = self.config().clone();
        if let Some(location_id) = update.location_id {
            config.location_id = Some(location_id);
        }
        if let Some(api_version) = update.api_version {
            config.api_version = api_version;
        }
        if let Some(output_format) = update.output_format {
            config.output_format = output_format;
        }
        self.save_config(config)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
pub(crate) struct MemoryVault(pub std::sync::Mutex<Option<String>>);

#[cfg(test)]
impl MemoryVault {
    pub(crate) fn new() -> Self {
        Self(std::sync::Mutex::new(None))
    }
}

#[cfg(test)]
impl TokenVault for MemoryVault {
    fn get(&self) -> Option<String> {
        self.0.lock().unwrap().clone()
    }

    fn set(&self, token: &str) -> bool {
        *self.0.lock().unwrap() = Some(token.to_string());
        true
    }

    fn delete(&self) -> bool {
        self.0.lock().unwrap().take().is_some()
    }
}

/// Vault whose backend is never available; exercises the fallback path.
#[cfg(test)]
pub(crate) struct UnavailableVault;

#[cfg(test)]
impl TokenVault for UnavailableVault {
    fn get(&self) -> Option<String> {
        None
    }

    fn set(&self, _token: &str) -> bool {
        false
    }

    fn delete(&self) -> bool {
        false
    }
}
