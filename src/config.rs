//! Server configuration.
//!
//! Settings come from the process environment, overlaid by an optional JSON
//! cache file written by `x509sign init` (`storage/env.json`). A key present
//! in the cache wins over the environment, even when its value is `null`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bon::Builder;
use serde_json::{Map, Value};

use crate::error::{Result, SignError};
use crate::issuer::CaPolicy;
use crate::key::{KeyFamily, KeyPair};

pub const SIGNATURE_PRIVATE_KEY: &str = "SIGNATURE_PRIVATE_KEY";
pub const SIGNATURE_PRIVATE_KEY_MODE: &str = "SIGNATURE_PRIVATE_KEY_MODE";
pub const SIGNATURE_PRIVATE_KEY_PASSPHRASE: &str = "SIGNATURE_PRIVATE_KEY_PASSPHRASE";
pub const EXTENSIONS: &str = "EXTENSIONS";
pub const CA_FILE: &str = "CA_FILE";
pub const ISSUE_CA_CERTIFICATES: &str = "ISSUE_CA_CERTIFICATES";

/// Every setting name, in the order they are written to the cache file.
pub const SETTING_NAMES: [&str; 6] = [
    SIGNATURE_PRIVATE_KEY,
    SIGNATURE_PRIVATE_KEY_MODE,
    SIGNATURE_PRIVATE_KEY_PASSPHRASE,
    EXTENSIONS,
    CA_FILE,
    ISSUE_CA_CERTIFICATES,
];

pub const DEFAULT_STORAGE_DIR: &str = "storage";
pub const ENV_CACHE_FILE: &str = "env.json";
pub const DEFAULT_CA_FILE: &str = "storage/ca.pem";

/// Configuration handed to every request handler.
///
/// # Fields
/// * `extensions` - Extension definitions as `[[identifier, oid, schema], ...]` JSON.
/// * `ca_file` - Path of the CA bundle served by `certificateAuthority`.
/// * `ca_policy` - Whether issued certificates are CAs.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct ServerConfig {
    #[builder(into)]
    pub extensions: Option<String>,
    #[builder(into, default = PathBuf::from(DEFAULT_CA_FILE))]
    pub ca_file: PathBuf,
    #[builder(default)]
    pub ca_policy: CaPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Raw settings, unset or empty values being `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: BTreeMap<&'static str, String>,
}

impl Settings {
    /// Reads settings from the environment and `<storage>/env.json`.
    pub fn from_env(storage: &Path) -> Result<Self> {
        let cache = load_cache(&storage.join(ENV_CACHE_FILE))?;
        Ok(Self::from_lookup(|name| match cache.get(name) {
            Some(cached) => cached.clone(),
            None => std::env::var(name).ok(),
        }))
    }

    /// Builds settings from any name to value lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let values = SETTING_NAMES
            .into_iter()
            .filter_map(|name| {
                lookup(name)
                    .filter(|value| !value.is_empty())
                    .map(|value| (name, value))
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(name);
        } else {
            self.values.insert(name, value);
        }
    }

    pub fn key_family(&self) -> Result<KeyFamily> {
        self.get(SIGNATURE_PRIVATE_KEY_MODE)
            .map_or(Ok(KeyFamily::default()), str::parse::<KeyFamily>)
    }

    /// Loads the configured server key, `None` when no key is configured.
    pub fn private_key(&self) -> Result<Option<KeyPair>> {
        let Some(material) = self.get(SIGNATURE_PRIVATE_KEY) else {
            return Ok(None);
        };
        let key = KeyPair::load(
            self.key_family()?,
            material.as_bytes(),
            self.get(SIGNATURE_PRIVATE_KEY_PASSPHRASE),
        )?;
        Ok(Some(key))
    }

    pub fn server_config(&self) -> Result<ServerConfig> {
        let ca_policy = match self.get(ISSUE_CA_CERTIFICATES) {
            Some(flag) => flag.parse()?,
            None => CaPolicy::default(),
        };
        Ok(ServerConfig::builder()
            .maybe_extensions(self.get(EXTENSIONS))
            .maybe_ca_file(self.get(CA_FILE))
            .ca_policy(ca_policy)
            .build())
    }

    /// Writes the settings as the `env.json` cache in `storage`.
    pub fn write_cache(&self, storage: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(storage)?;
        let path = storage.join(ENV_CACHE_FILE);
        let cache: Map<String, Value> = SETTING_NAMES
            .into_iter()
            .map(|name| {
                let value = self.get(name).map_or(Value::Null, Value::from);
                (name.to_string(), value)
            })
            .collect();
        std::fs::write(&path, serde_json::to_string_pretty(&cache)?)?;
        log::info!("wrote settings to {}", path.display());
        Ok(path)
    }
}

/// Reads the env cache; a missing file is an empty cache.
fn load_cache(path: &Path) -> Result<BTreeMap<String, Option<String>>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(e.into()),
    };
    let Value::Object(entries) = serde_json::from_str(&text)? else {
        return Err(SignError::Config(format!(
            "{} must contain a JSON object",
            path.display()
        )));
    };
    log::debug!("using settings cache {}", path.display());
    Ok(entries
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::Null => None,
                Value::String(text) => Some(text),
                other => Some(other.to_string()),
            };
            (name, value)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_are_unset() {
        let settings = Settings::from_lookup(|name| match name {
            SIGNATURE_PRIVATE_KEY_MODE => Some("RSA".to_string()),
            EXTENSIONS => Some(String::new()),
            _ => None,
        });
        assert_eq!(settings.key_family().unwrap(), KeyFamily::Rsa);
        assert_eq!(settings.get(EXTENSIONS), None);
        assert!(settings.private_key().unwrap().is_none());
    }

    #[test]
    fn test_server_config_defaults() {
        let config = Settings::default().server_config().unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.ca_file, PathBuf::from("storage/ca.pem"));
        assert_eq!(config.ca_policy, CaPolicy::Authority);

        let settings = Settings::from_lookup(|name| {
            (name == ISSUE_CA_CERTIFICATES).then(|| "false".to_string())
        });
        assert_eq!(
            settings.server_config().unwrap().ca_policy,
            CaPolicy::EndEntity
        );
    }

    #[test]
    fn test_cache_round_trip() {
        let storage = std::env::temp_dir().join(format!("x509sign-config-{}", std::process::id()));
        let mut settings = Settings::default();
        settings.set(SIGNATURE_PRIVATE_KEY_MODE, "DSA");
        settings.set(CA_FILE, "/srv/ca.pem");
        settings.write_cache(&storage).unwrap();

        let cache = load_cache(&storage.join(ENV_CACHE_FILE)).unwrap();
        assert_eq!(cache.get(SIGNATURE_PRIVATE_KEY_MODE), Some(&Some("DSA".to_string())));
        assert_eq!(cache.get(SIGNATURE_PRIVATE_KEY), Some(&None));

        let loaded = Settings::from_env(&storage).unwrap();
        assert_eq!(loaded.get(CA_FILE), Some("/srv/ca.pem"));
        assert_eq!(loaded.get(SIGNATURE_PRIVATE_KEY), None);
        std::fs::remove_dir_all(&storage).unwrap();
    }
}
