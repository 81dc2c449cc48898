//! Configuration management
//!
//! Profiles are stored in `~/.config/aa2/config.toml`. Each profile carries the
//! service-account settings needed for the JWT exchange and the report suite to
//! query. Secrets may be left out of the file and supplied through
//! `AA2_API_KEY` / `AA2_CLIENT_SECRET` instead (see [`super::credentials`]).

use super::Result;
use crate::error::{ConfigError, StorageError};
use dirs;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_PROFILE: &str = "default";

/// Metascopes requested when a profile does not list its own
pub const DEFAULT_METASCOPES: [&str; 2] = ["ent_analytics_bulk_ingest_sdk", "ent_reactor_sdk"];

/// Fields accepted by `config set`, in display order
pub const PROFILE_FIELDS: [&str; 11] = [
    "org_id",
    "technical_account_id",
    "private_key_path",
    "ims_host",
    "api_key",
    "client_secret",
    "ims_exchange_url",
    "discovery_url",
    "analytics_api_url",
    "rsid",
    "metascopes",
];

/// Application configuration
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

/// One named set of service-account settings. Every field is optional on disk;
/// [`Settings::from_profile`] enforces which ones are required.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "orgid")]
    pub org_id: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "technicalaccountid"
    )]
    pub technical_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "key_path")]
    pub private_key_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "imshost")]
    pub ims_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "apikey")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "secret")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "imsexchange")]
    pub ims_exchange_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "discoveryurl")]
    pub discovery_url: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "analyticsapiurl"
    )]
    pub analytics_api_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metascopes: Option<Vec<String>>,
}

impl Profile {
    /// Set a field by its config name. `metascopes` takes a comma-separated list.
    pub fn set_field(&mut self, field: &str, value: &str) -> std::result::Result<(), ConfigError> {
        let value = value.trim();
        let slot = match field {
            "org_id" => &mut self.org_id,
            "technical_account_id" => &mut self.technical_account_id,
            "private_key_path" => &mut self.private_key_path,
            "ims_host" => &mut self.ims_host,
            "api_key" => &mut self.api_key,
            "client_secret" => &mut self.client_secret,
            "ims_exchange_url" => &mut self.ims_exchange_url,
            "discovery_url" => &mut self.discovery_url,
            "analytics_api_url" => &mut self.analytics_api_url,
            "rsid" => &mut self.rsid,
            "metascopes" => {
                let scopes: Vec<String> = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                self.metascopes = (!scopes.is_empty()).then_some(scopes);
                return Ok(());
            }
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: format!("unknown field, expected one of: {}", PROFILE_FIELDS.join(", ")),
                });
            }
        };
        *slot = (!value.is_empty()).then(|| value.to_string());
        Ok(())
    }

    /// Fields present in this profile, secrets masked
    pub fn display_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        let mut push = |name: &'static str, value: &Option<String>, secret: bool| {
            if let Some(v) = value {
                let shown = if secret { mask_secret(v) } else { v.clone() };
                fields.push((name, shown));
            }
        };
        push("org_id", &self.org_id, false);
        push("technical_account_id", &self.technical_account_id, false);
        push("private_key_path", &self.private_key_path, false);
        push("ims_host", &self.ims_host, false);
        push("api_key", &self.api_key, true);
        push("client_secret", &self.client_secret, true);
        push("ims_exchange_url", &self.ims_exchange_url, false);
        push("discovery_url", &self.discovery_url, false);
        push("analytics_api_url", &self.analytics_api_url, false);
        push("rsid", &self.rsid, false);
        if let Some(scopes) = &self.metascopes {
            fields.push(("metascopes", scopes.join(",")));
        }
        fields
    }
}

fn mask_secret(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    if value.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|e| StorageError::ConfigParseError {
                message: format!("Failed to parse config file: {}", e),
            })?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::FileIo {
                path: parent.to_string_lossy().to_string(),
                source,
            })?;
        }

        let toml_content = toml::to_string(self).map_err(|e| StorageError::ConfigParseError {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(&config_path, toml_content).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        Ok(())
    }

    fn config_file_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().ok_or(StorageError::ConfigDirNotFound)?;

        let app_config_dir = home_dir.join(".config").join("aa2");
        let config_file = app_config_dir.join("config.toml");

        Ok(config_file)
    }

    /// Name of the profile used when none is given on the command line
    pub fn default_profile_name(&self) -> String {
        self.default_profile
            .clone()
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
    }

    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn profile_mut(&mut self, name: &str) -> &mut Profile {
        self.profiles.entry(name.to_string()).or_default()
    }

    pub fn profile_names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }
}

/// Fully resolved, immutable settings for one profile
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub profile: String,
    pub org_id: String,
    pub technical_account_id: String,
    pub private_key_path: PathBuf,
    pub ims_host: String,
    pub api_key: String,
    pub client_secret: String,
    pub ims_exchange_url: String,
    pub discovery_url: String,
    pub analytics_api_url: String,
    pub rsid: String,
    pub metascopes: Vec<String>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("profile", &self.profile)
            .field("org_id", &self.org_id)
            .field("technical_account_id", &self.technical_account_id)
            .field("private_key_path", &self.private_key_path)
            .field("ims_host", &self.ims_host)
            .field("api_key", &mask_secret(&self.api_key))
            .field("client_secret", &"****")
            .field("ims_exchange_url", &self.ims_exchange_url)
            .field("discovery_url", &self.discovery_url)
            .field("analytics_api_url", &self.analytics_api_url)
            .field("rsid", &self.rsid)
            .field("metascopes", &self.metascopes)
            .finish()
    }
}

impl Settings {
    pub fn from_profile(name: &str, profile: &Profile) -> std::result::Result<Self, ConfigError> {
        let require = |field: &str, value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ConfigError::MissingField {
                    field: field.to_string(),
                    profile: name.to_string(),
                })
        };

        let metascopes = match &profile.metascopes {
            Some(scopes) if !scopes.is_empty() => scopes.clone(),
            _ => DEFAULT_METASCOPES.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            profile: name.to_string(),
            org_id: require("org_id", &profile.org_id)?,
            technical_account_id: require("technical_account_id", &profile.technical_account_id)?,
            private_key_path: PathBuf::from(require("private_key_path", &profile.private_key_path)?),
            ims_host: require("ims_host", &profile.ims_host)?,
            api_key: require("api_key", &profile.api_key)?,
            client_secret: require("client_secret", &profile.client_secret)?,
            ims_exchange_url: require("ims_exchange_url", &profile.ims_exchange_url)?,
            discovery_url: require("discovery_url", &profile.discovery_url)?,
            analytics_api_url: require("analytics_api_url", &profile.analytics_api_url)?
                .trim_end_matches('/')
                .to_string(),
            rsid: require("rsid", &profile.rsid)?,
            metascopes,
        })
    }

    /// Build settings from a flat key-value source. Accepts both the profile
    /// field names and the short legacy keys (`orgid`, `apikey`, `key_path`...).
    pub fn from_key_values(
        values: &HashMap<String, String>,
    ) -> std::result::Result<Self, ConfigError> {
        const LEGACY_KEYS: [(&str, &str); 9] = [
            ("orgid", "org_id"),
            ("technicalaccountid", "technical_account_id"),
            ("key_path", "private_key_path"),
            ("imshost", "ims_host"),
            ("apikey", "api_key"),
            ("secret", "client_secret"),
            ("imsexchange", "ims_exchange_url"),
            ("discoveryurl", "discovery_url"),
            ("analyticsapiurl", "analytics_api_url"),
        ];

        let mut profile = Profile::default();
        for (key, value) in values {
            let key = key.trim().to_lowercase();
            let field = LEGACY_KEYS
                .iter()
                .find(|(legacy, _)| *legacy == key)
                .map(|(_, field)| *field)
                .unwrap_or(key.as_str());
            if PROFILE_FIELDS.contains(&field) {
                profile.set_field(field, value)?;
            }
        }
        Self::from_profile(DEFAULT_PROFILE, &profile)
    }

    /// Read the PEM private key used to sign the exchange assertion
    pub fn read_private_key(&self) -> std::result::Result<String, ConfigError> {
        fs::read_to_string(&self.private_key_path).map_err(|source| {
            ConfigError::PrivateKeyUnreadable {
                path: self.private_key_path.to_string_lossy().to_string(),
                source,
            }
        })
    }
}
