//! Configuration service for profile management and settings resolution

use crate::AppError;
use crate::error::CliError;
use crate::storage::config::{Config, Profile, Settings};
use crate::storage::credentials::with_env_overrides;
use std::path::PathBuf;

/// Configuration service wrapping the loaded [`Config`]
pub struct ConfigService {
    config: Config,
}

impl ConfigService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `requested` if given, otherwise the configured default profile
    pub fn profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_string)
            .unwrap_or_else(|| self.config.default_profile_name())
    }

    pub fn list_profiles(&self) -> Vec<String> {
        self.config.profile_names()
    }

    /// Stored profile without environment overrides
    pub fn get_profile(&self, name: &str) -> Result<&Profile, AppError> {
        self.config.get_profile(name).ok_or_else(|| {
            CliError::UnknownProfile {
                profile: name.to_string(),
                available_profiles: self.list_profiles(),
            }
            .into()
        })
    }

    /// Resolve a profile into [`Settings`], applying `AA2_*` overrides.
    ///
    /// A profile that is not in the file may still resolve when the
    /// environment is the only source; in that case every non-secret field is
    /// missing and the error names the first of them.
    pub fn resolve_settings(&self, requested: Option<&str>) -> Result<Settings, AppError> {
        let name = self.profile_name(requested);
        let stored = match self.config.get_profile(&name) {
            Some(profile) => profile.clone(),
            None if requested.is_some() => {
                return Err(CliError::UnknownProfile {
                    profile: name,
                    available_profiles: self.list_profiles(),
                }
                .into());
            }
            None => Profile::default(),
        };

        let merged = with_env_overrides(&stored);
        let settings = Settings::from_profile(&name, &merged)?;
        log::debug!("Resolved settings: {:?}", settings);
        Ok(settings)
    }

    /// Set one field of a profile, creating the profile if needed
    pub fn set_profile_field(
        &mut self,
        profile: &str,
        field: &str,
        value: &str,
    ) -> Result<(), AppError> {
        self.config.profile_mut(profile).set_field(field, value)?;
        if self.config.default_profile.is_none() {
            self.config.default_profile = Some(profile.to_string());
        }
        Ok(())
    }

    pub fn set_default_profile(&mut self, profile: &str) -> Result<(), AppError> {
        self.get_profile(profile)?;
        self.config.default_profile = Some(profile.to_string());
        Ok(())
    }

    /// Save configuration to file
    pub fn save_config(&self, path: Option<PathBuf>) -> Result<(), AppError> {
        self.config.save(path).map_err(|e| e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use tempfile::tempdir;

    fn service_with_profile(name: &str) -> ConfigService {
        let mut service = ConfigService::new(Config::default());
        for (field, value) in [
            ("org_id", "ORG@AdobeOrg"),
            ("technical_account_id", "TECH@techacct.example"),
            ("private_key_path", "/tmp/private.key"),
            ("ims_host", "ims.example.test"),
            ("api_key", "client-id"),
            ("client_secret", "secret"),
            ("ims_exchange_url", "https://ims.example.test/exchange"),
            ("discovery_url", "https://discovery.example.test/"),
            ("analytics_api_url", "https://analytics.example.test/api/"),
            ("rsid", "suite1"),
        ] {
            service.set_profile_field(name, field, value).unwrap();
        }
        service
    }

    #[test]
    fn test_first_profile_becomes_default() {
        let service = service_with_profile("prod");
        assert_eq!(service.profile_name(None), "prod");
        assert_eq!(service.profile_name(Some("stage")), "stage");
        assert_eq!(service.list_profiles(), vec!["prod".to_string()]);
    }

    #[test]
    fn test_resolve_settings_for_named_profile() {
        let service = service_with_profile("prod");
        let settings = service.resolve_settings(Some("prod")).unwrap();
        assert_eq!(settings.profile, "prod");
        assert_eq!(
            settings.analytics_api_url,
            "https://analytics.example.test/api"
        );
        assert_eq!(settings.metascopes.len(), 2);
    }

    #[test]
    fn test_unknown_profile_lists_available() {
        let service = service_with_profile("prod");
        match service.resolve_settings(Some("missing")) {
            Err(AppError::Cli(CliError::UnknownProfile {
                profile,
                available_profiles,
            })) => {
                assert_eq!(profile, "missing");
                assert_eq!(available_profiles, vec!["prod".to_string()]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_config_reports_missing_field() {
        let service = ConfigService::new(Config::default());
        assert!(matches!(
            service.resolve_settings(None),
            Err(AppError::Config(ConfigError::MissingField { .. }))
        ));
    }

    #[test]
    fn test_set_unknown_field_fails() {
        let mut service = ConfigService::new(Config::default());
        assert!(matches!(
            service.set_profile_field("prod", "colour", "blue"),
            Err(AppError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_set_default_requires_existing_profile() {
        let mut service = service_with_profile("prod");
        assert!(service.set_default_profile("stage").is_err());
        service.set_profile_field("stage", "rsid", "suite2").unwrap();
        service.set_default_profile("stage").unwrap();
        assert_eq!(service.profile_name(None), "stage");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let service = service_with_profile("prod");
        service.save_config(Some(path.clone())).unwrap();

        let reloaded = ConfigService::new(Config::load(Some(path)).unwrap());
        assert_eq!(reloaded.list_profiles(), vec!["prod".to_string()]);
        assert_eq!(
            reloaded.get_profile("prod").unwrap().rsid.as_deref(),
            Some("suite1")
        );
    }
}
