//! Secret overrides from the environment
//!
//! `AA2_API_KEY`, `AA2_CLIENT_SECRET` and `AA2_RSID` take priority over the
//! values stored in the profile, so secrets can stay out of config.toml.

use super::config::Profile;
use std::env;

pub const API_KEY_ENV: &str = "AA2_API_KEY";
pub const CLIENT_SECRET_ENV: &str = "AA2_CLIENT_SECRET";
pub const RSID_ENV: &str = "AA2_RSID";

fn read_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Get the API key (client id) from the environment
pub fn get_api_key() -> Option<String> {
    read_env(API_KEY_ENV)
}

/// Get the client secret from the environment
pub fn get_client_secret() -> Option<String> {
    read_env(CLIENT_SECRET_ENV)
}

/// Get the report suite id from the environment
pub fn get_rsid() -> Option<String> {
    read_env(RSID_ENV)
}

pub fn has_client_secret() -> bool {
    get_client_secret().is_some()
}

/// Copy of `profile` with environment overrides applied
pub fn with_env_overrides(profile: &Profile) -> Profile {
    let mut merged = profile.clone();
    if let Some(api_key) = get_api_key() {
        merged.api_key = Some(api_key);
    }
    if let Some(secret) = get_client_secret() {
        merged.client_secret = Some(secret);
    }
    if let Some(rsid) = get_rsid() {
        merged.rsid = Some(rsid);
    }
    merged
}
