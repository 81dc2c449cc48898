//! Service-account authentication
//!
//! The JWT assertion is signed RS256 with the technical account's private key
//! and exchanged for a bearer token. The bearer token is then used to look up
//! the global company id through the discovery endpoint.

use crate::api::models::DiscoveryResponse;
use crate::error::{AuthError, ConfigError};
use crate::storage::config::Settings;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Map, Value};

/// Lifetime of the signed assertion
pub const ASSERTION_TTL_SECS: i64 = 300;

/// Claims carried by the exchange assertion
pub fn assertion_claims(settings: &Settings, now: DateTime<Utc>) -> Map<String, Value> {
    let mut claims = Map::new();
    let exp = now + Duration::seconds(ASSERTION_TTL_SECS);
    claims.insert("exp".to_string(), Value::from(exp.timestamp()));
    claims.insert("iss".to_string(), Value::from(settings.org_id.clone()));
    claims.insert(
        "sub".to_string(),
        Value::from(settings.technical_account_id.clone()),
    );
    claims.insert(
        "aud".to_string(),
        Value::from(format!(
            "https://{}/c/{}",
            settings.ims_host, settings.api_key
        )),
    );
    for scope in &settings.metascopes {
        claims.insert(
            format!("https://{}/s/{}", settings.ims_host, scope),
            Value::Bool(true),
        );
    }
    claims
}

/// Sign the exchange assertion with the PEM encoded RSA private key
pub fn build_assertion(
    settings: &Settings,
    private_key_pem: &str,
    now: DateTime<Utc>,
) -> crate::Result<String> {
    let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes()).map_err(|e| {
        ConfigError::PrivateKeyInvalid {
            path: settings.private_key_path.to_string_lossy().to_string(),
            reason: e.to_string(),
        }
    })?;

    let claims = assertion_claims(settings, now);
    let token = encode(&Header::new(Algorithm::RS256), &claims, &key).map_err(|e| {
        AuthError::Signing {
            message: e.to_string(),
        }
    })?;
    Ok(token)
}

/// Pick the company to route requests to.
///
/// Only the first company of the first organization is used. When more are
/// visible to the technical account they are logged and ignored.
pub fn select_company_id(discovery: &DiscoveryResponse) -> Result<String, AuthError> {
    let org = discovery
        .ims_orgs
        .first()
        .ok_or_else(|| AuthError::CompanyNotFound {
            message: "response has no imsOrgs".to_string(),
        })?;
    let company = org
        .companies
        .first()
        .ok_or_else(|| AuthError::CompanyNotFound {
            message: "first organization has no companies".to_string(),
        })?;
    let company_id = company
        .global_company_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AuthError::CompanyNotFound {
            message: "first company has no globalCompanyId".to_string(),
        })?;

    let ignored: Vec<&str> = discovery
        .ims_orgs
        .iter()
        .flat_map(|o| o.companies.iter())
        .skip(1)
        .map(|c| c.global_company_id.as_deref().unwrap_or("<no id>"))
        .collect();
    if !ignored.is_empty() {
        log::warn!(
            "Using company {}; ignoring {} other visible companies: {}",
            company_id,
            ignored.len(),
            ignored.join(", ")
        );
    }

    Ok(company_id.to_string())
}
