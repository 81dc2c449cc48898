#![allow(dead_code)]

use aa2_core::api::session::Session;
use aa2_core::storage::config::{Profile, Settings};
use wiremock::MockServer;

pub const API_KEY: &str = "test-client-id";
pub const TOKEN: &str = "test-access-token";
pub const COMPANY: &str = "testco0";
pub const RSID: &str = "testsuite";

pub fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

/// Settings whose endpoints all point at `server`
pub fn settings_for(server: &MockServer) -> Settings {
    let profile = Profile {
        org_id: Some("TESTORG@AdobeOrg".to_string()),
        technical_account_id: Some("TECH@techacct.adobe.com".to_string()),
        private_key_path: Some(fixture_path("test_private_key.pem")),
        ims_host: Some("ims.example.test".to_string()),
        api_key: Some(API_KEY.to_string()),
        client_secret: Some("test-secret".to_string()),
        ims_exchange_url: Some(format!("{}/ims/exchange/jwt", server.uri())),
        discovery_url: Some(format!("{}/discovery/me", server.uri())),
        analytics_api_url: Some(format!("{}/api", server.uri())),
        rsid: Some(RSID.to_string()),
        metascopes: None,
    };
    Settings::from_profile("test", &profile).unwrap()
}

/// Session against `<server>/api/<company>`
pub fn session_for(server: &MockServer) -> Session {
    Session::new(
        TOKEN.to_string(),
        API_KEY.to_string(),
        COMPANY.to_string(),
        RSID.to_string(),
        &format!("{}/api", server.uri()),
    )
}

pub fn company_path(path: &str) -> String {
    format!("/api/{}{}", COMPANY, path)
}
