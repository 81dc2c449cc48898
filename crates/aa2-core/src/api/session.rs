//! Authenticated session
//!
//! A `Session` is built once after the token exchange and company discovery
//! and never mutated afterwards. It is passed by reference to every API call,
//! so one session can be shared read-only between call sites.

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue};
use std::fmt;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const COMPANY_HEADER: &str = "x-proxy-global-company-id";

#[derive(Clone, PartialEq)]
pub struct Session {
    access_token: String,
    api_key: String,
    company_id: String,
    rsid: String,
    base_url: String,
}

impl Session {
    /// `analytics_api_url` is the API root; the company id is appended to form
    /// the base path of every request.
    pub fn new(
        access_token: String,
        api_key: String,
        company_id: String,
        rsid: String,
        analytics_api_url: &str,
    ) -> Self {
        let base_url = format!("{}/{}", analytics_api_url.trim_end_matches('/'), company_id);
        Self {
            access_token,
            api_key,
            company_id,
            rsid,
            base_url,
        }
    }

    pub fn company_id(&self) -> &str {
        &self.company_id
    }

    pub fn rsid(&self) -> &str {
        &self.rsid
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Headers sent with every analytics API request
    pub fn headers(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&self.bearer())?);
        headers.insert(API_KEY_HEADER, HeaderValue::from_str(&self.api_key)?);
        headers.insert(COMPANY_HEADER, HeaderValue::from_str(&self.company_id)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("company_id", &self.company_id)
            .field("rsid", &self.rsid)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(
            "token-abc".to_string(),
            "client-id".to_string(),
            "exampl0".to_string(),
            "suite".to_string(),
            "https://analytics.example.test/api/",
        )
    }

    #[test]
    fn test_base_url_includes_company() {
        assert_eq!(
            session().base_url(),
            "https://analytics.example.test/api/exampl0"
        );
    }

    #[test]
    fn test_headers() {
        let headers = session().headers().expect("headers");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer token-abc");
        assert_eq!(headers.get(API_KEY_HEADER).unwrap(), "client-id");
        assert_eq!(headers.get(COMPANY_HEADER).unwrap(), "exampl0");
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", session());
        assert!(!debug.contains("token-abc"));
        assert!(debug.contains("exampl0"));
    }
}
