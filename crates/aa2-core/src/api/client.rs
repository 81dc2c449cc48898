use crate::api::auth::select_company_id;
use crate::api::models::{
    CalculatedMetric, DiscoveryResponse, Dimension, Metric, Page, ReportResponse, ReportSuite,
    Segment, TokenResponse,
};
use crate::api::session::{API_KEY_HEADER, Session};
use crate::core::report::ReportBody;
use crate::error::{ApiError, AppError, AuthError};
use crate::storage::config::Settings;
use crate::utils::error_helpers::*;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const REPORT_TIMEOUT_SECS: u64 = 60;
const USER_AGENT: &str = concat!("aa2/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the identity, discovery and analytics endpoints.
///
/// The client itself holds no credentials; every analytics call takes the
/// [`Session`] it should run under.
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    client: Client,
}

impl AnalyticsClient {
    pub fn new() -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| convert_request_error(e, "client_init", DEFAULT_TIMEOUT_SECS))?;

        Ok(AnalyticsClient { client })
    }

    /// Request against `<base_url><path>` carrying the session headers
    pub fn build_request(
        &self,
        session: &Session,
        method: Method,
        path: &str,
    ) -> Result<RequestBuilder, ApiError> {
        let url = format!("{}{}", session.base_url(), path);
        let headers = session.headers().map_err(|e| ApiError::Http {
            status: 0,
            endpoint: path.to_string(),
            message: format!("Invalid header value: {}", e),
        })?;

        Ok(self.client.request(method, url).headers(headers))
    }

    /// Exchange a signed assertion for a bearer access token
    pub async fn exchange_token(
        &self,
        settings: &Settings,
        assertion: &str,
    ) -> Result<String, AppError> {
        let endpoint = settings.ims_exchange_url.as_str();
        log::info!("Sending POST request to {}", endpoint);

        let form = [
            ("client_id", settings.api_key.as_str()),
            ("client_secret", settings.client_secret.as_str()),
            ("jwt_token", assertion),
        ];
        let response = self
            .client
            .post(endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| convert_request_error(e, endpoint, DEFAULT_TIMEOUT_SECS))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| convert_request_error(e, endpoint, DEFAULT_TIMEOUT_SECS))?;

        let exchange_error = |message: String| AuthError::TokenExchange {
            endpoint: endpoint.to_string(),
            message,
        };

        if !status.is_success() {
            return Err(exchange_error(format!("status {}: {}", status.as_u16(), body)).into());
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| exchange_error(format!("unreadable response: {}", e)))?;

        if let Some(expires_in) = token.expires_in {
            log::debug!("Access token issued, expires in {}", expires_in);
        }

        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| exchange_error("response did not contain access_token".to_string()).into())
    }

    /// Resolve the global company id visible to the access token
    pub async fn discover_company_id(
        &self,
        settings: &Settings,
        access_token: &str,
    ) -> Result<String, AppError> {
        let endpoint = settings.discovery_url.as_str();
        log::info!("Sending GET request to {}", endpoint);

        let response = self
            .client
            .get(endpoint)
            .bearer_auth(access_token)
            .header(API_KEY_HEADER, settings.api_key.as_str())
            .send()
            .await
            .map_err(|e| convert_request_error(e, endpoint, DEFAULT_TIMEOUT_SECS))?;

        let discovery: DiscoveryResponse =
            Self::handle_response(response, endpoint, DEFAULT_TIMEOUT_SECS).await?;
        Ok(select_company_id(&discovery)?)
    }

    async fn get_json<T>(
        &self,
        session: &Session,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        log::info!("Sending GET request to {}{}", session.base_url(), path);

        let response = self
            .build_request(session, Method::GET, path)?
            .query(query)
            .send()
            .await
            .map_err(|e| convert_request_error(e, path, DEFAULT_TIMEOUT_SECS))?;

        Ok(Self::handle_response(response, path, DEFAULT_TIMEOUT_SECS).await?)
    }

    /// `GET /collections/suites?limit=N`
    pub async fn get_report_suites(
        &self,
        session: &Session,
        limit: u32,
    ) -> Result<Vec<ReportSuite>, AppError> {
        let page: Page<ReportSuite> = self
            .get_json(
                session,
                "/collections/suites",
                &[("limit", limit.to_string())],
            )
            .await?;
        Ok(page.content)
    }

    /// `GET /dimensions/?rsid=R`
    pub async fn get_dimensions(&self, session: &Session) -> Result<Vec<Dimension>, AppError> {
        self.get_json(session, "/dimensions/", &[("rsid", session.rsid().to_string())])
            .await
    }

    /// `GET /metrics/?rsid=R`
    pub async fn get_metrics(&self, session: &Session) -> Result<Vec<Metric>, AppError> {
        self.get_json(session, "/metrics/", &[("rsid", session.rsid().to_string())])
            .await
    }

    /// `GET /calculatedmetrics/?rsid=R&includeType=all&limit=N[&name=Q]`
    pub async fn get_calculated_metrics(
        &self,
        session: &Session,
        name: Option<&str>,
        limit: u32,
    ) -> Result<Vec<CalculatedMetric>, AppError> {
        let mut query = vec![
            ("rsid", session.rsid().to_string()),
            ("includeType", "all".to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            query.push(("name", name.to_string()));
        }

        let page: Page<CalculatedMetric> = self
            .get_json(session, "/calculatedmetrics/", &query)
            .await?;
        Ok(page.content)
    }

    /// `GET /segments?rsids=R&includeType=all&limit=N[&name=Q]`
    pub async fn get_segments(
        &self,
        session: &Session,
        name: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Segment>, AppError> {
        let mut query = vec![
            ("rsids", session.rsid().to_string()),
            ("includeType", "all".to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            query.push(("name", name.to_string()));
        }

        let page: Page<Segment> = self.get_json(session, "/segments", &query).await?;
        Ok(page.content)
    }

    /// `POST /reports/?rsid=R`
    pub async fn run_report(
        &self,
        session: &Session,
        body: &ReportBody,
    ) -> Result<ReportResponse, AppError> {
        let endpoint = "/reports/";
        log::info!(
            "Sending POST request to {}{} (dimension: {}, metrics: {})",
            session.base_url(),
            endpoint,
            body.dimension.as_deref().unwrap_or("-"),
            body.metric_container.metrics.len()
        );

        let response = self
            .build_request(session, Method::POST, endpoint)?
            .query(&[("rsid", session.rsid())])
            .json(body)
            .timeout(Duration::from_secs(REPORT_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| convert_request_error(e, endpoint, REPORT_TIMEOUT_SECS))?;

        Ok(Self::handle_response(response, endpoint, REPORT_TIMEOUT_SECS).await?)
    }

    /// Decode a successful body or classify the failure status.
    ///
    /// `timeout_secs` is the limit the request was sent with, reported on 408/504.
    pub async fn handle_response<T>(
        response: Response,
        endpoint: &str,
        timeout_secs: u64,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| convert_json_error(e, endpoint))
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            match status.as_u16() {
                401 | 403 => Err(ApiError::Unauthorized {
                    status: status.as_u16(),
                    endpoint: endpoint.to_string(),
                    server_message: error_text,
                }),
                408 | 504 => Err(ApiError::Timeout {
                    timeout_secs,
                    endpoint: endpoint.to_string(),
                }),
                _ => Err(ApiError::Http {
                    status: status.as_u16(),
                    endpoint: endpoint.to_string(),
                    message: error_text,
                }),
            }
        }
    }
}
