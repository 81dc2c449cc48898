use crate::AppError;
use crate::api::auth::build_assertion;
use crate::api::client::AnalyticsClient;
use crate::api::session::Session;
use crate::storage::config::Settings;
use chrono::Utc;

/// Runs the JWT exchange and company discovery to produce a [`Session`]
pub struct AuthService<'a> {
    client: &'a AnalyticsClient,
    settings: &'a Settings,
}

impl<'a> AuthService<'a> {
    pub fn new(client: &'a AnalyticsClient, settings: &'a Settings) -> Self {
        Self { client, settings }
    }

    /// Sign an assertion and trade it for an access token
    pub async fn access_token(&self) -> Result<String, AppError> {
        let private_key = self.settings.read_private_key()?;
        let assertion = build_assertion(self.settings, &private_key, Utc::now())?;
        self.client.exchange_token(self.settings, &assertion).await
    }

    /// Full bootstrap: access token, then company id. The returned session
    /// is never refreshed; create a new one once the token expires.
    pub async fn authenticate(&self) -> Result<Session, AppError> {
        let access_token = self.access_token().await?;
        let company_id = self
            .client
            .discover_company_id(self.settings, &access_token)
            .await?;
        log::info!("Resolved global company id {}", company_id);

        Ok(Session::new(
            access_token,
            self.settings.api_key.clone(),
            company_id,
            self.settings.rsid.clone(),
            &self.settings.analytics_api_url,
        ))
    }
}
