use crate::AppError;
use crate::api::client::AnalyticsClient;
use crate::api::models::ReportResponse;
use crate::api::session::Session;
use crate::core::report::ReportRequest;
use async_trait::async_trait;

/// Something that can answer a single report request
#[async_trait]
pub trait ReportSource {
    async fn fetch_report(&self, request: &ReportRequest) -> Result<ReportResponse, AppError>;
}

/// Runs report requests against the API under one session
pub struct ReportService<'a> {
    client: &'a AnalyticsClient,
    session: &'a Session,
}

impl<'a> ReportService<'a> {
    pub fn new(client: &'a AnalyticsClient, session: &'a Session) -> Self {
        Self { client, session }
    }

    /// Build the body for the session's report suite and post it
    pub async fn run(&self, request: &ReportRequest) -> Result<ReportResponse, AppError> {
        let body = request.to_body(self.session.rsid());
        log::debug!(
            "Report request: dimension={:?} metrics={} breakdown={:?} range={}",
            request.dimension,
            request.metrics.len(),
            request.breakdown.as_ref().map(|b| &b.item_id),
            request.date_range.to_api_string()
        );
        self.client.run_report(self.session, &body).await
    }
}

#[async_trait]
impl ReportSource for ReportService<'_> {
    async fn fetch_report(&self, request: &ReportRequest) -> Result<ReportResponse, AppError> {
        self.run(request).await
    }
}
