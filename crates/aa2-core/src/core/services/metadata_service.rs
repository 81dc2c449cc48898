//! Report suite, dimension, metric and segment listings

use crate::AppError;
use crate::api::client::AnalyticsClient;
use crate::api::models::{CalculatedMetric, Dimension, Metric, MetricName, ReportSuite, Segment};
use crate::api::session::Session;
use crate::core::search::filter_by_name;
use crate::error::InputError;
use std::collections::HashSet;

pub const DEFAULT_SUITE_LIMIT: u32 = 10;
pub const DEFAULT_CALCULATED_METRIC_LIMIT: u32 = 100;
pub const DEFAULT_SEGMENT_LIMIT: u32 = 10;

pub struct MetadataService<'a> {
    client: &'a AnalyticsClient,
    session: &'a Session,
}

impl<'a> MetadataService<'a> {
    pub fn new(client: &'a AnalyticsClient, session: &'a Session) -> Self {
        Self { client, session }
    }

    pub async fn list_report_suites(&self, limit: u32) -> Result<Vec<ReportSuite>, AppError> {
        self.client.get_report_suites(self.session, limit).await
    }

    /// Dimensions of the session's report suite, optionally filtered by name
    pub async fn list_dimensions(
        &self,
        search_terms: &[String],
        exact: bool,
    ) -> Result<Vec<Dimension>, AppError> {
        let dimensions = self.client.get_dimensions(self.session).await?;
        Ok(filter_by_name(dimensions, search_terms, exact))
    }

    /// Metrics of the session's report suite, optionally filtered by name
    pub async fn list_metrics(
        &self,
        search_terms: &[String],
        exact: bool,
    ) -> Result<Vec<Metric>, AppError> {
        let metrics = self.client.get_metrics(self.session).await?;
        Ok(filter_by_name(metrics, search_terms, exact))
    }

    /// The search term is required; `Some("")` lists everything.
    pub async fn list_calculated_metrics(
        &self,
        search_term: Option<&str>,
        limit: u32,
    ) -> Result<Vec<CalculatedMetric>, AppError> {
        let term = search_term.ok_or_else(|| InputError::SearchTermRequired {
            resource: "calculated metrics".to_string(),
        })?;
        self.client
            .get_calculated_metrics(self.session, Some(term), limit)
            .await
    }

    /// The search term is required; `Some("")` lists everything.
    pub async fn list_segments(
        &self,
        search_term: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Segment>, AppError> {
        let term = search_term.ok_or_else(|| InputError::SearchTermRequired {
            resource: "segments".to_string(),
        })?;
        self.client
            .get_segments(self.session, Some(term), limit)
            .await
    }

    /// Names for the given metric ids, in server listing order. Unknown ids
    /// are skipped and duplicates collapse to one row.
    pub async fn resolve_metric_names(
        &self,
        metric_ids: &[String],
    ) -> Result<Vec<MetricName>, AppError> {
        if metric_ids.is_empty() {
            return Err(InputError::EmptyMetricIds.into());
        }

        let wanted: HashSet<&str> = metric_ids.iter().map(String::as_str).collect();
        let metrics = self.client.get_metrics(self.session).await?;

        Ok(metrics
            .into_iter()
            .filter(|m| wanted.contains(m.id.as_str()))
            .map(|m| MetricName {
                id: m.id,
                name: m.name,
            })
            .collect())
    }
}
