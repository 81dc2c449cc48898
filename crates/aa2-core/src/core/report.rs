//! Report request construction
//!
//! [`ReportRequest`] is the caller-facing description of one report call;
//! [`ReportRequest::to_body`] turns it into the JSON body posted to
//! `/reports/`.

use crate::error::InputError;
use chrono::{Days, Local, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_ROW_LIMIT: u32 = 50;
const MIDNIGHT: &str = "T00:00:00.000";

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InputError> {
        if start > end {
            return Err(InputError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Yesterday through `today`
    pub fn ending_on(today: NaiveDate) -> Self {
        let start = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        Self { start, end: today }
    }

    /// Yesterday through today on the local calendar
    pub fn yesterday_to_today() -> Self {
        Self::ending_on(Local::now().date_naive())
    }

    /// Parse optional `YYYY-MM-DD` bounds, filling the gaps relative to `today`
    pub fn parse(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, InputError> {
        let defaults = Self::ending_on(today);
        let start = match start {
            Some(s) => parse_day(s)?,
            None => defaults.start,
        };
        let end = match end {
            Some(e) => parse_day(e)?,
            None => defaults.end,
        };
        Self::new(start, end)
    }

    /// `YYYY-MM-DDT00:00:00.000/YYYY-MM-DDT00:00:00.000`
    pub fn to_api_string(&self) -> String {
        format!(
            "{}{}/{}{}",
            self.start.format("%Y-%m-%d"),
            MIDNIGHT,
            self.end.format("%Y-%m-%d"),
            MIDNIGHT
        )
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::yesterday_to_today()
    }
}

pub fn parse_day(value: &str) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| InputError::InvalidDate {
        value: value.to_string(),
    })
}

/// Restrict every metric to one item of a dimension (drill-down)
#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    pub dimension: String,
    pub item_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub dimension: Option<String>,
    pub metrics: Vec<String>,
    pub breakdown: Option<Breakdown>,
    pub date_range: DateRange,
    pub segments: Vec<String>,
    /// Search clause per row dimension id
    pub search: HashMap<String, String>,
    pub limit: u32,
}

impl ReportRequest {
    pub fn new(metrics: Vec<String>) -> Self {
        Self {
            dimension: None,
            metrics,
            breakdown: None,
            date_range: DateRange::default(),
            segments: Vec::new(),
            search: HashMap::new(),
            limit: DEFAULT_ROW_LIMIT,
        }
    }

    pub fn with_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.dimension = Some(dimension.into());
        self
    }

    pub fn with_breakdown(
        mut self,
        dimension: impl Into<String>,
        item_id: impl Into<String>,
    ) -> Self {
        self.breakdown = Some(Breakdown {
            dimension: dimension.into(),
            item_id: item_id.into(),
        });
        self
    }

    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    pub fn with_segments(mut self, segments: Vec<String>) -> Self {
        self.segments = segments;
        self
    }

    pub fn with_search(mut self, search: HashMap<String, String>) -> Self {
        self.search = search;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Build the `/reports/` body for report suite `rsid`
    pub fn to_body(&self, rsid: &str) -> ReportBody {
        let mut metrics = Vec::with_capacity(self.metrics.len());
        let mut metric_filters = Vec::new();

        for (idx, metric_id) in self.metrics.iter().enumerate() {
            let mut filters = Vec::new();
            if let Some(breakdown) = &self.breakdown {
                filters.push(idx);
                metric_filters.push(MetricFilter {
                    id: idx,
                    kind: "breakdown",
                    dimension: breakdown.dimension.clone(),
                    item_id: breakdown.item_id.clone(),
                });
            }
            metrics.push(MetricEntry {
                column_id: idx,
                id: metric_id.clone(),
                filters,
            });
        }

        let mut global_filters = vec![GlobalFilter::DateRange {
            date_range: self.date_range.to_api_string(),
        }];
        global_filters.extend(self.segments.iter().map(|segment_id| GlobalFilter::Segment {
            segment_id: segment_id.clone(),
        }));

        let search = self
            .dimension
            .as_ref()
            .and_then(|dim| self.search.get(dim))
            .map(|clause| SearchClause {
                clause: clause.clone(),
            });

        ReportBody {
            rsid: rsid.to_string(),
            global_filters,
            metric_container: MetricContainer {
                metrics,
                metric_filters,
            },
            dimension: self.dimension.clone(),
            settings: ReportSettings {
                count_repeat_instances: true,
                limit: self.limit,
            },
            search,
        }
    }
}

// Wire body
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportBody {
    pub rsid: String,
    pub global_filters: Vec<GlobalFilter>,
    pub metric_container: MetricContainer,
    pub dimension: Option<String>,
    pub settings: ReportSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchClause>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum GlobalFilter {
    #[serde(rename = "dateRange")]
    DateRange {
        #[serde(rename = "dateRange")]
        date_range: String,
    },
    #[serde(rename = "segment")]
    Segment {
        #[serde(rename = "segmentId")]
        segment_id: String,
    },
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricContainer {
    pub metrics: Vec<MetricEntry>,
    pub metric_filters: Vec<MetricFilter>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricEntry {
    pub column_id: usize,
    pub id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<usize>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricFilter {
    pub id: usize,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub dimension: String,
    pub item_id: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSettings {
    pub count_repeat_instances: bool,
    pub limit: u32,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SearchClause {
    pub clause: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        parse_day(s).expect("valid date")
    }

    fn january() -> DateRange {
        DateRange::new(day("2024-01-01"), day("2024-01-02")).expect("range")
    }

    #[test]
    fn test_date_range_api_string() {
        assert_eq!(
            january().to_api_string(),
            "2024-01-01T00:00:00.000/2024-01-02T00:00:00.000"
        );
    }

    #[test]
    fn test_date_range_defaults_to_yesterday_and_today() {
        let range = DateRange::parse(None, None, day("2024-03-01")).expect("range");
        assert_eq!(range.start, day("2024-02-29"));
        assert_eq!(range.end, day("2024-03-01"));

        let range = DateRange::parse(Some("2024-02-01"), None, day("2024-03-01")).expect("range");
        assert_eq!(range.start, day("2024-02-01"));
        assert_eq!(range.end, day("2024-03-01"));
    }

    #[test]
    fn test_date_range_rejects_bad_input() {
        assert_eq!(
            DateRange::parse(Some("2024-13-01"), None, day("2024-03-01")),
            Err(InputError::InvalidDate {
                value: "2024-13-01".to_string()
            })
        );
        assert!(matches!(
            DateRange::new(day("2024-02-02"), day("2024-02-01")),
            Err(InputError::InvalidDateRange { .. })
        ));
        // Single-day ranges are allowed
        assert!(DateRange::new(day("2024-02-01"), day("2024-02-01")).is_ok());
    }

    #[test]
    fn test_body_without_breakdown() {
        let body = ReportRequest::new(vec!["metrics/visits".into(), "metrics/pageviews".into()])
            .with_dimension("variables/page")
            .with_date_range(january())
            .to_body("suite");

        assert_eq!(
            serde_json::to_value(&body).expect("serialize"),
            json!({
                "rsid": "suite",
                "globalFilters": [
                    {"type": "dateRange", "dateRange": "2024-01-01T00:00:00.000/2024-01-02T00:00:00.000"}
                ],
                "metricContainer": {
                    "metrics": [
                        {"columnId": 0, "id": "metrics/visits"},
                        {"columnId": 1, "id": "metrics/pageviews"}
                    ],
                    "metricFilters": []
                },
                "dimension": "variables/page",
                "settings": {"countRepeatInstances": true, "limit": 50}
            })
        );
    }

    #[test]
    fn test_body_with_breakdown_and_segment() {
        let body = ReportRequest::new(vec!["metrics/visits".into(), "metrics/orders".into()])
            .with_dimension("variables/browser")
            .with_breakdown("variables/page", "1234")
            .with_segments(vec!["s_mobile".into()])
            .with_date_range(january())
            .with_limit(10)
            .to_body("suite");

        let value = serde_json::to_value(&body).expect("serialize");
        assert_eq!(
            value["metricContainer"],
            json!({
                "metrics": [
                    {"columnId": 0, "id": "metrics/visits", "filters": [0]},
                    {"columnId": 1, "id": "metrics/orders", "filters": [1]}
                ],
                "metricFilters": [
                    {"id": 0, "type": "breakdown", "dimension": "variables/page", "itemId": "1234"},
                    {"id": 1, "type": "breakdown", "dimension": "variables/page", "itemId": "1234"}
                ]
            })
        );
        assert_eq!(
            value["globalFilters"][1],
            json!({"type": "segment", "segmentId": "s_mobile"})
        );
        assert_eq!(value["settings"]["limit"], 10);
    }

    #[test]
    fn test_body_search_clause_only_for_row_dimension() {
        let search: HashMap<String, String> = [(
            "variables/page".to_string(),
            "CONTAINS 'checkout'".to_string(),
        )]
        .into_iter()
        .collect();

        let body = ReportRequest::new(vec!["metrics/visits".into()])
            .with_dimension("variables/page")
            .with_search(search.clone())
            .to_body("suite");
        assert_eq!(
            body.search,
            Some(SearchClause {
                clause: "CONTAINS 'checkout'".to_string()
            })
        );

        let body = ReportRequest::new(vec!["metrics/visits".into()])
            .with_dimension("variables/browser")
            .with_search(search)
            .to_body("suite");
        assert!(body.search.is_none());
        assert!(
            serde_json::to_value(&body)
                .expect("serialize")
                .get("search")
                .is_none()
        );
    }

    #[test]
    fn test_body_without_dimension_serializes_null() {
        let body = ReportRequest::new(vec!["metrics/visits".into()]).to_body("suite");
        let value = serde_json::to_value(&body).expect("serialize");
        assert!(value["dimension"].is_null());
    }
}
