//! Freeform (cross-tab) report assembly
//!
//! Stage 1 reports on the first dimension. With a second dimension, stage 2
//! issues one drill-down report per distinct stage-1 item, sequentially, and
//! the results are joined back onto the stage-1 items.

use super::report_service::ReportSource;
use super::types::FreeformRequest;
use crate::AppError;
use crate::api::models::ReportRow;
use crate::core::table::{BreakdownRecord, DimensionRecord, ResultTable};
use crate::error::EmptyResultError;
use crate::utils::validation::validate_freeform_counts;
use std::collections::HashSet;

pub struct FreeformService<S> {
    source: S,
}

/// First occurrence of each item id, in response order
fn distinct_records(rows: &[ReportRow]) -> Vec<DimensionRecord> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|row| seen.insert(row.item_id.as_str()))
        .map(DimensionRecord::from)
        .collect()
}

impl<S: ReportSource> FreeformService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Run the report and return one flattened table.
    ///
    /// Argument counts are checked before any request is sent. Any drill-down
    /// that comes back empty aborts the whole report with
    /// [`EmptyResultError`]; partial tables are never returned.
    pub async fn run(&self, request: &FreeformRequest) -> Result<ResultTable, AppError> {
        validate_freeform_counts(
            request.dimensions.len(),
            request.metrics.len(),
            request.segments.len(),
        )?;

        let first_dimension = request.dimensions[0].as_str();
        let stage_one = self
            .source
            .fetch_report(&request.report_for(first_dimension))
            .await?;

        let parents = distinct_records(&stage_one.rows);
        log::debug!(
            "{} returned {} rows ({} distinct items)",
            first_dimension,
            stage_one.rows.len(),
            parents.len()
        );

        let Some(second_dimension) = request.dimensions.get(1).map(String::as_str) else {
            return Ok(ResultTable::from_dimension_records(
                first_dimension,
                &request.metrics,
                &parents,
            ));
        };

        let breakdown_dimension = match stage_one.dimension_id() {
            Some(id) => id.to_string(),
            None => {
                log::warn!(
                    "Report response has no dimension column, breaking down by {}",
                    first_dimension
                );
                first_dimension.to_string()
            }
        };

        let mut children = Vec::new();
        for parent in &parents {
            let drill_down = request
                .report_for(second_dimension)
                .with_breakdown(breakdown_dimension.as_str(), parent.item_id.as_str());
            let response = self.source.fetch_report(&drill_down).await?;

            if response.rows.is_empty() {
                return Err(EmptyResultError {
                    dimension: second_dimension.to_string(),
                    item_id: parent.item_id.clone(),
                }
                .into());
            }

            children.extend(
                response
                    .rows
                    .iter()
                    .map(|row| BreakdownRecord::from_row(&parent.item_id, row)),
            );
        }

        Ok(ResultTable::join_breakdown(
            (first_dimension, second_dimension),
            &request.metrics,
            &parents,
            &children,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{ColumnDimension, ReportColumns, ReportResponse};
    use crate::core::report::ReportRequest;
    use crate::core::table::CellValue;
    use crate::error::InputError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn row(item_id: &str, value: &str, data: &[f64]) -> ReportRow {
        ReportRow {
            item_id: item_id.to_string(),
            value: value.to_string(),
            data: data.iter().copied().map(Some).collect(),
        }
    }

    fn response(dimension: &str, rows: Vec<ReportRow>) -> ReportResponse {
        ReportResponse {
            columns: ReportColumns {
                dimension: Some(ColumnDimension {
                    id: dimension.to_string(),
                    kind: None,
                }),
                column_ids: Vec::new(),
            },
            rows,
            total_elements: None,
        }
    }

    /// Answers stage-1 requests with `top` and drill-downs from `by_item`
    struct FakeSource {
        top: ReportResponse,
        by_item: HashMap<String, Vec<ReportRow>>,
        requests: Mutex<Vec<ReportRequest>>,
    }

    impl FakeSource {
        fn new(top: ReportResponse) -> Self {
            Self {
                top,
                by_item: HashMap::new(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn with_drill_down(mut self, item_id: &str, rows: Vec<ReportRow>) -> Self {
            self.by_item.insert(item_id.to_string(), rows);
            self
        }

        fn requests(&self) -> Vec<ReportRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReportSource for &FakeSource {
        async fn fetch_report(&self, request: &ReportRequest) -> Result<ReportResponse, AppError> {
            self.requests.lock().unwrap().push(request.clone());
            match &request.breakdown {
                None => Ok(self.top.clone()),
                Some(b) => Ok(response(
                    request.dimension.as_deref().unwrap_or_default(),
                    self.by_item.get(&b.item_id).cloned().unwrap_or_default(),
                )),
            }
        }
    }

    fn metrics() -> Vec<String> {
        vec!["metrics/visits".to_string(), "metrics/orders".to_string()]
    }

    fn pages() -> ReportResponse {
        response(
            "variables/page",
            vec![
                row("1", "Home", &[10.0, 1.0]),
                row("2", "Cart", &[4.0, 2.0]),
            ],
        )
    }

    #[tokio::test]
    async fn test_single_dimension_uses_one_request() {
        let source = FakeSource::new(pages());
        let service = FreeformService::new(&source);
        let request = FreeformRequest::new(vec!["variables/page".to_string()], metrics());

        let table = service.run(&request).await.expect("report");

        assert_eq!(source.requests().len(), 1);
        assert_eq!(
            table.columns(),
            &["variables/page", "metrics/visits", "metrics/orders"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1][0], CellValue::Text("Cart".to_string()));
        assert_eq!(table.rows()[1][2], CellValue::Number(2.0));
    }

    #[tokio::test]
    async fn test_two_dimensions_joins_drill_downs() {
        let source = FakeSource::new(pages())
            .with_drill_down(
                "1",
                vec![row("a", "Chrome", &[6.0, 1.0]), row("b", "Safari", &[4.0, 0.0])],
            )
            .with_drill_down("2", vec![row("a", "Chrome", &[4.0, 2.0])]);
        let service = FreeformService::new(&source);
        let request = FreeformRequest::new(
            vec!["variables/page".to_string(), "variables/browser".to_string()],
            metrics(),
        )
        .with_segments(vec!["s_mobile".to_string()])
        .with_limit(5);

        let table = service.run(&request).await.expect("report");

        // Row count is the sum of drill-down rows; parent values carried over
        assert_eq!(table.len(), 3);
        let parents: Vec<String> = table
            .column("variables/page")
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(parents, vec!["Home", "Home", "Cart"]);
        assert_eq!(table.rows()[2][1], CellValue::Text("Chrome".to_string()));
        assert_eq!(table.rows()[2][2], CellValue::Number(4.0));

        let requests = source.requests();
        assert_eq!(requests.len(), 3);
        let drill = &requests[1];
        assert_eq!(drill.dimension.as_deref(), Some("variables/browser"));
        let breakdown = drill.breakdown.as_ref().expect("breakdown");
        assert_eq!(breakdown.dimension, "variables/page");
        assert_eq!(breakdown.item_id, "1");
        assert_eq!(drill.segments, vec!["s_mobile".to_string()]);
        assert_eq!(drill.limit, 5);
        assert_eq!(requests[2].breakdown.as_ref().unwrap().item_id, "2");
    }

    #[tokio::test]
    async fn test_duplicate_items_are_fanned_out_once() {
        let top = response(
            "variables/page",
            vec![
                row("1", "Home", &[1.0]),
                row("1", "Home", &[1.0]),
                row("2", "Cart", &[1.0]),
            ],
        );
        let source = FakeSource::new(top)
            .with_drill_down("1", vec![row("x", "Chrome", &[1.0])])
            .with_drill_down("2", vec![row("x", "Chrome", &[1.0])]);
        let service = FreeformService::new(&source);
        let request = FreeformRequest::new(
            vec!["variables/page".to_string(), "variables/browser".to_string()],
            vec!["metrics/visits".to_string()],
        );

        let table = service.run(&request).await.expect("report");
        assert_eq!(source.requests().len(), 3);
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_drill_down_aborts() {
        let source = FakeSource::new(pages())
            .with_drill_down("1", vec![row("a", "Chrome", &[6.0, 1.0])]);
        let service = FreeformService::new(&source);
        let request = FreeformRequest::new(
            vec!["variables/page".to_string(), "variables/browser".to_string()],
            metrics(),
        );

        let err = service.run(&request).await.unwrap_err();
        match err {
            AppError::EmptyResult(e) => {
                assert_eq!(e.item_id, "2");
                assert_eq!(e.dimension, "variables/browser");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_arguments_send_no_requests() {
        let source = FakeSource::new(pages());
        let service = FreeformService::new(&source);

        let three = FreeformRequest::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            metrics(),
        );
        assert!(matches!(
            service.run(&three).await,
            Err(AppError::Input(InputError::TooManyDimensions { count: 3 }))
        ));

        let no_metrics = FreeformRequest::new(vec!["a".to_string()], vec![]);
        assert!(matches!(
            service.run(&no_metrics).await,
            Err(AppError::Input(InputError::NoMetrics))
        ));

        let no_dimensions = FreeformRequest::new(vec![], metrics());
        assert!(matches!(
            service.run(&no_dimensions).await,
            Err(AppError::Input(InputError::NoDimensions))
        ));

        let two_segments = FreeformRequest::new(vec!["a".to_string()], metrics())
            .with_segments(vec!["s1".to_string(), "s2".to_string()]);
        assert!(matches!(
            service.run(&two_segments).await,
            Err(AppError::Input(InputError::TooManySegments { count: 2 }))
        ));

        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_first_stage_gives_empty_table() {
        let source = FakeSource::new(response("variables/page", vec![]));
        let service = FreeformService::new(&source);
        let request = FreeformRequest::new(
            vec!["variables/page".to_string(), "variables/browser".to_string()],
            metrics(),
        );

        let table = service.run(&request).await.expect("report");
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 4);
        assert_eq!(source.requests().len(), 1);
    }
}
