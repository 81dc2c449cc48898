use crate::core::report::{DEFAULT_ROW_LIMIT, DateRange, ReportRequest};
use std::collections::HashMap;

/// Freeform report parameters
#[derive(Debug, Clone, PartialEq)]
pub struct FreeformRequest {
    /// One or two dimension ids; the second breaks down each item of the first
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    /// At most one segment id
    pub segments: Vec<String>,
    /// Search clause per dimension id
    pub search: HashMap<String, String>,
    pub date_range: DateRange,
    pub limit: u32,
}

impl FreeformRequest {
    pub fn new(dimensions: Vec<String>, metrics: Vec<String>) -> Self {
        Self {
            dimensions,
            metrics,
            segments: Vec::new(),
            search: HashMap::new(),
            date_range: DateRange::default(),
            limit: DEFAULT_ROW_LIMIT,
        }
    }

    pub fn with_segments(mut self, segments: Vec<String>) -> Self {
        self.segments = segments;
        self
    }

    pub fn with_search(mut self, search: HashMap<String, String>) -> Self {
        self.search = search;
        self
    }

    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Report request with `dimension` as the row dimension and the shared
    /// metrics, segments, search clauses, range and limit
    pub fn report_for(&self, dimension: &str) -> ReportRequest {
        ReportRequest::new(self.metrics.clone())
            .with_dimension(dimension)
            .with_segments(self.segments.clone())
            .with_search(self.search.clone())
            .with_date_range(self.date_range)
            .with_limit(self.limit)
    }
}
