//! Name filtering for metadata listings

use crate::api::models::{CalculatedMetric, Dimension, Metric, Segment};

/// Anything with a display name that can be searched
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Dimension {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Metric {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for CalculatedMetric {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Segment {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Keep items whose name matches any of `terms`, ignoring case.
///
/// `exact` compares the whole name; otherwise a term only has to occur in it.
/// No terms means no filtering.
pub fn filter_by_name<T: Named>(items: Vec<T>, terms: &[String], exact: bool) -> Vec<T> {
    let terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
    if terms.is_empty() {
        return items;
    }

    items
        .into_iter()
        .filter(|item| {
            let name = item.name().to_lowercase();
            if exact {
                terms.iter().any(|t| *t == name)
            } else {
                terms.iter().any(|t| name.contains(t.as_str()))
            }
        })
        .collect()
}
