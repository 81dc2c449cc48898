//! Flattened report results
//!
//! Report rows are first turned into explicit records, then projected into a
//! [`ResultTable`] in one step. Two-dimension reports inner-join the
//! breakdown records onto their parent records by item id.

use crate::api::models::ReportRow;
use crate::utils::text::escape_csv_field;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Empty => Ok(()),
        }
    }
}

impl CellValue {
    fn to_json(&self) -> Value {
        match self {
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CellValue::Empty => Value::Null,
        }
    }
}

/// One row of a first-level report: an item of the row dimension
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionRecord {
    pub item_id: String,
    pub value: String,
    pub metrics: Vec<Option<f64>>,
}

impl From<&ReportRow> for DimensionRecord {
    fn from(row: &ReportRow) -> Self {
        Self {
            item_id: row.item_id.clone(),
            value: row.value.clone(),
            metrics: row.data.clone(),
        }
    }
}

/// One row of a drill-down report, keyed by the parent item it was filtered to
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownRecord {
    pub parent_item_id: String,
    pub value: String,
    pub metrics: Vec<Option<f64>>,
}

impl BreakdownRecord {
    pub fn from_row(parent_item_id: &str, row: &ReportRow) -> Self {
        Self {
            parent_item_id: parent_item_id.to_string(),
            value: row.value.clone(),
            metrics: row.data.clone(),
        }
    }
}

/// Metric cells aligned to the requested metric list; absent or null values are empty
fn metric_cells(
    values: &[Option<f64>],
    metric_count: usize,
) -> impl Iterator<Item = CellValue> + '_ {
    (0..metric_count).map(move |idx| match values.get(idx) {
        Some(Some(v)) => CellValue::Number(*v),
        _ => CellValue::Empty,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row; it must have one cell per column
    pub fn push_row(&mut self, row: Vec<CellValue>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All cells of the named column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&CellValue>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// `[dimension, metrics...]`, one row per record
    pub fn from_dimension_records(
        dimension: &str,
        metrics: &[String],
        records: &[DimensionRecord],
    ) -> Self {
        let mut columns = vec![dimension.to_string()];
        columns.extend(metrics.iter().cloned());

        let mut table = Self::new(columns);
        for record in records {
            let mut row = vec![CellValue::Text(record.value.clone())];
            row.extend(metric_cells(&record.metrics, metrics.len()));
            table.push_row(row);
        }
        table
    }

    /// Inner join of breakdown records onto their parents by item id.
    ///
    /// Columns are `[first dimension, second dimension, metrics...]`; the item
    /// id itself is not projected. Rows follow parent order, then breakdown
    /// order within a parent.
    pub fn join_breakdown(
        dimensions: (&str, &str),
        metrics: &[String],
        parents: &[DimensionRecord],
        children: &[BreakdownRecord],
    ) -> Self {
        let mut by_parent: HashMap<&str, Vec<&BreakdownRecord>> = HashMap::new();
        for child in children {
            by_parent
                .entry(child.parent_item_id.as_str())
                .or_default()
                .push(child);
        }

        let mut columns = vec![dimensions.0.to_string(), dimensions.1.to_string()];
        columns.extend(metrics.iter().cloned());

        let mut table = Self::new(columns);
        for parent in parents {
            let Some(matches) = by_parent.get(parent.item_id.as_str()) else {
                continue;
            };
            for child in matches {
                let mut row = vec![
                    CellValue::Text(parent.value.clone()),
                    CellValue::Text(child.value.clone()),
                ];
                row.extend(metric_cells(&child.metrics, metrics.len()));
                table.push_row(row);
            }
        }
        table
    }

    /// Rows as JSON objects keyed by column name
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(col, cell)| (col.clone(), cell.to_json()))
                    .collect()
            })
            .collect()
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        let header: Vec<String> = self.columns.iter().map(|c| escape_csv_field(c)).collect();
        out.push_str(&header.join(","));
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .map(|cell| escape_csv_field(&cell.to_string()))
                .collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parent(item_id: &str, value: &str) -> DimensionRecord {
        DimensionRecord {
            item_id: item_id.to_string(),
            value: value.to_string(),
            metrics: vec![Some(100.0)],
        }
    }

    fn child(parent_item_id: &str, value: &str, metrics: Vec<Option<f64>>) -> BreakdownRecord {
        BreakdownRecord {
            parent_item_id: parent_item_id.to_string(),
            value: value.to_string(),
            metrics,
        }
    }

    fn metrics() -> Vec<String> {
        vec!["metrics/visits".to_string(), "metrics/orders".to_string()]
    }

    #[test]
    fn test_from_dimension_records() {
        let records = vec![
            DimensionRecord {
                item_id: "1".to_string(),
                value: "Home".to_string(),
                metrics: vec![Some(10.0), Some(2.0)],
            },
            DimensionRecord {
                item_id: "2".to_string(),
                value: "Cart".to_string(),
                metrics: vec![Some(5.0)],
            },
        ];
        let table = ResultTable::from_dimension_records("variables/page", &metrics(), &records);

        assert_eq!(
            table.columns(),
            &["variables/page", "metrics/visits", "metrics/orders"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][1], CellValue::Number(10.0));
        // Missing trailing metric values become empty cells
        assert_eq!(table.rows()[1][2], CellValue::Empty);
    }

    #[test]
    fn test_null_metric_is_empty_not_zero() {
        let row: ReportRow =
            serde_json::from_str(r#"{"itemId": "1", "value": "Home", "data": [null, 5]}"#)
                .unwrap();
        let table = ResultTable::from_dimension_records(
            "variables/page",
            &metrics(),
            &[DimensionRecord::from(&row)],
        );

        assert_eq!(
            table.rows()[0],
            vec![
                CellValue::Text("Home".to_string()),
                CellValue::Empty,
                CellValue::Number(5.0)
            ]
        );
        assert_eq!(table.to_csv(), "variables/page,metrics/visits,metrics/orders\nHome,,5\n");
    }

    #[test]
    fn test_join_breakdown_inner_joins_on_item_id() {
        let parents = vec![parent("1", "Home"), parent("2", "Cart"), parent("3", "Exit")];
        let children = vec![
            child("2", "Firefox", vec![Some(3.0), Some(1.0)]),
            child("1", "Chrome", vec![Some(7.0), Some(0.0)]),
            child("1", "Safari", vec![Some(2.0), Some(1.0)]),
            child("9", "Orphan", vec![Some(1.0), Some(1.0)]),
        ];

        let table = ResultTable::join_breakdown(
            ("variables/page", "variables/browser"),
            &metrics(),
            &parents,
            &children,
        );

        assert_eq!(
            table.columns(),
            &[
                "variables/page",
                "variables/browser",
                "metrics/visits",
                "metrics/orders"
            ]
        );
        assert_eq!(table.len(), 3);
        let pages: Vec<String> = table
            .column("variables/page")
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(pages, vec!["Home", "Home", "Cart"]);
        let browsers: Vec<String> = table
            .column("variables/browser")
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(browsers, vec!["Chrome", "Safari", "Firefox"]);
        assert_eq!(table.rows()[2][2], CellValue::Number(3.0));
    }

    #[test]
    fn test_join_breakdown_without_children_is_empty() {
        let table = ResultTable::join_breakdown(
            ("a", "b"),
            &metrics(),
            &[parent("1", "Home")],
            &[],
        );
        assert!(table.is_empty());
        assert_eq!(table.columns().len(), 4);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Number(42.0).to_string(), "42");
        assert_eq!(CellValue::Number(0.25).to_string(), "0.25");
        assert_eq!(CellValue::Text("x".into()).to_string(), "x");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_to_records_and_csv() {
        let mut table = ResultTable::new(vec!["page".to_string(), "visits".to_string()]);
        table.push_row(vec![
            CellValue::Text("Home, main".to_string()),
            CellValue::Number(12.0),
        ]);
        table.push_row(vec![CellValue::Text("Cart".to_string()), CellValue::Empty]);

        let records = table.to_records();
        assert_eq!(records[0]["page"], "Home, main");
        assert_eq!(records[0]["visits"], 12.0);
        assert!(records[1]["visits"].is_null());

        assert_eq!(table.to_csv(), "page,visits\n\"Home, main\",12\nCart,\n");
    }

    #[test]
    fn test_records_from_rows() {
        let row = ReportRow {
            item_id: "77".to_string(),
            value: "Chrome".to_string(),
            data: vec![Some(1.0), Some(2.0)],
        };
        let record = DimensionRecord::from(&row);
        assert_eq!(record.item_id, "77");

        let breakdown = BreakdownRecord::from_row("12", &row);
        assert_eq!(breakdown.parent_item_id, "12");
        assert_eq!(breakdown.value, "Chrome");
        assert_eq!(breakdown.metrics, vec![Some(1.0), Some(2.0)]);
    }
}
