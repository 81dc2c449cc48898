use crate::api::models::{CalculatedMetric, Dimension, Metric, MetricName, ReportSuite, Segment};
use crate::core::table::{CellValue, ResultTable};
use crate::utils::text::{escape_csv_field, truncate_text};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table, presets};
use crossterm::terminal;

/// A metadata item that can be listed as one table row
pub trait ListRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

fn description(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

impl ListRow for ReportSuite {
    const HEADERS: &'static [&'static str] = &["RSID", "Name"];

    fn cells(&self) -> Vec<String> {
        vec![self.rsid.clone(), description(&self.name)]
    }
}

impl ListRow for MetricName {
    const HEADERS: &'static [&'static str] = &["ID", "Name"];

    fn cells(&self) -> Vec<String> {
        vec![self.id.clone(), self.name.clone()]
    }
}

macro_rules! described_list_row {
    ($($ty:ty),+) => {
        $(
            impl ListRow for $ty {
                const HEADERS: &'static [&'static str] = &["ID", "Name", "Description"];

                fn cells(&self) -> Vec<String> {
                    vec![self.id.clone(), self.name.clone(), description(&self.description)]
                }
            }
        )+
    };
}

described_list_row!(Dimension, Metric, CalculatedMetric, Segment);

struct ColumnWidths {
    id: usize,
    text: usize,
}

pub struct TableDisplay {
    max_width: Option<usize>,
    use_colors: bool,
}

impl TableDisplay {
    pub fn new() -> Self {
        Self {
            max_width: Self::detect_terminal_width(),
            use_colors: true,
        }
    }

    fn detect_terminal_width() -> Option<usize> {
        match terminal::size() {
            Ok((cols, _)) => Some((cols as usize).clamp(40, 200)),
            Err(_) => Some(80),
        }
    }

    pub fn with_max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn header_cell(&self, text: &str) -> Cell {
        let cell = Cell::new(text).add_attribute(Attribute::Bold);
        if self.use_colors {
            cell.fg(Color::Cyan)
        } else {
            cell
        }
    }

    fn new_table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        let width = self
            .max_width
            .map(|w| if w > 20 { w - 6 } else { w.max(40) })
            .unwrap_or(80);
        table.set_width(width as u16);
        table.set_header(headers.iter().map(|h| self.header_cell(h)));
        table
    }

    fn column_widths(&self) -> ColumnWidths {
        match self.max_width.unwrap_or(80) {
            0..=79 => ColumnWidths { id: 20, text: 25 },
            80..=119 => ColumnWidths { id: 30, text: 40 },
            _ => ColumnWidths { id: 45, text: 60 },
        }
    }

    /// Render a report result; numbers are right-aligned
    pub fn render_result_table(&self, result: &ResultTable) -> String {
        if result.is_empty() {
            return "Report returned no rows.".to_string();
        }

        let headers: Vec<&str> = result.columns().iter().map(String::as_str).collect();
        let mut table = self.new_table(&headers);
        let widths = self.column_widths();

        for row in result.rows() {
            let cells: Vec<Cell> = row
                .iter()
                .map(|value| match value {
                    CellValue::Number(_) => {
                        Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
                    }
                    CellValue::Empty if self.use_colors => Cell::new("-").fg(Color::DarkGrey),
                    CellValue::Empty => Cell::new("-"),
                    CellValue::Text(s) => Cell::new(truncate_text(s, widths.text)),
                })
                .collect();
            table.add_row(cells);
        }

        format!("{}\n{} rows", table, result.len())
    }

    /// Render a metadata listing, one row per item
    pub fn render_list<T: ListRow>(&self, items: &[T]) -> String {
        if items.is_empty() {
            return "No matching items.".to_string();
        }

        let mut table = self.new_table(T::HEADERS);
        let widths = self.column_widths();

        for item in items {
            let cells: Vec<Cell> = item
                .cells()
                .into_iter()
                .enumerate()
                .map(|(idx, text)| match idx {
                    0 if self.use_colors => {
                        Cell::new(truncate_text(&text, widths.id)).fg(Color::Cyan)
                    }
                    0 => Cell::new(truncate_text(&text, widths.id)),
                    2 if self.use_colors => {
                        Cell::new(truncate_text(&text, widths.text)).fg(Color::DarkGrey)
                    }
                    _ => Cell::new(truncate_text(&text, widths.text)),
                })
                .collect();
            table.add_row(cells);
        }

        table.to_string()
    }

    /// Two-column key/value table, used by `config show`
    pub fn render_key_values(&self, pairs: &[(&str, String)]) -> String {
        let mut table = self.new_table(&["Key", "Value"]);
        for (key, value) in pairs {
            table.add_row(vec![Cell::new(key), Cell::new(value)]);
        }
        table.to_string()
    }
}

impl Default for TableDisplay {
    fn default() -> Self {
        Self::new()
    }
}

/// CSV rendering of a metadata listing
pub fn list_to_csv<T: ListRow>(items: &[T]) -> String {
    let mut out = T::HEADERS.join(",");
    out.push('\n');
    for item in items {
        let cells: Vec<String> = item.cells().iter().map(|c| escape_csv_field(c)).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::table::DimensionRecord;
    use serde_json::Map;

    fn plain() -> TableDisplay {
        TableDisplay::new().with_max_width(120).with_colors(false)
    }

    fn dimension(id: &str, name: &str, description: Option<&str>) -> Dimension {
        Dimension {
            id: id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_render_result_table() {
        let records = vec![DimensionRecord {
            item_id: "1".to_string(),
            value: "Home".to_string(),
            metrics: vec![Some(42.0)],
        }];
        let table = ResultTable::from_dimension_records(
            "variables/page",
            &["metrics/visits".to_string()],
            &records,
        );

        let output = plain().render_result_table(&table);
        assert!(output.contains("variables/page"));
        assert!(output.contains("Home"));
        assert!(output.contains("42"));
        assert!(output.ends_with("1 rows"));
    }

    #[test]
    fn test_render_empty_result() {
        let table = ResultTable::new(vec!["variables/page".to_string()]);
        assert_eq!(
            plain().render_result_table(&table),
            "Report returned no rows."
        );
    }

    #[test]
    fn test_render_list_fills_missing_description() {
        let output = plain().render_list(&[dimension("variables/page", "Page", None)]);
        assert!(output.contains("Description"));
        assert!(output.contains("variables/page"));
        assert!(output.contains(" - "));
    }

    #[test]
    fn test_render_empty_list() {
        let items: Vec<Segment> = Vec::new();
        assert_eq!(plain().render_list(&items), "No matching items.");
    }

    #[test]
    fn test_list_to_csv_escapes() {
        let csv = list_to_csv(&[dimension("variables/page", "Page, full", Some("URL"))]);
        assert_eq!(csv, "ID,Name,Description\nvariables/page,\"Page, full\",URL\n");
    }

    #[test]
    fn test_render_key_values() {
        let output = plain().render_key_values(&[("rsid", "suite1".to_string())]);
        assert!(output.contains("rsid"));
        assert!(output.contains("suite1"));
    }
}
