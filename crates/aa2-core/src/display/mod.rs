pub mod table;

pub use table::{ListRow, TableDisplay, list_to_csv};

use crate::error::{CliError, DisplayError};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Output format for listings and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(CliError::InvalidArguments(format!(
                "Unknown format '{}', expected table, json or csv",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        };
        f.write_str(name)
    }
}

/// Pretty-printed JSON
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, DisplayError> {
    serde_json::to_string_pretty(value).map_err(|e| DisplayError::Serialization(e.to_string()))
}
