use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Item ids and row values come back as strings, but some report suites
/// return bare numbers. Normalize both to `String`.
fn deserialize_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

/// Treat an explicit `null` like a missing field
fn deserialize_null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Authentication models
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResponse {
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub ims_orgs: Vec<ImsOrg>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImsOrg {
    pub ims_org_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub companies: Vec<Company>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub global_company_id: Option<String>,
    pub company_name: Option<String>,
}

/// Collection endpoints wrap their results in `{ "content": [...] }`
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(rename = "totalElements")]
    pub total_elements: Option<u64>,
}

// Metadata models
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReportSuite {
    pub rsid: String,
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Dimension {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Metric {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CalculatedMetric {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Segment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Id/name pair returned by metric name resolution
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MetricName {
    pub id: String,
    pub name: String,
}

// Report models
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ReportResponse {
    #[serde(default)]
    pub columns: ReportColumns,
    #[serde(default)]
    pub rows: Vec<ReportRow>,
    #[serde(rename = "totalElements")]
    pub total_elements: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportColumns {
    pub dimension: Option<ColumnDimension>,
    #[serde(default)]
    pub column_ids: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ColumnDimension {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub item_id: String,
    #[serde(deserialize_with = "deserialize_string_or_number")]
    pub value: String,
    /// Aligned with the requested metrics; `None` where the server had no value
    #[serde(default, deserialize_with = "deserialize_null_as_default")]
    pub data: Vec<Option<f64>>,
}

impl ReportResponse {
    /// Id of the dimension the rows are broken down by
    pub fn dimension_id(&self) -> Option<&str> {
        self.columns.dimension.as_ref().map(|d| d.id.as_str())
    }
}
