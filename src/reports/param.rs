use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Operation;
use crate::error::ReporterResult;

/// Named parameter values for a report operation.
///
/// Keys the operation doesn't recognize are ignored when the positional
/// argument list is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportParams(Map<String, Value>);

impl ReportParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Converts any serializable struct or map into parameters, using its
    /// serialized field names as keys.
    ///
    /// # Errors
    ///
    /// Fails if `params` does not serialize to an object.
    pub fn from_serialize<T: Serialize + ?Sized>(params: &T) -> ReporterResult<Self> {
        match serde_json::to_value(params)? {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "report parameters must serialize to an object, got {other}"
            ))
            .into()),
        }
    }
}

impl From<Map<String, Value>> for ReportParams {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ReportParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Parameters of `Sales.getReport`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_sub_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_version: Option<String>,
}

/// Parameters of `Finance.getReport`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceReportParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiscal_period: Option<String>,
}

/// Picks the values of `keys` out of `values`, in key order.
///
/// Falsy values (`null`, `""`, `0`, `false`) are dropped along with absent
/// ones, so a literal `0` can never be sent as an argument. Arrays are spliced
/// in element by element.
#[must_use]
pub fn build_params(keys: &[&str], values: &ReportParams) -> Vec<Value> {
    keys.iter()
        .filter_map(|key| values.get(key))
        .filter(|value| is_truthy(value))
        .fold(Vec::new(), |mut out, value| {
            match value {
                Value::Array(items) => out.extend(items.iter().cloned()),
                other => out.push(other.clone()),
            }
            out
        })
}

/// Builds the `queryInput` fragment for `operation`, e.g.
/// `Sales.getReport, 123456,Sales,Summary,Weekly,20150208`.
#[must_use]
pub fn query_input(operation: &Operation, values: &ReportParams) -> String {
    let args = build_params(operation.keys, values)
        .iter()
        .map(render)
        .collect::<Vec<_>>()
        .join(",");

    let name = operation.qualified_name();
    if args.is_empty() {
        name
    } else {
        format!("{name}, {args}")
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
