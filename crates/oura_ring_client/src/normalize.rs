//! Per-category selection of records out of raw API bodies.

use crate::{Category, OuraError, Record};
use serde_json::{Map, Value};

/// Sentinel the sessions endpoint reports in `detail` when there is nothing to return.
pub const NOT_FOUND_DETAIL: &str = "Not Found";

/// How a category's records are pulled out of its response body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extraction {
    /// `data` as-is; a missing field is an error.
    Data,
    /// `data` when truthy, otherwise the placeholder.
    DataOrPlaceholder,
    /// `detail` unless it is the "Not Found" sentinel.
    DetailUnlessNotFound,
    /// The whole body as a single record.
    WholeBody,
}

impl Extraction {
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::PersonalInfo => Extraction::WholeBody,
            Category::Sessions => Extraction::DetailUnlessNotFound,
            Category::Tag | Category::Workout | Category::DailyActivity => {
                Extraction::DataOrPlaceholder
            }
            Category::HeartRate
            | Category::DailySleep
            | Category::Sleep
            | Category::Readiness
            | Category::IdealBedtime => Extraction::Data,
        }
    }
}

/// A single empty record, used when the API reports no data.
pub fn placeholder() -> Vec<Record> {
    vec![Value::Object(Map::new())]
}

/// Extract `category`'s records from a successful response body.
pub fn extract(category: Category, body: Value) -> Result<Vec<Record>, OuraError> {
    match Extraction::for_category(category) {
        Extraction::WholeBody => Ok(vec![body]),
        Extraction::Data => match take_field(body, "data") {
            Some(data) => Ok(into_records(data)),
            None => Err(OuraError::UnexpectedPayload {
                category,
                reason: "missing `data` field".into(),
            }),
        },
        Extraction::DataOrPlaceholder => Ok(take_field(body, "data")
            .filter(is_truthy)
            .map(into_records)
            .unwrap_or_else(placeholder)),
        Extraction::DetailUnlessNotFound => Ok(session_records(body)),
    }
}

fn session_records(body: Value) -> Vec<Record> {
    let Value::Object(mut map) = body else {
        return placeholder();
    };
    match map.remove("detail") {
        Some(Value::String(s)) if s == NOT_FOUND_DETAIL => placeholder(),
        Some(detail) => into_records(detail),
        // Successful pages carry `data` rather than `detail`.
        None => map
            .remove("data")
            .filter(is_truthy)
            .map(into_records)
            .unwrap_or_else(placeholder),
    }
}

fn take_field(body: Value, field: &str) -> Option<Value> {
    match body {
        Value::Object(mut map) => map.remove(field),
        _ => None,
    }
}

fn into_records(value: Value) -> Vec<Record> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Python-style truthiness of a JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
