//! Shared pieces of the payload parsers.
//!
//! The watchlive service is loose about its JSON: scores and shirt numbers
//! arrive either as strings or numbers, flags as booleans or `0`/`1`. The
//! helpers here normalize those values without failing the whole payload.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedPayload(format!("failed to decode JSON from response text ({e})"))
    }
}

/// A non-fatal problem with one record of a payload. The record is skipped and
/// parsing continues with its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseWarning {
    #[error("record {index} is not a JSON object")]
    NotAnObject { index: usize },
    #[error("record {index} is missing required attribute `{field}`")]
    MissingField { index: usize, field: &'static str },
    #[error("record {index} has an unusable value for `{field}`")]
    InvalidField { index: usize, field: &'static str },
    #[error("clock block has only one of `time` and `ds`, ignoring it")]
    UnpairedClock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub warnings: Vec<ParseWarning>,
}

impl<T> Parsed<T> {
    pub fn new(value: T, warnings: Vec<ParseWarning>) -> Self {
        Self { value, warnings }
    }
}

/// String form of a scalar, the same way the service's own pages print it.
/// `null`, arrays and objects have no string form.
pub(crate) fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

pub(crate) fn value_as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
