pub mod contact;
pub mod holiday;

pub use contact::{Address, Contact, ContactKind, ContactUpdate, Others};
pub use holiday::{Holiday, HolidayUpdate};

use serde_json::{Map, Value};
use thiserror::Error;

/// Request-body problems, reported to the client as 400s
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Request body must be a JSON object.")]
    NotAnObject,

    #[error("{message}")]
    MissingFields {
        message: &'static str,
        fields: Vec<&'static str>,
    },

    #[error("Invalid type specified.")]
    InvalidType(String),

    #[error("Invalid date format.")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid value for {field}.")]
    InvalidField { field: &'static str, value: String },
}

pub(crate) fn as_object(body: &Value) -> Result<&Map<String, Value>, ValidationError> {
    body.as_object().ok_or(ValidationError::NotAnObject)
}

/// A present, truthy text value. Numbers are accepted and kept as their
/// decimal text; empty strings, `null`, `false`, and zero count as absent.
pub(crate) fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// True when the key holds a value that would count as present
pub(crate) fn is_truthy(object: &Map<String, Value>, key: &str) -> bool {
    match object.get(key) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}
