use serde_json::Value;
use thiserror::Error;

/// Why a raw WordPress object could not be turned into a view model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("expected a JSON object for `{entity}`, found {found}")]
    NotAnObject {
        entity: &'static str,
        found: &'static str,
    },
    #[error("malformed `{entity}`: {message}")]
    Shape {
        entity: &'static str,
        message: String,
    },
}

impl TransformError {
    pub fn not_an_object(entity: &'static str, value: &Value) -> Self {
        Self::NotAnObject {
            entity,
            found: json_kind(value),
        }
    }

    pub fn shape(entity: &'static str, message: impl Into<String>) -> Self {
        Self::Shape {
            entity,
            message: message.into(),
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
