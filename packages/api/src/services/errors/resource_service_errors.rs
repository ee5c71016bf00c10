use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceServiceError {
    NotFound,
    InvalidPage,
    /// Field name to list of messages, as rendered in 400 responses.
    ValidationError(Map<String, Value>),
}

impl ResourceServiceError {
    pub fn field(field: &str, message: &str) -> Self {
        let mut errors = Map::new();
        errors.insert(
            field.to_string(),
            Value::Array(vec![Value::String(message.to_string())]),
        );
        ResourceServiceError::ValidationError(errors)
    }
}

impl fmt::Display for ResourceServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResourceServiceError::NotFound => write!(f, "Not found"),
            ResourceServiceError::InvalidPage => write!(f, "Invalid page"),
            ResourceServiceError::ValidationError(errors) => {
                let fields: Vec<&str> = errors.keys().map(String::as_str).collect();
                write!(f, "Validation error on {}", fields.join(", "))
            }
        }
    }
}

impl std::error::Error for ResourceServiceError {}
