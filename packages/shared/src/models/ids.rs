use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary key as the backend serialises it. Django models use integer keys,
/// some endpoints expose UUIDs or slugs instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ObjectId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectId::Number(n) => write!(f, "{}", n),
            ObjectId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ObjectId {
    fn from(value: i64) -> Self {
        ObjectId::Number(value)
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(n) => ObjectId::Number(n),
            Err(_) => ObjectId::Text(value.to_string()),
        }
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        ObjectId::from(value.as_str())
    }
}
