use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded response body. JSON when the server said so, raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse {
    Json(serde_json::Value),
    Text(String),
}

impl ApiResponse {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ApiResponse::Json(v) => Some(v),
            ApiResponse::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ApiResponse::Json(_) => None,
            ApiResponse::Text(s) => Some(s),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ApiResponse::Json(v) => v.is_null(),
            ApiResponse::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for ApiResponse {
    /// JSON bodies are pretty-printed with two-space indentation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiResponse::Json(v) => {
                let pretty = serde_json::to_string_pretty(v).map_err(|_| fmt::Error)?;
                f.write_str(&pretty)
            }
            ApiResponse::Text(s) => f.write_str(s),
        }
    }
}
