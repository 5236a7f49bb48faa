// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("session expired or not logged in; run `khata auth login`")]
    Unauthorized,

    #[error("Validation Failed:\n{}", .0.join("\n"))]
    Validation(Vec<String>),

    #[error("server returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("offline and no cached copy of {0}")]
    Offline(String),

    #[error("local store: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(err.to_string())
    }
}

impl ApiError {
    /// Map a non-2xx backend response onto the error taxonomy.
    ///
    /// A `detail` array (FastAPI validation errors) becomes one
    /// `Field: message` line per entry; a string `detail` is passed through.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        if status == 401 {
            return ApiError::Unauthorized;
        }
        let parsed: Option<Value> = serde_json::from_slice(body).ok();
        let detail = parsed.as_ref().and_then(|v| v.get("detail"));
        match detail {
            Some(Value::Array(items)) => {
                ApiError::Validation(items.iter().map(validation_line).collect())
            }
            Some(Value::String(s)) => ApiError::Status {
                status,
                detail: s.clone(),
            },
            _ => ApiError::Status {
                status,
                detail: String::from_utf8_lossy(body).trim().to_string(),
            },
        }
    }
}

fn validation_line(item: &Value) -> String {
    let field = item
        .get("loc")
        .and_then(|l| l.as_array())
        .and_then(|l| l.last())
        .map(|f| match f {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| "Error".to_string());
    let msg = item.get("msg").and_then(|m| m.as_str()).unwrap_or("invalid");
    format!("{}: {}", capitalize(&field), msg)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_detail_becomes_one_line_per_field() {
        let body = br#"{"detail":[
            {"loc":["body","name"],"msg":"field required","type":"value_error.missing"},
            {"loc":["body","opening_balance"],"msg":"value is not a valid float"}
        ]}"#;
        match ApiError::from_response(422, body) {
            ApiError::Validation(lines) => assert_eq!(
                lines,
                vec![
                    "Name: field required".to_string(),
                    "Opening_balance: value is not a valid float".to_string()
                ]
            ),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn string_detail_is_passed_through() {
        let err = ApiError::from_response(400, br#"{"detail":"Buyer has sales"}"#);
        assert_eq!(err.to_string(), "server returned 400: Buyer has sales");
    }

    #[test]
    fn unauthorized_is_its_own_variant() {
        assert!(matches!(
            ApiError::from_response(401, b"{}"),
            ApiError::Unauthorized
        ));
    }
}
