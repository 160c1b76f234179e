//! Backend answers.

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{GatewayError, Result};

/// Longest plain-text body carried into an error detail.
const MAX_DETAIL_CHARS: usize = 200;

/// A fully-read response from the backend.
///
/// Any status is a valid `ApiResponse`; only the caller decides whether a
/// non-success answer is an error, via [`ApiResponse::error_for_status`].
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self { status, headers, body: body.into() }
    }

    pub(crate) async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Self { status, headers, body })
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as (lossy) UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Turns a non-success answer into [`GatewayError::Api`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(GatewayError::Api { status: self.status, detail: self.detail() })
        }
    }

    /// Human-readable reason carried by an error body.
    ///
    /// Understands `{"detail": "..."}` and validation lists
    /// (`{"detail": [{"msg": "..."}]}`); anything else falls back to the
    /// body text, then to the status reason.
    #[must_use]
    pub fn detail(&self) -> String {
        if let Ok(value) = serde_json::from_slice::<Value>(&self.body) {
            match value.get("detail") {
                Some(Value::String(s)) => return s.clone(),
                Some(Value::Array(items)) => {
                    let messages: Vec<&str> =
                        items.iter().filter_map(|item| item.get("msg").and_then(Value::as_str)).collect();
                    if !messages.is_empty() {
                        return messages.join("; ");
                    }
                }
                Some(other) => return other.to_string(),
                None => {}
            }
        }

        let text = String::from_utf8_lossy(&self.body);
        let text = text.trim();
        if text.is_empty() {
            return self.status.canonical_reason().unwrap_or("Request failed").to_string();
        }
        text.chars().take(MAX_DETAIL_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse::new(StatusCode::from_u16(status).unwrap(), HeaderMap::new(), body.to_string())
    }

    #[test]
    fn test_json_body() {
        let res = response(200, r#"{"age": 40, "gender": "Female"}"#);
        let value: Value = res.json().unwrap();
        assert_eq!(value["age"], 40);
        assert!(res.is_success());
    }

    #[test]
    fn test_detail_string() {
        let res = response(400, r#"{"detail": "Email already registered"}"#);
        assert_eq!(res.detail(), "Email already registered");
    }

    #[test]
    fn test_detail_validation_list() {
        let res = response(
            422,
            r#"{"detail": [{"loc": ["body", "email"], "msg": "field required"}, {"msg": "value is not a valid integer"}]}"#,
        );
        assert_eq!(res.detail(), "field required; value is not a valid integer");
    }

    #[test]
    fn test_detail_plain_text_and_empty() {
        assert_eq!(response(502, "  Bad gateway upstream \n").detail(), "Bad gateway upstream");
        assert_eq!(response(503, "").detail(), "Service Unavailable");
    }

    #[test]
    fn test_detail_truncates_long_bodies() {
        let long = "x".repeat(1000);
        assert_eq!(response(500, &long).detail().len(), MAX_DETAIL_CHARS);
    }

    #[test]
    fn test_error_for_status() {
        assert!(response(201, "{}").error_for_status().is_ok());

        match response(404, r#"{"detail": "Report not found"}"#).error_for_status() {
            Err(GatewayError::Api { status, detail }) => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(detail, "Report not found");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }
}
