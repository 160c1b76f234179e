//! Outbound request description.

use bytes::Bytes;
use reqwest::Method;
use serde::Serialize;

use crate::error::Result;

/// Payload of an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON document, sent with `Content-Type: application/json`.
    Json(serde_json::Value),
    /// Pre-encoded payload with an explicit content type.
    Raw { content_type: String, data: Bytes },
}

/// A request to the backend, relative to the configured base URL.
///
/// Requests are plain values: the client clones nothing but this description
/// when it has to send the same call a second time after a token refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<RequestBody>,
}

impl ApiRequest {
    /// Creates a request for `path` (a leading `/` is added when missing).
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') { path } else { format!("/{}", path) };
        Self { method, path, query: Vec::new(), body: None }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attaches a JSON body.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self> {
        Ok(self.json_value(serde_json::to_value(body)?))
    }

    /// Attaches an already-built JSON body.
    #[must_use]
    pub fn json_value(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attaches a raw body with the given content type.
    #[must_use]
    pub fn body(mut self, data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Raw { content_type: content_type.into(), data: data.into() });
        self
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    #[must_use]
    pub fn body_ref(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_gets_leading_slash() {
        assert_eq!(ApiRequest::get("patient/profile").path(), "/patient/profile");
        assert_eq!(ApiRequest::get("/patient/profile").path(), "/patient/profile");
    }

    #[test]
    fn test_verb_constructors() {
        assert_eq!(ApiRequest::get("/a").method(), &Method::GET);
        assert_eq!(ApiRequest::post("/a").method(), &Method::POST);
        assert_eq!(ApiRequest::put("/a").method(), &Method::PUT);
        assert_eq!(ApiRequest::patch("/a").method(), &Method::PATCH);
        assert_eq!(ApiRequest::delete("/a").method(), &Method::DELETE);
    }

    #[test]
    fn test_json_body() {
        #[derive(Serialize)]
        struct Reading {
            systolic: u32,
            diastolic: u32,
        }

        let request = ApiRequest::post("/patient/chronic")
            .json(&Reading { systolic: 120, diastolic: 80 })
            .unwrap();
        assert_eq!(
            request.body_ref(),
            Some(&RequestBody::Json(json!({"systolic": 120, "diastolic": 80})))
        );
    }

    #[test]
    fn test_raw_body_and_query() {
        let request = ApiRequest::post("/patient/labs/upload")
            .body(vec![1u8, 2, 3], "application/pdf")
            .query("lang", "en");
        assert_eq!(request.query_pairs(), &[("lang".to_string(), "en".to_string())]);
        match request.body_ref() {
            Some(RequestBody::Raw { content_type, data }) => {
                assert_eq!(content_type, "application/pdf");
                assert_eq!(data.as_ref(), &[1u8, 2, 3]);
            }
            other => panic!("Expected raw body, got {:?}", other),
        }
    }

    #[test]
    fn test_clone_is_identical() {
        let request = ApiRequest::put("/patient/profile").json_value(json!({"age": 40}));
        assert_eq!(request.clone(), request);
    }
}
