use crate::Result;
use crate::http::types::Status;
use reqwest::header::HeaderMap as Headers;
use std::time::Duration;

/// A captured response: status, headers, raw and parsed body, elapsed time.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: Status,
    pub status_line: String,
    pub headers: Headers,
    pub body: String,
    pub json: Option<serde_json::Value>,
    pub duration: Duration,
}

impl Response {
    pub fn new(
        status: u16,
        status_line: impl Into<String>,
        headers: Headers,
        body: String,
        duration: Duration,
    ) -> Result<Self> {
        let json = if body.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&body).ok()
        };

        Ok(Self {
            status: Status::new(status)?,
            status_line: status_line.into(),
            headers,
            body,
            json,
            duration,
        })
    }

    pub fn status_code(&self) -> u16 {
        self.status.code()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Elapsed time in whole milliseconds.
    pub fn time_ms(&self) -> u128 {
        self.duration.as_millis()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body pretty-printed when it is JSON, verbatim otherwise.
    pub fn pretty_body(&self) -> String {
        self.json
            .as_ref()
            .and_then(|value| serde_json::to_string_pretty(value).ok())
            .unwrap_or_else(|| self.body.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body_is_parsed() {
        let response = Response::new(
            201,
            "HTTP/1.1 201 Created",
            Headers::new(),
            r#"{"id": 42}"#.to_string(),
            Duration::from_millis(12),
        )
        .unwrap();

        assert_eq!(response.status_code(), 201);
        assert_eq!(response.json, Some(serde_json::json!({"id": 42})));
        assert_eq!(response.time_ms(), 12);
        assert_eq!(response.pretty_body(), "{\n  \"id\": 42\n}");
    }

    #[test]
    fn test_non_json_body_is_kept_raw() {
        let response = Response::new(
            500,
            "HTTP/1.1 500 Internal Server Error",
            Headers::new(),
            "oops".to_string(),
            Duration::ZERO,
        )
        .unwrap();

        assert!(response.json.is_none());
        assert_eq!(response.pretty_body(), "oops");
        assert!(!response.is_success());
    }
}
