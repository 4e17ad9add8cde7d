//! HTTP response values.
//!
//! [`Response`] provides access to status, headers, and body with JSON/text
//! deserialization. Like [`crate::Request`], it is an immutable value with
//! `with_*` copy-with-changes operations.
//!
//! # Example
//!
//! ```ignore
//! let user: User = response.json()?;
//! ```

use bytes::Bytes;

use crate::{Error, Headers, Result};

/// HTTP response with status, headers, and optional body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    body: Option<Bytes>,
    headers: Headers,
}

impl Response {
    /// Creates a response without body or headers.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            body: None,
            headers: Headers::new(),
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Single header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// A new response with another status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// A new response with the given body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// A new response with added headers; later values win.
    #[must_use]
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.extend(headers);
        self
    }

    /// A new response with one added header.
    #[must_use]
    pub fn with_header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_headers([(name, value)])
    }

    /// Consume into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (u16, Headers, Option<Bytes>) {
        (self.status, self.headers, self.body)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 3xx.
    #[must_use]
    pub const fn is_redirection(&self) -> bool {
        self.status >= 300 && self.status < 400
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }

    /// Deserialize the response body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        crate::from_json(self.body.as_deref().unwrap_or_default())
    }

    /// Get the response body as text (empty if there is no body).
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> Result<String> {
        let bytes = self.body.as_deref().unwrap_or_default();
        String::from_utf8(bytes.to_vec())
            .map_err(|err| Error::invalid_response(format!("body is not UTF-8: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_basic() {
        let response = Response::new(200)
            .with_header("Content-Type", "application/json")
            .with_body(r#"{"id":1}"#);

        assert_eq!(response.status(), 200);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert!(response.is_success());
        assert!(!response.is_client_error());
        assert!(!response.is_server_error());
    }

    #[test]
    fn response_status_checks() {
        assert!(Response::new(301).is_redirection());
        assert!(Response::new(404).is_client_error());
        assert!(Response::new(500).is_server_error());
    }

    #[test]
    fn response_equality() {
        let a = Response::new(204).with_header("X-Id", "1");
        assert_eq!(a, Response::new(204).with_header("x-id", "1"));
        assert_ne!(a, a.clone().with_status(200));
        assert_ne!(a, a.clone().with_body(""));
    }

    #[test]
    fn response_json() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct User {
            id: u64,
            name: String,
        }

        let response = Response::new(200).with_body(r#"{"id":1,"name":"test"}"#);

        let user: User = response.json().expect("deserialize");
        assert_eq!(
            user,
            User {
                id: 1,
                name: "test".to_string()
            }
        );
    }

    #[test]
    fn response_text() {
        let response = Response::new(200).with_body("Hello, World!");
        assert_eq!(response.text().expect("text"), "Hello, World!");
        assert_eq!(Response::new(204).text().expect("empty"), "");
        assert!(Response::new(200).with_body(vec![0xff, 0xfe]).text().is_err());
    }
}
