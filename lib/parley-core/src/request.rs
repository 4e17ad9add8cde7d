//! HTTP request values.
//!
//! A [`Request`] is an immutable value: every `with_*` operation consumes the
//! request and returns a new one with the change merged over the original.
//!
//! # Example
//!
//! ```
//! use parley_core::Request;
//!
//! let request = Request::get("/users/octocat")
//!     .with_prefix("https://api.github.com")
//!     .with_header("Accept", "application/json")
//!     .with_param("per_page", "10");
//!
//! assert_eq!(request.url(), "https://api.github.com/users/octocat");
//! assert_eq!(
//!     request.full_url(),
//!     "https://api.github.com/users/octocat?per_page=10"
//! );
//! ```

use bytes::Bytes;

use crate::{Headers, Method, Params, Result};

/// An HTTP request with method, URL, query parameters, headers, and optional body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: String,
    body: Option<Bytes>,
    params: Params,
    headers: Headers,
}

impl Request {
    /// Creates a request without body, parameters or headers.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            params: Params::new(),
            headers: Headers::new(),
        }
    }

    /// Shortcut for a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Shortcut for a POST request.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    /// Shortcut for a PUT request.
    #[must_use]
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    /// Shortcut for a PATCH request.
    #[must_use]
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::Patch, url)
    }

    /// Shortcut for a DELETE request.
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// Shortcut for a HEAD request.
    #[must_use]
    pub fn head(url: impl Into<String>) -> Self {
        Self::new(Method::Head, url)
    }

    /// Shortcut for an OPTIONS request.
    #[must_use]
    pub fn options(url: impl Into<String>) -> Self {
        Self::new(Method::Options, url)
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL, without the query parameters.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Query parameters.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Single header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The URL with the query parameters form-encoded and appended.
    #[must_use]
    pub fn full_url(&self) -> String {
        if self.params.is_empty() {
            return self.url.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish();
        let separator = match self.url.rfind('?') {
            None => "?",
            Some(index) if index + 1 == self.url.len() || self.url.ends_with('&') => "",
            Some(_) => "&",
        };
        format!("{}{separator}{query}", self.url)
    }

    /// A new request with added headers; later values win.
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

    /// A new request with one added header.
    #[must_use]
    pub fn with_header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_headers([(name, value)])
    }

    /// A new request with the prefix prepended to its URL.
    #[must_use]
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.url.insert_str(0, prefix);
        self
    }

    /// A new request with added query parameters; later values win.
    #[must_use]
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// A new request with one added query parameter.
    #[must_use]
    pub fn with_param(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_params([(name, value)])
    }

    /// A new request with the given body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// A new request without body.
    #[must_use]
    pub fn without_body(mut self) -> Self {
        self.body = None;
        self
    }

    /// A new request with another URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// A new request with another method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// A new request with a JSON body and the matching `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn with_json<T: serde::Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let body = crate::to_json(value)?;
        Ok(self
            .with_header("Content-Type", crate::ContentType::Json.as_str())
            .with_body(body))
    }

    /// A new request with query parameters serialized from a struct.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn with_query<T: serde::Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let encoded = crate::to_query_string(value)?;
        let pairs = url::form_urlencoded::parse(encoded.as_bytes()).into_owned();
        Ok(self.with_params(pairs))
    }

    /// Consume into (method, url, params, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, String, Params, Headers, Option<Bytes>) {
        (self.method, self.url, self.params, self.headers, self.body)
    }
}
