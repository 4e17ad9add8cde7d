//! Encoding and decoding of message bodies.

use bytes::Bytes;

use crate::{Error, Result};

/// Well-known media types used by the built-in middleware and senders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ContentType {
    /// `application/json`
    #[display("application/json")]
    Json,
    /// `application/x-www-form-urlencoded`
    #[display("application/x-www-form-urlencoded")]
    FormUrlEncoded,
    /// `text/plain`
    #[display("text/plain")]
    PlainText,
    /// `application/octet-stream`, assumed for bodies sent without a content type.
    #[display("application/octet-stream")]
    OctetStream,
}

impl ContentType {
    /// The MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
            Self::PlainText => "text/plain",
            Self::OctetStream => "application/octet-stream",
        }
    }

    /// Returns `true` if a `Content-Type` header value denotes this media type.
    ///
    /// Parameters such as `charset` are ignored.
    #[must_use]
    pub fn matches(&self, header_value: &str) -> bool {
        header_value
            .split(';')
            .next()
            .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(self.as_str()))
    }
}

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use parley_core::to_json;
///
/// let bytes = to_json(&serde_json::json!({"name": "Alice"})).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"name":"Alice"}"#);
/// ```
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    let bytes = serde_json::to_vec(value)?;
    Ok(Bytes::from(bytes))
}

/// Serialize a value to form URL-encoded bytes.
///
/// `Vec<T>` fields become repeated keys (`tags=a&tags=b`).
///
/// # Errors
///
/// Returns an error if form serialization fails.
pub fn to_form<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    let encoded = serde_html_form::to_string(value)?;
    Ok(Bytes::from(encoded))
}

/// Serialize a value to a query string (without the leading `?`).
///
/// # Errors
///
/// Returns an error if query serialization fails.
///
/// # Example
///
/// ```
/// use parley_core::to_query_string;
///
/// let query = to_query_string(&[("q", "rust"), ("page", "1")]).expect("serialize");
/// assert_eq!(query, "q=rust&page=1");
/// ```
pub fn to_query_string<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_html_form::to_string(value)?)
}

/// Deserialize JSON bytes, reporting the path of the failing field.
///
/// # Errors
///
/// Returns [`Error::JsonDeserialization`] with the path to the problematic
/// field (e.g. `user.address.city`) when decoding fails.
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|err| Error::json_deserialization(err.path().to_string(), err.inner().to_string()))
}
