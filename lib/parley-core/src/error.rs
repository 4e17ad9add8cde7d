//! Error types for parley.

use derive_more::{Display, Error, From};

/// Boxed error type for domain-specific failures raised by middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ============================================================================
// Error Decoder Trait
// ============================================================================

/// Trait for decoding HTTP error responses into typed errors.
///
/// Implement this trait to customize how error responses are handled by the
/// error translation middleware. The decoder receives the HTTP status code and
/// response body, and can optionally return a decoded error.
///
/// # Example
///
/// ```ignore
/// use parley::ErrorDecoder;
///
/// #[derive(Debug, Deserialize)]
/// struct ApiError {
///     message: String,
/// }
///
/// struct GitHubErrors;
///
/// impl ErrorDecoder for GitHubErrors {
///     type Error = ApiError;
///
///     fn decode(&self, status: u16, body: &[u8]) -> Option<Self::Error> {
///         if status == 400 {
///             serde_json::from_slice(body).ok()
///         } else {
///             None
///         }
///     }
/// }
/// ```
pub trait ErrorDecoder: Send + Sync + 'static {
    /// The decoded error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Decode an HTTP error response into a typed error.
    ///
    /// Returns `Some(error)` if the response should be decoded as a custom error,
    /// or `None` to fall back to the default `Error::Http` handling.
    fn decode(&self, status: u16, body: &[u8]) -> Option<Self::Error>;
}

/// Default error decoder that always returns `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorDecoder;

impl ErrorDecoder for DefaultErrorDecoder {
    type Error = std::convert::Infallible;

    fn decode(&self, _status: u16, _body: &[u8]) -> Option<Self::Error> {
        None
    }
}

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for parley operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// A query broke the exchange protocol (e.g. completed without a request).
    #[display("protocol violation: {_0}")]
    #[from(skip)]
    Protocol(#[error(not(source))] String),

    /// No sender is registered for the client type.
    #[display("client not supported: {type_name}")]
    #[from(skip)]
    UnsupportedClient {
        /// Name of the unregistered client type.
        type_name: &'static str,
    },

    /// HTTP-level errors translated from a response by middleware.
    #[display("HTTP error {status}: {message}")]
    #[from(skip)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Response body, if available.
        #[error(not(source))]
        body: Option<bytes::Bytes>,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Socket-level I/O errors.
    #[display("I/O error: {_0}")]
    #[from]
    Io(std::io::Error),

    /// The peer sent something that is not a valid HTTP response.
    #[display("invalid response: {_0}")]
    #[from(skip)]
    InvalidResponse(#[error(not(source))] String),

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// Query string serialization error.
    #[display("query serialization error: {_0}")]
    #[from]
    QuerySerialization(serde_html_form::ser::Error),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// Too many redirects.
    #[display("too many redirects ({count} exceeded max of {max})")]
    #[from(skip)]
    TooManyRedirects {
        /// Number of redirects followed.
        count: usize,
        /// Maximum allowed redirects.
        max: usize,
    },

    /// Invalid redirect response.
    #[display("invalid redirect: {_0}")]
    #[from(skip)]
    InvalidRedirect(#[error(not(source))] String),

    /// Response body could not be decompressed.
    #[display("decompression error: {_0}")]
    #[from(skip)]
    Decompression(#[error(not(source))] String),

    /// Domain-specific error raised by middleware or a query.
    #[display("{_0}")]
    #[from(skip)]
    Custom(#[error(not(source))] BoxError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a protocol violation error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }

    /// Create an unsupported client error for the client type `C`.
    #[must_use]
    pub fn unsupported_client<C: ?Sized>() -> Self {
        Self::UnsupportedClient {
            type_name: std::any::type_name::<C>(),
        }
    }

    /// Create an HTTP error from status code and message.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Create an HTTP error with body.
    #[must_use]
    pub fn http_with_body(status: u16, message: impl Into<String>, body: bytes::Bytes) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: Some(body),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wrap a domain-specific error.
    #[must_use]
    pub fn custom(error: impl Into<BoxError>) -> Self {
        Self::Custom(error.into())
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Io(_))
    }

    /// Returns `true` if this is a protocol violation.
    #[must_use]
    pub const fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    /// Returns the HTTP status code if this is an HTTP error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns the response body if this is an HTTP error with a body.
    #[must_use]
    pub fn body(&self) -> Option<&bytes::Bytes> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Downcast a [`Error::Custom`] error to its concrete type.
    #[must_use]
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Custom(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Try to decode the HTTP error body as JSON.
    ///
    /// Returns `None` if there is no body or this is not an HTTP error.
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(|body| crate::from_json(body))
    }
}
