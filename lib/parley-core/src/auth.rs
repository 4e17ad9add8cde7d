//! Authentication transforms applied to every outgoing request.
//!
//! An [`Auth`] is configured once on an [`crate::Executor`] and applied to
//! each request a query emits, immediately before it is dispatched.
//!
//! # Example
//!
//! ```
//! use parley_core::{Auth, Request};
//!
//! let auth = Auth::from(("user", "pw"));
//! let request = auth.apply(Request::get("https://api.example.com/me"));
//! assert_eq!(request.header("Authorization"), Some("Basic dXNlcjpwdw=="));
//! ```

use std::fmt;
use std::sync::Arc;

use base64::Engine;

use crate::Request;

/// Shared request transform used by [`Auth::Custom`].
pub type AuthFn = Arc<dyn Fn(Request) -> Request + Send + Sync>;

/// Authentication strategy of an executor.
#[derive(Clone, Default)]
pub enum Auth {
    /// No authentication; requests pass through unchanged.
    #[default]
    None,
    /// HTTP basic authentication.
    Basic {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
    /// Arbitrary request transform (tokens, signatures, ...).
    Custom(AuthFn),
}

impl Auth {
    /// Basic authentication with the given credentials.
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Authentication through a custom request transform.
    #[must_use]
    pub fn custom(transform: impl Fn(Request) -> Request + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(transform))
    }

    /// Bearer token authentication.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::custom(bearer_auth(token))
    }

    /// Apply the transform to a request.
    #[must_use]
    pub fn apply(&self, request: Request) -> Request {
        match self {
            Self::None => request,
            Self::Basic { username, password } => {
                request.with_header("Authorization", basic_auth_header(username, password))
            }
            Self::Custom(transform) => transform(request),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<(&str, &str)> for Auth {
    fn from((username, password): (&str, &str)) -> Self {
        Self::basic(username, password)
    }
}

impl From<(String, String)> for Auth {
    fn from((username, password): (String, String)) -> Self {
        Self::basic(username, password)
    }
}

/// The `Authorization` header value for basic authentication.
#[must_use]
pub fn basic_auth_header(username: &str, password: &str) -> String {
    let credentials = format!("{username}:{password}");
    let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
    format!("Basic {encoded}")
}

/// Request mapper adding a basic `Authorization` header.
pub fn basic_auth(
    username: impl AsRef<str>,
    password: impl AsRef<str>,
) -> impl Fn(Request) -> Request + Clone + Send + Sync + 'static {
    let header: Arc<str> = basic_auth_header(username.as_ref(), password.as_ref()).into();
    move |request: Request| request.with_header("Authorization", &*header)
}

/// Request mapper adding a bearer `Authorization` header.
pub fn bearer_auth(
    token: impl Into<String>,
) -> impl Fn(Request) -> Request + Clone + Send + Sync + 'static {
    let header: Arc<str> = format!("Bearer {}", token.into()).into();
    move |request: Request| request.with_header("Authorization", &*header)
}
