//! Middleware pipes for parley queries.
//!
//! Every middleware is a [`Pipe`](crate::Pipe) over [`Request`](crate::Request)s,
//! applied to an exchange with [`ExchangeExt::relay`](crate::ExchangeExt::relay)
//! or composed with other pipes through [`PipeExt::chain`](crate::PipeExt::chain).
//! In a chain `a.chain(b)`, `a` is closest to the wire.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `middleware-decompression` | [`Decompression`] pipe |
//! | `middleware-metrics` | [`Metrics`] pipe |
//! | `middleware-full` | All middleware |
//!
//! # Available Middleware
//!
//! - [`FollowRedirects`] - Re-sends requests answered with a redirect
//! - [`Retry`] - Re-sends idempotent requests answered with 5xx or 429
//! - [`Logging`] - Logs requests/responses using `tracing`
//! - [`Json`] - JSON headers and decoding into [`serde_json::Value`]
//! - [`raise_for_status`], [`translate_errors`] - Failure statuses as errors
//!
//! # Example
//!
//! ```
//! use parley::exchange::{self, ExchangeExt};
//! use parley::middleware::{FollowRedirects, Logging, Retry};
//! use parley::pipe::{self, PipeExt};
//! use parley::{Request, Response};
//!
//! // logs every request on the wire, retries included
//! let api = Logging::new()
//!     .chain(Retry::new(2))
//!     .chain(FollowRedirects::new())
//!     .chain(pipe::map_requests(pipe::prefix_adder("https://api.example.com")));
//!
//! let status = exchange::once(Request::get("/health"), |response: Response| Ok(response.status()))
//!     .relay(api);
//! # let _ = status;
//! ```

#[cfg(feature = "middleware-decompression")]
mod decompression;
mod errors;
pub(crate) mod follow_redirect;
mod json;
mod logging;
#[cfg(feature = "middleware-metrics")]
mod metrics;
mod retry;

#[cfg(feature = "middleware-decompression")]
pub use decompression::{Decompressing, Decompression};
pub use errors::{raise_for_status, translate_errors};
pub use follow_redirect::{FollowRedirects, Redirecting};
pub use json::{Decoding, ExpectJson, Json, expect_json, load_json};
pub use logging::{LogLevel, Logged, Logging};
#[cfg(feature = "middleware-metrics")]
pub use metrics::{Measured, Metrics};
pub use retry::{Retry, Retrying};
