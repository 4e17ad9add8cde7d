//! # Chapter 2: Middleware
//!
//! Add cross-cutting concerns like redirects, retries and logging.
//!
//! ## Pipes
//!
//! A [`Pipe`](crate::Pipe) wraps each request of an exchange in an exchange of
//! its own. That exchange may alter the request, send more requests, and
//! decides which response the wrapped exchange resumes with.
//!
//! Simple request rewrites are built with
//! [`pipe::map_requests`](crate::pipe::map_requests):
//!
//! ```
//! use parley::pipe;
//!
//! let github = pipe::map_requests(pipe::prefix_adder("https://api.github.com"));
//! let json = pipe::map_requests(pipe::header_adder([("Accept", "application/vnd.github+json")]));
//! # let _ = (github, json);
//! ```
//!
//! ## Available Middleware
//!
//! | Feature | Pipe | Description |
//! |---------|------|-------------|
//! | | [`FollowRedirects`](crate::middleware::FollowRedirects) | Follow 301/302/303/307/308 |
//! | | [`Retry`](crate::middleware::Retry) | Retry idempotent requests on 5xx and 429 |
//! | | [`Logging`](crate::middleware::Logging) | Log requests/responses with `tracing` |
//! | | [`Json`](crate::middleware::Json) | JSON headers and decoding |
//! | `middleware-decompression` | `Decompression` | gzip, deflate, br, zstd bodies |
//! | `middleware-metrics` | `Metrics` | Request counter and duration histogram |
//!
//! [`raise_for_status`](crate::middleware::raise_for_status) and
//! [`translate_errors`](crate::middleware::translate_errors) turn failure
//! statuses into errors through `map_send`.
//!
//! ## Middleware Order
//!
//! `a.chain(b).chain(c)` wraps `c` in `b` in `a`. Requests travel outward,
//! so `a` is closest to the wire:
//!
//! ```text
//! Query → c → b → a → HTTP
//! Query ← c ← b ← a ← HTTP
//! ```
//!
//! Typical order:
//! 1. Logging (outermost - logs every attempt)
//! 2. Retry (re-sends failed attempts)
//! 3. `FollowRedirects` (resolves redirects within one attempt)
//! 4. URL prefix (innermost - the pipes above see absolute URLs)
//!
//! ```
//! use parley::exchange::{self, ExchangeExt};
//! use parley::middleware::{FollowRedirects, Logging, Retry};
//! use parley::pipe::{self, PipeExt};
//! use parley::{Request, Response};
//!
//! let api = Logging::new()
//!     .chain(Retry::new(2))
//!     .chain(FollowRedirects::new())
//!     .chain(pipe::map_requests(pipe::prefix_adder("https://api.example.com")));
//!
//! let mut calls = 0;
//! let status = exchange::drive(
//!     exchange::once(Request::get("/flaky"), |response: Response| Ok(response.status())).relay(api),
//!     |_| {
//!         calls += 1;
//!         Ok(Response::new(if calls < 3 { 503 } else { 200 }))
//!     },
//! );
//! assert_eq!(status.ok(), Some(200));
//! assert_eq!(calls, 3);
//! ```
//!
//! ## Custom Middleware
//!
//! Implement [`Pipe`](crate::Pipe) for a `Clone` type whose exchange has
//! `Request = Request` and `Response = Response`, or build one from a closure
//! with [`pipe::from_fn`](crate::pipe::from_fn).
//!
//! ## Summary
//!
//! - Pipes compose with `chain`, the first pipe is closest to the wire
//! - Apply a pipe to an exchange with `relay`
//! - Pipes only see responses: transport errors go straight to the caller
//!
//! ## Next Steps
//!
//! - [Chapter 3: Transports & Pagination][super::chapter_3]
