//! # Chapter 1: Exchanges
//!
//! Queries sending several requests, and the combinators shaping them.
//!
//! ## The Protocol
//!
//! An [`Exchange`](crate::Exchange) is started once, then resumed with the
//! response to each request it yields:
//!
//! ```text
//! start()          → Step::Send(request)
//! resume(response) → Step::Send(next request) | Step::Done(value)
//! ```
//!
//! [`exchange::drive`](crate::exchange::drive) runs an exchange against any
//! send function, which makes queries easy to test without a server:
//!
//! ```
//! use parley::exchange::{self, ExchangeExt};
//! use parley::{Request, Response};
//!
//! let status = exchange::once(Request::get("/status"), |response: Response| Ok(response.status()))
//!     .map_yield(|request: Request| request.with_prefix("https://api.example.com"));
//!
//! let result = exchange::drive(status, |request| {
//!     assert_eq!(request.url(), "https://api.example.com/status");
//!     Ok(Response::new(204))
//! });
//! assert_eq!(result.ok(), Some(204));
//! ```
//!
//! ## Several Requests
//!
//! [`exchange::from_fn`](crate::exchange::from_fn) builds an exchange from a
//! state machine. The closure receives `None` on start and every response
//! afterwards:
//!
//! ```
//! use parley::exchange::{self, Step};
//! use parley::{Request, Response};
//!
//! // create an issue, then read it back
//! let mut created = None;
//! let roundtrip = exchange::from_fn(move |response: Option<Response>| match (response, created.take()) {
//!     (None, _) => Ok(Step::Send(Request::post("https://example.com/issues").with_body("bug"))),
//!     (Some(response), None) => {
//!         let location = response.header("location").unwrap_or("/issues/1").to_string();
//!         created = Some(location.clone());
//!         Ok(Step::Send(Request::get(format!("https://example.com{location}"))))
//!     }
//!     (Some(response), Some(_)) => response.text().map(Step::Done),
//! });
//!
//! let body = exchange::drive(roundtrip, |request| match request.method().as_str() {
//!     "POST" => Ok(Response::new(201).with_header("Location", "/issues/42")),
//!     _ => Ok(Response::new(200).with_body(request.url().to_string())),
//! });
//! assert_eq!(body.ok().as_deref(), Some("https://example.com/issues/42"));
//! ```
//!
//! ## Combinators
//!
//! | Combinator | Applies to |
//! |------------|------------|
//! | `map_yield(f)` | every emitted request |
//! | `map_send(f)` | every response, before the exchange sees it |
//! | `map_return(f)` | the final value |
//! | `relay(pipe)` | every request, handed to a [pipe][super::chapter_2] |
//! | `boxed()` | the whole exchange, to name its type |
//!
//! Chained combinators wrap outward: the last one called is closest to the
//! wire. In `e.map_yield(f).map_yield(g)`, `g` sees the request after `f`.
//!
//! ## Escape Hatch
//!
//! A query needing the raw transport overrides
//! [`Query::execute`](crate::Query::execute) and uses the
//! [`Session`](crate::Session) it receives, returning
//! [`exchange::unsupported`](crate::exchange::unsupported) as its exchange.
//!
//! ## Next Steps
//!
//! - [Chapter 2: Middleware][super::chapter_2] - Pipes and chains
