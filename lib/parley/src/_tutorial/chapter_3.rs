//! # Chapter 3: Transports & Pagination
//!
//! Pick a client, register your own, and iterate over pages.
//!
//! ## Built-in Clients
//!
//! | Client | Mode | Notes |
//! |--------|------|-------|
//! | [`HyperClient`](crate::HyperClient) | async | Pooled hyper client with rustls |
//! | [`RawClient`](crate::RawClient) | async | One HTTP/1.1 connection per request, follows redirects |
//! | `reqwest::Client` | async | Feature `reqwest` |
//! | `reqwest::blocking::Client` | blocking | Feature `blocking` (default) |
//!
//! [`default_registry`](crate::default_registry) knows all of them, and
//! [`executor`](crate::executor) uses a shared instance of it.
//!
//! ## Registering a Client
//!
//! Any type can act as a client once a sender is registered for it.
//! Closures are blocking senders:
//!
//! ```
//! use std::sync::Arc;
//!
//! use parley::{Executor, Request, Response, query};
//!
//! struct Fixture;
//!
//! let registry = parley::default_registry().with(|_: &Fixture, request: Request| {
//!     Ok(Response::new(200).with_body(request.url().to_string()))
//! });
//!
//! let executor = Executor::new(Arc::new(registry), Fixture);
//! let response = executor.execute(&query::request(Request::get("https://example.com/hello")));
//! assert_eq!(response.ok().and_then(|r| r.text().ok()).as_deref(), Some("https://example.com/hello"));
//! ```
//!
//! Registering a second sender for the same client type replaces the first.
//! Executing with a client type nobody registered fails with
//! [`Error::UnsupportedClient`](crate::Error::UnsupportedClient) before any I/O.
//!
//! ## Pagination
//!
//! A paginated query returns a [`Page`](crate::Page): the content and the
//! query for the next page.
//!
//! ```ignore
//! impl Query for Issues {
//!     type Output = Page<Vec<Issue>, Issues>;
//!     type Exchange = BoxExchange<Self::Output>;
//!
//!     fn exchange(&self) -> Self::Exchange {
//!         let page = self.page;
//!         let repo = self.repo.clone();
//!         expect_json::<Vec<Issue>>(Request::get(format!("/repos/{repo}/issues")).with_param("page", page.to_string()))
//!             .relay(Json)
//!             .map_return(move |issues| {
//!                 let next = (!issues.is_empty()).then(|| Issues { repo, page: page + 1 });
//!                 Ok(Page::new(issues, next))
//!             })
//!             .map_yield(pipe::prefix_adder("https://api.github.com"))
//!             .boxed()
//!     }
//! }
//!
//! for issues in github.paginate(&Issues { repo: "rust-lang/rust".into(), page: 1 }) {
//!     for issue in issues? {
//!         println!("{}", issue.title);
//!     }
//! }
//! ```
//!
//! With an async client, `paginate_async` yields pages with `next_page()` or
//! as a `Stream` with `into_stream()`.
//!
//! ## Summary
//!
//! - Queries are transport-free, clients are chosen at execution time
//! - Register senders for your own client types
//! - Paginated queries return pages, executors iterate over them
