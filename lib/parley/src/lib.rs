//! Composable HTTP API queries.
//!
//! A query describes an API interaction as an [`Exchange`]: it yields
//! requests and is resumed with responses, without ever touching a socket.
//! Executors run queries with any client whose type has a sender registered
//! in a [`SenderRegistry`], and [`middleware`] pipes wrap exchanges with
//! redirects, retries, logging and JSON handling.
//!
//! # Example
//!
//! ```no_run
//! use parley::exchange::{self, BoxExchange, ExchangeExt};
//! use parley::middleware::{Json, expect_json, raise_for_status};
//! use parley::{HyperClient, Query, Request, pipe};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Repo {
//!     full_name: String,
//!     stargazers_count: u64,
//! }
//!
//! struct GetRepo<'a> {
//!     owner: &'a str,
//!     name: &'a str,
//! }
//!
//! impl Query for GetRepo<'_> {
//!     type Output = Repo;
//!     type Exchange = BoxExchange<Repo>;
//!
//!     fn exchange(&self) -> Self::Exchange {
//!         expect_json(Request::get(format!("/repos/{}/{}", self.owner, self.name)))
//!             .relay(Json)
//!             .map_send(raise_for_status)
//!             .map_yield(pipe::prefix_adder("https://api.github.com"))
//!             .boxed()
//!     }
//! }
//!
//! # async fn run() -> parley::Result<()> {
//! let github = parley::executor(HyperClient::new());
//! let repo = github.execute_async(&GetRepo { owner: "rust-lang", name: "rust" }).await?;
//! println!("{}: {} stars", repo.full_name, repo.stargazers_count);
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `blocking` (default) | Blocking sender for `reqwest::blocking::Client` |
//! | `reqwest` | Asynchronous sender for `reqwest::Client` |
//! | `middleware-decompression` | Response decompression pipe |
//! | `middleware-metrics` | Request metrics pipe |
//! | `middleware-full` | All middleware |
//!
//! See the [tutorial][_tutorial] for a complete guide.

pub mod _tutorial;
mod client;
mod config;
mod connector;
pub mod middleware;
pub mod prelude;
mod raw;
mod registry;
#[cfg(feature = "reqwest")]
mod reqwest_sender;

// Transports
pub use client::{HyperClient, HyperClientBuilder};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_MAX_REDIRECTS, default_user_agent};
pub use connector::{https_connector, tls_config};
pub use raw::{DEFAULT_TIMEOUT, RawClient};
#[cfg(feature = "blocking")]
pub use reqwest_sender::ReqwestBlockingSender;
#[cfg(feature = "reqwest")]
pub use reqwest_sender::ReqwestSender;

// Execution
pub use registry::{default_registry, execute, execute_async, executor, shared_registry};

// Re-export core types
pub use parley_core::{
    AsyncPaginator, AsyncSender, Auth, AuthFn, BlockingHttpClient, BoxError, BoxExchange, BoxFuture,
    ContentType, DefaultErrorDecoder, Error, ErrorDecoder, Exchange, ExchangeExt, Executor, Headers,
    HttpClient, Method, Page, Pagelike, Paginated, Paginator, Params, Pipe, PipeExt, Query, Request,
    Response, Result, Sender, SenderRegistry, Session, Step, basic_auth, basic_auth_header,
    bearer_auth, from_json, paginated, to_form, to_json, to_query_string,
};
pub use parley_core::{exchange, pagination, pipe, query};

// Re-export crates appearing in public signatures
pub use serde_json;
pub use url;
