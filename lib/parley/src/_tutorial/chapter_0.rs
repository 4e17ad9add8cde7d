//! # Chapter 0: Getting Started
//!
//! Your first parley query in 5 minutes.
//!
//! ## What You'll Learn
//!
//! - Describe a request with [`Request`](crate::Request)
//! - Turn it into a [`Query`](crate::Query)
//! - Execute it with an [`Executor`](crate::Executor)
//!
//! ## Prerequisites
//!
//! Add to `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! parley = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! ## Your First Query
//!
//! A query never talks to the network. It describes which requests to send
//! and what to do with the responses:
//!
//! ```ignore
//! use parley::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! pub struct User {
//!     pub login: String,
//!     pub name: Option<String>,
//! }
//!
//! pub struct GetUser {
//!     pub login: String,
//! }
//!
//! impl Query for GetUser {
//!     type Output = User;
//!     type Exchange = parley::BoxExchange<User>;
//!
//!     fn exchange(&self) -> Self::Exchange {
//!         let request = Request::get(format!("https://api.github.com/users/{}", self.login));
//!         exchange::once(request, |response: Response| response.json()).boxed()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> parley::Result<()> {
//!     let github = parley::executor(HyperClient::new());
//!     let user = github.execute_async(&GetUser { login: "octocat".into() }).await?;
//!     println!("User: {user:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Where Things Happen
//!
//! ```text
//! GetUser::exchange()  →  Step::Send(request)  →  sender for HyperClient  →  network
//!                      ←  resume(response)     ←                          ←
//!                      →  Step::Done(User)
//! ```
//!
//! - The query builds the request and parses the response
//! - The executor authenticates each request and picks the sender registered
//!   for the client type
//! - The same query runs with any registered client, blocking or async
//!
//! ## Blocking Execution
//!
//! With the default `blocking` feature, a `reqwest::blocking::Client` runs the
//! same query without an async runtime:
//!
//! ```ignore
//! let user = parley::execute(&GetUser { login: "octocat".into() }, ("me", "token"), &reqwest::blocking::Client::new())?;
//! ```
//!
//! ## Next Steps
//!
//! - [Chapter 1: Exchanges][super::chapter_1] - Queries sending several requests
