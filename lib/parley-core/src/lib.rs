//! Core types and traits for the parley query framework.
//!
//! This crate is transport-free. It provides:
//! - [`Request`], [`Response`], [`Headers`] and [`Method`]: immutable HTTP values
//! - [`Error`] and [`Result`]: error handling
//! - [`exchange`]: the suspend/resume protocol between queries and executors
//! - [`pipe`]: middleware composition
//! - [`Query`]: restartable descriptions of API interactions
//! - [`Sender`], [`AsyncSender`] and [`SenderRegistry`]: transport dispatch on client type
//! - [`Executor`] and [`Session`]: query execution with authentication
//! - [`pagination`]: iteration over paginated queries

mod auth;
mod body;
mod error;
pub mod exchange;
mod executor;
mod headers;
mod method;
pub mod pagination;
pub mod pipe;
pub mod prelude;
pub mod query;
mod request;
mod response;
mod sender;

pub use auth::{Auth, AuthFn, basic_auth, basic_auth_header, bearer_auth};
pub use body::{ContentType, from_json, to_form, to_json, to_query_string};
pub use error::{BoxError, DefaultErrorDecoder, Error, ErrorDecoder, Result};
pub use exchange::{BoxExchange, Exchange, ExchangeExt, Step};
pub use executor::{Executor, Session};
pub use headers::{Headers, Params};
pub use method::Method;
pub use pagination::{AsyncPaginator, Page, Pagelike, Paginated, Paginator, paginated};
pub use pipe::{Pipe, PipeExt};
pub use query::Query;
pub use request::Request;
pub use response::Response;
pub use sender::{AsyncSender, BlockingHttpClient, HttpClient, Sender, SenderRegistry};

pub use futures_util::future::BoxFuture;
