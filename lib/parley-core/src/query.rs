//! Queries: restartable descriptions of API interactions.
//!
//! A [`Query`] never performs I/O itself and never holds a client. Each call
//! to [`Query::exchange`] returns a fresh exchange, so executing the same
//! query twice issues the same requests twice.
//!
//! Most queries only implement [`Query::exchange`]. A query needing direct
//! access to the transport overrides [`Query::execute`] (and, if it supports
//! it, [`Query::execute_async`]) and works with the [`Session`] it receives.
//!
//! # Example
//!
//! ```
//! use parley_core::exchange::{self, BoxExchange, ExchangeExt};
//! use parley_core::{pipe, Query, Request, Response};
//!
//! struct Repo<'a> {
//!     owner: &'a str,
//!     name: &'a str,
//! }
//!
//! impl Query for Repo<'_> {
//!     type Output = serde_json::Value;
//!     type Exchange = BoxExchange<serde_json::Value>;
//!
//!     fn exchange(&self) -> Self::Exchange {
//!         let path = format!("/repos/{}/{}", self.owner, self.name);
//!         exchange::once(Request::get(path), |response: Response| response.json())
//!             .map_yield(pipe::prefix_adder("https://api.github.com"))
//!             .boxed()
//!     }
//! }
//! ```

use std::any::Any;
use std::future::Future;

use crate::exchange::Exchange;
use crate::{Request, Response, Result, Session};

/// A restartable factory of exchanges.
pub trait Query {
    /// Final value of the query.
    type Output;

    /// Exchange driving the query.
    type Exchange: Exchange<Request = Request, Response = Response, Output = Self::Output>;

    /// A fresh, independent exchange for one execution.
    fn exchange(&self) -> Self::Exchange;

    /// Execute the query with a blocking transport.
    ///
    /// The default implementation drives [`Query::exchange`].
    ///
    /// # Errors
    ///
    /// Returns any error raised by the exchange, the authentication step or
    /// the transport.
    fn execute<C: Any>(&self, session: &Session<'_, C>) -> Result<Self::Output> {
        session.run(self.exchange())
    }

    /// Execute the query with an asynchronous transport.
    ///
    /// The default implementation drives [`Query::exchange`].
    fn execute_async<C>(&self, session: &Session<'_, C>) -> impl Future<Output = Result<Self::Output>> + Send
    where
        C: Any + Send + Sync,
        Self::Exchange: Send,
        Self::Output: Send,
    {
        session.run_async(self.exchange())
    }
}

impl<Q: Query + ?Sized> Query for &Q {
    type Output = Q::Output;
    type Exchange = Q::Exchange;

    fn exchange(&self) -> Self::Exchange {
        (**self).exchange()
    }

    fn execute<C: Any>(&self, session: &Session<'_, C>) -> Result<Self::Output> {
        (**self).execute(session)
    }

    fn execute_async<C>(&self, session: &Session<'_, C>) -> impl Future<Output = Result<Self::Output>> + Send
    where
        C: Any + Send + Sync,
        Self::Exchange: Send,
        Self::Output: Send,
    {
        (**self).execute_async(session)
    }
}

/// A query built from a closure creating its exchange.
///
/// ```
/// use parley_core::exchange;
/// use parley_core::{query, Request, Response};
///
/// let ping = query::from_fn(|| {
///     exchange::once(Request::get("https://example.com/ping"), |response: Response| {
///         Ok(response.is_success())
///     })
/// });
/// # let _ = ping;
/// ```
pub fn from_fn<E, F>(f: F) -> FnQuery<F>
where
    F: Fn() -> E,
    E: Exchange<Request = Request, Response = Response>,
{
    FnQuery(f)
}

/// Query returned by [`from_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FnQuery<F>(F);

impl<E, F> Query for FnQuery<F>
where
    F: Fn() -> E,
    E: Exchange<Request = Request, Response = Response>,
{
    type Output = E::Output;
    type Exchange = E;

    fn exchange(&self) -> E {
        (self.0)()
    }
}

/// A query sending a fixed request and returning the raw response.
///
/// ```
/// use parley_core::{query, Request};
///
/// let raw = query::request(Request::get("https://example.com"));
/// # let _ = raw;
/// ```
#[must_use]
pub fn request(request: Request) -> RequestQuery {
    RequestQuery(request)
}

/// Query returned by [`request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestQuery(Request);

impl Query for RequestQuery {
    type Output = Response;
    type Exchange = crate::pipe::Forward;

    fn exchange(&self) -> Self::Exchange {
        crate::pipe::forward(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{self, ExchangeExt, Step};

    #[test]
    fn each_exchange_is_fresh() {
        let query = from_fn(|| {
            exchange::once(Request::get("/count"), |response: Response| response.text())
        });

        for _ in 0..2 {
            let mut exchange = query.exchange();
            assert_eq!(exchange.start().ok(), Some(Step::Send(Request::get("/count"))));
            let done = exchange.resume(Response::new(200).with_body("1")).ok();
            assert_eq!(done, Some(Step::Done("1".to_string())));
        }
    }

    #[test]
    fn request_query_returns_raw_response() {
        let query = request(Request::delete("/items/1"));
        let response = exchange::drive(query.exchange(), |request| {
            assert_eq!(request.method(), crate::Method::Delete);
            Ok(Response::new(204))
        })
        .expect("runs");
        assert_eq!(response.status(), 204);
    }

    #[test]
    fn reference_to_query_is_a_query() {
        fn exchange_of<Q: Query>(query: Q) -> Q::Exchange {
            query.exchange()
        }

        let query = request(Request::get("/"));
        let mut exchange = exchange_of(&query).map_return(|response| Ok(response.status()));
        assert!(matches!(exchange.start(), Ok(Step::Send(_))));
    }
}
