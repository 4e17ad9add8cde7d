//! Middleware as composable pipes.
//!
//! A [`Pipe`] receives one request of the exchange it wraps and answers with
//! an exchange of its own. That exchange may send the request on (changed or
//! not), send further requests, and finally produces the response handed back
//! to the wrapped exchange.
//!
//! Pipes compose with [`PipeExt::chain`]: `a.chain(b).chain(c)` is the chain
//! `[A, B, C]` in which `A` wraps `B` wraps `C`. Requests travel from `C`
//! outward to `A`, which is closest to the wire, and responses travel back
//! from `A` to `C`.
//!
//! # Example
//!
//! ```
//! use parley_core::exchange::{self, ExchangeExt};
//! use parley_core::pipe::{self, PipeExt};
//! use parley_core::{Request, Response};
//!
//! let api = pipe::map_requests(pipe::prefix_adder("https://api.example.com"))
//!     .chain(pipe::map_requests(pipe::header_adder([("Accept", "application/json")])));
//!
//! let mut sent = None;
//! let status = exchange::drive(
//!     exchange::once(Request::get("/users"), |response: Response| Ok(response.status()))
//!         .relay(api),
//!     |request| {
//!         sent = Some(request.full_url());
//!         Ok(Response::new(200))
//!     },
//! )
//! .expect("executes");
//!
//! assert_eq!(status, 200);
//! assert_eq!(sent.as_deref(), Some("https://api.example.com/users"));
//! ```

use std::sync::Arc;

use crate::exchange::{self, Exchange, Once, Relay};
use crate::{Headers, Request, Response, Result};

/// A factory of exchanges wrapping a single request.
pub trait Pipe<Req> {
    /// Exchange produced for each wrapped request.
    type Exchange: Exchange;

    /// Wrap one request.
    fn wrap(&self, request: Req) -> Self::Exchange;
}

impl<Req, P: Pipe<Req> + ?Sized> Pipe<Req> for &P {
    type Exchange = P::Exchange;

    fn wrap(&self, request: Req) -> Self::Exchange {
        (**self).wrap(request)
    }
}

impl<Req, P: Pipe<Req> + ?Sized> Pipe<Req> for Arc<P> {
    type Exchange = P::Exchange;

    fn wrap(&self, request: Req) -> Self::Exchange {
        (**self).wrap(request)
    }
}

/// Pipe combinators.
pub trait PipeExt<Req>: Pipe<Req> + Sized {
    /// Nest `inner` inside `self`; `self` stays closest to the wire.
    fn chain<B>(self, inner: B) -> Chain<Self, B> {
        Chain { outer: self, inner }
    }
}

impl<Req, P: Pipe<Req>> PipeExt<Req> for P {}

/// Pipe returned by [`PipeExt::chain`].
#[derive(Debug, Clone)]
pub struct Chain<A, B> {
    outer: A,
    inner: B,
}

impl<Req, A, B> Pipe<Req> for Chain<A, B>
where
    B: Pipe<Req>,
    A: Pipe<<B::Exchange as Exchange>::Request> + Clone,
    A::Exchange: Exchange<Output = <B::Exchange as Exchange>::Response>,
{
    type Exchange = Relay<B::Exchange, A>;

    fn wrap(&self, request: Req) -> Self::Exchange {
        Relay::new(self.inner.wrap(request), self.outer.clone())
    }
}

/// A pipe backed by a closure returning an exchange.
pub fn from_fn<Req, E, F>(f: F) -> FnPipe<F>
where
    F: Fn(Req) -> E,
    E: Exchange,
{
    FnPipe(f)
}

/// Pipe returned by [`from_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FnPipe<F>(F);

impl<Req, E, F> Pipe<Req> for FnPipe<F>
where
    F: Fn(Req) -> E,
    E: Exchange,
{
    type Exchange = E;

    fn wrap(&self, request: Req) -> E {
        (self.0)(request)
    }
}

/// A pipe that transforms each request and passes the response through.
pub fn map_requests<F>(f: F) -> MapRequests<F>
where
    F: Fn(Request) -> Request,
{
    MapRequests(f)
}

/// Pipe returned by [`map_requests`].
#[derive(Debug, Clone, Copy)]
pub struct MapRequests<F>(F);

impl<F> Pipe<Request> for MapRequests<F>
where
    F: Fn(Request) -> Request,
{
    type Exchange = Forward;

    fn wrap(&self, request: Request) -> Forward {
        forward((self.0)(request))
    }
}

/// Exchange sending one request and returning its response unchanged.
pub type Forward = Once<fn(Response) -> Result<Response>>;

/// Forward `request` to the next stage.
#[must_use]
pub fn forward(request: Request) -> Forward {
    exchange::once(request, Ok as fn(Response) -> Result<Response>)
}

// ============================================================================
// Request mappers
// ============================================================================

/// Request mapper merging the given headers (later wins).
pub fn header_adder<I, K, V>(headers: I) -> impl Fn(Request) -> Request + Clone + Send + Sync + 'static
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let headers: Arc<Headers> = Arc::new(headers.into_iter().collect());
    move |request: Request| {
        request.with_headers(
            headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        )
    }
}

/// Request mapper prepending a prefix to the URL.
pub fn prefix_adder(
    prefix: impl Into<String>,
) -> impl Fn(Request) -> Request + Clone + Send + Sync + 'static {
    let prefix: Arc<str> = prefix.into().into();
    move |request: Request| request.with_prefix(&prefix)
}

/// Request mapper merging the given query parameters (later wins).
pub fn params_adder<I, K, V>(params: I) -> impl Fn(Request) -> Request + Clone + Send + Sync + 'static
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let params: Arc<crate::Params> = Arc::new(
        params
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect(),
    );
    move |request: Request| request.with_params(params.iter().map(|(k, v)| (k.clone(), v.clone())))
}
