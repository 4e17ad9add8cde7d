//! The suspend/resume protocol between a query and the executor.
//!
//! An [`Exchange`] is a resumable computation. The driver calls
//! [`Exchange::start`] to obtain the first request, sends it, hands the
//! response back through [`Exchange::resume`] and repeats until the exchange
//! reports [`Step::Done`] or fails.
//!
//! ```text
//! CREATED --start--> AWAITING_RESPONSE --resume--> AWAITING_RESPONSE ...
//!                                        \--resume--> DONE(value | error)
//! ```
//!
//! Exchanges are composed with the [`ExchangeExt`] combinators. Chained
//! combinators wrap outward: in `e.map_yield(f).map_yield(g)`, `f` sees the
//! request first and `g` last, so `g` is the stage closest to the wire.
//!
//! # Example
//!
//! ```
//! use parley_core::exchange::{self, Exchange, ExchangeExt, Step};
//! use parley_core::{Request, Response};
//!
//! let mut lookup = exchange::once(Request::get("/status"), |response: Response| {
//!     Ok(response.status())
//! })
//! .map_yield(|request: Request| request.with_prefix("https://api.example.com"));
//!
//! let Ok(Step::Send(request)) = lookup.start() else { panic!("expected a request") };
//! assert_eq!(request.url(), "https://api.example.com/status");
//!
//! let Ok(Step::Done(status)) = lookup.resume(Response::new(204)) else { panic!("expected a value") };
//! assert_eq!(status, 204);
//! ```

use std::marker::PhantomData;

use crate::pipe::Pipe;
use crate::{Error, Request, Response, Result};

/// One outcome of advancing an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<Req, T> {
    /// The exchange is suspended until the response to this request arrives.
    Send(Req),
    /// The exchange completed with this value.
    Done(T),
}

impl<Req, T> Step<Req, T> {
    /// Transform the request of a [`Step::Send`].
    pub fn map_request<Req2>(self, f: impl FnOnce(Req) -> Req2) -> Step<Req2, T> {
        match self {
            Self::Send(request) => Step::Send(f(request)),
            Self::Done(value) => Step::Done(value),
        }
    }

    /// Returns `true` for [`Step::Done`].
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

/// A resumable request/response computation.
pub trait Exchange {
    /// Requests emitted by this exchange.
    type Request;
    /// Responses this exchange consumes.
    type Response;
    /// Final value.
    type Output;

    /// Begin the exchange, yielding the first request.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails before sending anything.
    fn start(&mut self) -> Result<Step<Self::Request, Self::Output>>;

    /// Feed the response to the last emitted request.
    ///
    /// # Errors
    ///
    /// Returns an error if the response cannot be handled.
    fn resume(&mut self, response: Self::Response) -> Result<Step<Self::Request, Self::Output>>;
}

impl<E: Exchange + ?Sized> Exchange for Box<E> {
    type Request = E::Request;
    type Response = E::Response;
    type Output = E::Output;

    fn start(&mut self) -> Result<Step<Self::Request, Self::Output>> {
        (**self).start()
    }

    fn resume(&mut self, response: Self::Response) -> Result<Step<Self::Request, Self::Output>> {
        (**self).resume(response)
    }
}

/// Boxed exchange, used to name composed exchanges.
pub type BoxExchange<T, Req = Request, Resp = Response> =
    Box<dyn Exchange<Request = Req, Response = Resp, Output = T> + Send>;

/// Drive an exchange to completion with a blocking send function.
///
/// # Errors
///
/// Returns [`Error::Protocol`] if the exchange completes without sending a
/// request, and propagates errors of the exchange or of `send`.
pub fn drive<E, F>(mut exchange: E, mut send: F) -> Result<E::Output>
where
    E: Exchange,
    F: FnMut(E::Request) -> Result<E::Response>,
{
    let mut request = match exchange.start()? {
        Step::Send(request) => request,
        Step::Done(_) => return Err(not_started()),
    };
    loop {
        let response = send(request)?;
        match exchange.resume(response)? {
            Step::Send(next) => request = next,
            Step::Done(value) => return Ok(value),
        }
    }
}

pub(crate) fn not_started() -> Error {
    Error::protocol("query completed without sending a request")
}

// ============================================================================
// Constructors
// ============================================================================

/// An exchange sending one request and parsing its response.
pub fn once<T, F>(request: Request, parse: F) -> Once<F>
where
    F: FnOnce(Response) -> Result<T>,
{
    Once {
        request: Some(request),
        parse: Some(parse),
    }
}

/// Exchange returned by [`once`].
#[derive(Debug, Clone)]
pub struct Once<F> {
    request: Option<Request>,
    parse: Option<F>,
}

impl<T, F> Exchange for Once<F>
where
    F: FnOnce(Response) -> Result<T>,
{
    type Request = Request;
    type Response = Response;
    type Output = T;

    fn start(&mut self) -> Result<Step<Request, T>> {
        self.request
            .take()
            .map(Step::Send)
            .ok_or_else(|| Error::protocol("exchange already started"))
    }

    fn resume(&mut self, response: Response) -> Result<Step<Request, T>> {
        if self.request.is_some() {
            return Err(Error::protocol("exchange resumed before it started"));
        }
        let parse = self
            .parse
            .take()
            .ok_or_else(|| Error::protocol("exchange already completed"))?;
        parse(response).map(Step::Done)
    }
}

/// An exchange backed by a state machine closure.
///
/// The closure receives `None` when the exchange starts and
/// `Some(response)` on every resume.
///
/// ```
/// use parley_core::exchange::{self, Step};
/// use parley_core::Request;
///
/// let mut attempts = 0;
/// let retry_once = exchange::from_fn(move |response| {
///     attempts += 1;
///     match response {
///         Some(response) if response.is_success() || attempts > 2 => {
///             Ok(Step::Done(response.status()))
///         }
///         _ => Ok(Step::Send(Request::get("https://example.com/flaky"))),
///     }
/// });
/// # let _ = retry_once;
/// ```
pub fn from_fn<T, F>(f: F) -> FromFn<F>
where
    F: FnMut(Option<Response>) -> Result<Step<Request, T>>,
{
    FromFn(f)
}

/// Exchange returned by [`from_fn`].
#[derive(Debug, Clone)]
pub struct FromFn<F>(F);

impl<T, F> Exchange for FromFn<F>
where
    F: FnMut(Option<Response>) -> Result<Step<Request, T>>,
{
    type Request = Request;
    type Response = Response;
    type Output = T;

    fn start(&mut self) -> Result<Step<Request, T>> {
        (self.0)(None)
    }

    fn resume(&mut self, response: Response) -> Result<Step<Request, T>> {
        (self.0)(Some(response))
    }
}

/// An exchange that fails at start.
///
/// Queries that only support their own `execute` use it as their exchange.
#[must_use]
pub fn unsupported<T>() -> Unsupported<T> {
    Unsupported(PhantomData)
}

/// Exchange returned by [`unsupported`].
#[derive(Debug)]
pub struct Unsupported<T>(PhantomData<fn() -> T>);

impl<T> Clone for Unsupported<T> {
    fn clone(&self) -> Self {
        Self(PhantomData)
    }
}

impl<T> Exchange for Unsupported<T> {
    type Request = Request;
    type Response = Response;
    type Output = T;

    fn start(&mut self) -> Result<Step<Request, T>> {
        Err(Error::protocol(
            "query cannot be executed as an exchange, use its execute method",
        ))
    }

    fn resume(&mut self, _response: Response) -> Result<Step<Request, T>> {
        Err(Error::protocol("unsupported exchange resumed"))
    }
}

// ============================================================================
// Combinators
// ============================================================================

/// Combinators available on every [`Exchange`].
pub trait ExchangeExt: Exchange + Sized {
    /// Transform every request the exchange emits.
    fn map_yield<F, Req2>(self, f: F) -> MapYield<Self, F>
    where
        F: Fn(Self::Request) -> Req2,
    {
        MapYield { inner: self, f }
    }

    /// Transform every response before it re-enters the exchange.
    fn map_send<F, Resp2>(self, f: F) -> MapSend<Self, F, Resp2>
    where
        F: Fn(Resp2) -> Result<Self::Response>,
    {
        MapSend {
            inner: self,
            f,
            _response: PhantomData,
        }
    }

    /// Transform the final value.
    fn map_return<F, U>(self, f: F) -> MapReturn<Self, F>
    where
        F: FnOnce(Self::Output) -> Result<U>,
    {
        MapReturn {
            inner: self,
            f: Some(f),
        }
    }

    /// Nest this exchange inside a pipe.
    fn relay<P>(self, pipe: P) -> Relay<Self, P>
    where
        P: Pipe<Self::Request>,
        P::Exchange: Exchange<Output = Self::Response>,
    {
        Relay::new(self, pipe)
    }

    /// Box the exchange.
    fn boxed(self) -> BoxExchange<Self::Output, Self::Request, Self::Response>
    where
        Self: Send + 'static,
    {
        Box::new(self)
    }
}

impl<E: Exchange> ExchangeExt for E {}

/// Exchange returned by [`ExchangeExt::map_yield`].
#[derive(Debug, Clone)]
pub struct MapYield<E, F> {
    inner: E,
    f: F,
}

impl<E, F, Req2> Exchange for MapYield<E, F>
where
    E: Exchange,
    F: Fn(E::Request) -> Req2,
{
    type Request = Req2;
    type Response = E::Response;
    type Output = E::Output;

    fn start(&mut self) -> Result<Step<Req2, E::Output>> {
        Ok(self.inner.start()?.map_request(&self.f))
    }

    fn resume(&mut self, response: E::Response) -> Result<Step<Req2, E::Output>> {
        Ok(self.inner.resume(response)?.map_request(&self.f))
    }
}

/// Exchange returned by [`ExchangeExt::map_send`].
#[derive(Debug)]
pub struct MapSend<E, F, Resp2> {
    inner: E,
    f: F,
    _response: PhantomData<fn(Resp2)>,
}

impl<E: Clone, F: Clone, Resp2> Clone for MapSend<E, F, Resp2> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            f: self.f.clone(),
            _response: PhantomData,
        }
    }
}

impl<E, F, Resp2> Exchange for MapSend<E, F, Resp2>
where
    E: Exchange,
    F: Fn(Resp2) -> Result<E::Response>,
{
    type Request = E::Request;
    type Response = Resp2;
    type Output = E::Output;

    fn start(&mut self) -> Result<Step<E::Request, E::Output>> {
        self.inner.start()
    }

    fn resume(&mut self, response: Resp2) -> Result<Step<E::Request, E::Output>> {
        let response = (self.f)(response)?;
        self.inner.resume(response)
    }
}

/// Exchange returned by [`ExchangeExt::map_return`].
#[derive(Debug, Clone)]
pub struct MapReturn<E, F> {
    inner: E,
    f: Option<F>,
}

impl<E: Exchange, F> MapReturn<E, F> {
    fn finish<U>(&mut self, step: Step<E::Request, E::Output>) -> Result<Step<E::Request, U>>
    where
        F: FnOnce(E::Output) -> Result<U>,
    {
        match step {
            Step::Send(request) => Ok(Step::Send(request)),
            Step::Done(value) => {
                let f = self
                    .f
                    .take()
                    .ok_or_else(|| Error::protocol("exchange already completed"))?;
                f(value).map(Step::Done)
            }
        }
    }
}

impl<E, F, U> Exchange for MapReturn<E, F>
where
    E: Exchange,
    F: FnOnce(E::Output) -> Result<U>,
{
    type Request = E::Request;
    type Response = E::Response;
    type Output = U;

    fn start(&mut self) -> Result<Step<E::Request, U>> {
        let step = self.inner.start()?;
        self.finish(step)
    }

    fn resume(&mut self, response: E::Response) -> Result<Step<E::Request, U>> {
        let step = self.inner.resume(response)?;
        self.finish(step)
    }
}

/// Exchange returned by [`ExchangeExt::relay`].
///
/// Every request of the inner exchange is handed to the pipe, which may send
/// any number of requests of its own before producing the response the inner
/// exchange resumes with.
pub struct Relay<E, P>
where
    P: Pipe<E::Request>,
    E: Exchange,
{
    inner: E,
    pipe: P,
    current: Option<P::Exchange>,
}

impl<E, P> Relay<E, P>
where
    E: Exchange,
    P: Pipe<E::Request>,
    P::Exchange: Exchange<Output = E::Response>,
{
    /// Nest `inner` inside `pipe`.
    pub fn new(inner: E, pipe: P) -> Self {
        Self {
            inner,
            pipe,
            current: None,
        }
    }

    fn open(&mut self, mut request: E::Request) -> Result<RelayStep<E, P>> {
        loop {
            let mut wrapped = self.pipe.wrap(request);
            match wrapped.start()? {
                Step::Send(outgoing) => {
                    self.current = Some(wrapped);
                    return Ok(Step::Send(outgoing));
                }
                // the pipe answered without touching the wire
                Step::Done(response) => match self.inner.resume(response)? {
                    Step::Send(next) => request = next,
                    Step::Done(value) => return Ok(Step::Done(value)),
                },
            }
        }
    }
}

type RelayStep<E, P> = Step<
    <<P as Pipe<<E as Exchange>::Request>>::Exchange as Exchange>::Request,
    <E as Exchange>::Output,
>;

impl<E, P> Exchange for Relay<E, P>
where
    E: Exchange,
    P: Pipe<E::Request>,
    P::Exchange: Exchange<Output = E::Response>,
{
    type Request = <P::Exchange as Exchange>::Request;
    type Response = <P::Exchange as Exchange>::Response;
    type Output = E::Output;

    fn start(&mut self) -> Result<RelayStep<E, P>> {
        match self.inner.start()? {
            Step::Send(request) => self.open(request),
            Step::Done(value) => Ok(Step::Done(value)),
        }
    }

    fn resume(&mut self, response: Self::Response) -> Result<RelayStep<E, P>> {
        let Some(current) = self.current.as_mut() else {
            return Err(Error::protocol("relay resumed without an outstanding request"));
        };
        match current.resume(response)? {
            Step::Send(outgoing) => Ok(Step::Send(outgoing)),
            Step::Done(inner_response) => {
                self.current = None;
                match self.inner.resume(inner_response)? {
                    Step::Send(next) => self.open(next),
                    Step::Done(value) => Ok(Step::Done(value)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipe;

    fn text_of(url: &str) -> Once<impl FnOnce(Response) -> Result<String>> {
        once(Request::get(url), |response: Response| response.text())
    }

    #[test]
    fn once_sends_then_parses() {
        let mut exchange = text_of("/hello");
        assert_eq!(exchange.start().ok(), Some(Step::Send(Request::get("/hello"))));
        let step = exchange.resume(Response::new(200).with_body("hi")).ok();
        assert_eq!(step, Some(Step::Done("hi".to_string())));
    }

    #[test]
    fn once_rejects_second_resume() {
        let mut exchange = text_of("/hello");
        let _ = exchange.start();
        let _ = exchange.resume(Response::new(200));
        let err = exchange.resume(Response::new(200)).expect_err("finished");
        assert!(err.is_protocol());
    }

    #[test]
    fn once_rejects_resume_before_start() {
        let mut exchange = text_of("/hello");
        let err = exchange.resume(Response::new(200)).expect_err("not started");
        assert!(err.is_protocol());
    }

    #[test]
    fn drive_runs_to_completion() {
        let mut sent = Vec::new();
        let result = drive(text_of("/a"), |request| {
            sent.push(request.url().to_string());
            Ok(Response::new(200).with_body("done"))
        });
        assert_eq!(result.ok().as_deref(), Some("done"));
        assert_eq!(sent, ["/a"]);
    }

    #[test]
    fn drive_rejects_exchange_done_at_start() {
        let exchange = from_fn(|_| Ok(Step::<Request, _>::Done(1)));
        let err = drive(exchange, |_| Ok(Response::new(200))).expect_err("protocol");
        insta::assert_snapshot!(err, @"protocol violation: query completed without sending a request");
    }

    #[test]
    fn drive_propagates_send_errors() {
        let err = drive(text_of("/a"), |_| Err(Error::Timeout)).expect_err("timeout");
        assert!(err.is_timeout());
    }

    #[test]
    fn from_fn_sees_each_response() {
        let exchange = from_fn(|response: Option<Response>| match response {
            None => Ok(Step::Send(Request::get("/first"))),
            Some(response) if response.status() == 302 => Ok(Step::Send(Request::get("/second"))),
            Some(response) => response.text().map(Step::Done),
        });

        let mut urls = Vec::new();
        let result = drive(exchange, |request| {
            urls.push(request.url().to_string());
            Ok(if request.url() == "/first" {
                Response::new(302)
            } else {
                Response::new(200).with_body("landed")
            })
        });

        assert_eq!(result.ok().as_deref(), Some("landed"));
        assert_eq!(urls, ["/first", "/second"]);
    }

    #[test]
    fn unsupported_fails_at_start() {
        let err = drive(unsupported::<()>(), |_| Ok(Response::new(200))).expect_err("fails");
        assert!(err.is_protocol());
    }

    #[test]
    fn chained_map_yield_applies_last_call_last() {
        let exchange = text_of("/")
            .map_yield(|request: Request| request.with_header("X", "1"))
            .map_yield(|request: Request| request.with_header("X", "2"));

        let mut seen = None;
        let _ = drive(exchange, |request| {
            seen = request.header("X").map(str::to_string);
            Ok(Response::new(200))
        });
        assert_eq!(seen.as_deref(), Some("2"));
    }

    #[test]
    fn map_send_can_fail() {
        let exchange = text_of("/").map_send(|response: Response| {
            if response.status() >= 400 {
                Err(Error::http(response.status(), "failed"))
            } else {
                Ok(response)
            }
        });
        let err = drive(exchange, |_| Ok(Response::new(404))).expect_err("404");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn map_send_converts_response_type() {
        let exchange = text_of("/").map_send(|status: u16| Ok(Response::new(200).with_body(status.to_string())));
        let result = drive(exchange.map_yield(|request: Request| request.url().to_string()), |url| {
            assert_eq!(url, "/");
            Ok(201_u16)
        });
        assert_eq!(result.ok().as_deref(), Some("201"));
    }

    #[test]
    fn map_return_transforms_once() {
        let exchange = text_of("/").map_return(|text| Ok(text.len()));
        let result = drive(exchange, |_| Ok(Response::new(200).with_body("four")));
        assert_eq!(result.ok(), Some(4));
    }

    #[test]
    fn relay_lets_pipe_send_extra_requests() {
        // the pipe retries once on 503
        let retry = pipe::from_fn(|request: Request| {
            let mut attempts = 0;
            from_fn(move |response: Option<Response>| {
                attempts += 1;
                match response {
                    Some(response) if response.status() != 503 || attempts > 2 => {
                        Ok(Step::Done(response))
                    }
                    _ => Ok(Step::Send(request.clone())),
                }
            })
        });

        let mut responses = vec![Response::new(200).with_body("ok"), Response::new(503)];
        let mut calls = 0;
        let result = drive(text_of("/flaky").relay(retry), |_| {
            calls += 1;
            responses.pop().ok_or(Error::Timeout)
        });

        assert_eq!(result.ok().as_deref(), Some("ok"));
        assert_eq!(calls, 2);
    }

    #[test]
    fn relay_rejects_resume_before_start() {
        let mut exchange = text_of("/").relay(pipe::from_fn(|request: Request| {
            once(request, Ok)
        }));
        let err = exchange.resume(Response::new(200)).expect_err("not started");
        assert!(err.is_protocol());
    }

    #[test]
    fn boxed_exchange_is_an_exchange() {
        let boxed: BoxExchange<String> = text_of("/boxed").boxed();
        let result = drive(boxed, |_| Ok(Response::new(200).with_body("box")));
        assert_eq!(result.ok().as_deref(), Some("box"));
    }
}
