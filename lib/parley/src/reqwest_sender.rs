//! Senders for [`reqwest`] clients.
//!
//! [`ReqwestSender`] dispatches through a `reqwest::Client`;
//! [`ReqwestBlockingSender`] (feature `blocking`) through a
//! `reqwest::blocking::Client`. Both are registered by
//! [`default_registry`](crate::default_registry).

use bytes::Bytes;
use futures_util::future::BoxFuture;
use tracing::{Instrument, debug_span};

use crate::client::{extract_headers, with_body};
use crate::{AsyncSender, Error, Headers, Request, Response, Result};

/// Asynchronous sender for `reqwest::Client`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestSender;

impl AsyncSender<reqwest::Client> for ReqwestSender {
    fn send<'a>(&'a self, client: &'a reqwest::Client, request: Request) -> BoxFuture<'a, Result<Response>> {
        let span = debug_span!("reqwest", method = %request.method(), url = %request.url());
        Box::pin(
            async move {
                let (method, url, headers, body) = prepare(request);
                let mut builder = client.request(method, url);
                for (name, value) in &headers {
                    builder = builder.header(name, value);
                }
                if let Some(body) = body {
                    builder = builder.body(body);
                }

                let response = builder.send().await.map_err(map_reqwest_error)?;
                let status = response.status().as_u16();
                let headers = extract_headers(response.headers());
                let body = response.bytes().await.map_err(map_reqwest_error)?;

                Ok(with_body(Response::new(status).with_headers(headers), body))
            }
            .instrument(span),
        )
    }
}

/// Blocking sender for `reqwest::blocking::Client`.
///
/// Must not be called from within an async runtime; use
/// `tokio::task::spawn_blocking` there.
#[cfg(feature = "blocking")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestBlockingSender;

#[cfg(feature = "blocking")]
impl crate::Sender<reqwest::blocking::Client> for ReqwestBlockingSender {
    fn send(&self, client: &reqwest::blocking::Client, request: Request) -> Result<Response> {
        let _span = debug_span!("reqwest_blocking", method = %request.method(), url = %request.url())
            .entered();
        let (method, url, headers, body) = prepare(request);
        let mut builder = client.request(method, url);
        for (name, value) in &headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let headers = extract_headers(response.headers());
        let body = response.bytes().map_err(map_reqwest_error)?;

        Ok(with_body(Response::new(status).with_headers(headers), body))
    }
}

/// Split a request for reqwest, labelling untyped bodies as octet streams.
fn prepare(request: Request) -> (http::Method, String, Headers, Option<Bytes>) {
    let url = request.full_url();
    let (method, _, _, mut headers, body) = request.into_parts();
    if body.is_some() && !headers.contains("content-type") {
        headers.insert("Content-Type", "application/octet-stream");
    }
    (http::Method::from(method), url, headers, body)
}

#[allow(clippy::needless_pass_by_value)]
fn map_reqwest_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        return Error::Timeout;
    }
    if err.is_builder() {
        return Error::invalid_request(err.to_string());
    }
    if err.is_redirect() {
        return Error::InvalidRedirect(err.to_string());
    }
    Error::connection(err.to_string())
}
