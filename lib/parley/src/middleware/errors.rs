//! Error translation send-mappers.
//!
//! By default every status code reaches the query unchanged. These functions
//! turn failure statuses into errors when used with
//! [`ExchangeExt::map_send`](crate::ExchangeExt::map_send).

use crate::{Error, ErrorDecoder, Response, Result};

/// Fail with [`Error::Http`] on any status of 400 and above.
///
/// The error carries the response body, see [`Error::decode_body`].
///
/// # Example
///
/// ```
/// use parley::exchange::{self, ExchangeExt};
/// use parley::middleware::raise_for_status;
/// use parley::{Request, Response};
///
/// let lookup = exchange::once(Request::get("https://example.com/missing"), |response: Response| {
///     response.text()
/// })
/// .map_send(raise_for_status);
///
/// let err = exchange::drive(lookup, |_| Ok(Response::new(404).with_body("nope"))).unwrap_err();
/// assert_eq!(err.status(), Some(404));
/// ```
pub fn raise_for_status(response: Response) -> Result<Response> {
    if response.status() < 400 {
        return Ok(response);
    }
    Err(status_error(response))
}

/// Like [`raise_for_status`], but lets `decoder` turn failures into a domain
/// error, surfaced as [`Error::Custom`].
///
/// Responses the decoder declines still fail with [`Error::Http`].
pub fn translate_errors<D: ErrorDecoder>(decoder: D) -> impl Fn(Response) -> Result<Response> + Clone + Send + Sync
where
    D: Clone,
{
    move |response: Response| {
        if response.status() < 400 {
            return Ok(response);
        }
        let body = response.body().map(|body| body.as_ref()).unwrap_or_default();
        match decoder.decode(response.status(), body) {
            Some(err) => Err(Error::custom(err)),
            None => Err(status_error(response)),
        }
    }
}

fn status_error(response: Response) -> Error {
    let status = response.status();
    let message = http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("unexpected status")
        .to_string();
    match response.into_parts() {
        (_, _, Some(body)) => Error::http_with_body(status, message, body),
        (_, _, None) => Error::http(status, message),
    }
}
