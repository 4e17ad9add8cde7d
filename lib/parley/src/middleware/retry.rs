//! Retry middleware.
//!
//! [`Retry`] re-sends idempotent requests whose response signals a transient
//! failure, immediately and without backoff. Transport errors are not seen by
//! pipes and always propagate.

use tracing::warn;

use crate::exchange::{Exchange, Step};
use crate::{Pipe, Request, Response, Result};

/// Pipe retrying idempotent requests on 5xx and 429 responses.
///
/// # Example
///
/// ```
/// use parley::exchange::{self, ExchangeExt};
/// use parley::middleware::Retry;
/// use parley::{Request, Response};
///
/// let status = exchange::once(Request::get("https://example.com/flaky"), |response: Response| {
///     Ok(response.status())
/// })
/// .relay(Retry::new(3));
/// # let _ = status;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Retry {
    max_retries: u32,
}

impl Retry {
    /// Retry up to `max_retries` times per request.
    #[must_use]
    pub const fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Returns `true` if the response should be retried.
    fn should_retry_response(response: &Response) -> bool {
        let status = response.status();
        status >= 500 || status == 429
    }
}

impl Pipe<Request> for Retry {
    type Exchange = Retrying;

    fn wrap(&self, request: Request) -> Retrying {
        let remaining = if request.method().is_idempotent() {
            self.max_retries
        } else {
            0
        };
        Retrying { request, remaining }
    }
}

/// Exchange created by [`Retry`] for one request.
#[derive(Debug, Clone)]
pub struct Retrying {
    request: Request,
    remaining: u32,
}

impl Exchange for Retrying {
    type Request = Request;
    type Response = Response;
    type Output = Response;

    fn start(&mut self) -> Result<Step<Request, Response>> {
        Ok(Step::Send(self.request.clone()))
    }

    fn resume(&mut self, response: Response) -> Result<Step<Request, Response>> {
        if self.remaining == 0 || !Retry::should_retry_response(&response) {
            return Ok(Step::Done(response));
        }
        self.remaining -= 1;
        warn!(
            status = response.status(),
            url = self.request.url(),
            remaining = self.remaining,
            "retrying request"
        );
        Ok(Step::Send(self.request.clone()))
    }
}
