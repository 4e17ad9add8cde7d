//! Follow redirect middleware.
//!
//! [`FollowRedirects`] re-sends a request as long as the response is a
//! redirect (3xx with a `Location` header). Only the final response reaches
//! the wrapped exchange.
//!
//! Unlike [`RawClient`](crate::RawClient), which re-sends the request
//! unchanged to the new URL, this pipe rewrites it the way browsers do: the
//! query of the `Location` replaces the request parameters, and 301, 302 and
//! 303 switch to `GET` without a body.

use url::Url;

use crate::config::DEFAULT_MAX_REDIRECTS;
use crate::exchange::{Exchange, Step};
use crate::{Error, Method, Pipe, Request, Response, Result};

/// Pipe following HTTP redirects.
///
/// # Example
///
/// ```
/// use parley::exchange::{self, ExchangeExt};
/// use parley::middleware::FollowRedirects;
/// use parley::{Request, Response};
///
/// let page = exchange::once(Request::get("https://example.com/old"), |response: Response| {
///     response.text()
/// })
/// .relay(FollowRedirects::new());
/// # let _ = page;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FollowRedirects {
    max_redirects: usize,
}

impl Default for FollowRedirects {
    fn default() -> Self {
        Self::new()
    }
}

impl FollowRedirects {
    /// Follow up to 10 redirects.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    /// Follow up to `max_redirects` redirects.
    #[must_use]
    pub const fn with_max_redirects(max_redirects: usize) -> Self {
        Self { max_redirects }
    }
}

impl Pipe<Request> for FollowRedirects {
    type Exchange = Redirecting;

    fn wrap(&self, request: Request) -> Redirecting {
        Redirecting {
            current: request,
            redirects: 0,
            max_redirects: self.max_redirects,
        }
    }
}

/// Exchange created by [`FollowRedirects`] for one request.
#[derive(Debug, Clone)]
pub struct Redirecting {
    current: Request,
    redirects: usize,
    max_redirects: usize,
}

impl Exchange for Redirecting {
    type Request = Request;
    type Response = Response;
    type Output = Response;

    fn start(&mut self) -> Result<Step<Request, Response>> {
        Ok(Step::Send(self.current.clone()))
    }

    fn resume(&mut self, response: Response) -> Result<Step<Request, Response>> {
        if !is_redirect(response.status()) {
            return Ok(Step::Done(response));
        }

        if self.redirects >= self.max_redirects {
            return Err(Error::TooManyRedirects {
                count: self.redirects,
                max: self.max_redirects,
            });
        }

        let location = response.header("location").ok_or_else(|| {
            Error::InvalidRedirect("redirect response missing Location header".into())
        })?;

        let base = Url::parse(self.current.url())?;
        let target = resolve_redirect_url(&base, location)?;
        let method = redirect_method(response.status(), self.current.method());

        self.current = relocate(self.current.clone(), method, &target);
        self.redirects += 1;
        Ok(Step::Send(self.current.clone()))
    }
}

/// Check if a status code is a redirect.
fn is_redirect(status: u16) -> bool {
    matches!(status, 301 | 302 | 303 | 307 | 308)
}

/// Determine the method for the redirected request.
///
/// - 301, 302, 303: Always use GET (standard browser behavior)
/// - 307, 308: Preserve original method
fn redirect_method(status: u16, original: Method) -> Method {
    match status {
        307 | 308 => original,
        _ => Method::Get,
    }
}

/// Resolve a redirect Location URL relative to the original request URL.
fn resolve_redirect_url(base_url: &Url, location: &str) -> Result<Url> {
    if let Ok(url) = Url::parse(location) {
        return Ok(url);
    }

    base_url.join(location).map_err(Error::InvalidUrl)
}

/// The same request sent to `url`, whose query replaces the original params.
///
/// The body is dropped when the method becomes GET or HEAD.
fn relocate(request: Request, method: Method, url: &Url) -> Request {
    let (_, _, _, headers, body) = request.into_parts();
    let relocated = Request::new(method, url.as_str()).with_headers(&headers);
    match body {
        Some(body) if !matches!(method, Method::Get | Method::Head) => relocated.with_body(body),
        _ => relocated,
    }
}
