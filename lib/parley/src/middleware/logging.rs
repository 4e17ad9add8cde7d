//! Request/response logging middleware.
//!
//! This middleware logs each round trip using the `tracing` crate.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::exchange::{Exchange, Step};
use crate::{Error, Method, Pipe, Request, Response, Result};

/// Pipe logging each request and its response.
///
/// Events carry `method`, `url`, `status` and `elapsed_ms` fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logging {
    level: LogLevel,
}

/// Log level for the logging middleware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Log at debug level (request/response details).
    Debug,
    /// Log at info level (summary only).
    #[default]
    Info,
}

impl Logging {
    /// Create a new logging pipe with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging pipe that logs at debug level, including headers.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }
}

impl Pipe<Request> for Logging {
    type Exchange = Logged;

    fn wrap(&self, request: Request) -> Logged {
        Logged {
            request: Some(request),
            level: self.level,
            started: None,
        }
    }
}

/// Exchange created by [`Logging`] for one request.
#[derive(Debug)]
pub struct Logged {
    request: Option<Request>,
    level: LogLevel,
    started: Option<(Instant, Method, String)>,
}

impl Exchange for Logged {
    type Request = Request;
    type Response = Response;
    type Output = Response;

    fn start(&mut self) -> Result<Step<Request, Response>> {
        let request = self
            .request
            .take()
            .ok_or_else(|| Error::protocol("exchange already started"))?;
        let method = request.method();
        let url = request.full_url();

        match self.level {
            LogLevel::Debug => {
                debug!(
                    method = %method,
                    url = %url,
                    headers = ?request.headers(),
                    "sending request"
                );
            }
            LogLevel::Info => {
                info!(method = %method, url = %url, "sending request");
            }
        }

        self.started = Some((Instant::now(), method, url));
        Ok(Step::Send(request))
    }

    fn resume(&mut self, response: Response) -> Result<Step<Request, Response>> {
        let (start, method, url) = self
            .started
            .take()
            .ok_or_else(|| Error::protocol("logging resumed without an outstanding request"))?;

        // Saturating conversion to u64 (truncates after ~584 million years)
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let status = response.status();

        if response.is_success() {
            info!(method = %method, url = %url, status, elapsed_ms, "request completed");
        } else {
            warn!(method = %method, url = %url, status, elapsed_ms, "request failed with HTTP error");
        }

        Ok(Step::Done(response))
    }
}
