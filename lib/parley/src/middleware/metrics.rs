//! Metrics middleware using the metrics crate facade.
//!
//! This middleware records HTTP request/response metrics using the `metrics` crate,
//! which allows integration with various metrics backends (Prometheus, `StatsD`, etc.).

use std::time::Instant;

use crate::exchange::{Exchange, Step};
use crate::{Error, Method, Pipe, Request, Response, Result};

/// Labels used for metrics.
const LABEL_METHOD: &str = "method";
const LABEL_STATUS: &str = "status";

/// Metric names.
const METRIC_REQUESTS_TOTAL: &str = "http_client_requests_total";
const METRIC_REQUEST_DURATION: &str = "http_client_request_duration_seconds";

/// Pipe recording HTTP metrics.
///
/// Records the following metrics:
/// - `http_client_requests_total` (counter): Total number of requests, labeled by method and status
/// - `http_client_request_duration_seconds` (histogram): Request duration in seconds, labeled by method
///
/// Requests that fail in transport never reach the pipe and are not counted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Metrics;

impl Pipe<Request> for Metrics {
    type Exchange = Measured;

    fn wrap(&self, request: Request) -> Measured {
        Measured {
            request: Some(request),
            started: None,
        }
    }
}

/// Exchange created by [`Metrics`] for one request.
#[derive(Debug)]
pub struct Measured {
    request: Option<Request>,
    started: Option<(Instant, Method)>,
}

impl Exchange for Measured {
    type Request = Request;
    type Response = Response;
    type Output = Response;

    fn start(&mut self) -> Result<Step<Request, Response>> {
        let request = self
            .request
            .take()
            .ok_or_else(|| Error::protocol("exchange already started"))?;
        self.started = Some((Instant::now(), request.method()));
        Ok(Step::Send(request))
    }

    fn resume(&mut self, response: Response) -> Result<Step<Request, Response>> {
        let (start, method) = self
            .started
            .take()
            .ok_or_else(|| Error::protocol("metrics resumed without an outstanding request"))?;

        metrics::histogram!(METRIC_REQUEST_DURATION, LABEL_METHOD => method.as_str())
            .record(start.elapsed().as_secs_f64());
        metrics::counter!(
            METRIC_REQUESTS_TOTAL,
            LABEL_METHOD => method.as_str(),
            LABEL_STATUS => response.status().to_string()
        )
        .increment(1);

        Ok(Step::Done(response))
    }
}
