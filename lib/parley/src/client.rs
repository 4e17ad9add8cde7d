//! HTTP client implementation using hyper-util.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tracing::{Instrument, debug_span};

use crate::{
    Error, Request, Response, Result,
    config::{ClientConfig, ClientConfigBuilder},
    connector::https_connector,
};

/// HTTP client using hyper-util with connection pooling and TLS.
///
/// Register it with [`SenderRegistry::register_client`](crate::SenderRegistry::register_client),
/// or use [`default_registry`](crate::default_registry) which already does.
///
/// # Example
///
/// ```no_run
/// use parley::{HyperClient, Request, query};
/// use std::time::Duration;
///
/// # async fn run() -> parley::Result<()> {
/// let client = HyperClient::builder()
///     .timeout(Duration::from_secs(5))
///     .build();
/// let response = parley::execute_async(&query::request(Request::get("https://example.com")), parley::Auth::None, &client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HyperClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// Create a new client with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let connector = https_connector(config.connect_timeout);

        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(connector);

        Self { inner, config }
    }

    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder::default()
    }

    /// Get the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a hyper request from a parley request.
    fn build_hyper_request(&self, request: Request) -> Result<http::Request<Full<Bytes>>> {
        let url = request.full_url();
        let (method, _, _, headers, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());

        for (name, value) in &headers {
            builder = builder.header(name, value);
        }
        if !headers.contains("user-agent") {
            builder = builder.header(http::header::USER_AGENT, self.config.user_agent.as_str());
        }

        let body = body.map_or_else(Full::default, Full::new);
        builder
            .body(body)
            .map_err(|err| Error::invalid_request(err.to_string()))
    }

    async fn send(&self, request: Request) -> Result<Response> {
        let hyper_request = self.build_hyper_request(request)?;

        let exchange = async {
            let response = self
                .inner
                .request(hyper_request)
                .await
                .map_err(map_hyper_error)?;

            let status = response.status().as_u16();
            let headers = extract_headers(response.headers());
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|err| Error::connection(err.to_string()))?
                .to_bytes();

            Ok(with_body(Response::new(status).with_headers(headers), body))
        };

        tokio::time::timeout(self.config.timeout, exchange)
            .await
            .map_err(|_| Error::Timeout)?
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl parley_core::HttpClient for HyperClient {
    async fn execute(&self, request: Request) -> Result<Response> {
        let span = debug_span!("hyper", method = %request.method(), url = %request.url());
        self.send(request).instrument(span).await
    }
}

/// Header pairs whose values are valid strings.
pub(crate) fn extract_headers(headers: &http::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.to_string(), value.to_string()))
        })
        .collect()
}

/// Attach `body` unless it is empty.
pub(crate) fn with_body(response: Response, body: Bytes) -> Response {
    if body.is_empty() {
        response
    } else {
        response.with_body(body)
    }
}

#[allow(clippy::needless_pass_by_value)]
fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
    let msg = err.to_string();

    if err.is_connect() {
        return Error::connection(msg);
    }

    if msg.contains("ssl") || msg.contains("tls") || msg.contains("certificate") {
        return Error::tls(msg);
    }

    Error::connection(msg)
}

/// Builder for [`HyperClient`].
#[derive(Debug, Default)]
pub struct HyperClientBuilder {
    config: ClientConfigBuilder,
}

impl HyperClientBuilder {
    /// Set the request timeout, covering the whole round trip.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config = self.config.pool_idle_per_host(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.pool_idle_timeout(timeout);
        self
    }

    /// Set the `User-Agent` sent when a request has none.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.user_agent(user_agent);
        self
    }

    /// Build the client.
    #[must_use]
    pub fn build(self) -> HyperClient {
        HyperClient::with_config(self.config.build())
    }
}
