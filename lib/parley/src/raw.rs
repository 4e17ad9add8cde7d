//! Minimal HTTP/1.1 client over tokio sockets.
//!
//! [`RawClient`] opens one connection per request (`Connection: close`),
//! writes the request by hand, reads until the peer closes and then parses
//! the status line, headers and body. Redirects (any 3xx carrying a
//! `Location`) are followed with the same method, body and query
//! parameters, up to [`ClientConfig::max_redirects`]. The parameters are
//! encoded again onto the `Location` URL.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{Instrument, debug, debug_span};
use url::Url;

use crate::config::ClientConfig;
use crate::connector::tls_connector;
use crate::{Error, Method, Request, Response, Result};

/// Default read timeout of [`RawClient`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Header names written by the client itself.
const FRAMING_HEADERS: [&str; 3] = ["host", "connection", "content-length"];

/// Asynchronous HTTP/1.1 client speaking over raw sockets.
///
/// Supports `http` and `https` URLs. TLS uses rustls with the Mozilla root
/// certificates.
#[derive(Clone)]
pub struct RawClient {
    config: ClientConfig,
    tls: tokio_rustls::TlsConnector,
}

impl std::fmt::Debug for RawClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for RawClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RawClient {
    /// A client with a 10 second timeout and at most 10 redirects.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::builder().timeout(DEFAULT_TIMEOUT).build())
    }

    /// A client with custom configuration.
    ///
    /// Uses `timeout`, `connect_timeout`, `max_redirects` and `user_agent`;
    /// the pool settings do not apply since no connection is reused.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config,
            tls: tls_connector(),
        }
    }

    /// Get the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(&self, mut request: Request) -> Result<Response> {
        let mut redirects = 0;
        loop {
            let response = self.round_trip(&request).await?;

            let location = match response.header("location") {
                Some(location) if response.is_redirection() => location,
                _ => return Ok(response),
            };
            if redirects >= self.config.max_redirects {
                return Err(Error::TooManyRedirects {
                    count: redirects,
                    max: self.config.max_redirects,
                });
            }

            let next = Url::parse(request.url())?.join(location)?;
            debug!(status = response.status(), location = %next, "following redirect");
            request = request.with_url(next.as_str());
            redirects += 1;
        }
    }

    async fn round_trip(&self, request: &Request) -> Result<Response> {
        let target = Target::parse(&request.full_url())?;
        let payload = encode_request(request, &target, &self.config.user_agent)?;

        let raw = tokio::time::timeout(self.config.timeout, self.transfer(&target, &payload))
            .await
            .map_err(|_| Error::Timeout)??;

        decode_response(&raw, request.method())
    }

    async fn transfer(&self, target: &Target, payload: &[u8]) -> Result<Vec<u8>> {
        let stream = tokio::time::timeout(
            self.config.connect_timeout,
            TcpStream::connect((target.host.as_str(), target.port)),
        )
        .await
        .map_err(|_| Error::Timeout)?
        .map_err(|err| Error::connection(format!("{}: {err}", target.authority)))?;

        if !target.tls {
            return exchange_bytes(stream, payload).await;
        }

        let server_name = rustls::pki_types::ServerName::try_from(target.host.clone())
            .map_err(|err| Error::tls(err.to_string()))?;
        let stream = self
            .tls
            .connect(server_name, stream)
            .await
            .map_err(|err| Error::tls(err.to_string()))?;
        exchange_bytes(stream, payload).await
    }
}

impl parley_core::HttpClient for RawClient {
    async fn execute(&self, request: Request) -> Result<Response> {
        let span = debug_span!("raw", method = %request.method(), url = %request.url());
        self.send(request).instrument(span).await
    }
}

/// Write the whole request, then read until the peer closes the connection.
async fn exchange_bytes<S>(mut stream: S, payload: &[u8]) -> Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(payload).await?;
    stream.flush().await?;

    let mut raw = Vec::new();
    match stream.read_to_end(&mut raw).await {
        Ok(_) => {}
        // peers commonly close TLS connections without close_notify
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof && !raw.is_empty() => {}
        Err(err) => return Err(err.into()),
    }
    let _ = stream.shutdown().await;
    Ok(raw)
}

// ============================================================================
// Framing
// ============================================================================

/// Where a request goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    host: String,
    port: u16,
    tls: bool,
    /// Value of the `Host` header.
    authority: String,
    /// Request target: path and query.
    path: String,
}

impl Target {
    fn parse(url: &str) -> Result<Self> {
        let url = Url::parse(url)?;
        let tls = match url.scheme() {
            "https" => true,
            "http" => false,
            scheme => return Err(Error::invalid_request(format!("unsupported scheme {scheme:?}"))),
        };
        let host = url
            .host_str()
            .ok_or_else(|| Error::invalid_request(format!("no host in {url}")))?
            .to_string();
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.clone(),
        };
        let port = url.port_or_known_default().unwrap_or(if tls { 443 } else { 80 });
        let path = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        Ok(Self {
            host,
            port,
            tls,
            authority,
            path,
        })
    }
}

/// Serialize the request line, headers and body.
///
/// Header names and values must be valid HTTP tokens and field values, so
/// no CR or LF reaches the request head.
fn encode_request(request: &Request, target: &Target, user_agent: &str) -> Result<Vec<u8>> {
    let body = request.body().map(|body| body.as_ref()).unwrap_or_default();

    let mut head = format!("{} {} HTTP/1.1\r\n", request.method(), target.path);
    head.push_str(&format!("Host: {}\r\n", target.authority));
    head.push_str("Connection: close\r\n");
    head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    if !request.headers().contains("user-agent") {
        push_header(&mut head, "User-Agent", user_agent)?;
    }
    for (name, value) in request.headers() {
        if FRAMING_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
            continue;
        }
        push_header(&mut head, name, value)?;
    }
    head.push_str("\r\n");

    let mut payload = head.into_bytes();
    payload.extend_from_slice(body);
    Ok(payload)
}

fn push_header(head: &mut String, name: &str, value: &str) -> Result<()> {
    http::HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| Error::invalid_request(format!("invalid header name {name:?}")))?;
    // `from_str` accepts tabs and visible ASCII only
    http::HeaderValue::from_str(value)
        .map_err(|_| Error::invalid_request(format!("invalid value for header {name}")))?;
    head.push_str(&format!("{name}: {value}\r\n"));
    Ok(())
}

/// Parse a complete HTTP/1.1 response read until connection close.
fn decode_response(raw: &[u8], method: Method) -> Result<Response> {
    let split = find(raw, b"\r\n\r\n")
        .ok_or_else(|| Error::invalid_response("incomplete response head"))?;
    let (head, rest) = raw.split_at(split);
    let rest = rest.get(4..).unwrap_or_default();

    let head = String::from_utf8_lossy(head);
    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap_or_default();
    let status = parse_status_line(status_line)?;

    let mut response = Response::new(status);
    for line in lines {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Error::invalid_response(format!("malformed header line {line:?}")))?;
        response = response.with_header(name.trim(), value.trim());
    }

    let bodyless = method == Method::Head || matches!(status, 100..=199 | 204 | 304);
    let body = if bodyless {
        Vec::new()
    } else if response
        .header("transfer-encoding")
        .is_some_and(|encoding| encoding.to_ascii_lowercase().contains("chunked"))
    {
        decode_chunked(rest)?
    } else if let Some(length) = response.header("content-length") {
        let length: usize = length
            .trim()
            .parse()
            .map_err(|_| Error::invalid_response(format!("invalid Content-Length {length:?}")))?;
        rest.get(..length)
            .ok_or_else(|| Error::invalid_response("body shorter than Content-Length"))?
            .to_vec()
    } else {
        rest.to_vec()
    };

    Ok(crate::client::with_body(response, body.into()))
}

fn parse_status_line(line: &str) -> Result<u16> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/") => code
            .parse()
            .map_err(|_| Error::invalid_response(format!("invalid status line {line:?}"))),
        _ => Err(Error::invalid_response(format!("invalid status line {line:?}"))),
    }
}

/// Decode a `Transfer-Encoding: chunked` body, ignoring trailers.
fn decode_chunked(mut input: &[u8]) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    loop {
        let line_end =
            find(input, b"\r\n").ok_or_else(|| Error::invalid_response("unterminated chunk size"))?;
        let (size_line, rest) = input.split_at(line_end);
        let size_line = String::from_utf8_lossy(size_line);
        let size_hex = size_line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_hex, 16)
            .map_err(|_| Error::invalid_response(format!("invalid chunk size {size_hex:?}")))?;
        let rest = rest.get(2..).unwrap_or_default();

        if size == 0 {
            return Ok(body);
        }

        let (chunk, rest) = rest
            .split_at_checked(size)
            .ok_or_else(|| Error::invalid_response("truncated chunk"))?;
        body.extend_from_slice(chunk);
        input = rest
            .strip_prefix(b"\r\n")
            .ok_or_else(|| Error::invalid_response("chunk not followed by CRLF"))?;
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
