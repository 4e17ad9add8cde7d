//! Response decompression middleware.
//!
//! This middleware decompresses HTTP responses that have been compressed with
//! gzip, deflate, br (brotli), or zstd.
//!
//! It adds the `Accept-Encoding` header to requests and decompresses responses
//! based on their `Content-Encoding` header.

use std::io::Read;

use bytes::Bytes;

use crate::exchange::{self, Once};
use crate::{Error, Pipe, Request, Response, Result};

const ACCEPT_ENCODING: &str = "gzip, deflate, br, zstd";

/// Pipe enabling automatic response decompression.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decompression;

impl Pipe<Request> for Decompression {
    type Exchange = Decompressing;

    fn wrap(&self, request: Request) -> Decompressing {
        let request = if request.headers().contains("accept-encoding") {
            request
        } else {
            request.with_header("Accept-Encoding", ACCEPT_ENCODING)
        };
        exchange::once(request, decompress_response as fn(Response) -> Result<Response>)
    }
}

/// Exchange created by [`Decompression`] for one request.
pub type Decompressing = Once<fn(Response) -> Result<Response>>;

fn decompress_response(response: Response) -> Result<Response> {
    let encoding = response
        .header("content-encoding")
        .map(|encoding| encoding.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if encoding.is_empty() || encoding == "identity" {
        return Ok(response);
    }

    let (status, mut headers, body) = response.into_parts();
    let Some(body) = body else {
        return Ok(Response::new(status).with_headers(&headers));
    };
    let decompressed = decompress(&encoding, body)?;

    // headers now describe the decoded body
    headers.remove("content-encoding");
    headers.insert("Content-Length", decompressed.len().to_string());

    Ok(Response::new(status)
        .with_headers(&headers)
        .with_body(decompressed))
}

/// Decompress bytes based on encoding.
fn decompress(encoding: &str, body: Bytes) -> Result<Bytes> {
    let result = match encoding {
        "gzip" | "x-gzip" => {
            let mut decoder = flate2::read::GzDecoder::new(body.as_ref());
            let mut decompressed = Vec::new();
            decoder
                .read_to_end(&mut decompressed)
                .map_err(|e| Error::Decompression(format!("gzip: {e}")))?;
            Bytes::from(decompressed)
        }
        "deflate" => {
            let mut decoder = flate2::read::DeflateDecoder::new(body.as_ref());
            let mut decompressed = Vec::new();
            decoder
                .read_to_end(&mut decompressed)
                .map_err(|e| Error::Decompression(format!("deflate: {e}")))?;
            Bytes::from(decompressed)
        }
        "br" => {
            let mut decompressed = Vec::new();
            brotli::BrotliDecompress(&mut body.as_ref(), &mut decompressed)
                .map_err(|e| Error::Decompression(format!("brotli: {e}")))?;
            Bytes::from(decompressed)
        }
        "zstd" => {
            let decompressed = zstd::decode_all(body.as_ref())
                .map_err(|e| Error::Decompression(format!("zstd: {e}")))?;
            Bytes::from(decompressed)
        }
        // unknown encodings are passed through untouched
        _ => body,
    };

    Ok(result)
}
