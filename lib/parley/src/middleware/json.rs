//! JSON middleware.
//!
//! The [`Json`] pipe negotiates JSON with the server and hands the decoded
//! body to the exchange it wraps as a [`serde_json::Value`]. Exchanges
//! consuming values are built with [`expect_json`], or with any exchange whose
//! `Response` is a `Value`.
//!
//! [`load_json`] is the same decoding as a plain function, for
//! [`ExchangeExt::map_send`](crate::ExchangeExt::map_send).
//!
//! # Example
//!
//! ```
//! use parley::exchange::{self, ExchangeExt};
//! use parley::middleware::{Json, expect_json};
//! use parley::{Request, Response};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize, PartialEq)]
//! struct User {
//!     login: String,
//! }
//!
//! let lookup = expect_json::<User>(Request::get("https://api.example.com/user")).relay(Json);
//! let user = exchange::drive(lookup, |request| {
//!     assert_eq!(request.header("accept"), Some("application/json"));
//!     Ok(Response::new(200).with_body(r#"{"login":"octocat"}"#))
//! })
//! .expect("decodes");
//!
//! assert_eq!(user, User { login: "octocat".into() });
//! ```

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::exchange::{self, Exchange, Once, Step};
use crate::{ContentType, Error, Pipe, Request, Response, Result};

/// Decode a response body as JSON; an empty body decodes from `null`.
///
/// # Errors
///
/// Returns [`Error::JsonDeserialization`] when the body does not match `T`.
pub fn load_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    match response.body() {
        Some(body) if !body.is_empty() => crate::from_json(body),
        _ => crate::from_json(b"null"),
    }
}

/// Pipe adding JSON headers and decoding responses into [`Value`]s.
///
/// Sets `Accept: application/json` and, for requests with a body and no
/// content type, `Content-Type: application/json`. Existing headers win.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

impl Pipe<Request> for Json {
    type Exchange = Decoding;

    fn wrap(&self, mut request: Request) -> Decoding {
        if request.header("accept").is_none() {
            request = request.with_header("Accept", ContentType::Json.as_str());
        }
        if request.body().is_some() && request.header("content-type").is_none() {
            request = request.with_header("Content-Type", ContentType::Json.as_str());
        }
        exchange::once(request, load_json::<Value> as fn(Response) -> Result<Value>)
    }
}

/// Exchange created by [`Json`] for one request.
pub type Decoding = Once<fn(Response) -> Result<Value>>;

/// An exchange sending one request and deserializing the JSON value it
/// receives into `T`.
pub fn expect_json<T: DeserializeOwned>(request: Request) -> ExpectJson<T> {
    ExpectJson {
        request: Some(request),
        sent: false,
        _output: PhantomData,
    }
}

/// Exchange returned by [`expect_json`].
#[derive(Debug)]
pub struct ExpectJson<T> {
    request: Option<Request>,
    sent: bool,
    _output: PhantomData<fn() -> T>,
}

impl<T> Clone for ExpectJson<T> {
    fn clone(&self) -> Self {
        Self {
            request: self.request.clone(),
            sent: self.sent,
            _output: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Exchange for ExpectJson<T> {
    type Request = Request;
    type Response = Value;
    type Output = T;

    fn start(&mut self) -> Result<Step<Request, T>> {
        let request = self
            .request
            .take()
            .ok_or_else(|| Error::protocol("exchange already started"))?;
        self.sent = true;
        Ok(Step::Send(request))
    }

    fn resume(&mut self, value: Value) -> Result<Step<Request, T>> {
        if !std::mem::take(&mut self.sent) {
            return Err(Error::protocol("exchange already completed"));
        }
        serde_path_to_error::deserialize(value)
            .map(Step::Done)
            .map_err(|err| Error::json_deserialization(err.path().to_string(), err.inner().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::exchange::{self, ExchangeExt};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Repo {
        name: String,
        stars: u32,
    }

    #[test]
    fn load_json_decodes_typed_values() {
        let response = Response::new(200).with_body(r#"{"name":"parley","stars":3}"#);
        let_assert!(Ok(repo) = load_json::<Repo>(response));
        check!(repo == Repo { name: "parley".into(), stars: 3 });
    }

    #[test]
    fn load_json_treats_empty_body_as_null() {
        let_assert!(Ok(Value::Null) = load_json::<Value>(Response::new(204)));
        let_assert!(Ok(None) = load_json::<Option<Repo>>(Response::new(200).with_body("")));
    }

    #[test]
    fn load_json_reports_path() {
        let response = Response::new(200).with_body(r#"{"name":"parley","stars":"many"}"#);
        let_assert!(Err(Error::JsonDeserialization { path, .. }) = load_json::<Repo>(response));
        check!(path == "stars");
    }

    #[test]
    fn json_pipe_sets_headers() {
        let mut decoding = Json.wrap(Request::post("https://example.com").with_body("{}"));
        let_assert!(Ok(Step::Send(request)) = decoding.start());
        check!(request.header("accept") == Some("application/json"));
        check!(request.header("content-type") == Some("application/json"));

        let mut decoding = Json.wrap(
            Request::get("https://example.com").with_header("Accept", "application/vnd.api+json"),
        );
        let_assert!(Ok(Step::Send(request)) = decoding.start());
        check!(request.header("accept") == Some("application/vnd.api+json"));
        check!(request.header("content-type").is_none());
    }

    #[test]
    fn expect_json_through_pipe() {
        let lookup = expect_json::<Repo>(Request::get("https://example.com/repo")).relay(Json);
        let_assert!(
            Ok(repo) = exchange::drive(lookup, |_| {
                Ok(Response::new(200).with_body(json!({"name": "x", "stars": 1}).to_string()))
            })
        );
        check!(repo == Repo { name: "x".into(), stars: 1 });
    }

    #[test]
    fn expect_json_reports_path() {
        let mut lookup = expect_json::<Repo>(Request::get("https://example.com/repo"));
        let_assert!(Ok(Step::Send(_)) = lookup.start());
        let_assert!(
            Err(Error::JsonDeserialization { path, .. }) =
                lookup.resume(json!({"name": "x", "stars": -1}))
        );
        check!(path == "stars");
    }

    #[test]
    fn decoding_errors_propagate() {
        let lookup = expect_json::<Repo>(Request::get("https://example.com/repo")).relay(Json);
        let_assert!(
            Err(Error::JsonDeserialization { .. }) =
                exchange::drive(lookup, |_| Ok(Response::new(200).with_body("not json")))
        );
    }
}
