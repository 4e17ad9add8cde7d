//! Integration tests for middleware pipes over a real server.

use parley::exchange::{self, Exchange, ExchangeExt};
use parley::middleware::{FollowRedirects, Json, Logging, Retry, expect_json, raise_for_status};
use parley::pipe::{self, PipeExt};
use parley::{Error, HyperClient, Pipe, Request, Response, query};
use serde::Deserialize;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string, header, method, path, query_param},
};

/// Send `request` through `pipe` with a [`HyperClient`].
async fn send_through<P>(pipe: P, request: Request) -> parley::Result<Response>
where
    P: Pipe<Request> + Clone + Send + Sync,
    P::Exchange: Exchange<Request = Request, Response = Response, Output = Response> + Send,
{
    let query = query::from_fn(move || exchange::once(request.clone(), Ok).relay(pipe.clone()));
    parley::executor(HyperClient::new()).execute_async(&query).await
}

fn url(server: &MockServer, path: &str) -> String {
    format!("{}{path}", server.uri())
}

// ============================================================================
// Retry Tests
// ============================================================================

/// Test that no retries happen for 4xx errors.
#[tokio::test]
async fn test_no_retry_on_client_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/not-found"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1) // Should only be called once, no retries
        .mount(&mock_server)
        .await;

    let response = send_through(Retry::new(3), Request::get(url(&mock_server, "/not-found")))
        .await
        .expect("response");

    assert_eq!(response.status(), 404);
}

/// Test retry on server error (5xx).
#[tokio::test]
async fn test_retry_on_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3) // Initial + 2 retries
        .mount(&mock_server)
        .await;

    let response = send_through(Retry::new(2), Request::get(url(&mock_server, "/error")))
        .await
        .expect("response");

    // Should get the 503 after exhausting retries
    assert_eq!(response.status(), 503);
}

/// Test retry on 429 Too Many Requests.
#[tokio::test]
async fn test_retry_on_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rate-limited"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&mock_server)
        .await;

    let response = send_through(Retry::new(2), Request::get(url(&mock_server, "/rate-limited")))
        .await
        .expect("response");

    assert_eq!(response.status(), 429);
}

/// Test that non-idempotent requests are never retried.
#[tokio::test]
async fn test_no_retry_for_post() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = Request::post(url(&mock_server, "/orders")).with_body("one pizza");
    let response = send_through(Retry::new(5), request).await.expect("response");

    assert_eq!(response.status(), 503);
}

// ============================================================================
// Logging Tests
// ============================================================================

/// Test that logging middleware doesn't break request/response flow.
#[tokio::test]
async fn test_logging_middleware() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/logged"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"logged": true})))
        .mount(&mock_server)
        .await;

    let response = send_through(Logging::new(), Request::get(url(&mock_server, "/logged")))
        .await
        .expect("response");
    assert!(response.is_success());

    let response = send_through(Logging::debug(), Request::get(url(&mock_server, "/logged")))
        .await
        .expect("response");
    assert!(response.is_success());
}

// ============================================================================
// Follow Redirect Tests
// ============================================================================

/// Test that follow redirect middleware handles 302 redirect.
#[tokio::test]
async fn test_follow_redirect_302() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("redirected"))
        .mount(&mock_server)
        .await;

    let response = send_through(FollowRedirects::new(), Request::get(url(&mock_server, "/old")))
        .await
        .expect("response");

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().expect("text"), "redirected");
}

/// Test that the query of the Location replaces the original params.
#[tokio::test]
async fn test_follow_redirect_301_with_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old-permanent"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new-permanent?page=2"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new-permanent"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = Request::get(url(&mock_server, "/old-permanent")).with_param("page", "1");
    let response = send_through(FollowRedirects::new(), request).await.expect("response");

    assert!(response.is_success());
}

/// Test that follow redirect middleware respects max redirects limit.
#[tokio::test]
async fn test_follow_redirect_max_exceeded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/loop1"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop2"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/loop2"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop1"))
        .mount(&mock_server)
        .await;

    let err = send_through(
        FollowRedirects::with_max_redirects(3),
        Request::get(url(&mock_server, "/loop1")),
    )
    .await
    .expect_err("should fail");

    assert!(
        matches!(err, Error::TooManyRedirects { count: 3, max: 3 }),
        "unexpected error: {err}"
    );
}

/// Test that 307 redirect preserves POST method and body.
#[tokio::test]
async fn test_follow_redirect_307_preserves_method() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/old-post"))
        .respond_with(ResponseTemplate::new(307).insert_header("Location", "/new-post"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/new-post"))
        .and(body_string("test body"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = Request::post(url(&mock_server, "/old-post")).with_body("test body");
    let response = send_through(FollowRedirects::new(), request).await.expect("response");

    assert!(response.is_success());
}

/// Test that 302 redirect changes POST to GET.
#[tokio::test]
async fn test_follow_redirect_302_changes_post_to_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/result"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/result"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = Request::post(url(&mock_server, "/submit")).with_body("form data");
    let response = send_through(FollowRedirects::new(), request).await.expect("response");

    assert!(response.is_success());
}

/// Test that a redirect without Location is an error.
#[tokio::test]
async fn test_follow_redirect_missing_location() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nowhere"))
        .respond_with(ResponseTemplate::new(302))
        .mount(&mock_server)
        .await;

    let err = send_through(FollowRedirects::new(), Request::get(url(&mock_server, "/nowhere")))
        .await
        .expect_err("no location");

    assert!(matches!(err, Error::InvalidRedirect(_)), "unexpected error: {err}");
}

// ============================================================================
// JSON and Error Tests
// ============================================================================

#[derive(Debug, Deserialize, PartialEq, Eq)]
struct Repo {
    name: String,
    stars: u32,
}

/// Test that the JSON pipe negotiates and decodes JSON.
#[tokio::test]
async fn test_json_pipe_decodes_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/parley"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "parley",
            "stars": 42,
            "ignored": true,
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let target = url(&mock_server, "/repos/parley");
    let get_repo = query::from_fn(|| expect_json::<Repo>(Request::get(target.clone())).relay(Json));

    let repo = parley::executor(HyperClient::new())
        .execute_async(&get_repo)
        .await
        .expect("repo");

    assert_eq!(
        repo,
        Repo {
            name: "parley".to_string(),
            stars: 42,
        }
    );
}

/// Test that a body of the wrong shape reports where decoding failed.
#[tokio::test]
async fn test_json_pipe_reports_path_of_mismatch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "parley",
            "stars": "many",
        })))
        .mount(&mock_server)
        .await;

    let target = url(&mock_server, "/repos/parley");
    let get_repo = query::from_fn(|| expect_json::<Repo>(Request::get(target.clone())).relay(Json));

    let err = parley::executor(HyperClient::new())
        .execute_async(&get_repo)
        .await
        .expect_err("stars is not a number");

    match err {
        Error::JsonDeserialization { path, .. } => assert_eq!(path, "stars"),
        other => panic!("unexpected error: {other}"),
    }
}

/// Test that failure statuses become errors with `raise_for_status`.
#[tokio::test]
async fn test_raise_for_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "gone"})))
        .mount(&mock_server)
        .await;

    let target = url(&mock_server, "/missing");
    let lookup = query::from_fn(|| {
        exchange::once(Request::get(target.clone()), |response: Response| response.text())
            .map_send(raise_for_status)
    });

    let err = parley::executor(HyperClient::new())
        .execute_async(&lookup)
        .await
        .expect_err("404");

    assert_eq!(err.status(), Some(404));
    let body: serde_json::Value = err.decode_body().expect("body").expect("json");
    assert_eq!(body["message"], "gone");
}

// ============================================================================
// Composition Tests
// ============================================================================

/// Test multiple middleware composed together.
#[tokio::test]
async fn test_middleware_composition() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/v1/composed?lang=en"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/composed"))
        .and(header("X-Client", "parley"))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_string("composed"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let api = Logging::new()
        .chain(Retry::new(2))
        .chain(FollowRedirects::new())
        .chain(pipe::map_requests(pipe::prefix_adder(url(&mock_server, "/v1"))))
        .chain(pipe::map_requests(pipe::header_adder([("X-Client", "parley")])))
        .chain(pipe::map_requests(pipe::params_adder([("lang", "en")])));

    let response = send_through(api, Request::get("/old")).await.expect("response");

    assert_eq!(response.text().expect("text"), "composed");
}

// ============================================================================
// Decompression Tests
// ============================================================================

/// Test that decompression middleware handles gzip-encoded responses.
#[cfg(feature = "middleware-decompression")]
#[tokio::test]
async fn test_decompression_gzip() {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use parley::middleware::Decompression;
    use wiremock::matchers::header_exists;

    let mock_server = MockServer::start().await;

    let original = b"hello world from gzip!";
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(original).expect("write");
    let compressed = encoder.finish().expect("finish");

    Mock::given(method("GET"))
        .and(path("/gzipped"))
        .and(header_exists("accept-encoding"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-encoding", "gzip")
                .set_body_bytes(compressed),
        )
        .mount(&mock_server)
        .await;

    let response = send_through(Decompression, Request::get(url(&mock_server, "/gzipped")))
        .await
        .expect("response");

    assert!(response.is_success());
    assert_eq!(response.body().map(|body| body.as_ref()), Some(&original[..]));
}

/// Test that decompression passes through uncompressed responses.
#[cfg(feature = "middleware-decompression")]
#[tokio::test]
async fn test_decompression_passthrough() {
    use parley::middleware::Decompression;

    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
        .mount(&mock_server)
        .await;

    let response = send_through(Decompression, Request::get(url(&mock_server, "/plain")))
        .await
        .expect("response");

    assert_eq!(response.text().expect("text"), "plain text");
}
