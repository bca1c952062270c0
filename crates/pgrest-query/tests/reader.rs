//! Table reader tests against an in-process fake PostgREST backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use pgrest_core::{Envelope, QueryRequest, ReadTableArgs, ReservedKeyPolicy, RestConfig};
use pgrest_query::TableReader;

#[derive(Debug, Clone)]
struct SeenRequest {
    method: Method,
    path: String,
    query: String,
    headers: HeaderMap,
}

#[derive(Clone)]
struct FakeBackend {
    status: StatusCode,
    body: &'static str,
    content_range: Option<&'static str>,
    location: Option<String>,
    delay: Duration,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl FakeBackend {
    fn ok(body: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            content_range: None,
            location: None,
            delay: Duration::ZERO,
            seen: Arc::default(),
        }
    }

    fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    fn with_range(mut self, range: &'static str) -> Self {
        self.content_range = Some(range);
        self
    }

    fn with_location(mut self, location: String) -> Self {
        self.location = Some(location);
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

async fn respond(
    State(backend): State<FakeBackend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    backend.seen.lock().unwrap().push(SeenRequest {
        method,
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        headers,
    });
    if !backend.delay.is_zero() {
        tokio::time::sleep(backend.delay).await;
    }

    let mut builder = axum::http::Response::builder()
        .status(backend.status)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(range) = backend.content_range {
        builder = builder.header(header::CONTENT_RANGE, range);
    }
    if let Some(location) = &backend.location {
        builder = builder.header(header::LOCATION, location.as_str());
    }
    builder.body(Body::from(backend.body)).unwrap()
}

/// Serve `backend` on an ephemeral port and return its base URL.
async fn spawn(backend: FakeBackend) -> String {
    let app = Router::new().fallback(respond).with_state(backend);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn reader(base_url: &str) -> TableReader {
    TableReader::new(RestConfig::new(base_url, "secret")).unwrap()
}

fn error_text(env: Envelope) -> String {
    match env {
        Envelope::Error { error } => error,
        other => panic!("expected error envelope, got {other:?}"),
    }
}

// === Request assembly ===

#[tokio::test]
async fn sends_get_with_encoded_filters_order_and_clamped_paging() {
    let backend = FakeBackend::ok(r#"[{"id":1,"country":"FR"}]"#).with_range("0-0/123");
    let base = spawn(backend.clone()).await;

    let args = ReadTableArgs {
        filters_json: r#"{"country":"FR","active":true}"#.to_string(),
        order_by: "id".to_string(),
        ascending: false,
        limit: 0,
        offset: -5,
        ..ReadTableArgs::new("public.kaggle_data")
    };
    let env = reader(&base).read_args(args).await;

    assert_eq!(
        env,
        Envelope::Rows {
            rows: vec![json!({"id": 1, "country": "FR"})],
            count: Some(123),
        }
    );

    let seen = backend.requests();
    assert_eq!(seen.len(), 1);
    let req = &seen[0];
    assert_eq!(req.method, Method::GET);
    assert_eq!(req.path, "/rest/v1/kaggle_data");
    assert_eq!(
        req.query,
        "select=*&limit=1&offset=0&order=id.desc&country=eq.FR&active=eq.true"
    );
}

#[tokio::test]
async fn sends_credential_and_count_headers() {
    let backend = FakeBackend::ok("[]");
    let base = spawn(backend.clone()).await;

    reader(&base).read(&QueryRequest::new("users")).await;

    let seen = backend.requests();
    let headers = &seen[0].headers;
    assert_eq!(headers["apikey"], "secret");
    assert_eq!(headers[header::AUTHORIZATION], "Bearer secret");
    assert_eq!(headers[header::ACCEPT], "application/json");
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(headers["prefer"], "count=exact");
}

#[tokio::test]
async fn table_name_is_percent_encoded_in_path() {
    let backend = FakeBackend::ok("[]");
    let base = spawn(backend.clone()).await;

    reader(&base).read(&QueryRequest::new("public.my table/x")).await;

    assert_eq!(backend.requests()[0].path, "/rest/v1/my%20table%2Fx");
}

#[tokio::test]
async fn default_request_sends_no_order() {
    let backend = FakeBackend::ok("[]");
    let base = spawn(backend.clone()).await;

    reader(&base).read(&QueryRequest::new("users")).await;

    assert_eq!(backend.requests()[0].query, "select=*&limit=100&offset=0");
}

#[tokio::test]
async fn reject_policy_never_contacts_backend() {
    let backend = FakeBackend::ok("[]");
    let base = spawn(backend.clone()).await;
    let config = RestConfig::new(&base, "secret").with_reserved_policy(ReservedKeyPolicy::Reject);
    let reader = TableReader::new(config).unwrap();

    let env = reader
        .read(&QueryRequest::new("users").filter("limit", 1))
        .await;

    assert!(error_text(env).contains("reserved"));
    assert!(backend.requests().is_empty());
}

// === Response normalisation ===

#[tokio::test]
async fn unknown_total_yields_null_count() {
    let base = spawn(FakeBackend::ok(r#"[{"a":1},{"a":2}]"#).with_range("0-1/*")).await;

    let env = reader(&base).read(&QueryRequest::new("t")).await;

    let parsed: Value = serde_json::from_str(&env.to_json()).unwrap();
    assert_eq!(parsed, json!({"rows": [{"a": 1}, {"a": 2}], "count": null}));
}

#[tokio::test]
async fn missing_content_range_yields_null_count() {
    let base = spawn(FakeBackend::ok("[]")).await;

    let env = reader(&base).read(&QueryRequest::new("t")).await;

    assert_eq!(
        env,
        Envelope::Rows {
            rows: vec![],
            count: None
        }
    );
}

#[tokio::test]
async fn rows_pass_through_untouched() {
    let body = r#"[{"id":1,"nested":{"k":[1,2]},"n":null},"scalar",3]"#;
    let base = spawn(FakeBackend::ok(body)).await;

    let env = reader(&base).read(&QueryRequest::new("t")).await;

    match env {
        Envelope::Rows { rows, .. } => {
            assert_eq!(Value::Array(rows), serde_json::from_str::<Value>(body).unwrap());
        }
        other => panic!("expected rows, got {other:?}"),
    }
}

// === Failures become error envelopes ===

#[tokio::test]
async fn server_error_becomes_error_envelope() {
    let backend = FakeBackend::ok(r#"{"message":"boom"}"#)
        .with_status(StatusCode::INTERNAL_SERVER_ERROR);
    let base = spawn(backend).await;

    let env = reader(&base).read(&QueryRequest::new("t")).await;

    let parsed: Value = serde_json::from_str(&env.to_json()).unwrap();
    let error = parsed["error"].as_str().unwrap();
    assert!(error.contains("500"));
    assert!(error.contains("boom"));
    assert!(parsed.get("rows").is_none());
}

#[tokio::test]
async fn client_error_carries_backend_message() {
    let backend = FakeBackend::ok(r#"{"code":"42P01","message":"relation \"nope\" does not exist"}"#)
        .with_status(StatusCode::NOT_FOUND);
    let base = spawn(backend).await;

    let error = error_text(reader(&base).read(&QueryRequest::new("nope")).await);

    assert!(error.contains("404"));
    assert!(error.contains("does not exist"));
}

#[tokio::test]
async fn redirects_are_not_followed() {
    let elsewhere = FakeBackend::ok(r#"[{"stolen":true}]"#);
    let elsewhere_base = spawn(elsewhere.clone()).await;
    let backend = FakeBackend::ok("")
        .with_status(StatusCode::FOUND)
        .with_location(format!("{elsewhere_base}/collect"));
    let base = spawn(backend.clone()).await;

    let error = error_text(reader(&base).read(&QueryRequest::new("t")).await);

    assert!(error.contains("302"), "error: {error}");
    assert_eq!(backend.requests().len(), 1);
    assert!(elsewhere.requests().is_empty());
}

#[tokio::test]
async fn non_array_body_is_an_error() {
    let base = spawn(FakeBackend::ok(r#"{"id":1}"#)).await;

    let error = error_text(reader(&base).read(&QueryRequest::new("t")).await);

    assert!(error.contains("expected a JSON array"));
}

#[tokio::test]
async fn malformed_filters_become_error_envelope() {
    let backend = FakeBackend::ok("[]");
    let base = spawn(backend.clone()).await;
    let args = ReadTableArgs {
        filters_json: "not valid json".to_string(),
        ..ReadTableArgs::new("t")
    };

    let error = error_text(reader(&base).read_args(args).await);

    assert!(error.starts_with("malformed filters"));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn refused_connection_becomes_error_envelope() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let error = error_text(
        reader(&format!("http://{addr}"))
            .read(&QueryRequest::new("t"))
            .await,
    );

    assert!(error.starts_with("request failed"));
}

#[tokio::test]
async fn timeout_becomes_error_envelope() {
    let base = spawn(FakeBackend::ok("[]").with_delay(Duration::from_secs(2))).await;
    let config = RestConfig::new(&base, "secret").with_timeout(Duration::from_millis(100));
    let reader = TableReader::new(config).unwrap();

    let error = error_text(reader.read(&QueryRequest::new("t")).await);

    assert!(error.starts_with("request failed"));
}

// === Concurrency ===

#[tokio::test]
async fn concurrent_reads_are_independent() {
    let backend = FakeBackend::ok("[]").with_range("*/0");
    let base = spawn(backend.clone()).await;
    let reader = reader(&base);
    let other = reader.clone();

    let req_a = QueryRequest::new("a");
    let req_b = QueryRequest::new("b").filter("x", 1);
    let (a, b) = tokio::join!(reader.read(&req_a), other.read(&req_b));

    assert_eq!(a, Envelope::Rows { rows: vec![], count: Some(0) });
    assert_eq!(b, Envelope::Rows { rows: vec![], count: Some(0) });
    let mut paths: Vec<String> = backend.requests().into_iter().map(|r| r.path).collect();
    paths.sort();
    assert_eq!(paths, ["/rest/v1/a", "/rest/v1/b"]);
}
