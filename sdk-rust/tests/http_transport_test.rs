use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use risk_sdk::{
    ApiRequest, FilePayload, HttpTransport, RequestBody, RiskApiError, Transport,
    TransportOptions,
};
use serde_json::{json, Value};
use std::{collections::HashMap, error::Error, sync::Arc};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};
use tracing_subscriber::EnvFilter;

type BoxedError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Clone, Default, PartialEq)]
struct RecordedRequest {
    path: String,
    content_type: Option<String>,
    tenant: Option<String>,
    body: String,
}

#[derive(Debug, Clone, PartialEq)]
struct RecordedUpload {
    company_id: String,
    field_name: Option<String>,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

#[derive(Default)]
struct StubState {
    requests: Mutex<Vec<RecordedRequest>>,
    uploads: Mutex<Vec<RecordedUpload>>,
}

impl StubState {
    async fn record(&self, path: &str, headers: &HeaderMap, body: String) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().await.push(RecordedRequest {
            path: path.to_string(),
            content_type: header("content-type"),
            tenant: header("x-tenant"),
            body,
        });
    }
}

struct StubServer {
    base_url: String,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

impl StubServer {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().await.clone()
    }

    async fn uploads(&self) -> Vec<RecordedUpload> {
        self.state.uploads.lock().await.clone()
    }

    async fn stop(self) -> Result<(), BoxedError> {
        if let Some(tx) = self.shutdown {
            let _ = tx.send(());
        }

        self.handle
            .await
            .map_err(|err| format!("Failed to join stub server task: {err}"))?;
        Ok(())
    }
}

async fn list_companies(State(state): State<Arc<StubState>>, headers: HeaderMap) -> Json<Value> {
    state.record("/api/companies", &headers, String::new()).await;
    Json(json!([
        { "id": "c1", "name": "Acme", "created_at": "2024-05-01T10:00:00" }
    ]))
}

async fn create_company(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    state.record("/api/companies", &headers, body).await;
    Json(json!({
        "id": "c2",
        "name": "Globex",
        "context": ["Widgets"],
        "documents": [],
        "created_at": "2024-05-02T09:30:00Z"
    }))
}

async fn upload_document(
    State(state): State<Arc<StubState>>,
    Path(company_id): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, StatusCode> {
    state
        .record(
            &format!("/api/companies/{company_id}/documents"),
            &headers,
            String::new(),
        )
        .await;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let field_name = field.name().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        state.uploads.lock().await.push(RecordedUpload {
            company_id: company_id.clone(),
            field_name,
            file_name: file_name.clone(),
            content_type: content_type.clone(),
            data: data.to_vec(),
        });
    }

    Ok(Json(json!({
        "file_name": "contract.pdf",
        "file_type": "application/pdf",
        "uploaded_at": "2024-05-03T08:00:00.123456"
    })))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn start_stub_server() -> Result<StubServer, BoxedError> {
    init_tracing();
    let state = Arc::new(StubState::default());

    let app = Router::new()
        .route("/api/companies", get(list_companies).post(create_company))
        .route("/api/companies/{company_id}/documents", post(upload_document))
        .route(
            "/api/missing",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))) }),
        )
        .route(
            "/api/broken",
            get(|| async { (StatusCode::BAD_GATEWAY, "<html>upstream down</html>") }),
        )
        .route(
            "/api/blank-error",
            get(|| async { (StatusCode::BAD_REQUEST, Json(json!({ "error": "" }))) }),
        )
        .route("/api/not-json", get(|| async { "definitely not json" }))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| Box::new(err) as BoxedError)?;
    let addr = listener
        .local_addr()
        .map_err(|err| Box::new(err) as BoxedError)?;
    let base_url = format!("http://{addr}/api");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let handle = tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });

        if let Err(err) = server.await {
            eprintln!("Stub server error: {err}");
        }
    });

    Ok(StubServer {
        base_url,
        state,
        shutdown: Some(shutdown_tx),
        handle,
    })
}

fn transport_for(stub: &StubServer) -> HttpTransport {
    HttpTransport::new(TransportOptions {
        base_url: Some(stub.base_url().to_string()),
        headers: Some(HashMap::from([(
            "x-tenant".to_string(),
            "acme-legal".to_string(),
        )])),
        ..Default::default()
    })
}

#[test]
fn url_is_base_address_followed_by_path() {
    let transport = HttpTransport::new(TransportOptions {
        base_url: Some("http://risk.internal:8080/api/".to_string()),
        ..Default::default()
    });
    assert_eq!(transport.base_url(), "http://risk.internal:8080/api");
    assert_eq!(
        transport.url_for("/companies/c1/analyses?limit=10"),
        "http://risk.internal:8080/api/companies/c1/analyses?limit=10"
    );

    let transport = HttpTransport::default();
    assert_eq!(transport.url_for("/companies"), "http://127.0.0.1:5001/api/companies");
}

#[tokio::test]
async fn sends_get_to_base_address_with_configured_headers() -> Result<(), BoxedError> {
    let stub = start_stub_server().await?;
    let transport = transport_for(&stub);

    let body = transport.send(ApiRequest::get("/companies")).await?;
    assert_eq!(body[0]["name"], json!("Acme"));

    let requests = stub.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/api/companies");
    assert_eq!(requests[0].tenant.as_deref(), Some("acme-legal"));

    stub.stop().await
}

#[tokio::test]
async fn serializes_json_bodies() -> Result<(), BoxedError> {
    let stub = start_stub_server().await?;
    let transport = transport_for(&stub);

    let request_body = json!({ "name": "Globex", "context": "Widgets" });
    let body = transport
        .send(ApiRequest::post(
            "/companies",
            RequestBody::Json(request_body.clone()),
        ))
        .await?;
    assert_eq!(body["id"], json!("c2"));

    let requests = stub.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
    let sent: Value = serde_json::from_str(&requests[0].body)?;
    assert_eq!(sent, request_body);

    stub.stop().await
}

#[tokio::test]
async fn sends_files_as_multipart() -> Result<(), BoxedError> {
    let stub = start_stub_server().await?;
    let transport = transport_for(&stub);

    let file = FilePayload::new("contract.pdf", "application/pdf", b"%PDF-1.7".to_vec());
    transport
        .send(ApiRequest::post(
            "/companies/c1/documents",
            RequestBody::File(file),
        ))
        .await?;

    let requests = stub.requests().await;
    let content_type = requests[0].content_type.clone().unwrap_or_default();
    assert!(
        content_type.starts_with("multipart/form-data; boundary="),
        "unexpected content type: {content_type}"
    );

    let uploads = stub.uploads().await;
    assert_eq!(
        uploads,
        vec![RecordedUpload {
            company_id: "c1".to_string(),
            field_name: Some("file".to_string()),
            file_name: Some("contract.pdf".to_string()),
            content_type: Some("application/pdf".to_string()),
            data: b"%PDF-1.7".to_vec(),
        }]
    );

    stub.stop().await
}

#[tokio::test]
async fn error_status_uses_error_field() -> Result<(), BoxedError> {
    let stub = start_stub_server().await?;
    let transport = transport_for(&stub);

    let err = transport
        .send(ApiRequest::get("/missing"))
        .await
        .expect_err("404 should fail");
    match &err {
        RiskApiError::Http(status, message) => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(message, "not found");
        }
        other => panic!("unexpected error variant: {other:?}"),
    }
    assert_eq!(err.to_string(), "not found");

    stub.stop().await
}

#[tokio::test]
async fn error_status_without_error_field_reports_status_code() -> Result<(), BoxedError> {
    let stub = start_stub_server().await?;
    let transport = transport_for(&stub);

    let err = transport
        .send(ApiRequest::get("/broken"))
        .await
        .expect_err("502 should fail");
    assert_eq!(err.to_string(), "HTTP error! status: 502");

    let err = transport
        .send(ApiRequest::get("/blank-error"))
        .await
        .expect_err("400 should fail");
    assert_eq!(err.to_string(), "HTTP error! status: 400");

    let err = transport
        .send(ApiRequest::get("/nowhere"))
        .await
        .expect_err("unknown route should fail");
    assert_eq!(err.status().map(|status| status.as_u16()), Some(404));
    assert_eq!(err.to_string(), "HTTP error! status: 404");

    stub.stop().await
}

#[tokio::test]
async fn success_body_that_is_not_json_is_a_protocol_error() -> Result<(), BoxedError> {
    let stub = start_stub_server().await?;
    let transport = transport_for(&stub);

    let err = transport
        .send(ApiRequest::get("/not-json"))
        .await
        .expect_err("non-JSON body should fail");
    assert!(
        matches!(err, RiskApiError::Protocol(_)),
        "unexpected error variant: {err:?}"
    );

    stub.stop().await
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() -> Result<(), BoxedError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let transport = HttpTransport::new(TransportOptions {
        base_url: Some(format!("http://{addr}/api")),
        ..Default::default()
    });

    let err = transport
        .send(ApiRequest::get("/companies"))
        .await
        .expect_err("closed port should fail");
    assert!(
        matches!(err, RiskApiError::Network(_)),
        "unexpected error variant: {err:?}"
    );
    assert_eq!(err.status(), None);
    Ok(())
}

#[tokio::test]
async fn invalid_configured_header_is_rejected_before_sending() -> Result<(), BoxedError> {
    let stub = start_stub_server().await?;
    let transport = HttpTransport::new(TransportOptions {
        base_url: Some(stub.base_url().to_string()),
        headers: Some(HashMap::from([(
            "bad header".to_string(),
            "value".to_string(),
        )])),
        ..Default::default()
    });

    let err = transport
        .send(ApiRequest::get("/companies"))
        .await
        .expect_err("invalid header should fail");
    assert!(matches!(err, RiskApiError::InvalidInput(_)));
    assert!(stub.requests().await.is_empty());

    stub.stop().await
}
