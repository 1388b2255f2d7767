//! Integration tests for the platform API client against a mock HTTP server.
//!
//! The mock serves the handful of endpoints the client knows about and
//! records every request body so the tests can assert on the wire shapes.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use platform_client::types::{
    ConfiguredStream, ConfiguredStreamDescriptor, ConnectionStatus, CreateConnectionRequest,
    SchemaFilter, Schedule, SyncCatalog,
};
use platform_client::{ApiError, PlatformClient};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;

/// Requests seen by the mock platform, path plus parsed JSON body.
#[derive(Clone, Default)]
struct RequestLog {
    entries: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
}

impl RequestLog {
    fn record(&self, path: &str, body: serde_json::Value) {
        self.entries
            .lock()
            .unwrap()
            .push((path.to_string(), body));
    }

    fn body_of(&self, path: &str) -> Option<serde_json::Value> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|(seen, _)| seen == path)
            .map(|(_, body)| body.clone())
    }
}

async fn create_source(State(log): State<RequestLog>, Json(body): Json<serde_json::Value>) -> Response {
    log.record("/sources/create", body);
    Json(json!({"sourceId": "src-123"})).into_response()
}

async fn check_source(State(log): State<RequestLog>, Json(body): Json<serde_json::Value>) -> Response {
    let source_id = body["sourceId"].as_str().unwrap_or_default().to_string();
    log.record("/sources/check_connection", body);
    match source_id.as_str() {
        "src-ok" => Json(json!({"status": "succeeded"})).into_response(),
        "src-bad" => Json(json!({
            "status": "failed",
            "message": "could not reach database",
        }))
        .into_response(),
        // No status field at all
        _ => Json(json!({"jobInfo": {"id": "job-1"}})).into_response(),
    }
}

async fn create_destination(
    State(log): State<RequestLog>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    log.record("/destinations/create", body);
    Json(json!({"destinationId": "dst-456"})).into_response()
}

async fn check_destination(
    State(log): State<RequestLog>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    log.record("/destinations/check_connection", body);
    Json(json!({"status": "succeeded"})).into_response()
}

async fn discover_schema(
    State(log): State<RequestLog>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    log.record("/connections/discover_schema", body);
    Json(json!({
        "streams": [
            {
                "stream": {
                    "name": "orders",
                    "jsonSchema": {"type": "object"},
                    "supportedSyncModes": ["full_refresh", "incremental"],
                    "sourceDefinedCursor": ["updated_at"],
                    "sourceDefinedPrimaryKey": [["id"]],
                },
            },
        ],
    }))
    .into_response()
}

async fn create_connection(
    State(log): State<RequestLog>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    log.record("/connections/create", body);
    Json(json!({"connectionId": "conn-789"})).into_response()
}

async fn get_connection(Query(params): Query<HashMap<String, String>>) -> Response {
    let connection_id = params.get("connectionId").cloned().unwrap_or_default();
    Json(json!({
        "connectionId": connection_id,
        "status": "active",
        "name": "sales-to-warehouse",
    }))
    .into_response()
}

async fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"message": "workspace quota exceeded"})),
    )
        .into_response()
}

async fn not_json() -> Response {
    (StatusCode::OK, "<html>maintenance</html>").into_response()
}

/// Start the mock platform API on an ephemeral port.
async fn start_mock_platform() -> (String, RequestLog, tokio::task::JoinHandle<()>) {
    let log = RequestLog::default();
    let app = Router::new()
        .route("/sources/create", post(create_source))
        .route("/sources/check_connection", post(check_source))
        .route("/destinations/create", post(create_destination))
        .route("/destinations/check_connection", post(check_destination))
        .route("/connections/discover_schema", post(discover_schema))
        .route("/connections/create", post(create_connection))
        .route("/connections/get", get(get_connection))
        .route("/broken/sources/create", post(server_error))
        .layer(ServiceBuilder::new())
        .with_state(log.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base_url, log, server_handle)
}

fn client_for(base_url: &str) -> PlatformClient {
    PlatformClient::new(base_url, "test-token", "ws-1", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_create_source_returns_response_id() {
    let (base_url, log, server) = start_mock_platform().await;
    let client = client_for(&base_url);

    let source_id = client
        .create_source(
            "orders-db",
            "def-1",
            json!({"host": "db.internal", "port": "1433"}),
        )
        .await
        .unwrap();

    assert_eq!(source_id, "src-123");

    // The creation request carries the workspace id and the opaque config.
    let body = log.body_of("/sources/create").unwrap();
    assert_eq!(body["name"], "orders-db");
    assert_eq!(body["sourceDefinitionId"], "def-1");
    assert_eq!(body["workspaceId"], "ws-1");
    assert_eq!(body["connectionConfiguration"]["host"], "db.internal");

    server.abort();
}

#[tokio::test]
async fn test_create_destination_returns_response_id() {
    let (base_url, log, server) = start_mock_platform().await;
    let client = client_for(&base_url);

    let destination_id = client
        .create_destination("warehouse", "def-2", json!({"account": "acme"}))
        .await
        .unwrap();

    assert_eq!(destination_id, "dst-456");

    let body = log.body_of("/destinations/create").unwrap();
    assert_eq!(body["destinationDefinitionId"], "def-2");

    server.abort();
}

#[tokio::test]
async fn test_check_source_true_only_on_success_literal() {
    let (base_url, _log, server) = start_mock_platform().await;
    let client = client_for(&base_url);

    assert!(client.check_source("src-ok").await.unwrap());
    // A structured failure description is false, not an error.
    assert!(!client.check_source("src-bad").await.unwrap());
    // An absent status field is false, not an error.
    assert!(!client.check_source("src-weird").await.unwrap());

    server.abort();
}

#[tokio::test]
async fn test_check_destination_true_on_success() {
    let (base_url, log, server) = start_mock_platform().await;
    let client = client_for(&base_url);

    assert!(client.check_destination("dst-456").await.unwrap());
    let body = log.body_of("/destinations/check_connection").unwrap();
    assert_eq!(body["destinationId"], "dst-456");

    server.abort();
}

#[tokio::test]
async fn test_non_success_status_raises_with_status_code() {
    let (base_url, _log, server) = start_mock_platform().await;
    let client = PlatformClient::new(
        &format!("{base_url}/broken"),
        "test-token",
        "ws-1",
        Duration::from_secs(5),
    )
    .unwrap();

    let err = client
        .create_source("orders-db", "def-1", json!({}))
        .await
        .unwrap_err();

    match &err {
        ApiError::Status {
            status, message, ..
        } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "workspace quota exceeded");
        }
        other => panic!("Expected status error, got {other:?}"),
    }
    assert_eq!(err.http_status(), Some(500));

    server.abort();
}

#[tokio::test]
async fn test_non_json_body_raises_decode_error_with_body() {
    // Dedicated server whose create endpoint answers 200 with HTML.
    let app = Router::new().route("/sources/create", post(not_json));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = client_for(&format!("http://{addr}"));
    let err = client
        .create_source("orders-db", "def-1", json!({}))
        .await
        .unwrap_err();

    match err {
        ApiError::Decode { body, .. } => {
            assert_eq!(body, "<html>maintenance</html>");
        }
        other => panic!("Expected decode error, got {other:?}"),
    }

    server.abort();
}

#[tokio::test]
async fn test_discover_schema_nests_filter_fields() {
    let (base_url, log, server) = start_mock_platform().await;
    let client = client_for(&base_url);

    let catalog = client
        .discover_schema(
            "src-123",
            SchemaFilter {
                database: Some("sales".to_string()),
                schema: Some("dbo".to_string()),
                tables: Some(vec!["orders".to_string(), "customers".to_string()]),
            },
        )
        .await
        .unwrap();

    assert_eq!(catalog.streams.len(), 1);
    let stream = &catalog.streams[0].stream;
    assert_eq!(stream.name, "orders");
    assert_eq!(stream.source_defined_cursor, vec!["updated_at"]);
    assert_eq!(stream.source_defined_primary_key, vec![vec!["id"]]);

    let body = log.body_of("/connections/discover_schema").unwrap();
    assert_eq!(body["sourceId"], "src-123");
    assert_eq!(body["connectorType"], "source");
    assert_eq!(body["schema"]["database"], "sales");
    assert_eq!(body["schema"]["schema"], "dbo");
    assert_eq!(body["schema"]["tables"], json!(["orders", "customers"]));

    server.abort();
}

#[tokio::test]
async fn test_discover_schema_omits_empty_filter() {
    let (base_url, log, server) = start_mock_platform().await;
    let client = client_for(&base_url);

    client
        .discover_schema("src-123", SchemaFilter::default())
        .await
        .unwrap();

    let body = log.body_of("/connections/discover_schema").unwrap();
    assert!(body.get("schema").is_none(), "Empty filter must be left off the wire: {body}");

    server.abort();
}

#[tokio::test]
async fn test_create_connection_returns_response_id() {
    let (base_url, log, server) = start_mock_platform().await;
    let client = client_for(&base_url);

    let request = CreateConnectionRequest {
        name: "sales-to-warehouse".to_string(),
        source_id: "src-123".to_string(),
        destination_id: "dst-456".to_string(),
        namespace_format: "${SOURCE_NAMESPACE}".to_string(),
        schedule: Schedule {
            units: 5,
            time_unit: "minutes".to_string(),
        },
        sync_catalog: SyncCatalog {
            streams: vec![ConfiguredStream {
                stream: ConfiguredStreamDescriptor {
                    name: "orders".to_string(),
                    json_schema: json!({"type": "object"}),
                    supported_sync_modes: vec!["incremental".to_string()],
                },
                sync_mode: "incremental".to_string(),
                destination_sync_mode: "append_dedup".to_string(),
                cursor_field: vec!["updated_at".to_string()],
                primary_key: vec![vec!["id".to_string()]],
            }],
        },
        auto_propagate_schema: true,
        status: ConnectionStatus::Active,
    };

    let connection_id = client.create_connection(&request).await.unwrap();
    assert_eq!(connection_id, "conn-789");

    let body = log.body_of("/connections/create").unwrap();
    assert_eq!(body["namespaceFormat"], "${SOURCE_NAMESPACE}");
    assert_eq!(body["schedule"], json!({"units": 5, "timeUnit": "minutes"}));
    assert_eq!(body["autoPropagateSchema"], true);
    assert_eq!(body["status"], "active");
    assert_eq!(body["syncCatalog"]["streams"][0]["stream"]["name"], "orders");

    server.abort();
}

#[tokio::test]
async fn test_get_connection_returns_raw_record() {
    let (base_url, _log, server) = start_mock_platform().await;
    let client = client_for(&base_url);

    let record = client.get_connection("conn-789").await.unwrap();
    assert_eq!(record["connectionId"], "conn-789");
    assert_eq!(record["status"], "active");

    server.abort();
}

#[tokio::test]
async fn test_unreachable_server_raises_transport_error() {
    // Bind and immediately drop a listener so the port is free but closed.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{addr}"));
    let err = client.check_source("src-1").await.unwrap_err();

    assert!(
        matches!(err, ApiError::Transport { .. }),
        "Expected transport error, got {err:?}"
    );
}
