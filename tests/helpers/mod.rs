//! Shared helpers for end-to-end tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use pagekit::{ClientConfig, Envelope, MemoryCredentialStore, RequestClient, ReqwestTransport};

/// An envelope API served on an ephemeral local port.
pub struct TestServer {
    /// `http://127.0.0.1:<port>`
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start the server.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let handle = tokio::spawn(async move {
            axum::serve(listener, router())
                .await
                .expect("Test server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }

    /// Client against this server, authenticated with `token` if given.
    pub fn client(&self, token: Option<&str>) -> RequestClient {
        client_for(&self.base_url, token)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Client using the real reqwest transport.
pub fn client_for(base_url: &str, token: Option<&str>) -> RequestClient {
    let mut config = ClientConfig::new(base_url);
    config.timeout_seconds = 5;
    config.connect_timeout_seconds = 2;

    let credentials = MemoryCredentialStore::new();
    if let Some(token) = token {
        credentials.insert("token", token);
    }

    let transport = ReqwestTransport::new(&config).expect("Failed to build transport");
    RequestClient::new(config, Arc::new(transport), Arc::new(credentials))
}

/// Address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind placeholder listener");
    listener.local_addr().expect("Failed to read local addr")
}

fn router() -> Router {
    Router::new()
        .route("/api/users/{id}", get(get_user))
        .route("/api/users", post(create_user))
        .route("/api/whoami", get(whoami))
        .route("/api/denied", get(denied))
        .route("/api/status/{code}", get(status))
        .route("/api/broken", get(broken))
        .route("/api/no-message", get(no_message))
}

fn envelope(code: i64, message: &str, data: Value) -> Json<Envelope<Value>> {
    Json(Envelope {
        code,
        message: message.to_string(),
        data,
    })
}

async fn get_user(Path(id): Path<u32>) -> Json<Envelope<Value>> {
    Json(Envelope::success(json!({ "id": id, "name": "ada" })))
}

async fn create_user(Json(body): Json<Value>) -> Json<Envelope<Value>> {
    envelope(201, "created", json!({ "id": 99, "name": body["name"] }))
}

async fn whoami(headers: HeaderMap) -> Json<Envelope<Value>> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| Value::String(value.to_string()))
        .unwrap_or(Value::Null);
    envelope(200, "ok", authorization)
}

async fn denied() -> Json<Envelope<Value>> {
    Json(Envelope::failure(403, "Permission denied"))
}

async fn status(Path(code): Path<u16>) -> impl IntoResponse {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, envelope(code as i64, "status route", Value::Null))
}

async fn broken() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/html")], "<html>upstream error</html>")
}

async fn no_message() -> Json<Value> {
    Json(json!({ "code": 500, "data": null }))
}
