//! Scripted transport for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::Notify;

use crate::error::RequestFailure;
use crate::transport::{HttpTransport, PreparedRequest, TransportResponse};

/// Replays one canned reply for every request and records what was sent.
#[derive(Debug)]
pub(crate) struct ScriptedTransport {
    reply: Result<TransportResponse, RequestFailure>,
    requests: Mutex<Vec<PreparedRequest>>,
    gate: Option<Notify>,
}

impl ScriptedTransport {
    pub(crate) fn respond(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            reply: Ok(TransportResponse {
                status,
                body: body.into(),
            }),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub(crate) fn envelope(body: Value) -> Self {
        Self::respond(StatusCode::OK, body.to_string())
    }

    pub(crate) fn fail(failure: RequestFailure) -> Self {
        Self {
            reply: Err(failure),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Hold every reply until [`release`](Self::release) is called.
    pub(crate) fn gated(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    pub(crate) fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub(crate) fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> PreparedRequest {
        self.requests().pop().expect("no request was sent")
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, RequestFailure> {
        self.requests.lock().unwrap().push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.reply.clone()
    }
}
