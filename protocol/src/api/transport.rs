//! The HTTP seam.
//!
//! The engine never opens a socket itself. Everything that talks to a node
//! goes through a [`Transport`], which speaks JSON to the active peer of one
//! network. Applications plug in their HTTP client of choice; tests and the
//! offline CLI use [`MemoryTransport`].

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::config::Network;

/// Errors surfaced by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The peer could not be reached.
    #[error("peer unreachable: {0}")]
    Unreachable(String),

    /// The peer answered with a non-success HTTP status.
    #[error("HTTP {status} from {target}")]
    Status { status: u16, target: String },

    /// The response body was not the JSON we expected.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The node answered but refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// JSON-over-HTTP access to one network.
///
/// `path` arguments are relative to the active peer (`/peer/transactions`);
/// `post_native` takes an absolute URL and bypasses the active peer.
#[async_trait]
pub trait Transport: Send + Sync {
    /// The network this transport talks to.
    fn network(&self) -> &Network;

    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, TransportError>;

    async fn post(&self, path: &str, body: Value) -> Result<Value, TransportError>;

    async fn post_native(&self, url: &str, body: Value) -> Result<Value, TransportError>;
}

// ---------------------------------------------------------------------------
// In-memory transport
// ---------------------------------------------------------------------------

/// HTTP verb of a recorded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A request seen by [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path for `get`/`post`, full URL for `post_native`.
    pub target: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// A [`Transport`] that answers from a table of canned responses and records
/// every request it receives.
///
/// Targets without a canned response answer HTTP 404.
pub struct MemoryTransport {
    network: Network,
    responses: Mutex<HashMap<String, Value>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MemoryTransport {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            responses: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Registers the JSON returned for `target` (a path or a full URL).
    pub fn respond(&self, target: impl Into<String>, response: Value) {
        self.responses.lock().insert(target.into(), response);
    }

    /// Builder form of [`respond`](Self::respond).
    pub fn with_response(self, target: impl Into<String>, response: Value) -> Self {
        self.respond(target, response);
        self
    }

    /// Snapshot of every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    fn answer(&self, request: RecordedRequest) -> Result<Value, TransportError> {
        debug!(method = ?request.method, target = %request.target, "memory transport request");
        let target = request.target.clone();
        self.requests.lock().push(request);
        self.responses
            .lock()
            .get(&target)
            .cloned()
            .ok_or(TransportError::Status {
                status: 404,
                target,
            })
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn network(&self) -> &Network {
        &self.network
    }

    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, TransportError> {
        self.answer(RecordedRequest {
            method: Method::Get,
            target: path.to_string(),
            query: query.to_vec(),
            body: None,
        })
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        self.answer(RecordedRequest {
            method: Method::Post,
            target: path.to_string(),
            query: Vec::new(),
            body: Some(body),
        })
    }

    async fn post_native(&self, url: &str, body: Value) -> Result<Value, TransportError> {
        self.answer(RecordedRequest {
            method: Method::Post,
            target: url.to_string(),
            query: Vec::new(),
            body: Some(body),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkType;
    use serde_json::json;

    fn transport() -> MemoryTransport {
        MemoryTransport::new(Network::default_for(NetworkType::Alphanet))
    }

    #[tokio::test]
    async fn canned_response_is_returned_and_request_recorded() {
        let transport = transport().with_response("/blocks/getFees", json!({"success": true}));
        let query = vec![("limit".to_string(), "10".to_string())];
        let value = transport.get("/blocks/getFees", &query).await.unwrap();
        assert_eq!(value, json!({"success": true}));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[0].query, query);
    }

    #[tokio::test]
    async fn unknown_target_is_404() {
        let transport = transport();
        let err = transport.post("/nowhere", json!({})).await.unwrap_err();
        assert_eq!(
            err,
            TransportError::Status {
                status: 404,
                target: "/nowhere".into()
            }
        );
        assert_eq!(transport.requests()[0].body, Some(json!({})));
    }

    #[tokio::test]
    async fn post_native_records_full_url() {
        let transport = transport();
        let url = "http://10.0.0.1:4100/peer/transactions";
        transport.respond(url, json!({"success": true}));
        transport.post_native(url, json!({"transactions": []})).await.unwrap();
        assert_eq!(transport.requests()[0].target, url);
    }
}
