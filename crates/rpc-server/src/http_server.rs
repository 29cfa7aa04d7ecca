//! HTTP Server
//!
//! REST status endpoints for dashboards plus a JSON-RPC endpoint.

use crate::methods::{
    handle_get_genesis, handle_get_health, handle_get_status, handle_get_validators, RpcError,
};
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pos_network::Network;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC request
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
}

/// JSON-RPC response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

/// HTTP Server
pub struct HttpRpcServer {
    network: Arc<Network>,
}

impl HttpRpcServer {
    pub fn new(network: Arc<Network>) -> Self {
        Self { network }
    }

    /// Create the Axum router
    pub fn router(self) -> Router {
        // CORS layer to allow browser clients
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

        Router::new()
            .route("/", post(handle_rpc))
            .route("/health", get(health))
            .route("/api/blockchain/status", get(status))
            .route("/api/blockchain/validators", get(validators))
            .route("/api/blockchain/genesis", get(genesis))
            .layer(cors)
            .with_state(self.network)
    }

    /// Run the server
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already-bound listener
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        tracing::info!("HTTP server listening on {}", listener.local_addr()?);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

async fn health(State(network): State<Arc<Network>>) -> &'static str {
    handle_get_health(&network)
}

async fn status(State(network): State<Arc<Network>>) -> impl IntoResponse {
    Json(handle_get_status(&network))
}

async fn validators(State(network): State<Arc<Network>>) -> impl IntoResponse {
    Json(handle_get_validators(&network))
}

async fn genesis(State(network): State<Arc<Network>>) -> Response {
    match handle_get_genesis(&network) {
        Ok(block) => Json(block).into_response(),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": e.to_string() })))
            .into_response(),
    }
}

/// Handle JSON-RPC request
async fn handle_rpc(
    State(network): State<Arc<Network>>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let result = if request.jsonrpc == JSONRPC_VERSION {
        dispatch_method(&network, &request.method)
    } else {
        Err(RpcError::InvalidRequest(format!(
            "unsupported jsonrpc version {:?}",
            request.jsonrpc
        )))
    };

    let response = match result {
        Ok(value) => JsonRpcResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: request.id,
            result: Some(value),
            error: None,
        },
        Err(e) => JsonRpcResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: request.id,
            result: None,
            error: Some(JsonRpcError {
                code: error_code(&e),
                message: e.to_string(),
            }),
        },
    };

    (StatusCode::OK, Json(response))
}

/// Dispatch to appropriate method handler
pub fn dispatch_method(network: &Network, method: &str) -> Result<Value, RpcError> {
    tracing::debug!("RPC method called: {}", method);
    match method {
        "getStatus" => to_value(handle_get_status(network)),
        "getValidators" => to_value(handle_get_validators(network)),
        "getGenesisBlock" => to_value(handle_get_genesis(network)?),
        "getHealth" => Ok(json!(handle_get_health(network))),
        "getVersion" => Ok(json!({ "pos-node": env!("CARGO_PKG_VERSION") })),
        _ => Err(RpcError::MethodNotFound(method.to_string())),
    }
}

fn to_value<T: Serialize>(value: T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::InternalError(e.to_string()))
}

/// Map error to JSON-RPC error code
fn error_code(error: &RpcError) -> i32 {
    match error {
        RpcError::InvalidRequest(_) => -32600,
        RpcError::MethodNotFound(_) => -32601,
        RpcError::InternalError(_) => -32603,
        RpcError::NotInitialized => -32002,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pos_network::NetworkConfig;

    fn network() -> Arc<Network> {
        Arc::new(Network::new(NetworkConfig::default()).unwrap())
    }

    #[test]
    fn test_dispatch_status() {
        let network = network();
        let value = dispatch_method(&network, "getStatus").unwrap();
        assert_eq!(value["consensusKind"], "proof-of-stake");
        assert_eq!(value["blockTimeSeconds"], 0.1);
        assert_eq!(value["validatorCount"], 0);
    }

    #[test]
    fn test_dispatch_errors() {
        let network = network();
        let err = dispatch_method(&network, "mintNft").unwrap_err();
        assert_eq!(error_code(&err), -32601);

        let err = dispatch_method(&network, "getGenesisBlock").unwrap_err();
        assert_eq!(error_code(&err), -32002);
    }

    #[tokio::test]
    async fn test_rest_handlers() {
        let network = network();
        network.initialize().unwrap();

        let response = status(State(network.clone())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(handle_get_status(&network).validator_count, 4);

        assert_eq!(health(State(network.clone())).await, "ok");
        let response = genesis(State(network.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);

        network.stop();
    }

    fn rpc_request(jsonrpc: &str, method: &str) -> Json<JsonRpcRequest> {
        Json(JsonRpcRequest {
            jsonrpc: jsonrpc.to_string(),
            id: json!(7),
            method: method.to_string(),
        })
    }

    async fn rpc_body(network: Arc<Network>, request: Json<JsonRpcRequest>) -> Value {
        let response = handle_rpc(State(network), request).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_rpc_checks_protocol_version() {
        let network = network();

        let body = rpc_body(network.clone(), rpc_request("2.0", "getHealth")).await;
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["id"], 7);
        assert!(body.get("error").is_none());

        let body = rpc_body(network, rpc_request("1.0", "getHealth")).await;
        assert_eq!(body["error"]["code"], -32600);
        assert_eq!(body["id"], 7);
        assert!(body.get("result").is_none());
    }

    #[tokio::test]
    async fn test_genesis_unavailable_before_initialize() {
        let response = genesis(State(network())).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
