//! RPC Server - read-only status API and event stream
//!
//! Serves the collaborators that sit outside the ledger core:
//! - HTTP: REST status endpoints plus JSON-RPC (getStatus, getValidators, ...)
//! - WebSocket: pushes every network event to connected clients

pub mod http_server;
pub mod methods;
pub mod ws_server;

pub use http_server::HttpRpcServer;
pub use ws_server::WebSocketServer;

// Re-export types that consumers might need
pub use pos_network::{Network, NetworkEvent, NetworkStatus};
