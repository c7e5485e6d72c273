//! Network clients for the Ticketdesk service.
//!
//! # Module Structure
//!
//! - `http`: the request executor seam and its reqwest implementation
//! - `auth_client`: `/auth/*` endpoints
//! - `token_manager`: refresh-before-expiry and single-flight refresh
//! - `gateway`: bearer injection and the one-shot 401 retry
//! - `ticket_api`: `/api/*` ticket endpoints over the gateway
//! - `ws_transport`: WebSocket implementation of the ticket channel transport

pub mod auth_client;
pub mod gateway;
pub mod http;
pub mod ticket_api;
pub mod token_manager;
pub mod ws_transport;

pub use auth_client::HttpAuthClient;
pub use gateway::AuthenticatedGateway;
pub use http::{ApiRequest, ApiResponse, HttpExecutor, Method, ReqwestExecutor};
pub use ticket_api::HttpTicketApi;
pub use token_manager::TokenLifecycleManager;
pub use ws_transport::WebSocketTransport;

#[cfg(test)]
mod test_support;
