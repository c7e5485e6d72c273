use super::action::FeedbackVerdict;
use super::model::Ticket;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;

/// Ticket counts keyed by lowercased status.
pub type StateCounts = BTreeMap<String, u64>;

/// Payload for `POST /api/process_ticket`.
#[derive(Debug, Clone, Serialize)]
pub struct NewTicket {
    /// Client-chosen id; generated when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sys_id: Option<String>,
    pub description: String,
    pub source: String,
}

/// Authenticated ticket endpoints.
///
/// Implementations go through the authenticated gateway, so token refresh
/// and the one-shot 401 retry are never handled here.
#[async_trait]
pub trait TicketApi: Send + Sync {
    /// `GET /api/incidents`
    async fn list_tickets(&self) -> Result<Vec<Ticket>>;

    /// `GET /api/incidents/:id`
    async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket>;

    /// `POST /api/process_ticket`. Returns the server's response body.
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<serde_json::Value>;

    /// `POST /api/feedback`
    async fn submit_feedback(&self, ticket_id: &str, verdict: FeedbackVerdict) -> Result<()>;

    /// `POST /api/more_info`
    async fn submit_more_info(&self, ticket_id: &str, additional_info: &str) -> Result<()>;

    /// `GET /api/ticket-state-count`. `None` asks for every status.
    async fn state_counts(&self, state: Option<&str>) -> Result<StateCounts>;
}
