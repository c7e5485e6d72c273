//! Ticket endpoints (`/api/*`).

use crate::gateway::AuthenticatedGateway;
use crate::http::{ApiRequest, ApiResponse};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use ticketdesk_core::{DeskError, Result};
use ticketdesk_core::config::ClientConfig;
use ticketdesk_core::ticket::{FeedbackVerdict, NewTicket, StateCounts, Ticket, TicketApi};

/// [`TicketApi`] over the authenticated gateway.
pub struct HttpTicketApi {
    config: ClientConfig,
    gateway: Arc<AuthenticatedGateway>,
}

impl HttpTicketApi {
    pub fn new(config: ClientConfig, gateway: Arc<AuthenticatedGateway>) -> Self {
        Self { config, gateway }
    }

    async fn get(&self, path: &str) -> Result<ApiResponse> {
        let request = ApiRequest::get(self.config.endpoint(path)?);
        self.gateway.request(&request).await?.into_result()
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<ApiResponse> {
        let request = ApiRequest::post_json(self.config.endpoint(path)?, body);
        self.gateway.request(&request).await?.into_result()
    }
}

#[async_trait]
impl TicketApi for HttpTicketApi {
    async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        self.get("/api/incidents").await?.json()
    }

    async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket> {
        let mut url = self.config.endpoint("/api/incidents")?;
        url.path_segments_mut()
            .map_err(|_| DeskError::config("API base URL cannot have paths"))?
            .push(ticket_id);
        let request = ApiRequest::get(url);
        self.gateway.request(&request).await?.into_result()?.json()
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<serde_json::Value> {
        let sys_id = ticket
            .sys_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let body = json!({
            "sys_id": sys_id,
            "description": ticket.description,
            "source": ticket.source,
        });
        let created = self.post("/api/process_ticket", body).await?.json()?;
        tracing::info!(sys_id = %sys_id, "Ticket submitted");
        Ok(created)
    }

    async fn submit_feedback(&self, ticket_id: &str, verdict: FeedbackVerdict) -> Result<()> {
        let body = json!({ "sys_id": ticket_id, "feedback": verdict.as_wire() });
        self.post("/api/feedback", body).await?;
        Ok(())
    }

    async fn submit_more_info(&self, ticket_id: &str, additional_info: &str) -> Result<()> {
        let body = json!({ "sys_id": ticket_id, "additional_info": additional_info });
        self.post("/api/more_info", body).await?;
        Ok(())
    }

    async fn state_counts(&self, state: Option<&str>) -> Result<StateCounts> {
        let mut url = self.config.endpoint("/api/ticket-state-count")?;
        if let Some(state) = state.filter(|s| !s.eq_ignore_ascii_case("all")) {
            url.query_pairs_mut().append_pair("state", state);
        }
        let request = ApiRequest::get(url);
        let response = self.gateway.request(&request).await?.into_result()?;
        if response.body.trim().is_empty() {
            return Ok(StateCounts::new());
        }
        response.json()
    }
}
