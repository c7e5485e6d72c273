use crate::ticket::{StatusTone, Ticket, TicketAction, legal_actions};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Agent,
}

/// Delivery state of a locally originated chat message.
///
/// Entries are appended before the send is attempted and only ever move
/// forward; a failed send leaves the entry in place as `Unsent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Not an outbound chat message.
    Local,
    Pending,
    /// Handed to the live link's outbound queue. The socket write happens
    /// later and is not acknowledged, so a drop before the write goes
    /// unnoticed here.
    Queued,
    /// No live link took the message.
    Unsent,
}

/// Display summary of a ticket snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketSummary {
    pub ticket_id: String,
    pub status: String,
    pub tone: StatusTone,
    pub priority: String,
    pub team: String,
    pub headline: String,
    pub created_at: Option<String>,
    pub resolution: Option<String>,
    /// Actions that were legal when the snapshot arrived.
    pub actions: Vec<TicketAction>,
}

impl TicketSummary {
    pub fn from_ticket(ticket: &Ticket) -> Self {
        let status = if ticket.status.is_empty() {
            "Unknown".to_string()
        } else {
            ticket.status.clone()
        };
        Self {
            ticket_id: ticket.id.clone(),
            status,
            tone: ticket.parsed_status().tone(),
            priority: ticket
                .priority
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
            team: ticket.assigned_team().unwrap_or("Unassigned").to_string(),
            headline: ticket.headline().unwrap_or("No description").to_string(),
            created_at: ticket.created_at.clone(),
            resolution: ticket.resolution.clone().filter(|r| !r.is_empty()),
            actions: legal_actions(ticket),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EntryPayload {
    Text(String),
    TicketSummary(TicketSummary),
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub id: Uuid,
    pub sender: Sender,
    pub payload: EntryPayload,
    pub is_error: bool,
    pub delivery: Delivery,
    pub recorded_at: DateTime<Utc>,
}

impl ConversationEntry {
    fn new(sender: Sender, payload: EntryPayload, is_error: bool, delivery: Delivery) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            payload,
            is_error,
            delivery,
            recorded_at: Utc::now(),
        }
    }

    /// Chat message typed by the user, not yet handed to the channel.
    pub fn outgoing(text: impl Into<String>) -> Self {
        Self::new(
            Sender::User,
            EntryPayload::Text(text.into()),
            false,
            Delivery::Pending,
        )
    }

    /// Local record of a user action (feedback, additional info).
    pub fn user_note(text: impl Into<String>) -> Self {
        Self::new(
            Sender::User,
            EntryPayload::Text(text.into()),
            false,
            Delivery::Local,
        )
    }

    pub fn agent_text(text: impl Into<String>) -> Self {
        Self::new(
            Sender::Agent,
            EntryPayload::Text(text.into()),
            false,
            Delivery::Local,
        )
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(
            Sender::Agent,
            EntryPayload::Text(text.into()),
            true,
            Delivery::Local,
        )
    }

    pub fn summary(summary: TicketSummary) -> Self {
        Self::new(
            Sender::Agent,
            EntryPayload::TicketSummary(summary),
            false,
            Delivery::Local,
        )
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            EntryPayload::Text(text) => Some(text),
            EntryPayload::TicketSummary(_) => None,
        }
    }

    pub fn is_summary(&self) -> bool {
        matches!(self.payload, EntryPayload::TicketSummary(_))
    }
}
