use super::model::Ticket;
use crate::error::{DeskError, Result};
use serde::{Deserialize, Serialize};

/// User actions whose availability depends on ticket status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketAction {
    SubmitAdditionalInfo,
    SubmitFeedback,
}

impl TicketAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketAction::SubmitAdditionalInfo => "submit_additional_info",
            TicketAction::SubmitFeedback => "submit_feedback",
        }
    }
}

/// Answer to "was the resolution helpful?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackVerdict {
    Helpful,
    NotHelpful,
}

impl FeedbackVerdict {
    /// Value sent in `POST /api/feedback`.
    pub fn as_wire(&self) -> &'static str {
        match self {
            FeedbackVerdict::Helpful => "yes",
            FeedbackVerdict::NotHelpful => "no",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            FeedbackVerdict::Helpful => "Resolution was helpful",
            FeedbackVerdict::NotHelpful => "Resolution was not helpful",
        }
    }
}

/// Actions legal for the ticket's current status.
pub fn legal_actions(ticket: &Ticket) -> Vec<TicketAction> {
    ticket.parsed_status().legal_action().into_iter().collect()
}

/// Fails with `ActionNotAllowed` unless `action` is legal right now.
pub fn ensure_action_allowed(ticket: &Ticket, action: TicketAction) -> Result<()> {
    if ticket.parsed_status().legal_action() == Some(action) {
        Ok(())
    } else {
        Err(DeskError::action_not_allowed(action.as_str(), &ticket.status))
    }
}
