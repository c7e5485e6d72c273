//! Ticket view controller.
//!
//! Ties the REST ticket endpoints to the session channel for the ticket on
//! screen: opening a ticket, and the two status-gated user actions.

use crate::ticket_session::{SessionView, TicketSessionChannel};
use std::sync::Arc;
use ticketdesk_core::auth::TokenSource;
use ticketdesk_core::conversation::ConversationEntry;
use ticketdesk_core::ticket::{FeedbackVerdict, TicketAction, TicketApi, ensure_action_allowed};
use ticketdesk_core::{DeskError, Result};
use tokio::sync::watch;

const LOAD_FAILED: &str = "Failed to load ticket details. Please try again later.";
const FEEDBACK_FAILED: &str = "Failed to submit feedback. Please try again.";
const MORE_INFO_FAILED: &str = "Failed to submit additional information. Please try again.";

pub struct TicketViewController {
    tickets: Arc<dyn TicketApi>,
    channel: TicketSessionChannel,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl TicketViewController {
    pub fn new(tickets: Arc<dyn TicketApi>, channel: TicketSessionChannel) -> Self {
        Self {
            tickets,
            channel,
            tokens: None,
        }
    }

    /// Validates the session before the channel reads the stored token.
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn channel(&self) -> &TicketSessionChannel {
        &self.channel
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.channel.subscribe()
    }

    pub fn view(&self) -> SessionView {
        self.channel.view()
    }

    /// Opens the channel for `ticket_id` and loads the ticket over REST.
    ///
    /// Both belong to the same session generation; a load that completes
    /// after the user moved on to another ticket is dropped.
    pub async fn open_ticket(&self, ticket_id: &str) -> Result<()> {
        self.ensure_session().await?;
        let generation = self.channel.open(ticket_id).await;
        self.reload(generation, ticket_id).await
    }

    /// Refreshes the stored token if it is expiring.
    ///
    /// Channel reconnects reuse the stored token, so long-lived sessions call
    /// this periodically. A no-op without a token source.
    pub async fn ensure_session(&self) -> Result<()> {
        match &self.tokens {
            Some(tokens) => tokens.valid_token().await.map(|_| ()),
            None => Ok(()),
        }
    }

    pub fn send_message(&self, text: &str) -> Result<()> {
        self.channel.send_message(text)
    }

    /// Submits "was the resolution helpful?". Only legal in `feedback_needed`.
    pub async fn submit_feedback(&self, verdict: FeedbackVerdict) -> Result<()> {
        let (generation, ticket_id) = self.gate(TicketAction::SubmitFeedback)?;

        if let Err(e) = self.tickets.submit_feedback(&ticket_id, verdict).await {
            tracing::warn!(ticket_id = %ticket_id, error = %e, "Feedback submission failed");
            self.channel
                .note(generation, ConversationEntry::error(FEEDBACK_FAILED));
            return Err(e);
        }

        self.channel.note(
            generation,
            ConversationEntry::user_note(format!("Feedback submitted: {}", verdict.describe())),
        );
        self.reload(generation, &ticket_id).await
    }

    /// Sends additional information. Only legal in `more_info_needed`.
    ///
    /// The text is sent and echoed as typed; surrounding whitespace only
    /// matters for the blank check.
    pub async fn submit_more_info(&self, additional_info: &str) -> Result<()> {
        if additional_info.trim().is_empty() {
            return Err(DeskError::validation(
                "Additional information must not be empty",
            ));
        }
        let (generation, ticket_id) = self.gate(TicketAction::SubmitAdditionalInfo)?;

        if let Err(e) = self
            .tickets
            .submit_more_info(&ticket_id, additional_info)
            .await
        {
            tracing::warn!(ticket_id = %ticket_id, error = %e, "Additional info submission failed");
            self.channel
                .note(generation, ConversationEntry::error(MORE_INFO_FAILED));
            return Err(e);
        }

        self.channel.note(
            generation,
            ConversationEntry::user_note(format!(
                "Additional information provided: {}",
                additional_info
            )),
        );
        self.reload(generation, &ticket_id).await
    }

    /// Checks the action against the cached ticket's status.
    fn gate(&self, action: TicketAction) -> Result<(u64, String)> {
        let (generation, ticket_id, ticket) = self.channel.current();
        let ticket =
            ticket.ok_or_else(|| DeskError::action_not_allowed(action.as_str(), "unknown"))?;
        ensure_action_allowed(&ticket, action)?;
        Ok((generation, ticket_id.unwrap_or(ticket.id)))
    }

    /// Fetches the ticket for `generation` and re-joins its room.
    async fn reload(&self, generation: u64, ticket_id: &str) -> Result<()> {
        match self.tickets.get_ticket(ticket_id).await {
            Ok(ticket) => {
                if self.channel.apply_fetched(generation, ticket) {
                    self.channel.rejoin();
                } else {
                    tracing::debug!(
                        ticket_id,
                        "Discarding ticket fetched for a superseded session"
                    );
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(ticket_id, error = %e, "Failed to load ticket");
                self.channel
                    .note(generation, ConversationEntry::error(LOAD_FAILED));
                Err(e)
            }
        }
    }
}
