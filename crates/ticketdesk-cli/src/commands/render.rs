//! Plain-text rendering for tickets and transcript entries.

use ticketdesk_core::conversation::{ConversationEntry, Delivery, EntryPayload, Sender, TicketSummary};
use ticketdesk_core::ticket::{Ticket, TicketAction, derive_stages, legal_actions};

pub fn ticket_row(ticket: &Ticket) -> String {
    format!(
        "{:<14} {:<28} {:<8} {}",
        ticket.id,
        truncate(&ticket.status, 28),
        ticket.priority.as_deref().unwrap_or("-"),
        ticket.headline().unwrap_or("No description"),
    )
}

pub fn ticket_details(ticket: &Ticket) -> String {
    let summary = TicketSummary::from_ticket(ticket);
    let mut lines = vec![
        format!("Ticket    {}", summary.ticket_id),
        format!("Status    {}", summary.status),
        format!("Priority  {}", summary.priority),
        format!("Team      {}", summary.team),
    ];
    if let Some(created_at) = &summary.created_at {
        lines.push(format!("Created   {}", created_at));
    }
    lines.push(format!("Pipeline  {}", pipeline(ticket)));
    lines.push(String::new());
    lines.push(ticket.description.clone());
    if let Some(resolution) = &summary.resolution {
        lines.push(String::new());
        lines.push(format!("Resolution: {}", resolution));
    }
    for action in legal_actions(ticket) {
        lines.push(format!("Next step: {}", action_hint(action, &ticket.id)));
    }
    lines.join("\n")
}

pub fn pipeline(ticket: &Ticket) -> String {
    derive_stages(ticket)
        .stage_list()
        .iter()
        .map(|stage| stage.label())
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn action_hint(action: TicketAction, ticket_id: &str) -> String {
    match action {
        TicketAction::SubmitFeedback => {
            format!("ticketdesk feedback {} <yes|no>", ticket_id)
        }
        TicketAction::SubmitAdditionalInfo => {
            format!("ticketdesk more-info {} \"<details>\"", ticket_id)
        }
    }
}

pub fn entry(entry: &ConversationEntry) -> String {
    match &entry.payload {
        EntryPayload::TicketSummary(summary) => format!(
            "[ticket] {} | {} | priority {} | {}",
            summary.ticket_id, summary.status, summary.priority, summary.team
        ),
        EntryPayload::Text(text) => {
            let who = match entry.sender {
                Sender::User => "you",
                Sender::Agent => "agent",
            };
            let marker = match entry.delivery {
                Delivery::Unsent => " (not sent)",
                Delivery::Pending => " (sending)",
                Delivery::Local | Delivery::Queued => "",
            };
            if entry.is_error {
                format!("[{}] ! {}", who, text)
            } else {
                format!("[{}] {}{}", who, text, marker)
            }
        }
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
