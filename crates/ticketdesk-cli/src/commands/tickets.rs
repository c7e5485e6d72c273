use anyhow::{Context, Result};
use ticketdesk_core::ticket::{FeedbackVerdict, NewTicket, TicketApi};

use super::{App, explain, render};

pub async fn list(app: &App) -> Result<()> {
    let tickets = app.tickets.list_tickets().await.map_err(explain)?;
    if tickets.is_empty() {
        println!("No tickets yet.");
        return Ok(());
    }
    for ticket in &tickets {
        println!("{}", render::ticket_row(ticket));
    }
    Ok(())
}

pub async fn show(app: &App, id: &str) -> Result<()> {
    let ticket = app
        .tickets
        .get_ticket(id)
        .await
        .map_err(explain)
        .with_context(|| format!("Failed to load ticket {}", id))?;
    println!("{}", render::ticket_details(&ticket));
    Ok(())
}

pub async fn counts(app: &App, state: Option<&str>) -> Result<()> {
    let counts = app.tickets.state_counts(state).await.map_err(explain)?;
    if counts.is_empty() {
        println!("No tickets.");
    }
    for (status, count) in &counts {
        println!("{:<32} {}", status, count);
    }
    Ok(())
}

pub async fn create(
    app: &App,
    description: String,
    source: String,
    sys_id: Option<String>,
) -> Result<()> {
    if description.trim().is_empty() {
        anyhow::bail!("Description must not be empty");
    }
    let response = app
        .tickets
        .create_ticket(&NewTicket {
            sys_id,
            description,
            source,
        })
        .await
        .map_err(explain)
        .context("Failed to create ticket")?;
    println!("✅ Ticket submitted");
    println!(
        "{}",
        serde_json::to_string_pretty(&response).context("Failed to format response")?
    );
    Ok(())
}

/// Goes through the view controller so the status gate applies.
pub async fn feedback(app: &App, id: &str, verdict: FeedbackVerdict) -> Result<()> {
    let controller = app.view_controller()?;
    controller.open_ticket(id).await.map_err(explain)?;
    let result = controller.submit_feedback(verdict).await;
    controller.channel().close();
    result.map_err(explain)?;
    println!("✅ {}", verdict.describe());
    Ok(())
}

pub async fn more_info(app: &App, id: &str, text: &str) -> Result<()> {
    let controller = app.view_controller()?;
    controller.open_ticket(id).await.map_err(explain)?;
    let result = controller.submit_more_info(text).await;
    controller.channel().close();
    result.map_err(explain)?;
    println!("✅ Additional information sent");
    Ok(())
}
