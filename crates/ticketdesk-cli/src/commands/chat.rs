//! Interactive conversation for one ticket.
//!
//! Prints transcript entries as they arrive and sends each stdin line as a
//! chat message. `/quit`, EOF or Ctrl-C ends the session. The session token
//! is checked once a minute so channel reconnects carry a fresh one.

use anyhow::{Context, Result};
use std::time::Duration;
use ticketdesk_application::SessionView;
use ticketdesk_core::channel::ChannelState;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use super::{App, explain, render};

const SESSION_CHECK_INTERVAL: Duration = Duration::from_secs(60);

pub async fn run(app: &App, id: &str) -> Result<()> {
    let controller = app.view_controller()?;
    let mut views = controller.subscribe();

    if let Err(e) = controller.open_ticket(id).await {
        if e.is_session_expired() {
            return Err(explain(e));
        }
        eprintln!("Warning: {}", e);
    }

    println!("💬 Chatting on ticket {} (type /quit to leave)", id);
    let mut last_state = None;
    let mut printed = print_new(&views.borrow_and_update(), 0, &mut last_state);

    let mut session_check = tokio::time::interval(SESSION_CHECK_INTERVAL);
    session_check.set_missed_tick_behavior(MissedTickBehavior::Delay);
    session_check.tick().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                printed = print_new(&views.borrow_and_update(), printed, &mut last_state);
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if line.trim() == "/quit" {
                    break;
                }
                if let Err(e) = controller.send_message(&line) {
                    tracing::warn!(ticket_id = %id, error = %e, "Message not sent");
                    eprintln!("Warning: {}", e);
                }
            }
            _ = session_check.tick() => {
                if let Err(e) = controller.ensure_session().await {
                    if e.is_session_expired() {
                        controller.channel().close();
                        return Err(explain(e));
                    }
                    tracing::warn!(error = %e, "Session check failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    controller.channel().close();
    Ok(())
}

/// Prints entries past `printed` and returns the new count.
///
/// A delivery update rewrites an entry already shown; only appended
/// entries are printed.
fn print_new(view: &SessionView, printed: usize, last_state: &mut Option<ChannelState>) -> usize {
    if *last_state != Some(view.channel_state) {
        match view.channel_state {
            ChannelState::Joined => println!("-- connected"),
            ChannelState::Connecting if last_state.is_some() => println!("-- reconnecting..."),
            _ => {}
        }
        *last_state = Some(view.channel_state);
    }

    // The transcript restarts when the session generation changes.
    let start = if printed > view.entries.len() { 0 } else { printed };
    for entry in &view.entries[start..] {
        println!("{}", render::entry(entry));
    }
    view.entries.len()
}
