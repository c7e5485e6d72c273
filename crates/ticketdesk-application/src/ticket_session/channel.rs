//! Ticket session channel.
//!
//! One channel object serves the ticket currently on screen. Every `open`
//! starts a new generation: the previous link is closed first, and its
//! dispatcher task, still draining whatever the old link delivered, finds
//! its generation stale on the next event and stops without touching the
//! new ticket's state.

use super::view::SessionView;
use std::sync::{Arc, Mutex, MutexGuard};
use ticketdesk_core::channel::{
    ChannelLink, ChannelState, ChannelTransport, InboundEvent, LinkHandle, OutboundEvent,
    TransportEvent,
};
use ticketdesk_core::conversation::{ConversationEntry, ConversationLog, TicketSummary};
use ticketdesk_core::ticket::{Ticket, derive_stages, legal_actions};
use ticketdesk_core::{DeskError, Result};
use tokio::sync::{mpsc, watch};

struct SessionState {
    generation: u64,
    ticket_id: Option<String>,
    ticket: Option<Ticket>,
    log: ConversationLog,
    channel_state: ChannelState,
    link: Option<LinkHandle>,
    /// A connection error entry was already added for the current outage.
    outage_reported: bool,
}

impl SessionState {
    fn new() -> Self {
        Self {
            generation: 0,
            ticket_id: None,
            ticket: None,
            log: ConversationLog::new(),
            channel_state: ChannelState::Disconnected,
            link: None,
            outage_reported: false,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && self.channel_state != ChannelState::Closed
    }

    fn view(&self) -> SessionView {
        SessionView {
            generation: self.generation,
            ticket_id: self.ticket_id.clone(),
            ticket: self.ticket.clone(),
            pipeline: self.ticket.as_ref().map(derive_stages),
            actions: self.ticket.as_ref().map(legal_actions).unwrap_or_default(),
            entries: self.log.entries().to_vec(),
            channel_state: self.channel_state,
        }
    }

    /// Ends the current link and forgets the ticket.
    fn reset(&mut self) {
        self.generation += 1;
        if let Some(link) = self.link.take() {
            link.close();
        }
        self.ticket_id = None;
        self.ticket = None;
        self.log = ConversationLog::new();
        self.outage_reported = false;
    }

    fn send_join(&self) -> bool {
        match (&self.link, &self.ticket_id) {
            (Some(link), Some(ticket_id)) => link.send(OutboundEvent::join(ticket_id.clone())),
            _ => false,
        }
    }

    fn apply(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => {
                self.channel_state = ChannelState::Joined;
                self.outage_reported = false;
                if !self.send_join() {
                    tracing::warn!(ticket_id = ?self.ticket_id, "Connected but could not join");
                }
            }
            TransportEvent::Disconnected { reason } => {
                tracing::debug!(reason = %reason, "Channel dropped, waiting for reconnect");
                self.channel_state = ChannelState::Connecting;
            }
            TransportEvent::ConnectFailed { message } => {
                self.channel_state = ChannelState::Connecting;
                self.report_outage(&message);
            }
            TransportEvent::Inbound(InboundEvent::Snapshot(ticket)) => self.accept_snapshot(ticket),
            TransportEvent::Inbound(InboundEvent::Text(text)) => {
                self.log.append(ConversationEntry::agent_text(text));
            }
            TransportEvent::Inbound(InboundEvent::Error(message)) => {
                tracing::warn!(message = %message, "Channel peer reported an error");
                self.log
                    .append(ConversationEntry::error(format!("Error: {}", message)));
            }
        }
    }

    /// Adds one error entry per outage; later failures only log.
    fn report_outage(&mut self, message: &str) {
        if self.outage_reported {
            tracing::debug!(message, "Channel still unreachable");
            return;
        }
        self.outage_reported = true;
        self.log
            .append(ConversationEntry::error(format!("Connection error: {}", message)));
    }

    fn accept_snapshot(&mut self, ticket: Ticket) {
        if !ticket.id.is_empty() && self.ticket_id.as_deref() != Some(ticket.id.as_str()) {
            tracing::debug!(snapshot = %ticket.id, "Ignoring snapshot for another ticket");
            return;
        }
        let summary = TicketSummary::from_ticket(&ticket);
        self.ticket = Some(ticket);
        self.log.append_summary_once(summary);
    }
}

struct Inner {
    state: Mutex<SessionState>,
    view: watch::Sender<SessionView>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Mutates the state and publishes the resulting view.
    fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.lock();
        let result = f(&mut state);
        self.view.send_replace(state.view());
        result
    }

    /// Like [`Inner::update`], but only while `generation` is still current.
    fn update_current(&self, generation: u64, f: impl FnOnce(&mut SessionState)) -> bool {
        let mut state = self.lock();
        if !state.is_current(generation) {
            return false;
        }
        f(&mut state);
        self.view.send_replace(state.view());
        true
    }
}

/// Real-time session for the ticket being viewed.
///
/// Observers follow the session through [`TicketSessionChannel::subscribe`].
/// Dropping the channel closes its link.
pub struct TicketSessionChannel {
    transport: Arc<dyn ChannelTransport>,
    inner: Arc<Inner>,
}

impl TicketSessionChannel {
    pub fn new(transport: Arc<dyn ChannelTransport>) -> Self {
        let (view, _) = watch::channel(SessionView::default());
        Self {
            transport,
            inner: Arc::new(Inner {
                state: Mutex::new(SessionState::new()),
                view,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.inner.view.subscribe()
    }

    /// Current view, built from the live state.
    pub fn view(&self) -> SessionView {
        self.inner.lock().view()
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    pub fn ticket(&self) -> Option<Ticket> {
        self.inner.lock().ticket.clone()
    }

    pub fn ticket_id(&self) -> Option<String> {
        self.inner.lock().ticket_id.clone()
    }

    /// Opens the channel for `ticket_id`, closing any previous link first.
    ///
    /// Returns the new session generation. A failed connection attempt is
    /// recorded as an error entry and leaves the session `Connecting`.
    pub async fn open(&self, ticket_id: &str) -> u64 {
        let generation = self.inner.update(|state| {
            state.reset();
            state.ticket_id = Some(ticket_id.to_string());
            state.channel_state = ChannelState::Connecting;
            state.generation
        });
        tracing::info!(ticket_id, generation, "Opening ticket session");

        let ChannelLink { events, handle } = match self.transport.connect().await {
            Ok(link) => link,
            Err(e) => {
                tracing::warn!(ticket_id, error = %e, "Could not open channel");
                self.inner.update_current(generation, |state| {
                    state.report_outage(&e.to_string());
                });
                return generation;
            }
        };

        // A newer open may have won the race while we were connecting; the
        // handle is then dropped here, which closes the link.
        let attached = self.inner.update_current(generation, |state| {
            state.link = Some(handle);
        });
        if attached {
            tokio::spawn(dispatch(self.inner.clone(), generation, events));
        }
        generation
    }

    /// Re-sends `join` for the current ticket. Only has an effect while joined.
    pub fn rejoin(&self) -> bool {
        let state = self.inner.lock();
        state.channel_state == ChannelState::Joined && state.send_join()
    }

    /// Appends a user entry, then emits one `message` event.
    ///
    /// Blank text is ignored.
    pub fn send_message(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        self.inner.update(|state| {
            let ticket_id = state
                .ticket_id
                .clone()
                .ok_or_else(|| DeskError::channel("No ticket session is open"))?;
            let position = state.log.append(ConversationEntry::outgoing(text));
            let queued = state
                .link
                .as_ref()
                .is_some_and(|link| link.send(OutboundEvent::message(ticket_id, text)));
            state.log.reconcile(position, queued);
            Ok(())
        })
    }

    /// Closes the link and discards the transcript.
    pub fn close(&self) {
        self.inner.update(|state| {
            state.reset();
            state.channel_state = ChannelState::Closed;
        });
        tracing::info!("Ticket session closed");
    }

    /// Generation, ticket id and cached ticket, read together.
    pub(crate) fn current(&self) -> (u64, Option<String>, Option<Ticket>) {
        let state = self.inner.lock();
        (state.generation, state.ticket_id.clone(), state.ticket.clone())
    }

    /// Replaces the cached ticket with a REST result, if `generation` is current.
    pub(crate) fn apply_fetched(&self, generation: u64, ticket: Ticket) -> bool {
        self.inner.update_current(generation, |state| {
            state.ticket = Some(ticket);
        })
    }

    /// Appends a locally produced entry, if `generation` is current.
    pub(crate) fn note(&self, generation: u64, entry: ConversationEntry) -> bool {
        self.inner.update_current(generation, |state| {
            state.log.append(entry);
        })
    }
}

impl Drop for TicketSessionChannel {
    fn drop(&mut self) {
        let mut state = self.inner.lock();
        state.generation += 1;
        if let Some(link) = state.link.take() {
            link.close();
        }
    }
}

async fn dispatch(
    inner: Arc<Inner>,
    generation: u64,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
) {
    while let Some(event) = events.recv().await {
        if !inner.update_current(generation, |state| state.apply(event)) {
            tracing::debug!(generation, "Session superseded, dropping channel events");
            return;
        }
    }
}
