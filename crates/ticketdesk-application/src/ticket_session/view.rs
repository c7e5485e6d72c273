use ticketdesk_core::channel::ChannelState;
use ticketdesk_core::conversation::ConversationEntry;
use ticketdesk_core::ticket::{Pipeline, Ticket, TicketAction};

/// Everything an observer needs to render one ticket session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    /// Bumped every time a ticket is opened or the session is closed.
    pub generation: u64,
    pub ticket_id: Option<String>,
    pub ticket: Option<Ticket>,
    /// Derived from `ticket`; `None` until a ticket is known.
    pub pipeline: Option<Pipeline>,
    pub actions: Vec<TicketAction>,
    pub entries: Vec<ConversationEntry>,
    pub channel_state: ChannelState,
}

impl Default for SessionView {
    fn default() -> Self {
        Self {
            generation: 0,
            ticket_id: None,
            ticket: None,
            pipeline: None,
            actions: Vec::new(),
            entries: Vec::new(),
            channel_state: ChannelState::Disconnected,
        }
    }
}

impl SessionView {
    pub fn is_joined(&self) -> bool {
        self.channel_state == ChannelState::Joined
    }

    pub fn summary_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_summary()).count()
    }
}
