use super::entry::{ConversationEntry, Delivery, TicketSummary};

/// Ordered, append-only transcript.
///
/// Entries keep the order in which their triggering events were observed.
/// The only in-place change allowed is moving an outbound entry's delivery
/// state forward.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    entries: Vec<ConversationEntry>,
    summary_emitted: bool,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and returns its position.
    pub fn append(&mut self, entry: ConversationEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Appends the ticket summary the first time only.
    ///
    /// Returns `false` when a summary was already emitted for this log.
    pub fn append_summary_once(&mut self, summary: TicketSummary) -> bool {
        if self.summary_emitted {
            return false;
        }
        self.summary_emitted = true;
        self.append(ConversationEntry::summary(summary));
        true
    }

    /// Records whether the entry at `position` was queued on a live link.
    ///
    /// Only `Pending` entries are updated.
    pub fn reconcile(&mut self, position: usize, queued: bool) {
        if let Some(entry) = self.entries.get_mut(position)
            && entry.delivery == Delivery::Pending
        {
            entry.delivery = if queued {
                Delivery::Queued
            } else {
                Delivery::Unsent
            };
        }
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary_emitted(&self) -> bool {
        self.summary_emitted
    }
}
