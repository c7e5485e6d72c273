use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use ticketdesk_application::{TicketSessionChannel, TicketViewController};
use ticketdesk_core::auth::TokenSource;
use ticketdesk_core::channel::{
    ChannelLink, ChannelState, ChannelTransport, InboundEvent, LinkHandle, OutboundEvent,
    TransportEvent,
};
use ticketdesk_core::conversation::Sender;
use ticketdesk_core::ticket::{
    FeedbackVerdict, NewTicket, PipelineStage, StateCounts, Ticket, TicketAction, TicketApi,
};
use ticketdesk_core::{DeskError, Result};
use tokio::sync::{Notify, mpsc};
use tokio_util::sync::CancellationToken;

// ============================================================================
// Fakes
// ============================================================================

struct Peer {
    events: mpsc::UnboundedSender<TransportEvent>,
    outbound: mpsc::UnboundedReceiver<OutboundEvent>,
}

impl Peer {
    fn push(&self, event: TransportEvent) {
        let _ = self.events.send(event);
    }

    fn sent(&mut self) -> Vec<OutboundEvent> {
        let mut sent = Vec::new();
        while let Ok(event) = self.outbound.try_recv() {
            sent.push(event);
        }
        sent
    }
}

#[derive(Default)]
struct LoopbackTransport {
    peers: Mutex<VecDeque<Peer>>,
}

impl LoopbackTransport {
    fn next_peer(&self) -> Peer {
        self.peers.lock().unwrap().pop_front().expect("no link opened")
    }
}

#[async_trait]
impl ChannelTransport for LoopbackTransport {
    async fn connect(&self) -> Result<ChannelLink> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        self.peers.lock().unwrap().push_back(Peer {
            events: event_tx,
            outbound: outbound_rx,
        });
        Ok(ChannelLink {
            events: event_rx,
            handle: LinkHandle::new(outbound_tx, CancellationToken::new()),
        })
    }
}

#[derive(Default)]
struct FakeTicketApi {
    tickets: Mutex<HashMap<String, Ticket>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    fetches: Mutex<Vec<String>>,
    feedback: Mutex<Vec<(String, FeedbackVerdict)>>,
    more_info: Mutex<Vec<(String, String)>>,
    fail_submissions: bool,
}

impl FakeTicketApi {
    fn with_ticket(ticket: Ticket) -> Self {
        let api = Self::default();
        api.put(ticket);
        api
    }

    fn put(&self, ticket: Ticket) {
        self.tickets
            .lock()
            .unwrap()
            .insert(ticket.id.clone(), ticket);
    }

    fn hold(&self, ticket_id: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(ticket_id.to_string(), gate.clone());
        gate
    }

    fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

#[async_trait]
impl TicketApi for FakeTicketApi {
    async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        Ok(self.tickets.lock().unwrap().values().cloned().collect())
    }

    async fn get_ticket(&self, ticket_id: &str) -> Result<Ticket> {
        self.fetches.lock().unwrap().push(ticket_id.to_string());
        let gate = self.gates.lock().unwrap().get(ticket_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.tickets
            .lock()
            .unwrap()
            .get(ticket_id)
            .cloned()
            .ok_or_else(|| DeskError::rejected(404, "Ticket not found"))
    }

    async fn create_ticket(&self, _ticket: &NewTicket) -> Result<serde_json::Value> {
        Ok(serde_json::json!({"status": "success"}))
    }

    async fn submit_feedback(&self, ticket_id: &str, verdict: FeedbackVerdict) -> Result<()> {
        if self.fail_submissions {
            return Err(DeskError::transport_status(500, "db down"));
        }
        self.feedback
            .lock()
            .unwrap()
            .push((ticket_id.to_string(), verdict));
        Ok(())
    }

    async fn submit_more_info(&self, ticket_id: &str, additional_info: &str) -> Result<()> {
        if self.fail_submissions {
            return Err(DeskError::transport_status(500, "db down"));
        }
        self.more_info
            .lock()
            .unwrap()
            .push((ticket_id.to_string(), additional_info.to_string()));
        Ok(())
    }

    async fn state_counts(&self, _state: Option<&str>) -> Result<StateCounts> {
        Ok(StateCounts::new())
    }
}

struct FakeTokens {
    calls: AtomicUsize,
    expired: bool,
}

impl FakeTokens {
    fn new(expired: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            expired,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenSource for FakeTokens {
    async fn valid_token(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.expired {
            Err(DeskError::session_expired("refresh rejected"))
        } else {
            Ok("a1".to_string())
        }
    }
}

fn controller(api: Arc<FakeTicketApi>) -> (TicketViewController, Arc<LoopbackTransport>) {
    let transport = Arc::new(LoopbackTransport::default());
    let channel = TicketSessionChannel::new(transport.clone());
    (TicketViewController::new(api, channel), transport)
}

async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_open_ticket_loads_and_joins() {
    let api = Arc::new(FakeTicketApi::with_ticket(
        Ticket::new("INC1", "Passed to L3, Processing").with_resolution("Patched"),
    ));
    let (controller, transport) = controller(api.clone());

    controller.open_ticket("INC1").await.unwrap();
    let mut peer = transport.next_peer();
    peer.push(TransportEvent::Connected);
    settle().await;

    let view = controller.view();
    assert_eq!(view.channel_state, ChannelState::Joined);
    assert_eq!(
        view.pipeline.unwrap().stage_list(),
        vec![
            PipelineStage::L1,
            PipelineStage::L2,
            PipelineStage::L3,
            PipelineStage::Resolved
        ]
    );
    assert_eq!(peer.sent(), vec![OutboundEvent::join("INC1")]);
    assert_eq!(api.fetch_count(), 1);
}

#[tokio::test]
async fn test_load_failure_is_reported_in_transcript() {
    let api = Arc::new(FakeTicketApi::default());
    let (controller, _transport) = controller(api);

    let err = controller.open_ticket("missing").await.unwrap_err();
    assert!(err.is_not_found());

    let view = controller.view();
    assert_eq!(view.entries.len(), 1);
    assert!(view.entries[0].is_error);
    assert_eq!(
        view.entries[0].text(),
        Some("Failed to load ticket details. Please try again later.")
    );
}

#[tokio::test]
async fn test_switching_tickets_discards_the_late_fetch() {
    let api = Arc::new(FakeTicketApi::default());
    api.put(Ticket::new("T1", "new"));
    api.put(Ticket::new("T2", "feedback_needed"));
    let gate = api.hold("T1");
    let (controller, transport) = controller(api.clone());

    let switch = async {
        while api.fetch_count() == 0 {
            tokio::task::yield_now().await;
        }
        controller.open_ticket("T2").await.unwrap();
        gate.notify_one();
    };
    let (first, ()) = tokio::join!(controller.open_ticket("T1"), switch);
    first.unwrap();

    let stale = transport.next_peer();
    stale.push(TransportEvent::Inbound(InboundEvent::Snapshot(Ticket::new(
        "T1", "new",
    ))));
    settle().await;

    let view = controller.view();
    assert_eq!(view.ticket_id.as_deref(), Some("T2"));
    assert_eq!(view.ticket.as_ref().unwrap().id, "T2");
    assert!(view.entries.is_empty());
    assert_eq!(view.actions, vec![TicketAction::SubmitFeedback]);
}

#[tokio::test]
async fn test_feedback_is_gated_on_status() {
    let api = Arc::new(FakeTicketApi::with_ticket(Ticket::new("T1", "new")));
    let (controller, _transport) = controller(api.clone());
    controller.open_ticket("T1").await.unwrap();

    let err = controller
        .submit_feedback(FeedbackVerdict::Helpful)
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::ActionNotAllowed { .. }));
    assert!(api.feedback.lock().unwrap().is_empty());

    let err = controller.submit_more_info("details").await.unwrap_err();
    assert!(matches!(err, DeskError::ActionNotAllowed { .. }));
}

#[tokio::test]
async fn test_feedback_submission_notes_and_reloads() {
    let api = Arc::new(FakeTicketApi::with_ticket(Ticket::new(
        "T1",
        "feedback_needed",
    )));
    let (controller, transport) = controller(api.clone());
    controller.open_ticket("T1").await.unwrap();
    let mut peer = transport.next_peer();
    peer.push(TransportEvent::Connected);
    settle().await;
    peer.sent();

    api.put(Ticket::new("T1", "feedback_received"));
    controller
        .submit_feedback(FeedbackVerdict::NotHelpful)
        .await
        .unwrap();

    assert_eq!(
        *api.feedback.lock().unwrap(),
        vec![("T1".to_string(), FeedbackVerdict::NotHelpful)]
    );
    assert_eq!(api.fetch_count(), 2);

    let view = controller.view();
    assert_eq!(view.entries[0].sender, Sender::User);
    assert_eq!(
        view.entries[0].text(),
        Some("Feedback submitted: Resolution was not helpful")
    );
    assert_eq!(view.ticket.unwrap().status, "feedback_received");
    assert!(view.actions.is_empty());
    assert_eq!(peer.sent(), vec![OutboundEvent::join("T1")]);
}

#[tokio::test]
async fn test_failed_submission_is_reported() {
    let api = Arc::new(FakeTicketApi {
        fail_submissions: true,
        ..FakeTicketApi::default()
    });
    api.put(Ticket::new("T1", "more_info_needed"));
    let (controller, _transport) = controller(api.clone());
    controller.open_ticket("T1").await.unwrap();

    let err = controller.submit_more_info("logs attached").await.unwrap_err();
    assert!(err.is_transport());

    let view = controller.view();
    assert_eq!(
        view.entries.last().unwrap().text(),
        Some("Failed to submit additional information. Please try again.")
    );
    assert!(view.entries.last().unwrap().is_error);
}

#[tokio::test]
async fn test_more_info_submission() {
    let api = Arc::new(FakeTicketApi::with_ticket(Ticket::new(
        "T1",
        "More_Info_Needed",
    )));
    let (controller, _transport) = controller(api.clone());
    controller.open_ticket("T1").await.unwrap();

    let err = controller.submit_more_info("   ").await.unwrap_err();
    assert!(matches!(err, DeskError::Validation(_)));

    controller
        .submit_more_info("  logs attached\n")
        .await
        .unwrap();
    assert_eq!(
        *api.more_info.lock().unwrap(),
        vec![("T1".to_string(), "  logs attached\n".to_string())]
    );
    assert_eq!(
        controller.view().entries[0].text(),
        Some("Additional information provided:   logs attached\n")
    );
}

#[tokio::test]
async fn test_open_validates_session_before_connecting() {
    let api = Arc::new(FakeTicketApi::with_ticket(Ticket::new("T1", "new")));
    let tokens = Arc::new(FakeTokens::new(false));
    let transport = Arc::new(LoopbackTransport::default());
    let controller =
        TicketViewController::new(api.clone(), TicketSessionChannel::new(transport.clone()))
            .with_token_source(tokens.clone());

    controller.open_ticket("T1").await.unwrap();
    assert_eq!(tokens.calls(), 1);
    assert_eq!(transport.peers.lock().unwrap().len(), 1);

    controller.ensure_session().await.unwrap();
    assert_eq!(tokens.calls(), 2);
}

#[tokio::test]
async fn test_expired_session_does_not_open_channel() {
    let api = Arc::new(FakeTicketApi::with_ticket(Ticket::new("T1", "new")));
    let tokens = Arc::new(FakeTokens::new(true));
    let transport = Arc::new(LoopbackTransport::default());
    let controller =
        TicketViewController::new(api.clone(), TicketSessionChannel::new(transport.clone()))
            .with_token_source(tokens.clone());

    let err = controller.open_ticket("T1").await.unwrap_err();
    assert!(err.is_session_expired());
    assert!(transport.peers.lock().unwrap().is_empty());
    assert_eq!(api.fetch_count(), 0);
    assert_eq!(controller.view().channel_state, ChannelState::Disconnected);
}
