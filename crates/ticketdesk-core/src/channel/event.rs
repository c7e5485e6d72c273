use crate::ticket::Ticket;
use serde::{Deserialize, Serialize};

/// Frame pushed by the server: `{"event": ..., "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerFrame {
    Message(ServerMessage),
    Error { message: String },
}

/// Payload of a server `message` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    TicketDetails { ticket: Ticket },
    Text { text: String },
}

/// Inbound event after demultiplexing, consumed by the session dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// A fresh ticket snapshot (`ticket_details`).
    Snapshot(Ticket),
    /// Agent chat text.
    Text(String),
    /// Error pushed by the peer.
    Error(String),
}

impl InboundEvent {
    /// Decodes a text frame.
    ///
    /// Returns `None` for frames that are not part of the ticket protocol.
    pub fn decode(raw: &str) -> Option<Self> {
        match serde_json::from_str::<ServerFrame>(raw) {
            Ok(frame) => Some(frame.into()),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unrecognized channel frame");
                None
            }
        }
    }
}

impl From<ServerFrame> for InboundEvent {
    fn from(frame: ServerFrame) -> Self {
        match frame {
            ServerFrame::Message(ServerMessage::TicketDetails { ticket }) => {
                InboundEvent::Snapshot(ticket)
            }
            ServerFrame::Message(ServerMessage::Text { text }) => InboundEvent::Text(text),
            ServerFrame::Error { message } => InboundEvent::Error(message),
        }
    }
}

/// Event emitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundEvent {
    Join { ticket_id: String },
    Message { ticket_id: String, message: String },
}

impl OutboundEvent {
    pub fn join(ticket_id: impl Into<String>) -> Self {
        Self::Join {
            ticket_id: ticket_id.into(),
        }
    }

    pub fn message(ticket_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Message {
            ticket_id: ticket_id.into(),
            message: message.into(),
        }
    }

    pub fn ticket_id(&self) -> &str {
        match self {
            OutboundEvent::Join { ticket_id } | OutboundEvent::Message { ticket_id, .. } => {
                ticket_id
            }
        }
    }

    pub fn encode(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ticket_details() {
        let raw = r#"{"event":"message","data":{"type":"ticket_details","ticket":{"id":"T1","status":"new","description":"Disk full"}}}"#;
        match InboundEvent::decode(raw) {
            Some(InboundEvent::Snapshot(ticket)) => {
                assert_eq!(ticket.id, "T1");
                assert_eq!(ticket.status, "new");
            }
            other => panic!("Expected snapshot, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_text_and_error() {
        let text = r#"{"event":"message","data":{"type":"text","text":"Try restarting."}}"#;
        assert_eq!(
            InboundEvent::decode(text),
            Some(InboundEvent::Text("Try restarting.".to_string()))
        );

        let error = r#"{"event":"error","data":{"message":"Ticket not found"}}"#;
        assert_eq!(
            InboundEvent::decode(error),
            Some(InboundEvent::Error("Ticket not found".to_string()))
        );
    }

    #[test]
    fn test_decode_ignores_foreign_frames() {
        assert_eq!(InboundEvent::decode(r#"{"event":"ticket_update","data":{}}"#), None);
        assert_eq!(InboundEvent::decode("not json"), None);
    }

    #[test]
    fn test_encode_outbound() {
        let join = OutboundEvent::join("T1").encode().unwrap();
        assert_eq!(join, r#"{"event":"join","data":{"ticket_id":"T1"}}"#);

        let message = OutboundEvent::message("T1", "hello").encode().unwrap();
        assert_eq!(
            message,
            r#"{"event":"message","data":{"ticket_id":"T1","message":"hello"}}"#
        );
    }
}
