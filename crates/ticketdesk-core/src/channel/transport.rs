use super::event::{InboundEvent, OutboundEvent};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Lifecycle of one ticket session channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Joined,
    /// Terminal for a channel instance.
    Closed,
}

/// What the transport reports to the session dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Connection (re-)established; the session must (re-)join.
    Connected,
    /// Connection lost; the transport will try again on its own.
    Disconnected { reason: String },
    /// A connection attempt failed; the transport will try again on its own.
    ConnectFailed { message: String },
    Inbound(InboundEvent),
}

/// Sending half of an open link.
///
/// Dropping the handle shuts the link down, so a session that goes away
/// for any reason never leaves the connection running.
#[derive(Debug)]
pub struct LinkHandle {
    outbound: mpsc::UnboundedSender<OutboundEvent>,
    shutdown: CancellationToken,
}

impl LinkHandle {
    pub fn new(
        outbound: mpsc::UnboundedSender<OutboundEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        Self { outbound, shutdown }
    }

    /// Queues an event for the peer. Returns `false` if the link is gone.
    pub fn send(&self, event: OutboundEvent) -> bool {
        !self.shutdown.is_cancelled() && self.outbound.send(event).is_ok()
    }

    pub fn close(&self) {
        self.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Token cancelled when this link closes.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

impl Drop for LinkHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// An open link: inbound events plus the handle that owns the connection.
pub struct ChannelLink {
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
    pub handle: LinkHandle,
}

/// Opens persistent connections to the real-time peer.
///
/// Implementations own reconnection: after a drop they keep retrying and
/// report each new connection with [`TransportEvent::Connected`], until the
/// link's shutdown token is cancelled.
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    async fn connect(&self) -> Result<ChannelLink>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropping_handle_cancels_link() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let handle = LinkHandle::new(tx, token.clone());

        assert!(handle.send(OutboundEvent::join("T1")));
        drop(handle);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_closed_handle_refuses_sends() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = LinkHandle::new(tx, CancellationToken::new());

        handle.close();
        assert!(!handle.send(OutboundEvent::join("T1")));
        assert!(rx.try_recv().is_err());
    }
}
