//! WebSocket transport for ticket session channels.
//!
//! One background task per link owns the socket. It reconnects after every
//! failure or drop, doubling the pause up to a cap and starting over once a
//! connection succeeds, until the link's shutdown token is cancelled or its
//! handle is dropped.
//!
//! The handshake carries whatever access token is stored at that moment. The
//! transport only reads credentials; callers keep the stored token fresh
//! (see `TokenLifecycleManager::ensure_valid`).

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use ticketdesk_core::channel::{
    ChannelLink, ChannelTransport, InboundEvent, LinkHandle, OutboundEvent, TransportEvent,
};
use ticketdesk_core::credentials::CredentialReader;
use ticketdesk_core::{DeskError, Result};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Pause before the first reconnection attempt of an outage.
pub const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Longest pause between reconnection attempts.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// [`ChannelTransport`] over a WebSocket to the service host.
pub struct WebSocketTransport {
    url: Url,
    credentials: Arc<dyn CredentialReader>,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl WebSocketTransport {
    pub fn new(url: Url, credentials: Arc<dyn CredentialReader>) -> Self {
        Self {
            url,
            credentials,
            initial_backoff: INITIAL_BACKOFF,
            max_backoff: MAX_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max.max(initial);
        self
    }
}

#[async_trait]
impl ChannelTransport for WebSocketTransport {
    async fn connect(&self) -> Result<ChannelLink> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let worker = LinkWorker {
            url: self.url.clone(),
            credentials: self.credentials.clone(),
            initial_backoff: self.initial_backoff,
            max_backoff: self.max_backoff,
            backoff: self.initial_backoff,
            events: event_tx,
            shutdown: shutdown.clone(),
        };
        tokio::spawn(worker.run(outbound_rx));

        Ok(ChannelLink {
            events: event_rx,
            handle: LinkHandle::new(outbound_tx, shutdown),
        })
    }
}

/// Why a connected socket stopped.
enum Disconnect {
    /// The session side went away; stop for good.
    Shutdown,
    /// The socket dropped; try again.
    Lost(String),
}

struct LinkWorker {
    url: Url,
    credentials: Arc<dyn CredentialReader>,
    initial_backoff: Duration,
    max_backoff: Duration,
    /// Pause before the next attempt.
    backoff: Duration,
    events: mpsc::UnboundedSender<TransportEvent>,
    shutdown: CancellationToken,
}

impl LinkWorker {
    async fn run(mut self, mut outbound: mpsc::UnboundedReceiver<OutboundEvent>) {
        while !self.shutdown.is_cancelled() {
            let request = match self.handshake_request() {
                Ok(request) => request,
                Err(e) => {
                    if !self.report_failure(e.to_string()).await {
                        break;
                    }
                    continue;
                }
            };

            let connected = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = connect_async(request) => result,
            };
            let socket = match connected {
                Ok((socket, _)) => socket,
                Err(e) => {
                    if !self.report_failure(e.to_string()).await {
                        break;
                    }
                    continue;
                }
            };

            tracing::debug!(url = %self.url, "Channel connected");
            self.backoff = self.initial_backoff;
            if self.events.send(TransportEvent::Connected).is_err() {
                break;
            }

            let (mut sink, mut stream) = socket.split();
            let disconnect = loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => break Disconnect::Shutdown,
                    outgoing = outbound.recv() => {
                        let Some(event) = outgoing else {
                            break Disconnect::Shutdown;
                        };
                        match event.encode() {
                            Ok(text) => {
                                if let Err(e) = sink.send(Message::Text(text)).await {
                                    break Disconnect::Lost(e.to_string());
                                }
                            }
                            Err(e) => tracing::warn!(error = %e, "Dropping unencodable channel event"),
                        }
                    }
                    incoming = stream.next() => match incoming {
                        Some(Ok(Message::Text(text))) => {
                            if let Some(event) = InboundEvent::decode(&text)
                                && self.events.send(TransportEvent::Inbound(event)).is_err()
                            {
                                break Disconnect::Shutdown;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            break Disconnect::Lost("closed by peer".to_string());
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => break Disconnect::Lost(e.to_string()),
                    },
                }
            };

            let _ = sink.close().await;
            match disconnect {
                Disconnect::Shutdown => break,
                Disconnect::Lost(reason) => {
                    tracing::warn!(url = %self.url, reason = %reason, "Channel disconnected");
                    if self
                        .events
                        .send(TransportEvent::Disconnected { reason })
                        .is_err()
                        || !self.pause().await
                    {
                        break;
                    }
                }
            }
        }
        tracing::debug!(url = %self.url, "Channel link closed");
    }

    fn handshake_request(&self) -> Result<Request> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| DeskError::channel(e.to_string()))?;
        if let Some(token) = self.credentials.access_token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| DeskError::channel("access token is not a valid header value"))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Ok(request)
    }

    /// Reports a failed attempt and waits out the backoff.
    /// Returns `false` when the link should stop.
    async fn report_failure(&mut self, message: String) -> bool {
        tracing::warn!(
            url = %self.url,
            error = %message,
            retry_in_ms = self.backoff.as_millis() as u64,
            "Channel connection failed"
        );
        if self
            .events
            .send(TransportEvent::ConnectFailed { message })
            .is_err()
        {
            return false;
        }
        self.pause().await
    }

    async fn pause(&mut self) -> bool {
        let delay = self.backoff;
        self.backoff = next_backoff(delay, self.max_backoff);
        tokio::select! {
            _ = self.shutdown.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}

fn next_backoff(current: Duration, max: Duration) -> Duration {
    (current + current).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;
    use ticketdesk_core::credentials::{CredentialWriter, Credentials};
    use ticketdesk_infrastructure::MemoryCredentialStore;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_hdr_async;
    use tokio_tungstenite::tungstenite::handshake::server::{
        ErrorResponse, Request as ServerRequest, Response,
    };

    fn credentials() -> Arc<MemoryCredentialStore> {
        let store = Arc::new(MemoryCredentialStore::new());
        store
            .replace(Credentials::issued("a1", "r1", Utc::now()))
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_joins_and_receives_frames_with_bearer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen_auth = Arc::new(Mutex::new(None));

        let server_auth = seen_auth.clone();
        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let callback = |req: &ServerRequest,
                            resp: Response|
             -> std::result::Result<Response, ErrorResponse> {
                *server_auth.lock().unwrap() = req
                    .headers()
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                Ok(resp)
            };
            let mut ws = accept_hdr_async(tcp, callback).await.unwrap();

            let join = match ws.next().await {
                Some(Ok(Message::Text(text))) => text,
                other => panic!("expected join frame, got {other:?}"),
            };
            ws.send(Message::Text(
                r#"{"event":"message","data":{"type":"text","text":"hi there"}}"#.to_string(),
            ))
            .await
            .unwrap();
            join
        });

        let transport = WebSocketTransport::new(
            Url::parse(&format!("ws://{}", addr)).unwrap(),
            credentials(),
        );
        let mut link = transport.connect().await.unwrap();

        assert_eq!(link.events.recv().await, Some(TransportEvent::Connected));
        assert!(link.handle.send(OutboundEvent::join("T1")));
        assert_eq!(
            link.events.recv().await,
            Some(TransportEvent::Inbound(InboundEvent::Text(
                "hi there".to_string()
            )))
        );

        let join = server.await.unwrap();
        assert_eq!(join, r#"{"event":"join","data":{"ticket_id":"T1"}}"#);
        assert_eq!(seen_auth.lock().unwrap().as_deref(), Some("Bearer a1"));
        link.handle.close();
    }

    #[tokio::test]
    async fn test_unreachable_peer_reports_connect_failures() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = WebSocketTransport::new(
            Url::parse(&format!("ws://{}", addr)).unwrap(),
            credentials(),
        )
        .with_backoff(Duration::from_millis(10), Duration::from_millis(40));
        let mut link = transport.connect().await.unwrap();

        for _ in 0..2 {
            match link.events.recv().await {
                Some(TransportEvent::ConnectFailed { .. }) => {}
                other => panic!("expected connect failure, got {other:?}"),
            }
        }

        let token = link.handle.shutdown_token();
        drop(link);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let max = Duration::from_secs(30);
        let mut delay = INITIAL_BACKOFF;
        let mut seen = Vec::new();
        for _ in 0..7 {
            seen.push(delay.as_secs());
            delay = next_backoff(delay, max);
        }
        assert_eq!(seen, vec![1, 2, 4, 8, 16, 30, 30]);
    }
}
