pub mod auth;
pub mod chat;
pub mod render;
pub mod tickets;

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::path::Path;
use std::sync::Arc;
use ticketdesk_application::{AuthService, TicketSessionChannel, TicketViewController};
use ticketdesk_core::clock::SystemClock;
use ticketdesk_core::config::ClientConfig;
use ticketdesk_core::credentials::CredentialReader;
use ticketdesk_core::ticket::FeedbackVerdict;
use ticketdesk_infrastructure::{ConfigService, DeskPaths, FileCredentialStore};
use ticketdesk_interaction::{
    AuthenticatedGateway, HttpAuthClient, HttpTicketApi, ReqwestExecutor, TokenLifecycleManager,
    WebSocketTransport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Verdict {
    Yes,
    No,
}

impl From<Verdict> for FeedbackVerdict {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Yes => FeedbackVerdict::Helpful,
            Verdict::No => FeedbackVerdict::NotHelpful,
        }
    }
}

/// Process-wide wiring: one credential store shared by every component.
pub struct App {
    pub config: ClientConfig,
    pub store: Arc<FileCredentialStore>,
    pub auth: AuthService,
    pub tickets: Arc<HttpTicketApi>,
    pub tokens: Arc<TokenLifecycleManager>,
}

impl App {
    pub fn load(config_dir: Option<&Path>) -> Result<Self> {
        let paths = DeskPaths::new(config_dir);
        let config = ConfigService::new(paths.clone())
            .get_config()
            .context("Failed to load client configuration")?;
        let store = Arc::new(
            FileCredentialStore::open(&paths).context("Failed to open credential store")?,
        );

        let http = Arc::new(ReqwestExecutor::new(config.request_timeout));
        let auth_client = Arc::new(HttpAuthClient::new(config.clone(), http.clone()));
        let clock = Arc::new(SystemClock);

        let tokens = Arc::new(TokenLifecycleManager::new(
            store.clone(),
            auth_client.clone(),
            clock.clone(),
        ));
        let gateway = Arc::new(AuthenticatedGateway::new(tokens.clone(), http));
        let tickets = Arc::new(HttpTicketApi::new(config.clone(), gateway));
        let auth = AuthService::new(auth_client, store.clone(), clock);

        tracing::debug!(
            api = %config.api_base_url,
            signed_in = store.access_token().is_some(),
            "Client wired"
        );

        Ok(Self {
            config,
            store,
            auth,
            tickets,
            tokens,
        })
    }

    /// Builds a view controller with its own real-time channel.
    pub fn view_controller(&self) -> Result<TicketViewController> {
        let url = self
            .config
            .channel_url()
            .context("Failed to derive channel URL")?;
        tracing::debug!(%url, "Preparing real-time channel");
        let transport = Arc::new(WebSocketTransport::new(url, self.store.clone()));
        Ok(TicketViewController::new(
            self.tickets.clone(),
            TicketSessionChannel::new(transport),
        )
        .with_token_source(self.tokens.clone()))
    }
}

/// Adds a re-login hint to expired-session errors.
pub fn explain(err: ticketdesk_core::DeskError) -> anyhow::Error {
    if err.is_session_expired() {
        anyhow::Error::new(err).context("Your session has ended, please run `ticketdesk login` again")
    } else {
        anyhow::Error::new(err)
    }
}
