//! Hand-written fakes shared by the unit tests in this crate.

use crate::http::{ApiRequest, ApiResponse, HttpExecutor};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use ticketdesk_core::auth::{AuthApi, LoginRequest, TokenGrant};
use ticketdesk_core::clock::Clock;
use ticketdesk_core::{DeskError, Result};

/// Replays canned responses in order and records every call.
pub struct ScriptedExecutor {
    responses: Mutex<VecDeque<Result<ApiResponse>>>,
    calls: Mutex<Vec<(ApiRequest, Option<String>)>>,
}

impl ScriptedExecutor {
    pub fn new(responses: Vec<Result<ApiResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(ApiRequest, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpExecutor for ScriptedExecutor {
    async fn execute(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((request.clone(), bearer.map(str::to_string)));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DeskError::internal("no scripted response left")))
    }
}

/// `AuthApi` whose refresh hands out `fresh-1`, `fresh-2`, ...
pub struct CountingAuth {
    refresh_calls: AtomicUsize,
    fail_refresh: bool,
    delay: Duration,
}

impl CountingAuth {
    pub fn new() -> Self {
        Self {
            refresh_calls: AtomicUsize::new(0),
            fail_refresh: false,
            delay: Duration::ZERO,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_refresh: true,
            ..Self::new()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for CountingAuth {
    async fn register(&self, _request: &LoginRequest) -> Result<()> {
        Ok(())
    }

    async fn login(&self, _request: &LoginRequest) -> Result<TokenGrant> {
        Ok(TokenGrant {
            access_token: "a1".to_string(),
            refresh_token: "r1".to_string(),
        })
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<String> {
        let call = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_refresh {
            Err(DeskError::session_expired("refresh rejected"))
        } else {
            Ok(format!("fresh-{call}"))
        }
    }

    async fn logout(&self, _refresh_token: &str) -> Result<()> {
        Ok(())
    }
}

/// Clock pinned to an instant that tests move by hand.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
