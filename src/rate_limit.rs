// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed-window, per-client request limiting.
//!
//! Each client (keyed by peer IP) may make `max_requests` requests per
//! window. The first request after a window has elapsed opens a new one.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::RuntimeConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Upper bound on tracked clients. At capacity expired windows are pruned,
/// then the oldest live window is evicted to make room.
const MAX_TRACKED_CLIENTS: usize = 10_000;

const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

struct WindowState {
    started_at: Instant,
    count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    clients: Mutex<HashMap<String, WindowState>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(
            Duration::from_millis(config.rate_limit_window_ms()),
            config.rate_limit_max(),
        )
    }

    /// Count one request for `client` and decide whether it may proceed.
    pub async fn check(&self, client: &str) -> RateDecision {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;

        if clients.len() >= MAX_TRACKED_CLIENTS && !clients.contains_key(client) {
            let window = self.window;
            clients.retain(|_, state| now.duration_since(state.started_at) < window);

            // The oldest window is the one closest to resetting anyway.
            if clients.len() >= MAX_TRACKED_CLIENTS {
                let oldest = clients
                    .iter()
                    .min_by_key(|(_, state)| state.started_at)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    clients.remove(&oldest);
                }
            }
        }

        let state = clients
            .entry(client.to_string())
            .or_insert(WindowState {
                started_at: now,
                count: 0,
            });

        let elapsed = now.duration_since(state.started_at);
        if elapsed >= self.window {
            state.started_at = now;
            state.count = 0;
        }

        if state.count >= self.max_requests {
            return RateDecision::Limited {
                retry_after: self.window.saturating_sub(now.duration_since(state.started_at)),
            };
        }

        state.count += 1;
        RateDecision::Allowed {
            remaining: self.max_requests - state.count,
        }
    }
}

/// Reject clients that exceeded their window with 429.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match state.rate_limiter.check(&client).await {
        RateDecision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            response
                .headers_mut()
                .insert(RATE_LIMIT_REMAINING, HeaderValue::from(remaining));
            response
        }
        RateDecision::Limited { retry_after } => {
            tracing::warn!(client = %client, path = %request.uri().path(), "Rate limit exceeded");
            ApiError::too_many_requests(retry_after).into_response()
        }
    }
}
