//! Credential-endpoint throttling.
//!
//! Fixed-window per-IP attempt counting for the register/login routes, so
//! password guessing is slowed without any shared infrastructure.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

// Bound on tracked IPs before stale windows are swept out.
const SWEEP_THRESHOLD: usize = 1024;

/// Per-IP attempt limiter with a fixed window.
#[derive(Clone)]
pub struct LoginThrottle {
    max_attempts: u32,
    window: Duration,
    state: Arc<Mutex<HashMap<IpAddr, Window>>>,
}

struct Window {
    attempts: u32,
    started: Instant,
}

impl LoginThrottle {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            state: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record one attempt. Returns the remaining wait when over budget.
    fn check(&self, ip: IpAddr) -> Option<Duration> {
        let mut state = self.state.lock();
        let now = Instant::now();

        if state.len() > SWEEP_THRESHOLD {
            let window = self.window;
            state.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = state.entry(ip).or_insert(Window {
            attempts: 0,
            started: now,
        });

        if now.duration_since(entry.started) >= self.window {
            entry.attempts = 0;
            entry.started = now;
        }

        entry.attempts += 1;
        if entry.attempts > self.max_attempts {
            Some(self.window - now.duration_since(entry.started))
        } else {
            None
        }
    }
}

pub async fn throttle_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(throttle): State<LoginThrottle>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = addr.ip();

    match throttle.check(ip) {
        None => next.run(request).await,
        Some(retry_after) => {
            warn!(ip = %ip, retry_after_secs = retry_after.as_secs(), "Throttled auth attempt");
            (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", retry_after.as_secs().max(1).to_string())],
                Json(serde_json::json!({ "message": "Too many attempts. Please slow down." })),
            )
                .into_response()
        }
    }
}
