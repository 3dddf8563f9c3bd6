//! Per-IP fixed-window rate limiting for the API.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::error::AppError;

/// Number of tracked clients above which expired windows are swept.
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: u64 },
}

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    trust_forwarded_for: bool,
    clients: DashMap<IpAddr, Window>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_secs.max(1)),
            trust_forwarded_for: config.trust_forwarded_for,
            clients: DashMap::new(),
        }
    }

    /// A limit of zero disables the limiter.
    pub fn is_enabled(&self) -> bool {
        self.max_requests > 0
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn check(&self, ip: IpAddr) -> Decision {
        self.check_at(ip, Instant::now())
    }

    /// Count one request from `ip` at `now`.
    pub fn check_at(&self, ip: IpAddr, now: Instant) -> Decision {
        if self.clients.len() > SWEEP_THRESHOLD {
            self.sweep(now);
        }

        let mut window = self.clients.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });
        let elapsed = now.saturating_duration_since(window.started);
        if elapsed >= self.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count >= self.max_requests {
            let left = self.window.saturating_sub(elapsed);
            let retry_after = left.as_secs() + u64::from(left.subsec_nanos() > 0);
            return Decision::Limited {
                retry_after: retry_after.max(1),
            };
        }

        window.count += 1;
        Decision::Allowed {
            remaining: self.max_requests - window.count,
        }
    }

    /// Forget clients whose window has expired.
    pub fn sweep(&self, now: Instant) {
        self.clients
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }

    fn client_ip(&self, req: &Request) -> Option<IpAddr> {
        if self.trust_forwarded_for {
            if let Some(ip) = forwarded_for(req.headers()) {
                return Some(ip);
            }
        }
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    }
}

/// First address of an `X-Forwarded-For` chain.
fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()?
        .trim()
        .parse()
        .ok()
}

/// Whether `path` falls under the `/api` prefix, matched or not.
pub fn is_api_path(path: &str) -> bool {
    path.strip_prefix("/api")
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Reject `/api` requests over the limit with `429 RATE_LIMITED`.
///
/// Counts every request under the prefix, including ones that end in
/// `ROUTE_NOT_FOUND`. Other paths pass through uncounted.
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !limiter.is_enabled() || !is_api_path(req.uri().path()) {
        return Ok(next.run(req).await);
    }
    let Some(ip) = limiter.client_ip(&req) else {
        return Ok(next.run(req).await);
    };

    match limiter.check(ip) {
        Decision::Limited { retry_after } => {
            tracing::warn!(ip = %ip, retry_after, "Rate limit exceeded");
            Err(AppError::RateLimited { retry_after })
        }
        Decision::Allowed { remaining } => {
            let mut res = next.run(req).await;
            let headers = res.headers_mut();
            headers.insert("x-ratelimit-limit", HeaderValue::from(limiter.max_requests()));
            headers.insert("x-ratelimit-remaining", HeaderValue::from(remaining));
            Ok(res)
        }
    }
}
