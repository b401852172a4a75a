//! Fixed-window request limiting keyed by client address.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::middleware::Next;
use actix_web::web;

use crate::routes::ApiError;

pub const API_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later.";
pub const CONTACT_LIMIT_MESSAGE: &str =
    "Too many contact form submissions. Please try again in 15 minutes.";
pub const CONTACT_MAX_REQUESTS: u32 = 5;
pub const CONTACT_WINDOW: Duration = Duration::from_secs(15 * 60);

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Requests counted for one client since `started`.
#[derive(Debug, Clone, Copy)]
pub struct RateWindow {
    pub count: u32,
    pub started: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32, reset_after: Duration },
    Limited { retry_after: Duration },
}

struct WindowStore {
    windows: HashMap<String, RateWindow>,
    last_sweep: Instant,
}

pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    sweep_threshold: usize,
    rejection_message: &'static str,
    store: Mutex<WindowStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(
        max_requests: u32,
        window: Duration,
        sweep_threshold: usize,
        rejection_message: &'static str,
    ) -> Self {
        Self::with_clock(
            max_requests,
            window,
            sweep_threshold,
            rejection_message,
            Arc::new(SystemClock),
        )
    }

    pub fn with_clock(
        max_requests: u32,
        window: Duration,
        sweep_threshold: usize,
        rejection_message: &'static str,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = WindowStore {
            windows: HashMap::new(),
            last_sweep: clock.now(),
        };
        Self {
            max_requests,
            window,
            sweep_threshold,
            rejection_message,
            store: Mutex::new(store),
            clock,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn rejection_message(&self) -> &'static str {
        self.rejection_message
    }

    /// Counts one request from `key`. The window restarts once `window` has
    /// elapsed since its first counted request.
    ///
    /// Expired windows are swept when the store is full, at most once per
    /// `window`.
    pub fn check(&self, key: &str) -> Decision {
        let now = self.clock.now();
        let mut store = self.store.lock().expect("rate limiter mutex poisoned");

        if store.windows.len() >= self.sweep_threshold
            && now.duration_since(store.last_sweep) >= self.window
            && !store.windows.contains_key(key)
        {
            let window = self.window;
            store.windows.retain(|_, w| now.duration_since(w.started) < window);
            store.last_sweep = now;
        }

        let entry = store.windows.entry(key.to_owned()).or_insert(RateWindow {
            count: 0,
            started: now,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = RateWindow {
                count: 0,
                started: now,
            };
        }

        let reset_after = self.window.saturating_sub(now.duration_since(entry.started));
        if entry.count >= self.max_requests {
            return Decision::Limited {
                retry_after: reset_after,
            };
        }

        entry.count += 1;
        Decision::Allowed {
            remaining: self.max_requests - entry.count,
            reset_after,
        }
    }

    pub fn tracked_clients(&self) -> usize {
        self.store
            .lock()
            .expect("rate limiter mutex poisoned")
            .windows
            .len()
    }
}

/// General limit applied to every `/api` route except the liveness probe.
pub struct ApiRateLimiter(pub RateLimiter);

/// Stricter limit on contact form submissions.
pub struct ContactRateLimiter(pub RateLimiter);

impl AsRef<RateLimiter> for ApiRateLimiter {
    fn as_ref(&self) -> &RateLimiter {
        &self.0
    }
}

impl AsRef<RateLimiter> for ContactRateLimiter {
    fn as_ref(&self) -> &RateLimiter {
        &self.0
    }
}

pub async fn api_rate_limit(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    enforce::<ApiRateLimiter>(req, next).await
}

pub async fn contact_rate_limit(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    enforce::<ContactRateLimiter>(req, next).await
}

async fn enforce<L>(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error>
where
    L: AsRef<RateLimiter> + 'static,
{
    let Some(limiter) = req.app_data::<web::Data<L>>().cloned() else {
        return Ok(next.call(req).await?.map_into_left_body::<BoxBody>());
    };
    let limiter = limiter.get_ref().as_ref();
    let client = client_key(req.peer_addr());

    match limiter.check(&client) {
        Decision::Allowed {
            remaining,
            reset_after,
        } => {
            let mut response = next.call(req).await?;
            let headers = response.headers_mut();
            headers.insert(
                HeaderName::from_static("ratelimit-limit"),
                HeaderValue::from(limiter.max_requests()),
            );
            headers.insert(
                HeaderName::from_static("ratelimit-remaining"),
                HeaderValue::from(remaining),
            );
            headers.insert(
                HeaderName::from_static("ratelimit-reset"),
                HeaderValue::from(reset_after.as_secs()),
            );
            Ok(response.map_into_left_body::<BoxBody>())
        }
        Decision::Limited { retry_after } => {
            tracing::warn!(client = %client, "Rate limit exceeded");
            let error = ApiError::RateLimited {
                message: limiter.rejection_message(),
                retry_after,
            };
            Ok(req.error_response(error).map_into_right_body())
        }
    }
}

/// Key a client is counted under: its peer IP, or `"unknown"`.
pub fn client_key(peer: Option<SocketAddr>) -> String {
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".into())
}
