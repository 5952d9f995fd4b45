use std::future;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use moka::future::Cache;
use moka::ops::compute::Op;

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60_000);
pub const DEFAULT_MAX_REQUESTS: u32 = 60;
pub const DEFAULT_MAX_CLIENTS: u64 = 100_000;

/// Identity used when neither a forwarded-for header nor a peer address is
/// available.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Rate limiter configuration
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Length of each client's window
    pub window: Duration,
    /// Maximum requests per window. Zero rejects every request.
    pub max_requests: u32,
    /// Upper bound on tracked clients
    pub max_clients: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            max_requests: DEFAULT_MAX_REQUESTS,
            max_clients: DEFAULT_MAX_CLIENTS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RateEntry {
    count: u32,
    window_start: Instant,
}

/// Result of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed {
        /// Requests left in the current window
        remaining: u32,
    },
    Limited {
        /// Time until the client's window resets
        retry_after: Duration,
    },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Fixed-window limiter keyed by client identity.
///
/// Each client's window starts at its first request and resets (rather than
/// slides) once it has elapsed, so windows are independent per client.
/// Entries live in a bounded cache and expire one window after their last
/// write.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    entries: Cache<String, RateEntry>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_clients)
            .time_to_live(config.window)
            .build();

        Self { config, entries }
    }

    /// Record a request from `client` and decide whether it may proceed.
    pub async fn check(&self, client: &str) -> RateDecision {
        self.check_at(client, Instant::now()).await
    }

    /// [`check`](Self::check) with an explicit clock reading.
    ///
    /// A rejected request leaves the window unchanged.
    pub async fn check_at(&self, client: &str, now: Instant) -> RateDecision {
        if self.config.max_requests == 0 {
            return RateDecision::Limited {
                retry_after: self.config.window,
            };
        }

        let mut decision = RateDecision::Limited {
            retry_after: self.config.window,
        };
        self.entries
            .entry(client.to_string())
            .and_compute_with(|current| {
                let (next, outcome) = self.advance(current.map(moka::Entry::into_value), now);
                decision = outcome;
                future::ready(next.map_or(Op::Nop, Op::Put))
            })
            .await;
        decision
    }

    /// Apply one request to a client's window. `None` leaves the entry as is.
    fn advance(
        &self,
        current: Option<RateEntry>,
        now: Instant,
    ) -> (Option<RateEntry>, RateDecision) {
        let RateLimitConfig {
            window,
            max_requests,
            ..
        } = self.config;

        match current {
            Some(entry) if now.duration_since(entry.window_start) < window => {
                if entry.count < max_requests {
                    let count = entry.count + 1;
                    (
                        Some(RateEntry { count, ..entry }),
                        RateDecision::Allowed {
                            remaining: max_requests - count,
                        },
                    )
                } else {
                    (
                        None,
                        RateDecision::Limited {
                            retry_after: window - now.duration_since(entry.window_start),
                        },
                    )
                }
            }
            _ => (
                Some(RateEntry {
                    count: 1,
                    window_start: now,
                }),
                RateDecision::Allowed {
                    remaining: max_requests - 1,
                },
            ),
        }
    }

    /// Number of clients currently tracked.
    pub async fn tracked_clients(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

/// Derive the client identity used as the rate limit key.
///
/// Prefers the first address in `X-Forwarded-For`, then the transport peer
/// address, then [`UNKNOWN_CLIENT`].
pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
