use std::{
    net::{IpAddr, Ipv4Addr},
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use rocket::request::{self, FromRequest, Request};

use crate::error::ApiError;

const REFILL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub struct TokenBucket {
    last_refill: Instant,
    tokens: u32,
    capacity: u32,
    refill_rate: u32,
    refill_interval: Duration,
}

impl TokenBucket {
    fn new(capacity: u32, refill_rate: u32, refill_interval: Duration) -> Self {
        Self {
            last_refill: Instant::now(),
            tokens: capacity,
            capacity,
            refill_rate,
            refill_interval,
        }
    }

    fn try_consume(&mut self) -> bool {
        self.refill();
        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    /// A bucket untouched for a full interval would refill to capacity on its
    /// next use, so dropping it loses nothing.
    fn is_idle(&self) -> bool {
        self.last_refill.elapsed() >= self.refill_interval
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let intervals = elapsed.as_secs() / self.refill_interval.as_secs().max(1);

        if intervals > 0 {
            let tokens_to_add = (intervals as u32).saturating_mul(self.refill_rate);
            self.tokens = self.tokens.saturating_add(tokens_to_add).min(self.capacity);
            self.last_refill = now;
        }
    }
}

/// Per-client limit on how many games can be started each minute.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    buckets: Arc<DashMap<IpAddr, TokenBucket>>,
    games_per_minute: u32,
}

impl RateLimiter {
    pub fn new(games_per_minute: u32) -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
            games_per_minute,
        }
    }

    pub fn check(&self, client_ip: &ClientIp) -> Result<(), ApiError> {
        let mut entry = self.buckets.entry(client_ip.0).or_insert_with(|| {
            TokenBucket::new(
                self.games_per_minute,
                self.games_per_minute,
                REFILL_INTERVAL,
            )
        });

        if entry.try_consume() {
            Ok(())
        } else {
            Err(ApiError::RateLimited)
        }
    }

    /// Drops buckets of clients that have been quiet for a whole refill interval.
    pub fn evict_idle(&self) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| !bucket.is_idle());
        before.saturating_sub(self.buckets.len())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub IpAddr);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientIp {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let ip = req
            .headers()
            .get_one("X-Forwarded-For")
            .and_then(|header| header.split(',').next())
            .and_then(|ip| ip.trim().parse().ok())
            .or_else(|| {
                req.headers()
                    .get_one("X-Real-IP")
                    .and_then(|ip| ip.trim().parse().ok())
            })
            .or_else(|| req.client_ip())
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

        request::Outcome::Success(ClientIp(ip))
    }
}
