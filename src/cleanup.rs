use std::time::Duration;

use rocket::{
    Build, Rocket,
    fairing::{self, Fairing, Info, Kind},
};
use tokio::time;
use tracing::{debug, info, warn};

use crate::{
    config::ServerConfig, engine::GameEngine, rate_limit::RateLimiter, store::SessionStore,
};

const MIN_CLEANUP_INTERVAL: Duration = Duration::from_secs(1);

pub async fn start_cleanup_task(
    store: SessionStore,
    rate_limiter: RateLimiter,
    config: ServerConfig,
) {
    let period = config.cleanup_interval.max(MIN_CLEANUP_INTERVAL);
    let mut interval = time::interval(period);

    info!(
        "Started game cleanup task: checking every {}s, inactive timeout: {}s, finished timeout: {}s",
        period.as_secs(),
        config.inactive_game_timeout.as_secs(),
        config.finished_game_timeout.as_secs()
    );

    loop {
        interval.tick().await;
        cleanup_games(&store, &config);
        cleanup_rate_limits(&rate_limiter);
    }
}

pub fn cleanup_games(store: &SessionStore, config: &ServerConfig) -> usize {
    let removed = store.evict_expired(config.inactive_game_timeout, config.finished_game_timeout);

    if removed > 0 {
        info!(
            "Cleaned up {} idle games, {} remaining",
            removed,
            store.len()
        );
    } else {
        debug!("No idle games to clean up");
    }

    removed
}

pub fn cleanup_rate_limits(rate_limiter: &RateLimiter) -> usize {
    let removed = rate_limiter.evict_idle();
    if removed > 0 {
        debug!(
            "Dropped {} idle rate limit buckets, {} remaining",
            removed,
            rate_limiter.len()
        );
    }
    removed
}

/// Spawns the cleanup loop once Rocket has its managed state in place.
pub struct CleanupFairing;

#[rocket::async_trait]
impl Fairing for CleanupFairing {
    fn info(&self) -> Info {
        Info {
            name: "Idle Game Cleanup",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> fairing::Result {
        match (
            rocket.state::<GameEngine>(),
            rocket.state::<RateLimiter>(),
            rocket.state::<ServerConfig>(),
        ) {
            (Some(engine), Some(rate_limiter), Some(config)) => {
                info!("Starting cleanup task for game sessions and rate limits");
                let store = engine.store().clone();
                let rate_limiter = rate_limiter.clone();
                let config = config.clone();
                tokio::spawn(async move {
                    start_cleanup_task(store, rate_limiter, config).await;
                });
            }
            _ => warn!("Engine, rate limiter or config not managed, cleanup task disabled"),
        }
        Ok(rocket)
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::*;
    use crate::{data::GameState, logic::tests::row_five_board, rate_limit::ClientIp};

    #[tokio::test]
    async fn removes_finished_games_first() {
        let store = SessionStore::new();
        store.insert("playing", GameState::with_board(row_five_board()));
        store.insert("won", GameState::with_board(row_five_board()));
        {
            let game = store.get("won").unwrap();
            let mut state = game.lock().await;
            state.reveal(0, 0);
            state.reveal(9, 9);
        }
        let config = ServerConfig {
            finished_game_timeout: Duration::ZERO,
            ..ServerConfig::default()
        };

        assert_eq!(cleanup_games(&store, &config), 1);
        assert!(store.get("won").is_none());
        assert!(store.get("playing").is_some());
        assert_eq!(cleanup_games(&store, &config), 0);
    }

    #[test]
    fn recent_rate_limit_buckets_survive() {
        let rate_limiter = RateLimiter::new(3);
        let client = ClientIp(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)));
        assert_eq!(rate_limiter.check(&client), Ok(()));

        assert_eq!(cleanup_rate_limits(&rate_limiter), 0);
        assert_eq!(rate_limiter.len(), 1);
    }
}
