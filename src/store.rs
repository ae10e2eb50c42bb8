use std::{
    sync::{Arc, Mutex as StdMutex, PoisonError},
    time::Duration,
};

use dashmap::DashMap;
use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::data::GameState;

/// A single game, locked for the duration of each click.
pub type SharedGame = Arc<Mutex<GameState>>;

enum RandomSource {
    Thread,
    Seeded(StdMutex<StdRng>),
}

impl RandomSource {
    fn new_game(&self) -> GameState {
        match self {
            Self::Thread => GameState::new(&mut rand::rng()),
            Self::Seeded(rng) => {
                let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
                GameState::new(&mut *rng)
            }
        }
    }
}

/// Concurrent map from session id to its game.
///
/// The map is sharded, so different sessions never contend on the same lock.
/// Each game sits behind its own mutex, which serializes clicks on one session.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, SharedGame>>,
    random: Arc<RandomSource>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            random: Arc::new(RandomSource::Thread),
        }
    }

    /// Store whose boards are drawn from a caller-supplied generator.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            random: Arc::new(RandomSource::Seeded(StdMutex::new(rng))),
        }
    }

    /// Installs a fresh game under `session_id`, dropping any previous one.
    #[instrument(level = "trace", skip(self))]
    pub fn create_or_replace(&self, session_id: &str) -> SharedGame {
        self.insert(session_id, self.random.new_game())
    }

    /// Installs a prepared game under `session_id`, dropping any previous one.
    pub fn insert(&self, session_id: &str, state: GameState) -> SharedGame {
        let game = Arc::new(Mutex::new(state));
        if self
            .sessions
            .insert(session_id.to_owned(), game.clone())
            .is_some()
        {
            debug!("Replaced existing game for session {}", session_id);
        }
        game
    }

    /// Returns a handle to the session's game. The map shard is released before
    /// returning, so holding the handle never blocks other sessions.
    pub fn get(&self, session_id: &str) -> Option<SharedGame> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.value().clone())
    }

    /// Whether `game` is still the one installed under `session_id`.
    pub fn is_current(&self, session_id: &str, game: &SharedGame) -> bool {
        self.sessions
            .get(session_id)
            .is_some_and(|entry| Arc::ptr_eq(entry.value(), game))
    }

    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drops idle games and returns how many were removed. Games whose lock is
    /// held are in use and always kept.
    pub fn evict_expired(&self, inactive_timeout: Duration, finished_timeout: Duration) -> usize {
        let mut removed = 0;

        self.sessions.retain(|session_id, game| match game.try_lock() {
            Ok(state) if state.should_cleanup(inactive_timeout, finished_timeout) => {
                debug!("Evicting idle game: {}", session_id);
                removed += 1;
                false
            }
            _ => true,
        });

        removed
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::{logic::tests::row_five_board, model::GameStatus};

    #[tokio::test]
    async fn create_get_remove() {
        let store = SessionStore::new();
        assert!(store.get("a").is_none());

        store.create_or_replace("a");
        assert_eq!(store.len(), 1);

        let game = store.get("a").unwrap();
        assert_eq!(game.lock().await.status(), GameStatus::Playing);

        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert!(store.get("a").is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn replace_discards_previous_state() {
        let store = SessionStore::new();
        store.insert("a", GameState::with_board(row_five_board()));
        store.get("a").unwrap().lock().await.reveal(5, 0);

        store.create_or_replace("a");

        let game = store.get("a").unwrap();
        let state = game.lock().await;
        assert_eq!(state.status(), GameStatus::Playing);
        assert_eq!(state.revealed_count(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn current_game_tracks_replacement() {
        let store = SessionStore::new();
        let first = store.create_or_replace("a");
        assert!(store.is_current("a", &first));
        assert!(!store.is_current("b", &first));

        let second = store.create_or_replace("a");
        assert!(!store.is_current("a", &first));
        assert!(store.is_current("a", &second));

        store.remove("a");
        assert!(!store.is_current("a", &second));
    }

    #[tokio::test]
    async fn seeded_store_is_reproducible() {
        let a = SessionStore::with_rng(StdRng::seed_from_u64(11));
        let b = SessionStore::with_rng(StdRng::seed_from_u64(11));

        for id in ["x", "y"] {
            let left = a.create_or_replace(id);
            let right = b.create_or_replace(id);
            assert_eq!(left.lock().await.board(), right.lock().await.board());
        }
    }

    #[tokio::test]
    async fn evicts_only_idle_and_unlocked_games() {
        let store = SessionStore::new();
        store.insert("playing", GameState::with_board(row_five_board()));
        store.insert("lost", GameState::with_board(row_five_board()));
        store.insert("busy", GameState::with_board(row_five_board()));
        store.get("lost").unwrap().lock().await.reveal(5, 0);

        let busy = store.get("busy").unwrap();
        let _guard = busy.lock().await;

        let removed = store.evict_expired(Duration::from_secs(3600), Duration::ZERO);

        assert_eq!(removed, 1);
        assert!(store.get("lost").is_none());
        assert!(store.get("playing").is_some());
        assert!(store.get("busy").is_some());
    }
}
