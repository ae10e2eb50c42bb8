use tracing::{debug, info, instrument};

use crate::{
    model::{GameStatus, server::GameResponse},
    store::SessionStore,
};

/// Entry point for the game boundary: starts games and applies clicks.
#[derive(Clone, Default)]
pub struct GameEngine {
    store: SessionStore,
}

impl GameEngine {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    #[instrument(level = "trace", skip(self))]
    pub fn new_game(&self, session_id: &str) -> GameResponse {
        self.store.create_or_replace(session_id);
        info!("Started new game for session {}", session_id);

        GameResponse {
            status: GameStatus::Playing,
            updates: Vec::new(),
        }
    }

    /// Applies a click to the session's game. `None` when the session is unknown.
    #[instrument(level = "trace", skip(self))]
    pub async fn click(&self, session_id: &str, row: usize, col: usize) -> Option<GameResponse> {
        let mut game = self.store.get(session_id)?;
        let mut state = game.clone().lock_owned().await;

        // The game may have been evicted or replaced while we waited for its lock.
        while !self.store.is_current(session_id, &game) {
            debug!("Session {} changed while waiting, retrying", session_id);
            game = self.store.get(session_id)?;
            state = game.clone().lock_owned().await;
        }

        let updates = state.reveal(row, col);
        let status = state.status();
        debug!(
            "Click ({}, {}) in session {} revealed {} cells, status {:?}",
            row,
            col,
            session_id,
            updates.len(),
            status
        );
        if !updates.is_empty() && status.is_finished() {
            info!("Session {} finished: {:?}", session_id, status);
        }

        Some(GameResponse { status, updates })
    }

    #[instrument(level = "trace", skip(self))]
    pub fn end_game(&self, session_id: &str) -> bool {
        let removed = self.store.remove(session_id);
        if removed {
            info!("Ended game for session {}", session_id);
        }
        removed
    }
}
