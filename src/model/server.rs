use serde::{Deserialize, Serialize};

use super::{CellUpdate, GameStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResponse {
    pub status: GameStatus,
    pub updates: Vec<CellUpdate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
