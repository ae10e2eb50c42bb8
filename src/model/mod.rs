use serde::{Deserialize, Serialize};

pub mod client;
pub mod server;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameStatus {
    Playing,
    Lost,
    Won,
}

impl GameStatus {
    pub fn is_finished(self) -> bool {
        self != Self::Playing
    }
}

/// One cell uncovered by a click. `val` is the adjacent mine count, or 9 for a mine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellUpdate {
    pub r: usize,
    pub c: usize,
    pub val: u8,
}

impl CellUpdate {
    pub fn new(row: usize, col: usize, val: u8) -> Self {
        Self {
            r: row,
            c: col,
            val,
        }
    }
}
