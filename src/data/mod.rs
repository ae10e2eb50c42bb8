use std::time::Instant;

use crate::model::GameStatus;

/// Rows and columns of every board.
pub const SIZE: usize = 10;
pub const MINE_COUNT: usize = 10;
/// Cell value marking a mine. Safe cells hold their adjacent mine count.
pub const MINE_VALUE: u8 = 9;
pub const SAFE_CELLS: usize = SIZE * SIZE - MINE_COUNT;

/// Mine layout with precomputed adjacency counts. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) cells: [[u8; SIZE]; SIZE],
}

#[derive(Debug)]
pub struct GameState {
    pub(crate) board: Board,
    pub(crate) revealed: [[bool; SIZE]; SIZE],
    pub(crate) status: GameStatus,
    pub(crate) revealed_count: usize,
    pub(crate) last_activity: Instant,
}
