use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, trace};

use crate::{
    data::{Board, GameState, MINE_COUNT, MINE_VALUE, SAFE_CELLS, SIZE},
    error::BoardError,
    model::{CellUpdate, GameStatus},
};

/// In-bounds 8-neighbourhood of a cell, row-major.
fn neighbours(row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
    (-1isize..=1)
        .flat_map(|dr| (-1isize..=1).map(move |dc| (dr, dc)))
        .filter(|&(dr, dc)| dr != 0 || dc != 0)
        .filter_map(move |(dr, dc)| {
            let r = row.checked_add_signed(dr)?;
            let c = col.checked_add_signed(dc)?;
            (r < SIZE && c < SIZE).then_some((r, c))
        })
}

fn in_bounds(row: usize, col: usize) -> bool {
    row < SIZE && col < SIZE
}

fn count_adjacent_mines(cells: &[[u8; SIZE]; SIZE], row: usize, col: usize) -> u8 {
    neighbours(row, col)
        .filter(|&(r, c)| cells[r][c] == MINE_VALUE)
        .count() as u8
}

/// Fills every non-mine cell with its adjacent mine count.
fn fill_counts(mut cells: [[u8; SIZE]; SIZE]) -> Board {
    for row in 0..SIZE {
        for col in 0..SIZE {
            if cells[row][col] != MINE_VALUE {
                cells[row][col] = count_adjacent_mines(&cells, row, col);
            }
        }
    }
    Board { cells }
}

/// Places `MINE_COUNT` mines by rejection sampling, then computes adjacency counts.
pub fn generate_board<R: Rng + ?Sized>(rng: &mut R) -> Board {
    let mut cells = [[0u8; SIZE]; SIZE];
    let mut placed = 0;

    while placed < MINE_COUNT {
        let row = rng.random_range(0..SIZE);
        let col = rng.random_range(0..SIZE);
        if cells[row][col] != MINE_VALUE {
            cells[row][col] = MINE_VALUE;
            placed += 1;
        }
    }

    fill_counts(cells)
}

impl Board {
    /// Builds a board from an explicit mine layout.
    pub fn from_mines(mines: &[(usize, usize)]) -> Result<Self, BoardError> {
        if mines.len() != MINE_COUNT {
            return Err(BoardError::MineCount {
                expected: MINE_COUNT,
                actual: mines.len(),
            });
        }

        let mut cells = [[0u8; SIZE]; SIZE];
        for &(row, col) in mines {
            if !in_bounds(row, col) {
                return Err(BoardError::OutOfBounds { row, col });
            }
            if cells[row][col] == MINE_VALUE {
                return Err(BoardError::Duplicate { row, col });
            }
            cells[row][col] = MINE_VALUE;
        }

        Ok(fill_counts(cells))
    }

    pub fn value(&self, row: usize, col: usize) -> Option<u8> {
        self.cells.get(row)?.get(col).copied()
    }

    pub fn is_mine(&self, row: usize, col: usize) -> bool {
        self.value(row, col) == Some(MINE_VALUE)
    }

    pub fn mine_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&value| value == MINE_VALUE)
            .count()
    }
}

impl GameState {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_board(generate_board(rng))
    }

    pub fn with_board(board: Board) -> Self {
        Self {
            board,
            revealed: [[false; SIZE]; SIZE],
            status: GameStatus::Playing,
            revealed_count: 0,
            last_activity: Instant::now(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed_count
    }

    pub fn is_revealed(&self, row: usize, col: usize) -> bool {
        in_bounds(row, col) && self.revealed[row][col]
    }

    /// Reveals a cell and returns every cell uncovered by this click.
    ///
    /// Clicks after the game ended, outside the board or on an already revealed
    /// cell leave the state untouched and return no updates.
    pub fn reveal(&mut self, row: usize, col: usize) -> Vec<CellUpdate> {
        let mut updates = Vec::new();
        self.last_activity = Instant::now();

        if self.status.is_finished() || !in_bounds(row, col) || self.revealed[row][col] {
            trace!(row, col, status = ?self.status, "Ignoring click");
            return updates;
        }

        let value = self.board.cells[row][col];

        if value == MINE_VALUE {
            self.revealed[row][col] = true;
            self.status = GameStatus::Lost;
            debug!(row, col, "Mine hit, game lost");
            updates.push(CellUpdate::new(row, col, MINE_VALUE));
            return updates;
        }

        if value > 0 {
            self.revealed[row][col] = true;
            self.revealed_count += 1;
            updates.push(CellUpdate::new(row, col, value));
        } else {
            self.flood_fill(row, col, &mut updates);
            debug!(row, col, revealed = updates.len(), "Flood fill");
        }

        self.check_win();
        updates
    }

    fn flood_fill(&mut self, row: usize, col: usize, updates: &mut Vec<CellUpdate>) {
        if !in_bounds(row, col) || self.revealed[row][col] {
            return;
        }

        let value = self.board.cells[row][col];
        if value == MINE_VALUE {
            return;
        }

        // Marked before recursing so no cell is visited twice.
        self.revealed[row][col] = true;
        self.revealed_count += 1;
        updates.push(CellUpdate::new(row, col, value));

        if value == 0 {
            for (r, c) in neighbours(row, col) {
                self.flood_fill(r, c, updates);
            }
        }
    }

    fn check_win(&mut self) {
        if self.revealed_count == SAFE_CELLS {
            debug!("All safe cells revealed, game won");
            self.status = GameStatus::Won;
        }
    }

    /// Whether the game has been idle long enough to be evicted. Finished games
    /// use their own, usually shorter, timeout.
    pub fn should_cleanup(&self, inactive_timeout: Duration, finished_timeout: Duration) -> bool {
        let idle = self.last_activity.elapsed();

        if self.status.is_finished() {
            idle >= finished_timeout
        } else {
            idle >= inactive_timeout
        }
    }
}
