//! Connect 4 game-state engine.
//! A session owns a `height x width` grid, the player to move and the
//! lifecycle status. `GameEngine::drop_piece` is the only mutator: it returns a
//! `MoveResult` describing where the piece landed and the resulting status, so
//! a presentation layer can render the move without reaching into the engine.
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const WIN_LENGTH: usize = 4;
pub const MIN_DIMENSION: usize = WIN_LENGTH;
pub const DEFAULT_WIDTH: usize = 7;
pub const DEFAULT_HEIGHT: usize = 6;

/// (row, column) steps: horizontal, vertical, diagonal down-right, diagonal down-left.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    fn symbol(self) -> char {
        match self {
            Player::One => '1',
            Player::Two => '2',
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.symbol())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("unplayable board {width}x{height}: sides need 4+ cells and must fit in memory")]
    InvalidDimensions { width: usize, height: usize },
    #[error("column {column} is out of bounds (board has {width} columns)")]
    InvalidColumn { column: usize, width: usize },
    #[error("column {column} is full")]
    ColumnFull { column: usize },
    #[error("game is already over")]
    GameAlreadyOver,
}

/// Opaque per-player display labels. The engine only reports them back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLabels {
    pub one: String,
    pub two: String,
}

impl PlayerLabels {
    pub fn new(one: impl Into<String>, two: impl Into<String>) -> Self {
        Self {
            one: one.into(),
            two: two.into(),
        }
    }

    pub fn get(&self, player: Player) -> &str {
        match player {
            Player::One => &self.one,
            Player::Two => &self.two,
        }
    }
}

impl Default for PlayerLabels {
    fn default() -> Self {
        Self::new("Player 1", "Player 2")
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "winner", rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Won(Player),
    Draw,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub row: usize,
    pub column: usize,
    pub placed_by: Player,
    pub status: GameStatus,
}

/// Row-major grid. Row 0 is the top, row `height - 1` the bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Option<Player>>,
}

impl Board {
    fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Occupant of a cell; coordinates outside the grid read as empty.
    pub fn get(&self, row: usize, column: usize) -> Option<Player> {
        if row >= self.height || column >= self.width {
            return None;
        }
        self.cells[row * self.width + column]
    }

    /// Row a piece dropped into `column` would land on.
    pub fn lowest_empty_row(&self, column: usize) -> Option<usize> {
        if column >= self.width {
            return None;
        }
        (0..self.height)
            .rev()
            .find(|&row| self.cells[row * self.width + column].is_none())
    }

    pub fn is_column_full(&self, column: usize) -> bool {
        self.lowest_empty_row(column).is_none()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    pub fn rows(&self) -> Vec<Vec<Option<Player>>> {
        self.cells.chunks(self.width).map(<[_]>::to_vec).collect()
    }

    /// Scans every cell for a run of four owned by `player`.
    pub fn contains_four(&self, player: Player) -> bool {
        for row in 0..self.height as isize {
            for column in 0..self.width as isize {
                if DIRECTIONS
                    .iter()
                    .any(|&step| self.is_run(row, column, step, player))
                {
                    return true;
                }
            }
        }
        false
    }

    /// Same answer as `contains_four` on a board that had no run before the
    /// piece at (row, column) was placed, but only tests runs through that cell.
    fn completes_four(&self, row: usize, column: usize, player: Player) -> bool {
        let (row, column) = (row as isize, column as isize);
        DIRECTIONS.iter().any(|&(dr, dc)| {
            (0..WIN_LENGTH as isize).any(|back| {
                self.is_run(row - dr * back, column - dc * back, (dr, dc), player)
            })
        })
    }

    fn is_run(&self, row: isize, column: isize, (dr, dc): (isize, isize), player: Player) -> bool {
        (0..WIN_LENGTH as isize)
            .all(|step| self.cell_at(row + dr * step, column + dc * step) == Some(player))
    }

    fn cell_at(&self, row: isize, column: isize) -> Option<Player> {
        if row < 0 || column < 0 {
            return None;
        }
        self.get(row as usize, column as usize)
    }

    fn place(&mut self, row: usize, column: usize, player: Player) {
        self.cells[row * self.width + column] = Some(player);
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width) {
            let line: String = row
                .iter()
                .map(|&cell| cell.map_or('.', Player::symbol))
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// One local two-player session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameEngine {
    board: Board,
    current: Player,
    status: GameStatus,
    labels: PlayerLabels,
    moves_played: usize,
}

impl GameEngine {
    pub fn create(width: usize, height: usize) -> Result<Self, GameError> {
        Self::with_labels(width, height, PlayerLabels::default())
    }

    pub fn with_labels(
        width: usize,
        height: usize,
        labels: PlayerLabels,
    ) -> Result<Self, GameError> {
        let cells = width
            .checked_mul(height)
            .filter(|&cells| cells <= isize::MAX as usize);
        if width < MIN_DIMENSION || height < MIN_DIMENSION || cells.is_none() {
            return Err(GameError::InvalidDimensions { width, height });
        }
        Ok(Self::fresh(width, height, labels))
    }

    fn fresh(width: usize, height: usize, labels: PlayerLabels) -> Self {
        Self {
            board: Board::empty(width, height),
            current: Player::One,
            status: GameStatus::InProgress,
            labels,
            moves_played: 0,
        }
    }

    /// Drops a piece for the player to move. Errors leave the session untouched.
    pub fn drop_piece(&mut self, column: usize) -> Result<MoveResult, GameError> {
        if column >= self.board.width {
            return Err(GameError::InvalidColumn {
                column,
                width: self.board.width,
            });
        }
        if self.status.is_terminal() {
            return Err(GameError::GameAlreadyOver);
        }
        let row = self
            .board
            .lowest_empty_row(column)
            .ok_or(GameError::ColumnFull { column })?;

        let player = self.current;
        self.board.place(row, column, player);
        self.moves_played += 1;

        // A move that fills the last cell and completes four is a win.
        self.status = if self.board.completes_four(row, column, player) {
            GameStatus::Won(player)
        } else if self.board.is_full() {
            GameStatus::Draw
        } else {
            self.current = player.opponent();
            GameStatus::InProgress
        };

        debug!(%player, row, column, moves = self.moves_played, "piece dropped");
        match self.status {
            GameStatus::Won(winner) => {
                info!(label = self.labels.get(winner), moves = self.moves_played, "{winner} won")
            }
            GameStatus::Draw => info!(moves = self.moves_played, "game drawn"),
            GameStatus::InProgress => {}
        }

        Ok(MoveResult {
            row,
            column,
            placed_by: player,
            status: self.status,
        })
    }

    /// Starts over with an empty board of the same size, keeping the labels.
    pub fn reset(&mut self) {
        let labels = std::mem::take(&mut self.labels);
        *self = Self::fresh(self.board.width, self.board.height, labels);
        info!(width = self.board.width, height = self.board.height, "game reset");
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Player to move; after a win this is still the winner.
    pub fn current_player(&self) -> Player {
        self.current
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn width(&self) -> usize {
        self.board.width
    }

    pub fn height(&self) -> usize {
        self.board.height
    }

    pub fn moves_played(&self) -> usize {
        self.moves_played
    }

    pub fn labels(&self) -> &PlayerLabels {
        &self.labels
    }

    pub fn label(&self, player: Player) -> &str {
        self.labels.get(player)
    }

    /// Columns that still accept a piece. Empty once the game is over.
    pub fn legal_columns(&self) -> Vec<usize> {
        if self.status.is_terminal() {
            return Vec::new();
        }
        (0..self.board.width)
            .filter(|&column| !self.board.is_column_full(column))
            .collect()
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::fresh(DEFAULT_WIDTH, DEFAULT_HEIGHT, PlayerLabels::default())
    }
}
