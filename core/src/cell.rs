use serde::{Deserialize, Serialize};

use crate::*;

/// One board position as seen by the engine.
///
/// Fields are only written by the engine; callers get copies or shared references.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) x: Coord,
    pub(crate) y: Coord,
    pub(crate) mine: bool,
    pub(crate) revealed: bool,
    pub(crate) flagged: bool,
    /// Mines among the neighbors, left at 0 for mine cells.
    pub(crate) adjacent_mines: u8,
}

impl Cell {
    pub const fn new((x, y): Coord2) -> Self {
        Self {
            x,
            y,
            mine: false,
            revealed: false,
            flagged: false,
            adjacent_mines: 0,
        }
    }

    pub const fn x(&self) -> Coord {
        self.x
    }

    pub const fn y(&self) -> Coord {
        self.y
    }

    pub const fn coords(&self) -> Coord2 {
        (self.x, self.y)
    }

    pub const fn is_mine(&self) -> bool {
        self.mine
    }

    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub const fn is_flagged(&self) -> bool {
        self.flagged
    }

    /// Neither revealed nor flagged, the only state reveal and auto-flag act on.
    pub const fn is_unknown(&self) -> bool {
        !self.revealed && !self.flagged
    }

    pub const fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }
}
