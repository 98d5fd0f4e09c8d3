#![no_std]

extern crate alloc;

use core::ops::{BitOr, Index};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use types::*;

mod board;
mod cell;
mod engine;
mod error;
mod generator;
mod types;

/// Board dimensions and mine count. Only [`GameConfig::new`] and the presets build
/// one, so every config an engine sees can hold its mines around any first reveal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConfigParts")]
pub struct GameConfig {
    size: Coord2,
    mines: CellCount,
}

/// Unchecked wire shape of [`GameConfig`], validated on the way in.
#[derive(Deserialize)]
struct ConfigParts {
    size: Coord2,
    mines: CellCount,
}

impl TryFrom<ConfigParts> for GameConfig {
    type Error = GameError;

    fn try_from(parts: ConfigParts) -> Result<Self> {
        Self::new(parts.size, parts.mines)
    }
}

impl GameConfig {
    pub(crate) const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Fails for empty boards and for more mines than fit outside a full safe zone.
    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        let config = Self::new_unchecked(size, mines);
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidDimensions);
        }
        if mines > config.mine_capacity() {
            return Err(GameError::TooManyMines);
        }
        Ok(config)
    }

    pub const fn beginner() -> Self {
        Self::new_unchecked((9, 9), 10)
    }

    pub const fn intermediate() -> Self {
        Self::new_unchecked((16, 16), 40)
    }

    pub const fn expert() -> Self {
        Self::new_unchecked((30, 16), 99)
    }

    pub const fn size(&self) -> Coord2 {
        self.size
    }

    pub const fn mines(&self) -> CellCount {
        self.mines
    }

    pub const fn width(&self) -> Coord {
        self.size.0
    }

    pub const fn height(&self) -> Coord {
        self.size.1
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    /// Largest mine count that can always be placed, wherever the first reveal lands.
    pub const fn mine_capacity(&self) -> CellCount {
        self.total_cells().saturating_sub(SAFE_ZONE_CELLS)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::beginner()
    }
}

/// Where the mines are, independent of what the player has seen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    mine_mask: Array2<bool>,
    mine_count: CellCount,
}

impl MineLayout {
    pub fn empty(size: Coord2) -> Self {
        Self {
            mine_mask: Array2::default((size.1 as usize, size.0 as usize)),
            mine_count: 0,
        }
    }

    pub fn from_mine_mask(mine_mask: Array2<bool>) -> Self {
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        Self {
            mine_mask,
            mine_count,
        }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut layout = Self::empty(size);

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            layout.place_mine(coords);
        }

        Ok(layout)
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn size(&self) -> Coord2 {
        size_of_dim(self.mine_mask.dim())
    }

    pub fn total_cells(&self) -> CellCount {
        self.mine_mask.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords]
    }

    /// Marks `coords` as a mine, placing the same cell twice counts once.
    pub(crate) fn place_mine(&mut self, coords: Coord2) {
        let slot = &mut self.mine_mask[coords.to_nd_index()];
        if !*slot {
            *slot = true;
            self.mine_count += 1;
        }
    }

    pub(crate) fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }
}

impl Index<Coord2> for MineLayout {
    type Output = bool;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.mine_mask[coords.to_nd_index()]
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MarkOutcome {
    #[default]
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

/// Returned in place of an alert when a session ends, the caller decides how to show it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverEvent {
    pub status: GameStatus,
    /// The mine that ended the game, `None` on a win.
    pub triggered_mine: Option<Coord2>,
    /// Mines uncovered by the loss reveal.
    pub exposed_mines: CellCount,
}

impl GameOverEvent {
    pub const fn is_win(&self) -> bool {
        matches!(self.status, GameStatus::Won)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RevealOutcome {
    #[default]
    NoChange,
    Revealed,
    GameOver(GameOverEvent),
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            GameOver(_) => true,
        }
    }

    pub const fn game_over(self) -> Option<GameOverEvent> {
        match self {
            Self::GameOver(event) => Some(event),
            _ => None,
        }
    }
}

impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (GameOver(event), _) => GameOver(event),
            (_, GameOver(event)) => GameOver(event),
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Result of a chord: the reveal pass runs first, then the flag pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpandOutcome {
    pub reveal: RevealOutcome,
    pub mark: MarkOutcome,
}

impl ExpandOutcome {
    pub const fn has_update(self) -> bool {
        self.reveal.has_update() || self.mark.has_update()
    }

    pub const fn game_over(self) -> Option<GameOverEvent> {
        self.reveal.game_over()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_empty_boards() {
        assert_eq!(GameConfig::new((0, 5), 0), Err(GameError::InvalidDimensions));
        assert_eq!(GameConfig::new((5, 0), 0), Err(GameError::InvalidDimensions));
    }

    #[test]
    fn config_leaves_room_for_safe_zone() {
        assert_eq!(GameConfig::new((5, 5), 16).map(|c| c.mines()), Ok(16));
        assert_eq!(GameConfig::new((5, 5), 17), Err(GameError::TooManyMines));
        assert_eq!(GameConfig::new((2, 2), 1), Err(GameError::TooManyMines));
        assert!(GameConfig::new((2, 2), 0).is_ok());
    }

    #[test]
    fn presets_are_valid() {
        for preset in [
            GameConfig::beginner(),
            GameConfig::intermediate(),
            GameConfig::expert(),
        ] {
            assert_eq!(GameConfig::new(preset.size(), preset.mines()), Ok(preset));
        }
        assert_eq!(GameConfig::default(), GameConfig::beginner());
    }

    #[test]
    fn deserializing_validates_config() {
        let config: GameConfig = serde_json::from_str(r#"{"size":[8,6],"mines":12}"#).unwrap();
        assert_eq!(config, GameConfig::new((8, 6), 12).unwrap());

        let crowded = serde_json::from_str::<GameConfig>(r#"{"size":[3,3],"mines":5}"#);
        assert!(crowded.is_err());
        let empty = serde_json::from_str::<GameConfig>(r#"{"size":[0,4],"mines":0}"#);
        assert!(empty.is_err());
    }

    #[test]
    fn layout_ignores_duplicate_coords() {
        let layout = MineLayout::from_mine_coords((3, 2), &[(2, 1), (2, 1), (0, 0)]).unwrap();

        assert_eq!(layout.mine_count(), 2);
        assert_eq!(layout.size(), (3, 2));
        assert!(layout.contains_mine((2, 1)));
        assert_eq!(
            MineLayout::from_mine_coords((3, 2), &[(0, 2)]),
            Err(GameError::InvalidCoords)
        );
    }

    #[test]
    fn game_over_dominates_merged_outcomes() {
        let lost = RevealOutcome::GameOver(GameOverEvent {
            status: GameStatus::Lost,
            triggered_mine: Some((1, 1)),
            exposed_mines: 3,
        });

        assert_eq!(RevealOutcome::Revealed | lost, lost);
        assert_eq!(lost | RevealOutcome::NoChange, lost);
        assert_eq!(
            RevealOutcome::NoChange | RevealOutcome::Revealed,
            RevealOutcome::Revealed
        );
        assert!(!RevealOutcome::NoChange.has_update());
    }
}
