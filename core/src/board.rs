use core::ops::Index;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Fixed-size grid of cells, `height` rows by `width` columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
}

impl Board {
    pub fn new((width, height): Coord2) -> Self {
        let cells = Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
            Cell::new((x as Coord, y as Coord))
        });
        Self { cells }
    }

    pub fn size(&self) -> Coord2 {
        size_of_dim(self.cells.dim())
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len() as CellCount
    }

    pub fn contains(&self, (x, y): Coord2) -> bool {
        let (width, height) = self.size();
        x < width && y < height
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn get(&self, coords: Coord2) -> Option<&Cell> {
        self.contains(coords)
            .then(|| &self.cells[coords.to_nd_index()])
    }

    /// Rows top to bottom, each indexed by column.
    pub fn rows(&self) -> impl Iterator<Item = ArrayView1<'_, Cell>> {
        self.cells.rows().into_iter()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    /// The 0 to 8 in-bounds neighbor cells of `coords`.
    pub fn neighbor_cells(&self, coords: Coord2) -> SmallVec<[Cell; 8]> {
        self.neighbors(coords).map(|pos| self[pos]).collect()
    }

    pub fn mine_count(&self) -> CellCount {
        self.count_where(|cell| cell.mine)
    }

    pub fn revealed_count(&self) -> CellCount {
        self.count_where(|cell| cell.revealed)
    }

    pub fn flagged_count(&self) -> CellCount {
        self.count_where(|cell| cell.flagged)
    }

    fn count_where(&self, predicate: impl Fn(&Cell) -> bool) -> CellCount {
        self.cells.iter().filter(|cell| predicate(cell)).count() as CellCount
    }

    pub(crate) fn cell_mut(&mut self, coords: Coord2) -> &mut Cell {
        &mut self.cells[coords.to_nd_index()]
    }

    pub(crate) fn apply_layout(&mut self, layout: &MineLayout) {
        for cell in self.cells.iter_mut() {
            cell.mine = layout.contains_mine(cell.coords());
        }
    }

    /// Stores the neighboring mine count on every safe cell.
    pub(crate) fn compute_adjacency(&mut self) {
        let (width, height) = self.size();
        for y in 0..height {
            for x in 0..width {
                let coords = (x, y);
                if self[coords].mine {
                    continue;
                }
                let count = self.neighbors(coords).filter(|&pos| self[pos].mine).count();
                self.cell_mut(coords).adjacent_mines = count as u8;
            }
        }
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with_mines(size: Coord2, mines: &[Coord2]) -> Board {
        let mut board = Board::new(size);
        board.apply_layout(&MineLayout::from_mine_coords(size, mines).unwrap());
        board.compute_adjacency();
        board
    }

    #[test]
    fn new_board_is_blank_and_row_major() {
        let board = Board::new((4, 2));

        assert_eq!(board.size(), (4, 2));
        assert_eq!(board.total_cells(), 8);
        assert_eq!(board.rows().count(), 2);
        for (y, row) in board.rows().enumerate() {
            assert_eq!(row.len(), 4);
            for (x, cell) in row.iter().enumerate() {
                assert_eq!(cell.coords(), (x as Coord, y as Coord));
                assert!(!cell.is_mine() && !cell.is_revealed() && !cell.is_flagged());
                assert_eq!(cell.adjacent_mines(), 0);
            }
        }
    }

    #[test]
    fn adjacency_counts_every_neighboring_mine() {
        let board = board_with_mines((3, 3), &[(0, 0), (2, 0), (1, 2)]);

        assert_eq!(board[(1, 1)].adjacent_mines(), 3);
        assert_eq!(board[(1, 0)].adjacent_mines(), 2);
        assert_eq!(board[(0, 1)].adjacent_mines(), 2);
        assert_eq!(board[(2, 2)].adjacent_mines(), 1);
        assert_eq!(board[(0, 0)].adjacent_mines(), 0);
        assert_eq!(board.mine_count(), 3);
    }

    #[test]
    fn adjacency_is_idempotent() {
        let mut board = board_with_mines((4, 4), &[(1, 1), (3, 3)]);
        let before = board.clone();

        board.compute_adjacency();

        assert_eq!(board, before);
    }

    #[test]
    fn out_of_bounds_lookups_are_rejected() {
        let board = Board::new((3, 2));

        assert!(board.get((2, 1)).is_some());
        assert!(board.get((3, 0)).is_none());
        assert_eq!(board.validate_coords((0, 2)), Err(GameError::InvalidCoords));
        assert_eq!(board.neighbor_cells((0, 0)).len(), 3);
    }
}
