/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, y)`, `x` being the column and `y` the row.
pub type Coord2 = (Coord, Coord);

/// Number of cells in a full safe zone: the first revealed cell and its 8 neighbors.
pub const SAFE_ZONE_CELLS: CellCount = 9;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

/// Boards are stored row-major, so `(x, y)` maps to `[y, x]`.
impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.1.into(), self.0.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Chebyshev (king-move) distance between two positions.
pub const fn chebyshev_distance(a: Coord2, b: Coord2) -> Coord {
    let dx = a.0.abs_diff(b.0);
    let dy = a.1.abs_diff(b.1);
    if dx > dy { dx } else { dy }
}

/// Converts an ndarray shape `(rows, cols)` back into a `(width, height)` size.
pub(crate) fn size_of_dim((rows, cols): (usize, usize)) -> Coord2 {
    (cols as Coord, rows as Coord)
}

/// Moore neighborhood offsets, order is not significant.
static DIRECTIONS: [(i8, i8); 8] = [
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
];

/// Moves `from` by `delta`, `None` once it falls off a board of size `bounds`.
pub fn step(from: Coord2, (dx, dy): (i8, i8), (width, height): Coord2) -> Option<Coord2> {
    let x = from.0.checked_add_signed(dx).filter(|&x| x < width)?;
    let y = from.1.checked_add_signed(dy).filter(|&y| y < height)?;
    Some((x, y))
}

/// In-bounds neighbors of `center`. Owns its state rather than borrowing the board,
/// so cells can be mutated while it is walked.
#[derive(Debug, Clone)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    directions: core::slice::Iter<'static, (i8, i8)>,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            directions: DIRECTIONS.iter(),
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        let Self {
            center,
            bounds,
            directions,
        } = self;
        directions.find_map(|&delta| step(*center, delta, *bounds))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.directions.len()))
    }
}
