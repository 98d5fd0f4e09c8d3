use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Uniform placement by rejection sampling, keeping the first revealed cell and its
/// neighbors free of mines so the opening move always lands on a zero.
#[derive(Clone, Debug)]
pub struct RandomMineGenerator {
    rng: SmallRng,
}

impl RandomMineGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_os_rng() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }
}

impl MineGenerator for RandomMineGenerator {
    fn generate(&mut self, config: GameConfig, initial: Coord2) -> Result<MineLayout> {
        let (width, height) = config.size();
        let mut layout = MineLayout::empty(config.size());

        // corners and edges clip the safe zone, so count what actually fits
        let safe_cells = layout.iter_neighbors(initial).count() as CellCount + 1;
        let free_cells = config.total_cells().saturating_sub(safe_cells);
        if width == 0 || height == 0 || config.mines() > free_cells {
            log::warn!(
                "Cannot place {} mines around {:?}, only {} cells available",
                config.mines(),
                initial,
                free_cells
            );
            return Err(GameError::TooManyMines);
        }

        let mut attempts: u32 = 0;
        while layout.mine_count() < config.mines() {
            attempts += 1;
            let candidate = (
                self.rng.random_range(0..width),
                self.rng.random_range(0..height),
            );
            if layout.contains_mine(candidate) || chebyshev_distance(candidate, initial) <= 1 {
                log::trace!("Rejected mine candidate {:?}", candidate);
                continue;
            }
            layout.place_mine(candidate);
        }

        log::debug!(
            "Placed {} mines around safe cell {:?} in {} attempts",
            layout.mine_count(),
            initial,
            attempts
        );
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid_layout(layout: &MineLayout, config: GameConfig, initial: Coord2) {
        assert_eq!(layout.size(), config.size());
        assert_eq!(layout.mine_count(), config.mines());

        let (width, height) = config.size();
        let mut counted = 0;
        for x in 0..width {
            for y in 0..height {
                if layout.contains_mine((x, y)) {
                    counted += 1;
                    assert!(chebyshev_distance((x, y), initial) > 1);
                }
            }
        }
        assert_eq!(counted, config.mines());
    }

    #[test]
    fn places_exact_count_outside_safe_zone() {
        let config = GameConfig::intermediate();

        for seed in 0..32 {
            let initial = ((seed % 16) as Coord, (seed * 7 % 16) as Coord);
            let layout = RandomMineGenerator::new(seed)
                .generate(config, initial)
                .unwrap();
            assert_valid_layout(&layout, config, initial);
        }
    }

    #[test]
    fn fills_every_cell_outside_safe_zone_when_dense() {
        let config = GameConfig::new((5, 5), 16).unwrap();

        let layout = RandomMineGenerator::new(3).generate(config, (2, 2)).unwrap();

        assert_valid_layout(&layout, config, (2, 2));
    }

    #[test]
    fn corner_start_leaves_room_for_extra_mines() {
        // a corner safe zone only covers 4 cells
        let config = GameConfig::new_unchecked((4, 4), 12);

        let layout = RandomMineGenerator::new(11).generate(config, (0, 0)).unwrap();

        assert_valid_layout(&layout, config, (0, 0));
        assert!(!layout.contains_mine((1, 1)));
        assert!(layout.contains_mine((3, 3)));
    }

    #[test]
    fn refuses_unsatisfiable_config() {
        let config = GameConfig::new_unchecked((3, 3), 1);

        let result = RandomMineGenerator::new(0).generate(config, (1, 1));

        assert_eq!(result, Err(GameError::TooManyMines));
    }

    #[test]
    fn same_seed_same_layout() {
        let config = GameConfig::expert();

        let first = RandomMineGenerator::new(42).generate(config, (10, 5)).unwrap();
        let second = RandomMineGenerator::new(42).generate(config, (10, 5)).unwrap();

        assert_eq!(first, second);
    }
}
