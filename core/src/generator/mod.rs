use crate::*;
pub use random::*;

mod random;

/// Decides where the mines go once the first cell of a session is revealed.
pub trait MineGenerator {
    fn generate(&mut self, config: GameConfig, initial: Coord2) -> Result<MineLayout>;

    /// Whether `generate` can produce a layout for `config`, checked when a session
    /// is set up so a mismatch surfaces before the first reveal.
    fn supports(&self, _config: GameConfig) -> bool {
        true
    }
}

/// A fixed layout replays verbatim, the safe zone around `initial` is not enforced.
impl MineGenerator for MineLayout {
    fn generate(&mut self, config: GameConfig, _initial: Coord2) -> Result<MineLayout> {
        if !self.supports(config) {
            log::warn!(
                "Preset layout {:?} does not fit requested config {:?}",
                self.game_config(),
                config
            );
            return Err(GameError::InvalidBoardShape);
        }
        Ok(self.clone())
    }

    fn supports(&self, config: GameConfig) -> bool {
        self.game_config() == config
    }
}
