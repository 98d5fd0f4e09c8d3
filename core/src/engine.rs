use alloc::collections::VecDeque;
use core::num::Saturating;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use web_time::{SystemTime, UNIX_EPOCH};

use crate::*;

/// Valid transitions:
/// - Ready -> Playing (first reveal)
/// - Playing -> Lost (a mine was revealed)
/// - Playing -> Won (every safe cell revealed, see [`GameEngine::check_win`])
/// - any -> Ready (reset)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    Ready,
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Everything that belongs to one game, replaced wholesale on reset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    board: Board,
    mine_generated: bool,
    status: GameStatus,
    start_ms: Option<u64>,
    end_ms: Option<u64>,
    flagged_count: Saturating<CellCount>,
}

impl GameSession {
    fn new(size: Coord2) -> Self {
        Self {
            board: Board::new(size),
            mine_generated: false,
            status: GameStatus::Ready,
            start_ms: None,
            end_ms: None,
            flagged_count: Saturating(0),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn mine_generated(&self) -> bool {
        self.mine_generated
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn start_ms(&self) -> Option<u64> {
        self.start_ms
    }

    pub fn end_ms(&self) -> Option<u64> {
        self.end_ms
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count.0
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

/// Rules engine for one player. Mines are placed lazily on the first reveal, all
/// mutation goes through the methods below.
#[derive(Clone, Debug)]
pub struct GameEngine<G = RandomMineGenerator> {
    config: GameConfig,
    session: GameSession,
    generator: G,
}

impl GameEngine<RandomMineGenerator> {
    pub fn new(config: GameConfig) -> Self {
        Self::assemble(config, RandomMineGenerator::from_os_rng())
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::assemble(config, RandomMineGenerator::new(seed))
    }
}

impl GameEngine<MineLayout> {
    /// Replays a known layout, taking the board size and mine count from it. The
    /// layout is fixed, so `reset` to any other size or mine count is refused.
    pub fn with_layout(layout: MineLayout) -> Self {
        let config = layout.game_config();
        Self::assemble(config, layout)
    }
}

impl<G: MineGenerator> GameEngine<G> {
    /// Fails with `InvalidBoardShape` when `generator` cannot fill `config`.
    pub fn with_generator(config: GameConfig, generator: G) -> Result<Self> {
        if !generator.supports(config) {
            return Err(GameError::InvalidBoardShape);
        }
        Ok(Self::assemble(config, generator))
    }

    fn assemble(config: GameConfig, generator: G) -> Self {
        Self {
            config,
            session: GameSession::new(config.size()),
            generator,
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn board(&self) -> &Board {
        &self.session.board
    }

    pub fn status(&self) -> GameStatus {
        self.session.status
    }

    pub fn is_finished(&self) -> bool {
        self.session.status.is_finished()
    }

    pub fn mine_generated(&self) -> bool {
        self.session.mine_generated
    }

    pub fn start_ms(&self) -> Option<u64> {
        self.session.start_ms
    }

    pub fn end_ms(&self) -> Option<u64> {
        self.session.end_ms
    }

    /// Play time so far, frozen once the game ends, 0 if it hasn't started.
    pub fn elapsed_ms(&self) -> u64 {
        match self.session.start_ms {
            Some(start) => self
                .session
                .end_ms
                .unwrap_or_else(now_ms)
                .saturating_sub(start),
            None => 0,
        }
    }

    /// How many mines have not been flagged yet, negative when over-flagged.
    pub fn mines_left(&self) -> isize {
        (self.config.mines() as isize) - (self.session.flagged_count.0 as isize)
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<Cell> {
        let coords = self.session.board.validate_coords(coords)?;
        Ok(self.session.board[coords])
    }

    pub fn neighbors(&self, coords: Coord2) -> Result<SmallVec<[Cell; 8]>> {
        let coords = self.session.board.validate_coords(coords)?;
        Ok(self.session.board.neighbor_cells(coords))
    }

    /// Starts over with new dimensions or mine count, each defaulting to the current one.
    /// Asking for the current config again always succeeds.
    pub fn reset(
        &mut self,
        width: Option<Coord>,
        height: Option<Coord>,
        mines: Option<CellCount>,
    ) -> Result<()> {
        let size = (
            width.unwrap_or(self.config.width()),
            height.unwrap_or(self.config.height()),
        );
        let mines = mines.unwrap_or(self.config.mines());
        if (size, mines) == (self.config.size(), self.config.mines()) {
            self.restart();
            return Ok(());
        }
        self.reset_with(GameConfig::new(size, mines)?)
    }

    /// Leaves the current session untouched when the generator cannot fill `config`.
    pub fn reset_with(&mut self, config: GameConfig) -> Result<()> {
        if !self.generator.supports(config) {
            log::warn!("generator cannot fill {:?}, keeping {:?}", config, self.config);
            return Err(GameError::InvalidBoardShape);
        }
        self.apply_config(config);
        Ok(())
    }

    pub fn restart(&mut self) {
        self.apply_config(self.config);
    }

    fn apply_config(&mut self, config: GameConfig) {
        log::debug!("reset to {:?}", config);
        self.config = config;
        self.session = GameSession::new(config.size());
    }

    /// Primary action. The first reveal of a session places the mines and starts the clock.
    pub fn on_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.session.board.validate_coords(coords)?;

        if self.session.status.is_ready() {
            if !self.session.mine_generated {
                self.generate_mines(coords)?;
            }
            self.mark_started();
        }

        if !self.session.status.is_playing() {
            return Ok(RevealOutcome::NoChange);
        }

        let cell = self.session.board[coords];
        if cell.flagged || cell.revealed {
            return Ok(RevealOutcome::NoChange);
        }

        self.session.board.cell_mut(coords).revealed = true;
        if cell.mine {
            let event = self.on_game_over(GameStatus::Lost, Some(coords));
            return Ok(RevealOutcome::GameOver(event));
        }

        let opened = self.flood_reveal(coords);
        log::debug!(
            "Revealed cell at {:?}, mine count: {}, flood opened {}",
            coords,
            cell.adjacent_mines,
            opened
        );
        Ok(RevealOutcome::Revealed)
    }

    /// Secondary action, toggles the flag on an unrevealed cell.
    pub fn on_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.session.board.validate_coords(coords)?;

        if !self.session.status.is_playing() {
            return Ok(MarkOutcome::NoChange);
        }

        let cell = self.session.board.cell_mut(coords);
        if cell.revealed {
            return Ok(MarkOutcome::NoChange);
        }

        cell.flagged = !cell.flagged;
        if cell.flagged {
            self.session.flagged_count += 1;
        } else {
            self.session.flagged_count -= 1;
        }
        Ok(MarkOutcome::Changed)
    }

    /// Chord on a revealed number: reveal the rest when its flags are satisfied, then
    /// flag the rest when the unknown neighbors must all be mines.
    pub fn auto_expand(&mut self, coords: Coord2) -> Result<ExpandOutcome> {
        let coords = self.session.board.validate_coords(coords)?;
        let mut outcome = ExpandOutcome::default();

        let cell = self.session.board[coords];
        if !self.session.status.is_playing() || cell.flagged || !cell.revealed {
            return Ok(outcome);
        }

        let neighbors: SmallVec<[Coord2; 8]> = self.session.board.neighbors(coords).collect();
        let flagged = neighbors
            .iter()
            .filter(|&&pos| self.session.board[pos].flagged)
            .count() as u8;

        if flagged == cell.adjacent_mines {
            for &pos in &neighbors {
                let neighbor = self.session.board[pos];
                if !neighbor.is_unknown() {
                    continue;
                }

                self.session.board.cell_mut(pos).revealed = true;
                if neighbor.mine {
                    let event = self.on_game_over(GameStatus::Lost, Some(pos));
                    outcome.reveal = RevealOutcome::GameOver(event);
                    return Ok(outcome);
                }
                self.flood_reveal(pos);
                outcome.reveal = RevealOutcome::Revealed;
            }
        }

        let unknown: SmallVec<[Coord2; 8]> = neighbors
            .iter()
            .copied()
            .filter(|&pos| self.session.board[pos].is_unknown())
            .collect();
        let remaining = cell.adjacent_mines.checked_sub(flagged);
        if !unknown.is_empty() && remaining == Some(unknown.len() as u8) {
            for &pos in &unknown {
                self.session.board.cell_mut(pos).flagged = true;
                self.session.flagged_count += 1;
            }
            log::debug!("Auto-flagged {} cells around {:?}", unknown.len(), coords);
            outcome.mark = MarkOutcome::Changed;
        }

        Ok(outcome)
    }

    /// Polled by the caller after state-changing actions; wins once every safe cell is
    /// revealed, flags are not required.
    pub fn check_win(&mut self) -> Option<GameOverEvent> {
        if !self.session.mine_generated || !self.session.status.is_playing() {
            return None;
        }

        let safe_hidden = self
            .session
            .board
            .cells()
            .any(|cell| !cell.revealed && !cell.mine);
        if safe_hidden {
            return None;
        }

        Some(self.on_game_over(GameStatus::Won, None))
    }

    fn generate_mines(&mut self, initial: Coord2) -> Result<()> {
        let layout = self.generator.generate(self.config, initial)?;
        if layout.size() != self.session.board.size() {
            return Err(GameError::InvalidBoardShape);
        }

        self.session.board.apply_layout(&layout);
        self.session.board.compute_adjacency();
        self.session.mine_generated = true;
        Ok(())
    }

    /// Opens the zero region connected to `origin` plus its numbered border. Flagged
    /// cells are neither opened nor expanded through. Returns how many cells opened.
    fn flood_reveal(&mut self, origin: Coord2) -> CellCount {
        if self.session.board[origin].adjacent_mines != 0 {
            return 0;
        }

        let mut opened: CellCount = 0;
        let mut to_visit = VecDeque::from([origin]);
        log::trace!("Starting flood-fill from {:?}", origin);

        while let Some(visit_coords) = to_visit.pop_front() {
            for pos in self.session.board.neighbors(visit_coords) {
                let neighbor = self.session.board.cell_mut(pos);
                if !neighbor.is_unknown() {
                    continue;
                }

                neighbor.revealed = true;
                opened += 1;
                log::trace!(
                    "Flood opened cell at {:?}, mine count: {}",
                    pos,
                    neighbor.adjacent_mines
                );

                if neighbor.adjacent_mines == 0 && !neighbor.mine {
                    to_visit.push_back(pos);
                }
            }
        }

        opened
    }

    fn mark_started(&mut self) {
        if self.session.status.is_ready() {
            let now = now_ms();
            log::debug!("started at {}", now);
            self.session.start_ms = Some(now);
            self.session.status = GameStatus::Playing;
        }
    }

    fn on_game_over(
        &mut self,
        status: GameStatus,
        triggered_mine: Option<Coord2>,
    ) -> GameOverEvent {
        let now = now_ms();
        self.session.status = status;
        self.session.end_ms = Some(now);
        log::debug!("ended as {:?} at {}", status, now);

        let exposed_mines = match status {
            GameStatus::Lost => self.show_all_mines(),
            _ => 0,
        };

        GameOverEvent {
            status,
            triggered_mine,
            exposed_mines,
        }
    }

    /// Reveals every mine still hidden, returning how many were uncovered.
    fn show_all_mines(&mut self) -> CellCount {
        let (width, height) = self.session.board.size();
        let mut exposed = 0;
        for y in 0..height {
            for x in 0..width {
                let cell = self.session.board.cell_mut((x, y));
                if cell.mine && !cell.revealed {
                    cell.revealed = true;
                    exposed += 1;
                }
            }
        }
        exposed
    }
}
