//! A single game session: sequences move, spawn and status the way the
//! play loop expects, one command at a time.

use rand::Rng;
use tracing::{debug, info};

use crate::engine::{apply_move, classify_status, GameStatus, Grid, SpawnError};
use crate::input::Command;

/// What a command did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The grid changed and one tile was spawned.
    Moved,
    /// The move left the grid as it was; nothing spawned.
    Unchanged,
    /// A fresh grid replaced the finished one.
    Restarted,
    /// Not valid in the current status (a move after the game ended, or a
    /// restart while still playing).
    Ignored,
    /// The player asked to leave.
    Quit,
}

/// Session state: the live grid, its status, and the RNG used for spawns.
#[derive(Debug)]
pub struct Game<R: Rng> {
    grid: Grid,
    status: GameStatus,
    moves: u64,
    rng: R,
}

impl<R: Rng> Game<R> {
    /// Start a session on a fresh two-tile grid.
    pub fn new(mut rng: R) -> Self {
        let grid = Grid::new_game(&mut rng);
        info!(grid = ?grid, "new game");
        Game { grid, status: GameStatus::Active, moves: 0, rng }
    }

    /// Start a session from a given grid; status is classified from it.
    pub fn from_grid(grid: Grid, rng: R) -> Self {
        Game { grid, status: classify_status(grid), moves: 0, rng }
    }

    #[inline]
    pub fn grid(&self) -> Grid { self.grid }

    #[inline]
    pub fn status(&self) -> GameStatus { self.status }

    /// Number of committed (grid-changing) moves since the last (re)start.
    #[inline]
    pub fn moves(&self) -> u64 { self.moves }

    /// Apply one command.
    ///
    /// While active, a move that changes the grid is committed and followed
    /// by exactly one spawn; a move that changes nothing is a no-op. The
    /// status is recomputed after every move. Once won or lost, only
    /// restart and quit are honoured.
    pub fn handle(&mut self, cmd: Command) -> Result<Outcome, SpawnError> {
        match (self.status, cmd) {
            (_, Command::Quit) => {
                info!(moves = self.moves, status = ?self.status, "quit");
                Ok(Outcome::Quit)
            }
            (GameStatus::Active, Command::Move(dir)) => {
                let next = apply_move(self.grid, dir);
                let outcome = if next != self.grid {
                    self.grid = next.spawn(1, &mut self.rng)?;
                    self.moves += 1;
                    debug!(?dir, grid = ?self.grid, moves = self.moves, "move committed");
                    Outcome::Moved
                } else {
                    debug!(?dir, "move changed nothing");
                    Outcome::Unchanged
                };
                self.status = classify_status(self.grid);
                if self.status.is_over() {
                    info!(
                        status = ?self.status,
                        moves = self.moves,
                        highest = self.grid.highest_tile(),
                        "game over"
                    );
                }
                Ok(outcome)
            }
            (GameStatus::Active, Command::Restart) => Ok(Outcome::Ignored),
            (_, Command::Restart) => {
                self.grid = Grid::new_game(&mut self.rng);
                self.status = GameStatus::Active;
                self.moves = 0;
                info!(grid = ?self.grid, "restart");
                Ok(Outcome::Restarted)
            }
            (_, Command::Move(_)) => Ok(Outcome::Ignored),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Direction;
    use rand::{rngs::StdRng, SeedableRng};

    fn seeded(rows: [[u32; 4]; 4]) -> Game<StdRng> {
        Game::from_grid(Grid::from_rows(rows).unwrap(), StdRng::seed_from_u64(11))
    }

    #[test]
    fn test_new_game_has_two_tiles() {
        let game = Game::new(StdRng::seed_from_u64(1));
        assert_eq!(game.grid().count_empty(), 14);
        assert_eq!(game.status(), GameStatus::Active);
        assert_eq!(game.moves(), 0);
    }

    #[test]
    fn test_changing_move_spawns_once() {
        let mut game = seeded([[0, 0, 0, 2], [0; 4], [0; 4], [0; 4]]);
        let outcome = game.handle(Command::Move(Direction::Left)).unwrap();
        assert_eq!(outcome, Outcome::Moved);
        assert_eq!(game.grid().tile(0, 0), 2);
        assert_eq!(game.grid().count_empty(), 14);
        assert_eq!(game.grid().tile_sum(), 4);
        assert_eq!(game.moves(), 1);
    }

    #[test]
    fn test_noop_move_does_not_spawn() {
        let mut game = seeded([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let before = game.grid();
        assert_eq!(game.handle(Command::Move(Direction::Left)).unwrap(), Outcome::Unchanged);
        assert_eq!(game.handle(Command::Move(Direction::Up)).unwrap(), Outcome::Unchanged);
        assert_eq!(game.grid(), before);
        assert_eq!(game.moves(), 0);
    }

    #[test]
    fn test_reaching_2048_wins() {
        let mut game = seeded([[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(game.handle(Command::Move(Direction::Left)).unwrap(), Outcome::Moved);
        assert_eq!(game.status(), GameStatus::Won);
        assert_eq!(game.handle(Command::Move(Direction::Right)).unwrap(), Outcome::Ignored);
    }

    #[test]
    fn test_lost_grid_only_restarts_or_quits() {
        let mut game = seeded([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ]);
        assert_eq!(game.status(), GameStatus::Lost);
        assert_eq!(game.handle(Command::Move(Direction::Down)).unwrap(), Outcome::Ignored);
        assert_eq!(game.handle(Command::Restart).unwrap(), Outcome::Restarted);
        assert_eq!(game.status(), GameStatus::Active);
        assert_eq!(game.grid().count_empty(), 14);
    }

    #[test]
    fn test_restart_ignored_while_active() {
        let mut game = seeded([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let before = game.grid();
        assert_eq!(game.handle(Command::Restart).unwrap(), Outcome::Ignored);
        assert_eq!(game.grid(), before);
    }

    #[test]
    fn test_quit_any_time() {
        let mut game = seeded([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(game.handle(Command::Quit).unwrap(), Outcome::Quit);
        let mut won = seeded([[2048, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(won.handle(Command::Quit).unwrap(), Outcome::Quit);
    }

    #[test]
    fn test_unmergeable_max_pair_ends_game() {
        let mut game = seeded([
            [32768, 32768, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ]);
        assert_eq!(game.status(), GameStatus::Lost);
        assert_eq!(game.handle(Command::Restart).unwrap(), Outcome::Restarted);
        assert_eq!(game.grid().count_empty(), 14);
    }

    #[test]
    fn test_yes_at_prompt_restarts_with_two_tiles() {
        let mut game = seeded([[2048, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        for cmd in crate::input::parse_line("yes") {
            game.handle(cmd).unwrap();
        }
        assert_eq!(game.status(), GameStatus::Active);
        assert_eq!(game.grid().count_empty(), 14);
        assert_eq!(game.moves(), 0);
    }

    #[test]
    fn test_last_empty_cell_filled_then_lost() {
        // Left merges the 4s in row 3; the spawn fills the freed cell.
        let mut game = seeded([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [8, 16, 4, 4],
        ]);
        assert_eq!(game.handle(Command::Move(Direction::Left)).unwrap(), Outcome::Moved);
        assert_eq!(game.grid().to_rows()[3], [8, 16, 8, 2]);
        assert_eq!(game.status(), GameStatus::Lost);
    }
}
