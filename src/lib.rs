//! twenty48-rules: the rule engine of a 4x4 sliding-tile (2048) puzzle
//!
//! This crate provides:
//! - A compact `Grid` type with spawn, directional shift (compact + merge) and
//!   win/lose classification (`engine` module)
//! - A `Game` session that sequences move, spawn and status per command (`game` module)
//! - Key-to-command translation (`input` module) and a text renderer (`render` module)
//!
//! Quick start:
//! ```
//! use twenty48_rules::engine::{self as GameEngine, Direction, GameStatus, Grid};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Optional: build the line tables up front instead of on the first move
//! GameEngine::new();
//!
//! // Deterministic start with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let g0 = Grid::new_game(&mut rng);
//! let g1 = g0.shift(Direction::Left);
//! let g2 = if g1 != g0 { g1.spawn(1, &mut rng).unwrap() } else { g0 };
//! assert_eq!(g2.status(), GameStatus::Active);
//! ```
//!
//! Session loop:
//! ```
//! use twenty48_rules::engine::Direction;
//! use twenty48_rules::game::{Game, Outcome};
//! use twenty48_rules::input::Command;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut game = Game::new(StdRng::seed_from_u64(123));
//! for dir in [Direction::Left, Direction::Up, Direction::Right, Direction::Down] {
//!     match game.handle(Command::Move(dir)).unwrap() {
//!         Outcome::Moved | Outcome::Unchanged => {}
//!         other => panic!("unexpected {other:?}"),
//!     }
//! }
//! assert!(game.grid().count_empty() <= 14);
//! ```
//!
//! Note: free functions (`engine::reset`, `engine::spawn`) use the thread-local
//! RNG. Prefer the `Grid` methods when you need determinism.
pub mod engine;
pub mod game;
pub mod input;
pub mod render;
