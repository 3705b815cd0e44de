//! Grid simulations
//!
//! All gameplay logic lives here. Nothing in this module touches the
//! platform: time arrives as elapsed milliseconds, randomness comes from a
//! seeded RNG, input arrives as `Key`s, and persistence goes through the
//! injected high-score store.

pub mod blocks;
pub mod grid;
pub mod piece;
pub mod snake;

pub use blocks::{BlocksGame, BlocksView};
pub use grid::{Direction, Position};
pub use piece::{Piece, PieceKind, Shape};
pub use snake::{Collision, SnakeGame, SnakeView, TickOutcome};
