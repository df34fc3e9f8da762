//! Level model for a hexagonal minesweeper puzzle editor.
//!
//! A [`LevelConfig`] is a grid of [`HexCoord`] cells, a set of mines and a list
//! of [`Rule`]s. [`EditorSession`] is the one place that changes a level over
//! time, and the [`codec`](parse_level) functions move levels to and from the
//! text format.

pub use codec::*;
pub use coord::*;
pub use editor::*;
pub use error::*;
pub use geometry::*;
pub use level::*;
pub use rule::*;

mod codec;
mod coord;
mod editor;
mod error;
mod geometry;
mod level;
mod rule;
#[cfg(test)]
mod strategy;
