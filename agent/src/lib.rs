//! A knowledge-based Minesweeper player.
//!
//! The agent never looks at the mines. It is fed one observation per revealed
//! cell (the cell and its neighbor mine count), keeps a set of [`Constraint`]s
//! over the cells it has not explored yet, and folds them to a fixed point so
//! that every cell it can prove safe or mined ends up in the [`KnowledgeBase`].
//! The [`MoveSelector`] then plays a proven-safe cell, or the least risky guess.

pub mod board;
pub mod constraint;
pub mod inference;
pub mod knowledge;
pub mod selector;

#[cfg(test)]
mod oracle;

pub use board::Board;
pub use constraint::Constraint;
pub use knowledge::KnowledgeBase;
pub use selector::MoveSelector;

use std::fmt;

/// A coordinate on the board, `(row, col)`, 0-indexed.
/// Ordered row-major so sets of points iterate in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub const fn new(row: usize, col: usize) -> Self {
        Point { row, col }
    }

    /// Every in-bounds neighbor of this point on a `height` x `width` board.
    /// Board edges and corners yield fewer than eight.
    pub fn neighbors(self, height: usize, width: usize) -> impl Iterator<Item = Point> {
        (-1..=1).flat_map(move |dr| {
            (-1..=1).filter_map(move |dc| {
                if dr == 0 && dc == 0 {
                    return None;
                }

                let nr = self.row as isize + dr;
                let nc = self.col as isize + dc;

                if nr >= 0 && nr < height as isize && nc >= 0 && nc < width as isize {
                    Some(Point {
                        row: nr as usize,
                        col: nc as usize,
                    })
                } else {
                    None
                }
            })
        })
    }

    pub fn in_bounds(self, height: usize, width: usize) -> bool {
        self.row < height && self.col < width
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// All points of a `height` x `width` board in row-major order.
pub fn all_points(height: usize, width: usize) -> impl Iterator<Item = Point> {
    (0..height).flat_map(move |row| (0..width).map(move |col| Point { row, col }))
}
