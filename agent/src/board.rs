//! The board the agent plays against: a fixed grid with planted mines.
//!
//! The agent itself never reads this. The driver consults it to turn a probe
//! into either a loss or an observation.

use crate::{Point, all_points};
use rand::Rng;
use rand::seq::IteratorRandom;
use std::collections::HashSet;

pub struct Board {
    pub height: usize,
    pub width: usize,
    mines: HashSet<Point>,
    /// Cells the driver has flagged as mines.
    flagged: HashSet<Point>,
}

impl Board {
    /// Plants `mines` mines uniformly at random.
    pub fn random(
        height: usize,
        width: usize,
        mines: usize,
        rng: &mut impl Rng,
    ) -> anyhow::Result<Self> {
        if mines >= height * width {
            anyhow::bail!("too_many_mines");
        }

        let mines = all_points(height, width).choose_multiple(rng, mines);
        Self::with_mines(height, width, mines)
    }

    /// A board with mines at exactly the given cells.
    pub fn with_mines(
        height: usize,
        width: usize,
        mines: impl IntoIterator<Item = Point>,
    ) -> anyhow::Result<Self> {
        let mines: HashSet<Point> = mines.into_iter().collect();
        if mines.iter().any(|cell| !cell.in_bounds(height, width)) {
            anyhow::bail!("out_of_bounds");
        }

        Ok(Board {
            height,
            width,
            mines,
            flagged: HashSet::new(),
        })
    }

    pub fn mine_count(&self) -> usize {
        self.mines.len()
    }

    pub fn is_mine(&self, cell: Point) -> bool {
        self.mines.contains(&cell)
    }

    /// Mines among the in-bounds neighbors of `cell`, not counting the cell.
    pub fn nearby_mines(&self, cell: Point) -> usize {
        cell.neighbors(self.height, self.width)
            .filter(|neighbor| self.mines.contains(neighbor))
            .count()
    }

    pub fn flag(&mut self, cell: Point) {
        self.flagged.insert(cell);
    }

    pub fn is_flagged(&self, cell: Point) -> bool {
        self.flagged.contains(&cell)
    }

    /// The game is won once the flags sit on exactly the mines.
    pub fn won(&self) -> bool {
        self.flagged == self.mines
    }
}
