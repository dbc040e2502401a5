use crate::{Constraint, Point, all_points};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Everything the agent has learned about one game.
///
/// Owned by whoever drives the game. [`KnowledgeBase::observe`] (see the
/// `inference` module) is the only way new facts come in; the selector and any
/// display code only read it.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    pub(crate) height: usize,
    pub(crate) width: usize,
    /// Number of mines planted on the board, known from the game rules.
    pub(crate) total_mines: usize,
    /// Cells already probed. Only ever grows.
    pub(crate) moves_made: HashSet<Point>,
    /// Cells proven safe, probed or not.
    pub(crate) known_safe: HashSet<Point>,
    /// Cells proven to hold a mine.
    pub(crate) known_mines: HashSet<Point>,
    /// Statements over cells whose state is still unknown.
    pub(crate) constraints: HashSet<Constraint>,
}

impl KnowledgeBase {
    pub fn new(height: usize, width: usize, total_mines: usize) -> Self {
        KnowledgeBase {
            height,
            width,
            total_mines,
            moves_made: HashSet::new(),
            known_safe: HashSet::new(),
            known_mines: HashSet::new(),
            constraints: HashSet::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn total_mines(&self) -> usize {
        self.total_mines
    }

    pub fn moves_made(&self) -> &HashSet<Point> {
        &self.moves_made
    }

    pub fn known_safe(&self) -> &HashSet<Point> {
        &self.known_safe
    }

    pub fn known_mines(&self) -> &HashSet<Point> {
        &self.known_mines
    }

    pub fn constraints(&self) -> &HashSet<Constraint> {
        &self.constraints
    }

    /// Safe cells that have not been probed yet, i.e. the moves on offer.
    pub fn safe_moves(&self) -> impl Iterator<Item = Point> + '_ {
        self.known_safe
            .iter()
            .copied()
            .filter(|cell| !self.moves_made.contains(cell))
    }

    /// Cells neither probed nor known to be mines, in row-major order.
    pub fn unknown_cells(&self) -> Vec<Point> {
        all_points(self.height, self.width)
            .filter(|cell| !self.moves_made.contains(cell) && !self.known_mines.contains(cell))
            .collect()
    }

    pub fn all_mines_found(&self) -> bool {
        self.known_mines.len() == self.total_mines
    }

    /// Records `cell` as a mine and folds that into every constraint.
    /// Returns whether this was news.
    pub(crate) fn mark_mine(&mut self, cell: Point) -> bool {
        if self.known_mines.contains(&cell) {
            return false;
        }
        if self.known_safe.contains(&cell) {
            warn!("{} concluded to be a mine but is known safe, ignoring", cell);
            return false;
        }

        debug!("Concluded mine at {}", cell);
        self.known_mines.insert(cell);
        self.fold_cell(cell, true);
        true
    }

    /// Records `cell` as safe and folds that into every constraint.
    /// Returns whether this was news.
    pub(crate) fn mark_safe(&mut self, cell: Point) -> bool {
        if self.known_safe.contains(&cell) {
            return false;
        }
        if self.known_mines.contains(&cell) {
            warn!("{} concluded to be safe but is a known mine, ignoring", cell);
            return false;
        }

        debug!("Concluded safe at {}", cell);
        self.known_safe.insert(cell);
        self.fold_cell(cell, false);
        true
    }

    /// Replaces every constraint mentioning `cell` with what remains once the
    /// cell is resolved. Emptied constraints are dropped, as are constraints
    /// the resolution contradicts.
    pub(crate) fn fold_cell(&mut self, cell: Point, was_mine: bool) {
        let affected: Vec<Constraint> = self
            .constraints
            .iter()
            .filter(|constraint| constraint.contains(&cell))
            .cloned()
            .collect();

        for constraint in affected {
            self.constraints.remove(&constraint);
            match constraint.without_cell(&cell, was_mine) {
                Some(rest) if rest.is_empty() => {}
                Some(rest) => {
                    self.constraints.insert(rest);
                }
                None => warn!(
                    "Dropping {}: contradicted by {} being {}",
                    constraint,
                    cell,
                    if was_mine { "a mine" } else { "safe" }
                ),
            }
        }
    }
}
