use crate::Point;
use std::collections::BTreeSet;
use std::fmt;

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// Constraints are values. Folding knowledge into one never mutates it, it
/// produces a new constraint (see [`Constraint::without_cell`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Constraint {
    cells: BTreeSet<Point>,
    count: usize,
}

impl Constraint {
    /// Builds a constraint, or `None` if it would be degenerate (no cells) or
    /// claim more mines than it has cells.
    pub fn new(cells: impl IntoIterator<Item = Point>, count: usize) -> Option<Self> {
        let cells: BTreeSet<Point> = cells.into_iter().collect();
        if cells.is_empty() || count > cells.len() {
            return None;
        }
        Some(Constraint { cells, count })
    }

    pub fn cells(&self) -> &BTreeSet<Point> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Only constraints produced by [`Constraint::without_cell`] can be empty.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: &Point) -> bool {
        self.cells.contains(cell)
    }

    /// Every cell, if every remaining cell has to be a mine.
    pub fn implied_mines(&self) -> BTreeSet<Point> {
        if !self.cells.is_empty() && self.count == self.cells.len() {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Every cell, if none of them can be a mine.
    pub fn implied_safe(&self) -> BTreeSet<Point> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// The statement that remains once `cell` is resolved.
    ///
    /// A resolved mine takes one off the count, a resolved safe cell does not.
    /// The result may be empty; callers discard it then. Returns `None` when the
    /// resolution contradicts this statement: a mine where `count == 0`, or a
    /// safe cell where every cell had to be a mine.
    pub fn without_cell(&self, cell: &Point, was_mine: bool) -> Option<Constraint> {
        if !self.cells.contains(cell) {
            return Some(self.clone());
        }

        let count = if was_mine {
            self.count.checked_sub(1)?
        } else {
            self.count
        };

        let mut cells = self.cells.clone();
        cells.remove(cell);
        if count > cells.len() {
            return None;
        }

        Some(Constraint { cells, count })
    }

    /// Subset resolution: when `subset`'s cells are a strict subset of
    /// `superset`'s, the cells outside `subset` hold the remaining mines.
    ///
    /// `{a, b, c} = 1` resolved against `{b, c} = 1` gives `{a} = 0`.
    pub fn resolve(subset: &Constraint, superset: &Constraint) -> Option<Constraint> {
        if subset.cells.is_empty()
            || subset.cells.len() >= superset.cells.len()
            || !subset.cells.is_subset(&superset.cells)
        {
            return None;
        }

        let count = superset.count.checked_sub(subset.count)?;
        Constraint::new(superset.cells.difference(&subset.cells).copied(), count)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", cell)?;
        }
        write!(f, "}} = {}", self.count)
    }
}
