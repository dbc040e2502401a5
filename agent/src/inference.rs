//! The inference engine: folding observations into the knowledge base and
//! propagating them to a fixed point.

use crate::{Constraint, KnowledgeBase, Point};
use itertools::Itertools;
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

impl KnowledgeBase {
    /// Folds in the fact that `cell` was revealed safe with `count` mines among
    /// its neighbors, then propagates until nothing new can be concluded.
    ///
    /// Fails without touching any state if the observation breaks the calling
    /// contract: a cell off the board, a cell probed before, a cell already
    /// proven to be a mine, or a count that cannot fit its neighborhood.
    pub fn observe(&mut self, cell: Point, count: usize) -> anyhow::Result<()> {
        // --- 1. Contract checks ---
        if !cell.in_bounds(self.height, self.width) {
            anyhow::bail!("out_of_bounds");
        }
        if self.moves_made.contains(&cell) {
            anyhow::bail!("already_probed");
        }
        if self.known_mines.contains(&cell) {
            anyhow::bail!("known_mine");
        }

        let neighbors: Vec<Point> = cell.neighbors(self.height, self.width).collect();
        if count > neighbors.len() {
            anyhow::bail!("count_out_of_range");
        }

        // --- 2. Build the new statement over the unexplored neighbors ---
        let unexplored = neighbors
            .into_iter()
            .filter(|neighbor| !self.moves_made.contains(neighbor));
        let statement = self.reduce(unexplored, count)?;

        debug!("Observed {} with {} adjacent mines", cell, count);

        // --- 3. The probed cell is safe, and no longer part of any statement ---
        self.moves_made.insert(cell);
        self.known_safe.insert(cell);
        self.fold_cell(cell, false);

        if let Some(statement) = statement {
            if self.constraints.insert(statement.clone()) {
                trace!("Added {}", statement);
            }
        }

        // --- 4. Run to a fixed point ---
        self.propagate();
        Ok(())
    }

    /// Adds a statement known from elsewhere (a hint, a replayed deduction) and
    /// propagates it. Cells it mentions that are already resolved are folded
    /// out first. Returns whether the statement added anything.
    pub fn add_constraint(&mut self, constraint: Constraint) -> anyhow::Result<bool> {
        if constraint
            .cells()
            .iter()
            .any(|cell| !cell.in_bounds(self.height, self.width))
        {
            anyhow::bail!("out_of_bounds");
        }

        let Some(statement) = self.reduce(constraint.cells().iter().copied(), constraint.count())?
        else {
            return Ok(false);
        };

        if !self.constraints.insert(statement.clone()) {
            return Ok(false);
        }
        trace!("Added {}", statement);

        self.propagate();
        Ok(true)
    }

    /// Turns "`count` mines among `cells`" into a statement over unknown cells
    /// only, taking out resolved cells (and the mines among them).
    /// `Ok(None)` when nothing unknown is left.
    fn reduce(
        &self,
        cells: impl IntoIterator<Item = Point>,
        count: usize,
    ) -> anyhow::Result<Option<Constraint>> {
        let mut remaining = count;
        let mut unknown = BTreeSet::new();

        for cell in cells {
            if self.known_mines.contains(&cell) {
                remaining = remaining
                    .checked_sub(1)
                    .ok_or(anyhow::anyhow!("count_inconsistent"))?;
            } else if !self.known_safe.contains(&cell) && !self.moves_made.contains(&cell) {
                unknown.insert(cell);
            }
        }

        if unknown.is_empty() {
            if remaining != 0 {
                anyhow::bail!("count_inconsistent");
            }
            return Ok(None);
        }

        match Constraint::new(unknown, remaining) {
            Some(statement) => Ok(Some(statement)),
            None => anyhow::bail!("count_inconsistent"),
        }
    }

    /// Alternates conclusion and subset resolution until a full pass changes
    /// nothing. Every productive pass either resolves a cell or adds a
    /// statement over unresolved cells, so on a finite board this ends.
    fn propagate(&mut self) {
        let mut passes = 0;
        loop {
            passes += 1;
            let concluded = self.apply_conclusions();
            let derived = self.resolve_subsets();
            if !concluded && !derived {
                break;
            }
        }
        trace!(
            "Fixed point after {} passes, {} constraints",
            passes,
            self.constraints.len()
        );
    }

    /// Records every cell some constraint pins down. Returns whether any of
    /// them was new.
    fn apply_conclusions(&mut self) -> bool {
        let mut mines = BTreeSet::new();
        let mut safes = BTreeSet::new();
        for constraint in &self.constraints {
            mines.extend(constraint.implied_mines());
            safes.extend(constraint.implied_safe());
        }

        let mut changed = false;
        for mine in mines {
            changed |= self.mark_mine(mine);
        }
        for safe in safes {
            changed |= self.mark_safe(safe);
        }
        changed
    }

    /// Adds every statement derivable from a pair of constraints where one's
    /// cells strictly contain the other's. Returns whether any was new.
    fn resolve_subsets(&mut self) -> bool {
        let derived: Vec<Constraint> = self
            .constraints
            .iter()
            .tuple_combinations()
            .flat_map(|(a, b)| [Constraint::resolve(a, b), Constraint::resolve(b, a)])
            .flatten()
            .filter(|candidate| !self.constraints.contains(candidate))
            .collect();

        let mut changed = false;
        for constraint in derived {
            if self.constraints.contains(&constraint) {
                continue;
            }
            if constraint
                .cells()
                .iter()
                .any(|cell| self.known_mines.contains(cell) || self.known_safe.contains(cell))
            {
                warn!("Derived {} mentions a resolved cell, dropping", constraint);
                continue;
            }
            trace!("Derived {}", constraint);
            self.constraints.insert(constraint);
            changed = true;
        }
        changed
    }
}
