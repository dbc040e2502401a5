use crate::{Constraint, KnowledgeBase, Point};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use tracing::debug;

/// Picks the next cell to probe from what a [`KnowledgeBase`] knows.
///
/// Owns its random generator so a seeded selector replays the same game.
pub struct MoveSelector<R = StdRng> {
    rng: R,
}

impl MoveSelector<StdRng> {
    /// A selector seeded from OS entropy.
    pub fn new() -> Self {
        MoveSelector {
            rng: StdRng::from_os_rng(),
        }
    }

    /// A selector whose guesses are fully determined by `seed`.
    pub fn seeded(seed: u64) -> Self {
        MoveSelector {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for MoveSelector<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> MoveSelector<R> {
    pub fn with_rng(rng: R) -> Self {
        MoveSelector { rng }
    }

    /// A cell proven safe and not probed yet, if there is one.
    /// Always the first such cell in row-major order.
    pub fn make_safe_move(&self, kb: &KnowledgeBase) -> Option<Point> {
        kb.safe_moves().min()
    }

    /// The least risky cell to probe when nothing is proven safe.
    ///
    /// The constraint with the lowest mine density is weighed against the
    /// density of the remaining mines over every unknown cell outside it, and
    /// the guess is drawn from whichever side looks safer. This treats cells
    /// as independent, which they are not, so it is an estimate only.
    ///
    /// `None` once every cell is either probed or a known mine.
    pub fn make_guess_move(&mut self, kb: &KnowledgeBase) -> Option<Point> {
        let unknown = kb.unknown_cells();
        if unknown.is_empty() {
            return None;
        }

        let Some(best) = kb
            .constraints()
            .iter()
            .filter(|constraint| !constraint.is_empty())
            .min_by(|a, b| compare_density(a, b))
        else {
            debug!("No constraints, guessing among {} cells", unknown.len());
            return unknown.choose(&mut self.rng).copied();
        };

        let best_cells: Vec<Point> = best.cells().iter().copied().collect();
        let pool: Vec<Point> = unknown
            .into_iter()
            .filter(|cell| !best.contains(cell))
            .collect();

        if pool.is_empty() {
            return best_cells.choose(&mut self.rng).copied();
        }

        let remaining_mines = kb.total_mines().saturating_sub(kb.known_mines().len());

        // best.count / best.len < remaining / pool.len, without the division
        if best.count() * pool.len() < remaining_mines * best.len() {
            debug!(
                "Guessing inside {} over {} mines in {} other cells",
                best,
                remaining_mines,
                pool.len()
            );
            best_cells.choose(&mut self.rng).copied()
        } else {
            debug!(
                "Guessing outside {}: {} mines in {} other cells",
                best,
                remaining_mines,
                pool.len()
            );
            pool.choose(&mut self.rng).copied()
        }
    }
}

/// Orders constraints by `count / len`, ties by value so the pick is stable.
fn compare_density(a: &Constraint, b: &Constraint) -> Ordering {
    (a.count() * b.len())
        .cmp(&(b.count() * a.len()))
        .then_with(|| a.cmp(b))
}
