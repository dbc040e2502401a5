//! A SAT model of the observations, used by tests to check that everything
//! the agent concludes is actually forced.

use crate::{Point, all_points};
use itertools::Itertools;
use std::collections::HashMap;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

pub struct Oracle {
    solver: Solver<'static>,
    vars: HashMap<Point, Var>,
}

impl Oracle {
    /// One variable per cell ("is a mine"). Each observation says its cell is
    /// safe and that exactly `count` of its neighbors are mines.
    pub fn new(height: usize, width: usize, observations: &[(Point, usize)]) -> Self {
        let mut solver = Solver::new();
        let vars: HashMap<Point, Var> = all_points(height, width)
            .map(|point| (point, solver.new_var()))
            .collect();

        let mut formula = CnfFormula::new();
        for &(cell, count) in observations {
            formula.add_clause(&[Lit::from_var(vars[&cell], false)]);

            let lits: Vec<Lit> = cell
                .neighbors(height, width)
                .map(|neighbor| Lit::from_var(vars[&neighbor], true))
                .collect();
            encode_exactly_k(&mut formula, &lits, count);
        }
        solver.add_formula(&formula);

        Oracle { solver, vars }
    }

    pub fn is_satisfiable(&mut self) -> bool {
        self.solver.solve().unwrap_or(false)
    }

    /// Whether every assignment consistent with the observations puts a mine
    /// at `cell` (`mine == true`) or leaves it clear (`mine == false`).
    pub fn is_forced(&mut self, cell: Point, mine: bool) -> bool {
        let opposite = Lit::from_var(self.vars[&cell], !mine);
        self.solver.assume(&[opposite]);
        let possible = self.solver.solve().unwrap_or(true);
        self.solver.assume(&[]);
        !possible
    }
}

/// Exactly `k` of `lits` are true. Neighborhoods have at most eight cells, so
/// the naive clause-per-combination encoding is small enough.
fn encode_exactly_k(formula: &mut CnfFormula, lits: &[Lit], k: usize) {
    // At most k: no k + 1 of them are all true
    if k < lits.len() {
        for combo in lits.iter().copied().combinations(k + 1) {
            let clause: Vec<Lit> = combo.iter().map(|&lit| !lit).collect();
            formula.add_clause(&clause);
        }
    }

    // At least k: any n - k + 1 of them contain a true one
    if k > lits.len() {
        formula.add_clause(&[]);
    } else if k > 0 {
        for combo in lits.iter().copied().combinations(lits.len() - k + 1) {
            formula.add_clause(&combo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, KnowledgeBase, MoveSelector};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn p(row: usize, col: usize) -> Point {
        Point::new(row, col)
    }

    #[test]
    fn test_oracle_forced_cells() {
        // 1x3 row, the middle cell sees one mine and the right cell sees none
        let observations = [(p(0, 1), 1), (p(0, 2), 0)];
        let mut oracle = Oracle::new(1, 3, &observations);
        assert!(oracle.is_satisfiable());
        assert!(oracle.is_forced(p(0, 0), true));
        assert!(oracle.is_forced(p(0, 2), false));
        assert!(!oracle.is_forced(p(0, 0), false));
    }

    #[test]
    fn test_oracle_undetermined_cells() {
        let mut oracle = Oracle::new(1, 3, &[(p(0, 1), 1)]);
        assert!(!oracle.is_forced(p(0, 0), true));
        assert!(!oracle.is_forced(p(0, 0), false));
        assert!(!oracle.is_forced(p(0, 2), true));
    }

    /// Checks every invariant the knowledge base promises, against the board's
    /// ground truth and against the SAT model of the observations.
    fn check_knowledge(kb: &KnowledgeBase, board: &Board, observations: &[(Point, usize)]) {
        let safe = kb.known_safe();
        let mines = kb.known_mines();
        assert!(safe.is_disjoint(mines));
        assert!(kb.moves_made().is_subset(safe));

        for constraint in kb.constraints() {
            assert!(!constraint.is_empty());
            assert!(constraint.count() <= constraint.len());
            for cell in constraint.cells() {
                assert!(!kb.moves_made().contains(cell));
                assert!(!safe.contains(cell));
                assert!(!mines.contains(cell));
            }
        }

        for &cell in mines {
            assert!(board.is_mine(cell), "{} concluded mine but is clear", cell);
        }
        for &cell in safe {
            assert!(!board.is_mine(cell), "{} concluded safe but is a mine", cell);
        }

        let mut oracle = Oracle::new(kb.height(), kb.width(), observations);
        for &cell in mines {
            assert!(oracle.is_forced(cell, true), "{} is not a forced mine", cell);
        }
        for &cell in safe {
            assert!(oracle.is_forced(cell, false), "{} is not forced safe", cell);
        }
    }

    /// Plays one game the way the bot does, checking the knowledge base after
    /// every observation. Returns whether the game was won.
    fn play(board: &mut Board, seed: u64) -> bool {
        let mut kb = KnowledgeBase::new(board.height, board.width, board.mine_count());
        let mut selector = MoveSelector::seeded(seed);
        let mut observations = Vec::new();

        loop {
            let next = match selector.make_safe_move(&kb) {
                Some(cell) => {
                    assert!(!kb.moves_made().contains(&cell));
                    Some(cell)
                }
                None => selector.make_guess_move(&kb),
            };
            let Some(cell) = next else {
                break;
            };
            assert!(!kb.known_mines().contains(&cell));
            assert!(!kb.moves_made().contains(&cell));

            if board.is_mine(cell) {
                assert!(!kb.known_safe().contains(&cell));
                return false;
            }

            let count = board.nearby_mines(cell);
            kb.observe(cell, count).unwrap();
            observations.push((cell, count));
            check_knowledge(&kb, board, &observations);

            for &mine in kb.known_mines() {
                board.flag(mine);
            }
            if board.won() {
                return true;
            }
        }

        board.won()
    }

    #[test]
    fn test_random_games_stay_sound() {
        // Guesses may lose; only the knowledge checks inside `play` matter here
        for seed in 0..12 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut board = Board::random(6, 6, 5, &mut rng).unwrap();
            play(&mut board, seed);
        }
    }

    #[test]
    fn test_empty_board_is_cleared() {
        let mut board = Board::with_mines(4, 4, []).unwrap();
        assert!(play(&mut board, 1));
    }

    #[test]
    fn test_corner_mine_is_found_by_logic_alone() {
        // Open the far corner of a 3x3 board, then only ever play proven cells
        let board = Board::with_mines(3, 3, [p(0, 0)]).unwrap();
        let mut kb = KnowledgeBase::new(3, 3, 1);
        let selector = MoveSelector::seeded(0);

        let mut cell = p(2, 2);
        loop {
            kb.observe(cell, board.nearby_mines(cell)).unwrap();
            match selector.make_safe_move(&kb) {
                Some(next) => cell = next,
                None => break,
            }
        }

        assert_eq!(kb.known_mines(), &HashSet::from([p(0, 0)]));
        assert_eq!(kb.moves_made().len(), 8);
        assert!(kb.constraints().is_empty());
        assert!(kb.all_mines_found());
    }
}
