//! Solution and move representations.

use std::fmt;

/// An unordered pair of positions, stored canonically with the smaller
/// index first.
///
/// A move describes how a neighbor was derived from its parent and also
/// serves as the key in the taboo list, so `Move::new(3, 1)` and
/// `Move::new(1, 3)` are the same move.
///
/// # Examples
///
/// ```
/// use qap_tabu::problem::Move;
///
/// let m = Move::new(7, 2);
/// assert_eq!((m.first(), m.second()), (2, 7));
/// assert_eq!(m, Move::new(2, 7));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    first: usize,
    second: usize,
}

impl Move {
    /// Creates the canonical move for the unordered pair `{a, b}`.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    /// The smaller position.
    pub fn first(&self) -> usize {
        self.first
    }

    /// The larger position.
    pub fn second(&self) -> usize {
        self.second
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// A candidate assignment of facilities to locations.
///
/// `assignment[i]` is the location of facility `i`. The fitness is `None`
/// until the solution has been evaluated against a
/// [`ProblemInstance`](super::ProblemInstance).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Permutation of `0..n`.
    pub assignment: Vec<usize>,
    /// Move that produced this solution from its parent; `None` for an
    /// initial solution.
    pub origin: Option<Move>,
    /// Cached cost, `None` while unevaluated.
    pub fitness: Option<u64>,
}

impl Solution {
    /// Creates an unevaluated initial solution.
    pub fn new(assignment: Vec<usize>) -> Self {
        Self {
            assignment,
            origin: None,
            fitness: None,
        }
    }

    /// Creates an unevaluated neighbor produced by `mv`.
    pub fn derived(assignment: Vec<usize>, mv: Move) -> Self {
        Self {
            assignment,
            origin: Some(mv),
            fitness: None,
        }
    }

    /// Number of facilities.
    pub fn len(&self) -> usize {
        self.assignment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }
}
