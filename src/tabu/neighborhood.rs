//! Sampled neighborhoods of a permutation.
//!
//! Each candidate is derived from the current solution by one elementary
//! [`Transform`] over a randomly drawn position pair. Pairs that are taboo,
//! or already used earlier in the same batch, are redrawn.

use rand::Rng;

use super::config::{NeighborhoodStrategy, TabuConfig};
use super::list::TabooList;
use crate::error::{ConfigError, QapError, Result};
use crate::problem::{Move, Solution};

/// An elementary permutation transform over a position pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Exchange the values at both positions.
    Swap,
    /// Reverse the contiguous span between both positions, inclusive.
    Reverse,
}

impl Transform {
    /// Applies the transform in place. Both transforms are self-inverse.
    ///
    /// ```
    /// use qap_tabu::problem::Move;
    /// use qap_tabu::tabu::Transform;
    ///
    /// let mut p = vec![0, 1, 2, 3, 4];
    /// Transform::Reverse.apply(&mut p, Move::new(1, 3));
    /// assert_eq!(p, vec![0, 3, 2, 1, 4]);
    /// Transform::Swap.apply(&mut p, Move::new(0, 4));
    /// assert_eq!(p, vec![4, 3, 2, 1, 0]);
    /// ```
    pub fn apply(self, perm: &mut [usize], mv: Move) {
        match self {
            Transform::Swap => perm.swap(mv.first(), mv.second()),
            Transform::Reverse => perm[mv.first()..=mv.second()].reverse(),
        }
    }
}

/// Produces batches of admissible neighbors for the search engine.
#[derive(Debug, Clone)]
pub struct NeighborhoodGenerator {
    size: usize,
    strategy: NeighborhoodStrategy,
    swap_probability: f64,
    max_redraws: Option<usize>,
}

impl NeighborhoodGenerator {
    /// Builds a generator for permutations of length `size`.
    pub fn new(size: usize, config: &TabuConfig) -> std::result::Result<Self, ConfigError> {
        config.validate_for(size)?;
        Ok(Self {
            size,
            strategy: config.strategy,
            swap_probability: config.swap_probability,
            max_redraws: config.max_redraws,
        })
    }

    pub fn strategy(&self) -> NeighborhoodStrategy {
        self.strategy
    }

    /// Samples `count` neighbors of `current`.
    ///
    /// Every returned candidate carries a distinct, non-taboo originating
    /// move and an unevaluated fitness. When the redraw budget runs out the
    /// taboo move closest to expiry is admitted instead; with no budget
    /// (`max_redraws == None`) the draw loop never gives up.
    ///
    /// Fails with [`QapError::InvalidPermutation`] if `current` does not
    /// have the generator's size.
    pub fn generate<R: Rng>(
        &self,
        current: &Solution,
        count: usize,
        taboo: &TabooList,
        rng: &mut R,
    ) -> Result<Vec<Solution>> {
        let too_large = || ConfigError::BatchTooLarge {
            batch_size: count,
            pairs: self.pair_count(),
            n: self.size,
        };
        if current.len() != self.size {
            return Err(QapError::InvalidPermutation {
                reason: format!(
                    "length {} does not match generator size {}",
                    current.len(),
                    self.size
                ),
            });
        }
        if count > self.pair_count() {
            return Err(too_large().into());
        }

        let mut chosen: Vec<Move> = Vec::with_capacity(count);
        let mut batch = Vec::with_capacity(count);
        while batch.len() < count {
            let mv = self.next_move(taboo, &chosen, rng).ok_or_else(too_large)?;
            chosen.push(mv);

            let transform = self.pick_transform(rng);
            let mut assignment = current.assignment.clone();
            transform.apply(&mut assignment, mv);
            batch.push(Solution::derived(assignment, mv));
        }
        Ok(batch)
    }

    fn pair_count(&self) -> usize {
        self.size * (self.size - 1) / 2
    }

    fn next_move<R: Rng>(&self, taboo: &TabooList, chosen: &[Move], rng: &mut R) -> Option<Move> {
        let mut redraws = 0usize;
        loop {
            let mv = draw_pair(self.size, rng);
            if !taboo.is_forbidden(mv) && !chosen.contains(&mv) {
                return Some(mv);
            }
            redraws += 1;
            if let Some(limit) = self.max_redraws {
                if redraws >= limit {
                    let fallback = least_recent(self.size, taboo, chosen);
                    tracing::warn!(
                        redraws,
                        taboo = taboo.len(),
                        fallback = ?fallback,
                        "redraw budget exhausted, admitting move closest to expiry"
                    );
                    return fallback;
                }
            }
        }
    }

    fn pick_transform<R: Rng>(&self, rng: &mut R) -> Transform {
        match self.strategy {
            NeighborhoodStrategy::Swap => Transform::Swap,
            NeighborhoodStrategy::Reverse => Transform::Reverse,
            NeighborhoodStrategy::Adhoc => {
                if rng.random_bool(self.swap_probability) {
                    Transform::Swap
                } else {
                    Transform::Reverse
                }
            }
        }
    }
}

/// Draws an unordered pair of distinct positions uniformly from `0..n`.
fn draw_pair<R: Rng>(n: usize, rng: &mut R) -> Move {
    let a = rng.random_range(0..n);
    let mut b = rng.random_range(0..n - 1);
    if b >= a {
        b += 1;
    }
    Move::new(a, b)
}

/// The pair not yet in `chosen` with the smallest remaining tenure;
/// ties go to the lexicographically smallest pair.
fn least_recent(n: usize, taboo: &TabooList, chosen: &[Move]) -> Option<Move> {
    (0..n)
        .flat_map(|a| (a + 1..n).map(move |b| Move::new(a, b)))
        .filter(|mv| !chosen.contains(mv))
        .min_by_key(|&mv| taboo.remaining(mv))
}
