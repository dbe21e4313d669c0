//! Taboo list with decaying tenure and optional frequency escalation.
//!
//! The list is a sparse timer wheel: each forbidden move maps to the number
//! of rounds it stays forbidden, and [`TabooList::age`] decrements every
//! entry once per round, dropping those that reach zero.

use std::collections::HashMap;

use crate::problem::Move;

/// Moves currently forbidden, keyed by canonical [`Move`].
///
/// # Examples
///
/// ```
/// use qap_tabu::problem::Move;
/// use qap_tabu::tabu::TabooList;
///
/// let mut list = TabooList::new(2, false);
/// list.forbid(Move::new(3, 1));
/// assert!(list.is_forbidden(Move::new(1, 3)));
/// list.age();
/// list.age();
/// assert!(!list.is_forbidden(Move::new(1, 3)));
/// ```
#[derive(Debug, Clone)]
pub struct TabooList {
    tenure: usize,
    escalation: bool,
    // Invariant: every value is >= 1.
    forbidden: HashMap<Move, usize>,
    frequency: HashMap<Move, usize>,
}

impl TabooList {
    /// Creates an empty list. `escalation` enables frequency-based tenure
    /// escalation.
    pub fn new(tenure: usize, escalation: bool) -> Self {
        Self {
            tenure,
            escalation,
            forbidden: HashMap::new(),
            frequency: HashMap::new(),
        }
    }

    /// Base tenure assigned by [`forbid`](Self::forbid).
    pub fn tenure(&self) -> usize {
        self.tenure
    }

    pub fn is_forbidden(&self, mv: Move) -> bool {
        self.forbidden.contains_key(&mv)
    }

    /// Rounds left before `mv` becomes admissible again, 0 if it already is.
    pub fn remaining(&self, mv: Move) -> usize {
        self.forbidden.get(&mv).copied().unwrap_or(0)
    }

    /// How many times `mv` has been forbidden, net of escalation halvings.
    /// Always 0 when escalation is disabled.
    pub fn frequency(&self, mv: Move) -> usize {
        self.frequency.get(&mv).copied().unwrap_or(0)
    }

    /// Number of moves currently forbidden.
    pub fn len(&self) -> usize {
        self.forbidden.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forbidden.is_empty()
    }

    /// Forbids `mv` for `tenure` rounds.
    ///
    /// With escalation enabled, a move forbidden more than `2 * tenure`
    /// times gets a `4 * tenure` penalty instead and its count is halved.
    /// Both products saturate at `usize::MAX`.
    pub fn forbid(&mut self, mv: Move) {
        let mut rounds = self.tenure;
        if self.escalation {
            let count = self.frequency.entry(mv).or_insert(0);
            *count += 1;
            if *count > self.tenure.saturating_mul(2) {
                rounds = self.tenure.saturating_mul(4);
                *count /= 2;
                tracing::trace!(%mv, rounds, "escalated taboo tenure");
            }
        }
        self.forbidden.insert(mv, rounds);
    }

    /// Advances one round: every entry loses one unit of tenure and entries
    /// reaching zero are dropped. Each entry is visited exactly once.
    pub fn age(&mut self) {
        self.forbidden.retain(|_, rounds| {
            *rounds -= 1;
            *rounds > 0
        });
    }
}
