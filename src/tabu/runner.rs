//! Tabu Search execution engine.
//!
//! # Algorithm
//!
//! 1. Start from a uniformly random permutation; it is both the current
//!    solution and the incumbent.
//! 2. At each iteration:
//!    a. Sample a batch of admissible neighbors of the current solution
//!    b. Evaluate each from scratch
//!    c. Move to the cheapest neighbor, even if it is worse than the
//!       current solution (first one wins on ties)
//!    d. Forbid the move that produced it
//!    e. Replace the incumbent on strict improvement
//!    f. Stop once the iteration counter reaches the budget; otherwise
//!       advance the counter and age the taboo list
//!
//! # Reference
//!
//! Glover, F. (1989). "Tabu Search—Part I", *ORSA Journal on Computing* 1(3), 190-206.
//! Taillard, É. (1991). "Robust taboo search for the quadratic assignment
//! problem", *Parallel Computing* 17, 443-455.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::config::TabuConfig;
use super::list::TabooList;
use super::neighborhood::NeighborhoodGenerator;
use crate::error::{QapError, Result};
use crate::problem::{Move, ProblemInstance, Solution};

/// Lifecycle of a [`SearchEngine`]. Initialization happens in the
/// constructor, so a live engine is either iterating or done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Iterating,
    Terminated,
}

/// Report of one iteration, handed to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Index of the iteration that produced this step.
    pub iteration: usize,
    /// Move that produced the new current solution.
    pub chosen: Move,
    /// Cost of the new current solution.
    pub current_cost: u64,
    /// Incumbent cost after this step.
    pub best_cost: u64,
    /// Whether the incumbent strictly improved.
    pub improved: bool,
    /// Whether the engine reached its terminal state.
    pub terminated: bool,
}

/// Result of a Tabu Search run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TabuResult {
    /// Best solution found.
    pub best: Solution,
    /// Cost of the best solution.
    pub best_cost: u64,
    /// Final value of the iteration counter. Equals `max_iterations` on a
    /// completed run; the loop body runs once more than this.
    pub iterations: usize,
    /// Iteration at which the best solution was found.
    pub best_iteration: usize,
    /// Incumbent cost after every executed step.
    pub cost_history: Vec<u64>,
    /// `(iteration, incumbent cost)` at the start and on every improvement.
    ///
    /// Convenience: derived from the same [`Step`] reports that
    /// [`SearchEngine::run_with_observer`] hands to the caller. The engine
    /// itself only tracks the incumbent.
    pub trace: Vec<(usize, u64)>,
    /// Whether the run was stopped by the cancellation flag.
    pub cancelled: bool,
    /// Whether the run was stopped by `time_limit_ms`.
    pub timed_out: bool,
}

impl TabuResult {
    /// Relative gap of the best cost to a known optimum, e.g. `0.05` for 5%.
    pub fn gap_to(&self, optimum: u64) -> f64 {
        if optimum == 0 {
            return if self.best_cost == 0 { 0.0 } else { f64::INFINITY };
        }
        (self.best_cost as f64 - optimum as f64) / optimum as f64
    }
}

/// Drives one tabu search run over a shared, read-only instance.
///
/// The engine owns its taboo list, random stream, current solution and
/// incumbent. Use [`step`](Self::step) to observe the search one iteration
/// at a time, or [`run`](Self::run) to drive it to termination.
///
/// # Examples
///
/// ```
/// use qap_tabu::problem::ProblemInstance;
/// use qap_tabu::tabu::{SearchEngine, TabuConfig};
///
/// let instance = ProblemInstance::new(
///     vec![vec![0, 1, 2], vec![1, 0, 1], vec![2, 1, 0]],
///     vec![vec![0, 4, 1], vec![4, 0, 2], vec![1, 2, 0]],
/// ).unwrap();
/// let config = TabuConfig::default()
///     .with_max_iterations(20)
///     .with_tenure(1)
///     .with_batch_size(2)
///     .with_seed(42);
///
/// let mut engine = SearchEngine::new(&instance, config).unwrap();
/// let result = engine.run().unwrap();
/// assert_eq!(result.iterations, 20);
/// assert_eq!(instance.fitness(&result.best.assignment).unwrap(), result.best_cost);
/// ```
pub struct SearchEngine<'a, R = ChaCha8Rng> {
    instance: &'a ProblemInstance,
    config: TabuConfig,
    generator: NeighborhoodGenerator,
    taboo: TabooList,
    rng: R,
    current: Solution,
    current_cost: u64,
    incumbent: Solution,
    best_cost: u64,
    iteration: usize,
    state: EngineState,
}

impl<'a> SearchEngine<'a, ChaCha8Rng> {
    /// Creates an engine seeded from `config.seed`, or from fresh entropy
    /// when no seed is set.
    pub fn new(instance: &'a ProblemInstance, config: TabuConfig) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_rng(instance, config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<'a, R: Rng> SearchEngine<'a, R> {
    /// Creates an engine drawing from a caller-supplied random stream.
    ///
    /// Validates the configuration against the instance and evaluates a
    /// uniformly shuffled initial permutation.
    pub fn with_rng(instance: &'a ProblemInstance, config: TabuConfig, mut rng: R) -> Result<Self> {
        let generator = NeighborhoodGenerator::new(instance.size(), &config)?;
        let taboo = TabooList::new(config.tenure, config.frequency_escalation);

        let mut assignment: Vec<usize> = (0..instance.size()).collect();
        assignment.shuffle(&mut rng);
        let mut current = Solution::new(assignment);
        let current_cost = instance.evaluate(&mut current)?;

        Ok(Self {
            instance,
            config,
            generator,
            taboo,
            rng,
            incumbent: current.clone(),
            current,
            current_cost,
            best_cost: current_cost,
            iteration: 0,
            state: EngineState::Iterating,
        })
    }

    pub fn config(&self) -> &TabuConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == EngineState::Terminated
    }

    /// Current iteration counter.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// The working solution, possibly worse than the incumbent.
    pub fn current(&self) -> &Solution {
        &self.current
    }

    pub fn current_cost(&self) -> u64 {
        self.current_cost
    }

    /// Best solution seen so far.
    pub fn incumbent(&self) -> &Solution {
        &self.incumbent
    }

    pub fn best_cost(&self) -> u64 {
        self.best_cost
    }

    pub fn taboo_list(&self) -> &TabooList {
        &self.taboo
    }

    /// Executes one iteration.
    ///
    /// Fails with [`QapError::Terminated`] once the engine has finished, and
    /// propagates any evaluation error as fatal.
    pub fn step(&mut self) -> Result<Step> {
        if self.is_terminated() {
            return Err(QapError::Terminated);
        }

        let mut batch = self.generator.generate(
            &self.current,
            self.config.batch_size,
            &self.taboo,
            &mut self.rng,
        )?;
        let costs = batch
            .iter_mut()
            .map(|cand| self.instance.evaluate(cand))
            .collect::<Result<Vec<u64>>>()?;

        let idx = select_best(&costs);
        let chosen = batch.swap_remove(idx);
        let mv = chosen.origin.ok_or_else(|| QapError::InvalidPermutation {
            reason: "neighbor has no originating move".into(),
        })?;

        self.taboo.forbid(mv);
        self.current = chosen;
        self.current_cost = costs[idx];

        let improved = self.current_cost < self.best_cost;
        if improved {
            self.incumbent = self.current.clone();
            self.best_cost = self.current_cost;
        }

        let iteration = self.iteration;
        let terminated = self.iteration >= self.config.max_iterations;
        if terminated {
            self.state = EngineState::Terminated;
        } else {
            self.iteration += 1;
            self.taboo.age();
        }

        tracing::trace!(
            iteration,
            %mv,
            current = self.current_cost,
            best = self.best_cost,
            "tabu step"
        );

        Ok(Step {
            iteration,
            chosen: mv,
            current_cost: self.current_cost,
            best_cost: self.best_cost,
            improved,
            terminated,
        })
    }

    /// Runs until termination (or `time_limit_ms`) and returns the result.
    pub fn run(&mut self) -> Result<TabuResult> {
        self.drive(None, |_| {})
    }

    /// Like [`run`](Self::run), calling `observer` after every step.
    pub fn run_with_observer<F: FnMut(&Step)>(&mut self, observer: F) -> Result<TabuResult> {
        self.drive(None, observer)
    }

    /// Like [`run`](Self::run), stopping early once `cancel` is set.
    pub fn run_with_cancel(&mut self, cancel: Arc<AtomicBool>) -> Result<TabuResult> {
        self.drive(Some(&cancel), |_| {})
    }

    #[tracing::instrument(
        level = "debug",
        name = "Tabu Search",
        skip_all,
        fields(n = self.instance.size(), strategy = ?self.config.strategy)
    )]
    fn drive<F: FnMut(&Step)>(
        &mut self,
        cancel: Option<&AtomicBool>,
        mut observer: F,
    ) -> Result<TabuResult> {
        let started = Instant::now();
        let limit = self.config.time_limit_ms.map(Duration::from_millis);

        let mut trace = vec![(self.iteration, self.best_cost)];
        let mut best_iteration = self.iteration;
        let mut cost_history = Vec::new();
        let mut cancelled = false;
        let mut timed_out = false;

        while !self.is_terminated() {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                cancelled = true;
                break;
            }
            if limit.is_some_and(|limit| started.elapsed() >= limit) {
                timed_out = true;
                break;
            }

            let step = self.step()?;
            observer(&step);
            cost_history.push(step.best_cost);

            if step.improved {
                best_iteration = step.iteration;
                trace.push((step.iteration, step.best_cost));
                tracing::debug!(
                    iteration = step.iteration,
                    best = step.best_cost,
                    "new incumbent"
                );
            }
        }

        tracing::debug!(
            iterations = self.iteration,
            best = self.best_cost,
            cancelled,
            timed_out,
            "tabu search finished"
        );

        Ok(TabuResult {
            best: self.incumbent.clone(),
            best_cost: self.best_cost,
            iterations: self.iteration,
            best_iteration,
            cost_history,
            trace,
            cancelled,
            timed_out,
        })
    }
}

/// Index of the strictly lowest cost; the first one wins on ties.
fn select_best(costs: &[u64]) -> usize {
    let mut best = 0;
    for (i, &c) in costs.iter().enumerate().skip(1) {
        if c < costs[best] {
            best = i;
        }
    }
    best
}

/// Runs one independent search per seed over a shared instance.
///
/// Each run owns its taboo list and engine; only the instance is shared.
/// With the `parallel` feature the runs execute on the rayon pool. Results
/// come back in seed order either way.
pub fn run_restarts(
    instance: &ProblemInstance,
    config: &TabuConfig,
    seeds: &[u64],
) -> Result<Vec<TabuResult>> {
    let run_one = |&seed: &u64| -> Result<TabuResult> {
        SearchEngine::new(instance, config.clone().with_seed(seed))?.run()
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        seeds.par_iter().map(run_one).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        seeds.iter().map(run_one).collect()
    }
}
