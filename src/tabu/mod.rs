//! Tabu Search (TS) for the Quadratic Assignment Problem.
//!
//! A single-solution trajectory metaheuristic. Each iteration samples a
//! small batch of neighbors, moves to the cheapest one even when it is
//! worse, and forbids the move that led there for a number of rounds
//! (the tenure) so the search does not cycle straight back.
//!
//! - [`TabooList`]: forbidden moves with decaying tenure and optional
//!   frequency escalation.
//! - [`NeighborhoodGenerator`]: samples admissible swap/reverse neighbors.
//! - [`SearchEngine`]: the iterate-evaluate-select-record loop.
//!
//! # References
//!
//! - Glover, F. (1989). "Tabu Search—Part I", *ORSA Journal on Computing* 1(3), 190-206.
//! - Glover, F. (1990). "Tabu Search—Part II", *ORSA Journal on Computing* 2(1), 4-32.

mod config;
mod list;
mod neighborhood;
mod runner;

pub use config::{NeighborhoodStrategy, TabuConfig};
pub use list::TabooList;
pub use neighborhood::{NeighborhoodGenerator, Transform};
pub use runner::{run_restarts, EngineState, SearchEngine, Step, TabuResult};
