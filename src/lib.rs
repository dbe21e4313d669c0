//! Tabu search for the Quadratic Assignment Problem (QAP).
//!
//! Assigns `n` facilities to `n` locations so that the total
//! flow-weighted distance is minimal:
//!
//! - [`problem`]: the static instance (distance and flow matrices),
//!   fitness evaluation, solutions and moves.
//! - [`tabu`]: the taboo list, neighborhood sampling and the search
//!   engine that drives them.
//!
//! Parsing of QAPLIB-style instance files is included; plotting, ranking
//! and report writing are left to callers, which consume the per-step
//! [`tabu::Step`] reports and the final [`tabu::TabuResult`].
//!
//! # Example
//!
//! ```
//! use qap_tabu::problem::ProblemInstance;
//! use qap_tabu::tabu::{NeighborhoodStrategy, SearchEngine, TabuConfig};
//!
//! let instance: ProblemInstance = "3\n0 1 2\n1 0 1\n2 1 0\n0 3 1\n3 0 2\n1 2 0\n"
//!     .parse()
//!     .unwrap();
//! let config = TabuConfig::default()
//!     .with_tenure(1)
//!     .with_batch_size(3)
//!     .with_max_iterations(30)
//!     .with_strategy(NeighborhoodStrategy::Adhoc)
//!     .with_seed(3);
//!
//! let result = SearchEngine::new(&instance, config).unwrap().run().unwrap();
//! assert!(result.best_cost <= result.trace[0].1);
//! ```
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` for configs, instances and results.
//! - `parallel`: run independent restarts on the rayon thread pool.

pub mod error;
pub mod problem;
pub mod tabu;

pub use error::{ConfigError, QapError, Result};
