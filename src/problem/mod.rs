//! QAP instance, solutions and moves.
//!
//! A [`ProblemInstance`] holds the static distance and flow matrices and
//! scores permutations. [`Solution`] is a permutation with its originating
//! [`Move`] and a lazily computed fitness.

mod instance;
mod types;

pub use instance::ProblemInstance;
pub use types::{Move, Solution};

/// Published optima for the Taillard reference instances, keyed by file
/// name as distributed by QAPLIB.
const KNOWN_OPTIMA: &[(&str, u64)] = &[
    ("tai12a", 224_416),
    ("tai12b", 39_464_925),
    ("tai15a", 388_214),
    ("tai17a", 491_812),
    ("tai100a", 21_052_466),
];

/// Returns the published optimum for a reference instance.
///
/// Accepts the bare name or the `.dat` file name. The published values use
/// the ordered-pair cost convention of [`ProblemInstance::fitness`].
///
/// ```
/// assert_eq!(qap_tabu::problem::known_optimum("tai12a.dat"), Some(224_416));
/// assert_eq!(qap_tabu::problem::known_optimum("unknown"), None);
/// ```
pub fn known_optimum(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(".dat").unwrap_or(name);
    KNOWN_OPTIMA
        .iter()
        .find(|(n, _)| *n == stem)
        .map(|&(_, opt)| opt)
}

/// The 4-facility instance used across unit tests.
#[cfg(test)]
pub(crate) fn four_facility() -> ProblemInstance {
    ProblemInstance::new(
        vec![
            vec![0, 1, 2, 3],
            vec![1, 0, 1, 2],
            vec![2, 1, 0, 1],
            vec![3, 2, 1, 0],
        ],
        vec![
            vec![0, 5, 2, 4],
            vec![5, 0, 3, 0],
            vec![2, 3, 0, 0],
            vec![4, 0, 0, 0],
        ],
    )
    .expect("fixture instance is square")
}
