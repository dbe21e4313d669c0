//! Static QAP instance and fitness evaluation.

use std::path::Path;
use std::str::FromStr;

use super::types::Solution;
use crate::error::{ConfigError, QapError, Result};

/// A Quadratic Assignment Problem instance.
///
/// Owns the `n × n` distance and flow matrices. Immutable once built, so a
/// single instance can be shared by reference across independent runs.
///
/// # Examples
///
/// ```
/// use qap_tabu::problem::ProblemInstance;
///
/// let instance = ProblemInstance::new(
///     vec![vec![0, 2], vec![2, 0]],
///     vec![vec![0, 3], vec![1, 0]],
/// ).unwrap();
/// // 2*3 + 2*1, summed over both ordered pairs.
/// assert_eq!(instance.fitness(&[0, 1]).unwrap(), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawInstance"))]
pub struct ProblemInstance {
    size: usize,
    distance: Vec<Vec<u64>>,
    flow: Vec<Vec<u64>>,
}

impl ProblemInstance {
    /// Builds an instance, checking that both matrices are square and of
    /// the same dimension.
    pub fn new(distance: Vec<Vec<u64>>, flow: Vec<Vec<u64>>) -> Result<Self> {
        let size = distance.len();
        if size == 0 {
            return Err(ConfigError::EmptyInstance.into());
        }
        check_square("distance", &distance, size)?;
        check_square("flow", &flow, size)?;
        Ok(Self {
            size,
            distance,
            flow,
        })
    }

    /// Reads an instance file in QAPLIB layout (see [`FromStr`]).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        text.parse()
    }

    /// Number of facilities (and locations).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn distance(&self) -> &[Vec<u64>] {
        &self.distance
    }

    pub fn flow(&self) -> &[Vec<u64>] {
        &self.flow
    }

    /// Number of distinct unordered position pairs, `n(n-1)/2`.
    pub fn pair_count(&self) -> usize {
        self.size * (self.size - 1) / 2
    }

    /// Checks that `assignment` is a permutation of `0..n`.
    pub fn check_permutation(&self, assignment: &[usize]) -> Result<()> {
        if assignment.len() != self.size {
            return Err(QapError::InvalidPermutation {
                reason: format!(
                    "length {} does not match instance size {}",
                    assignment.len(),
                    self.size
                ),
            });
        }
        let mut seen = vec![false; self.size];
        for (i, &loc) in assignment.iter().enumerate() {
            if loc >= self.size {
                return Err(QapError::InvalidPermutation {
                    reason: format!("value {loc} at position {i} is out of range"),
                });
            }
            if seen[loc] {
                return Err(QapError::InvalidPermutation {
                    reason: format!("value {loc} at position {i} is duplicated"),
                });
            }
            seen[loc] = true;
        }
        Ok(())
    }

    /// Cost of an assignment: the sum over all ordered pairs `(i, j)`,
    /// `i != j`, of `distance[i][j] * flow[p[i]][p[j]]`.
    ///
    /// Always recomputed in full. Fails if `assignment` is not a
    /// permutation of `0..n`, or with [`QapError::Overflow`] if the cost
    /// does not fit in `u64`.
    pub fn fitness(&self, assignment: &[usize]) -> Result<u64> {
        self.check_permutation(assignment)?;
        let mut total = 0u64;
        for (i, d_row) in self.distance.iter().enumerate() {
            let f_row = &self.flow[assignment[i]];
            for (j, &d) in d_row.iter().enumerate() {
                if i != j {
                    total = d
                        .checked_mul(f_row[assignment[j]])
                        .and_then(|term| total.checked_add(term))
                        .ok_or(QapError::Overflow)?;
                }
            }
        }
        Ok(total)
    }

    /// Computes and caches the fitness of `solution`.
    pub fn evaluate(&self, solution: &mut Solution) -> Result<u64> {
        let cost = self.fitness(&solution.assignment)?;
        solution.fitness = Some(cost);
        Ok(cost)
    }
}

/// Unvalidated wire form; deserialization goes through [`ProblemInstance::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawInstance {
    distance: Vec<Vec<u64>>,
    flow: Vec<Vec<u64>>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawInstance> for ProblemInstance {
    type Error = QapError;

    fn try_from(raw: RawInstance) -> Result<Self> {
        Self::new(raw.distance, raw.flow)
    }
}

fn check_square(matrix: &'static str, rows: &[Vec<u64>], expected: usize) -> Result<()> {
    if rows.len() != expected {
        return Err(ConfigError::RowCount {
            matrix,
            rows: rows.len(),
            expected,
        }
        .into());
    }
    if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
        return Err(ConfigError::NotSquare {
            matrix,
            row,
            len: r.len(),
            expected,
        }
        .into());
    }
    Ok(())
}

/// Parses the QAPLIB text layout: the size `n`, then the `n × n` distance
/// matrix, then the `n × n` flow matrix, all whitespace separated.
impl FromStr for ProblemInstance {
    type Err = QapError;

    fn from_str(s: &str) -> Result<Self> {
        let mut tokens = Tokens {
            raw: s.split_whitespace().collect(),
            pos: 0,
        };

        let n = tokens.next_number("instance size")?;
        let n = usize::try_from(n).map_err(|_| QapError::Parse {
            token: 0,
            message: format!("instance size {n} does not fit in usize"),
        })?;
        if n == 0 {
            return Err(ConfigError::EmptyInstance.into());
        }
        let expected = n.checked_mul(n).and_then(|cells| cells.checked_mul(2));
        if expected != Some(tokens.raw.len() - 1) {
            return Err(QapError::Parse {
                token: tokens.raw.len(),
                message: format!(
                    "size {n} needs {} matrix entries, found {}",
                    expected.map_or_else(|| "too many".to_string(), |e| e.to_string()),
                    tokens.raw.len() - 1
                ),
            });
        }

        let distance = tokens.matrix(n, "distance")?;
        let flow = tokens.matrix(n, "flow")?;
        Self::new(distance, flow)
    }
}

struct Tokens<'a> {
    raw: Vec<&'a str>,
    pos: usize,
}

impl Tokens<'_> {
    fn next_number(&mut self, what: &str) -> Result<u64> {
        let token = self.pos;
        let raw = self.raw.get(token).ok_or_else(|| QapError::Parse {
            token,
            message: format!("unexpected end of input while reading {what}"),
        })?;
        self.pos += 1;
        raw.parse::<u64>().map_err(|e| QapError::Parse {
            token,
            message: format!("expected non-negative integer for {what}, got {raw:?}: {e}"),
        })
    }

    fn matrix(&mut self, n: usize, name: &str) -> Result<Vec<Vec<u64>>> {
        (0..n)
            .map(|_| (0..n).map(|_| self.next_number(name)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::four_facility;
    use proptest::prelude::*;

    fn brute_force(instance: &ProblemInstance, p: &[usize]) -> u64 {
        let n = instance.size();
        let mut total = 0;
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    total += instance.distance()[i][j] * instance.flow()[p[i]][p[j]];
                }
            }
        }
        total
    }

    #[test]
    fn test_fitness_identity() {
        let instance = four_facility();
        // 2 * (1*5 + 2*2 + 3*4 + 1*3 + 2*0 + 1*0)
        assert_eq!(instance.fitness(&[0, 1, 2, 3]).unwrap(), 48);
    }

    #[test]
    fn test_fitness_swapped() {
        let instance = four_facility();
        assert_eq!(instance.fitness(&[1, 0, 2, 3]).unwrap(), 42);
    }

    #[test]
    fn test_fitness_counts_both_ordered_pairs() {
        // Flow only runs 1 -> 0; an i<j sum would miss it.
        let instance =
            ProblemInstance::new(vec![vec![0, 1], vec![1, 0]], vec![vec![0, 0], vec![3, 0]])
                .unwrap();
        assert_eq!(instance.fitness(&[0, 1]).unwrap(), 3);
        assert_eq!(instance.fitness(&[1, 0]).unwrap(), 3);
    }

    #[test]
    fn test_fitness_ignores_self_flow() {
        let instance =
            ProblemInstance::new(vec![vec![0, 2], vec![2, 0]], vec![vec![9, 1], vec![1, 9]])
                .unwrap();
        assert_eq!(instance.fitness(&[0, 1]).unwrap(), 4);
    }

    #[test]
    fn test_fitness_rejects_wrong_length() {
        let instance = four_facility();
        let err = instance.fitness(&[0, 1, 2]).unwrap_err();
        assert!(matches!(err, QapError::InvalidPermutation { .. }));
    }

    #[test]
    fn test_fitness_rejects_duplicate() {
        let instance = four_facility();
        let err = instance.fitness(&[0, 1, 1, 3]).unwrap_err();
        assert!(matches!(err, QapError::InvalidPermutation { .. }));
    }

    #[test]
    fn test_fitness_rejects_out_of_range() {
        let instance = four_facility();
        let err = instance.fitness(&[0, 1, 2, 4]).unwrap_err();
        assert!(matches!(err, QapError::InvalidPermutation { .. }));
    }

    #[test]
    fn test_fitness_reports_overflow() {
        let instance = ProblemInstance::new(
            vec![vec![0, u64::MAX / 2], vec![u64::MAX / 2, 0]],
            vec![vec![0, 3], vec![3, 0]],
        )
        .unwrap();
        assert!(matches!(instance.fitness(&[0, 1]), Err(QapError::Overflow)));

        // Each term fits, their sum does not.
        let instance = ProblemInstance::new(
            vec![vec![0, u64::MAX / 2 + 1], vec![u64::MAX / 2 + 1, 0]],
            vec![vec![0, 1], vec![1, 0]],
        )
        .unwrap();
        assert!(matches!(instance.fitness(&[1, 0]), Err(QapError::Overflow)));
    }

    #[test]
    fn test_evaluate_caches_fitness() {
        let instance = four_facility();
        let mut sol = Solution::new(vec![0, 1, 2, 3]);
        assert_eq!(instance.evaluate(&mut sol).unwrap(), 48);
        assert_eq!(sol.fitness, Some(48));
    }

    #[test]
    fn test_new_rejects_empty() {
        let err = ProblemInstance::new(vec![], vec![]).unwrap_err();
        assert!(matches!(err, QapError::Config(ConfigError::EmptyInstance)));
    }

    #[test]
    fn test_new_rejects_size_mismatch() {
        let err = ProblemInstance::new(vec![vec![0, 1], vec![1, 0]], vec![vec![0]]).unwrap_err();
        assert!(matches!(
            err,
            QapError::Config(ConfigError::RowCount {
                matrix: "flow",
                rows: 1,
                expected: 2
            })
        ));
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let err = ProblemInstance::new(
            vec![vec![0, 1], vec![1]],
            vec![vec![0, 1], vec![1, 0]],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            QapError::Config(ConfigError::NotSquare {
                matrix: "distance",
                row: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_pair_count() {
        assert_eq!(four_facility().pair_count(), 6);
    }

    #[test]
    fn test_parse_qaplib_layout() {
        let text = "4\n\n 0 1 2 3\n 1 0 1 2\n 2 1 0 1\n 3 2 1 0\n\n\
                    0 5 2 4\n5 0 3 0\n2 3 0 0\n4 0 0 0\n";
        let parsed: ProblemInstance = text.parse().unwrap();
        assert_eq!(parsed, four_facility());
    }

    #[test]
    fn test_parse_truncated() {
        let err = "2\n0 1\n1 0\n0 1\n".parse::<ProblemInstance>().unwrap_err();
        assert!(matches!(err, QapError::Parse { token: 7, .. }));
    }

    #[test]
    fn test_parse_non_numeric() {
        let err = "2\n0 x\n1 0\n0 1\n1 0\n".parse::<ProblemInstance>().unwrap_err();
        assert!(matches!(err, QapError::Parse { token: 2, .. }));
    }

    #[test]
    fn test_parse_trailing_tokens() {
        let err = "1\n0\n0\n7\n".parse::<ProblemInstance>().unwrap_err();
        assert!(matches!(err, QapError::Parse { token: 4, .. }));
    }

    #[test]
    fn test_from_file_missing() {
        let err = ProblemInstance::from_file("/nonexistent/qap/instance.dat").unwrap_err();
        assert!(matches!(err, QapError::Io(_)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates_shape() {
        let ok: ProblemInstance =
            serde_json::from_str(r#"{"distance": [[0, 1], [1, 0]], "flow": [[0, 2], [2, 0]]}"#)
                .unwrap();
        assert_eq!(ok.size(), 2);
        let bad = serde_json::from_str::<ProblemInstance>(
            r#"{"distance": [[0, 1], [1, 0]], "flow": [[0, 2]]}"#,
        );
        assert!(bad.is_err());
    }

    fn instance_and_perm() -> impl Strategy<Value = (ProblemInstance, Vec<usize>)> {
        (2usize..8).prop_flat_map(|n| {
            let matrix = || prop::collection::vec(prop::collection::vec(0u64..100, n), n);
            let perm = Just((0..n).collect::<Vec<usize>>()).prop_shuffle();
            (matrix(), matrix(), perm).prop_map(|(d, f, p)| {
                (ProblemInstance::new(d, f).unwrap(), p)
            })
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_fitness_matches_brute_force((instance, p) in instance_and_perm()) {
            let fast = instance.fitness(&p).unwrap();
            prop_assert_eq!(fast, brute_force(&instance, &p));
        }

        #[test]
        fn prop_fitness_accepts_every_permutation((instance, p) in instance_and_perm()) {
            // Non-negative by construction of u64; a valid permutation must
            // never be rejected.
            prop_assert!(instance.fitness(&p).is_ok());
        }
    }
}
