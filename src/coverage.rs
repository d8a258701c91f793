//! Pairwise coverage validation
//!
//! Recomputes from the vectors alone which `(A, a, B, b)` combinations are
//! realized, for every attribute pair `A < B` in the given attribute order,
//! and compares that with the theoretical total
//! `Σ_{A<B} |candidates(A)|·|candidates(B)|`.
//!
//! Nothing here trusts the generator's own bookkeeping; a report below 100%
//! means the generator (or its input) is broken.

use crate::error::{Error, Result};
use crate::pairwise::{CandidateSet, TestVector};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Coverage of one attribute pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PairCoverage {
    pub first: String,
    pub second: String,
    pub total: usize,
    pub covered: usize,
    pub percentage: f64,
}

/// A value combination no vector exercises
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MissingPair {
    pub first: String,
    pub first_value: Value,
    pub second: String,
    pub second_value: Value,
}

/// Result of coverage validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CoverageReport {
    /// All 2-way combinations covered?
    pub is_complete: bool,

    pub parameter_count: usize,
    pub vector_count: usize,

    /// Pair statistics
    pub total_pairs: usize,
    pub covered_pairs: usize,
    pub coverage_ratio: f64,

    /// Full-enumeration size (product of candidate counts, saturating)
    pub total_combinations: u128,

    /// Per attribute pair, in attribute order
    pub pairs: Vec<PairCoverage>,

    /// Uncovered combinations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<MissingPair>,
}

impl CoverageReport {
    pub fn percentage(&self) -> f64 {
        self.coverage_ratio * 100.0
    }
}

/// Validate pairwise coverage.
///
/// `candidate_sets` and every vector are aligned (vector value `i` belongs to
/// `candidate_sets[i]`); `attribute_order` names the attributes to report on
/// and the order pairs are enumerated in.
pub fn validate(
    attribute_order: &[String],
    candidate_sets: &[CandidateSet],
    vectors: &[TestVector],
) -> Result<CoverageReport> {
    let position: HashMap<&str, usize> = candidate_sets
        .iter()
        .enumerate()
        .map(|(i, s)| (s.attribute.as_str(), i))
        .collect();

    let columns = attribute_order
        .iter()
        .map(|name| {
            position.get(name.as_str()).copied().ok_or_else(|| {
                Error::Other(format!("no candidate set for attribute '{}'", name))
            })
        })
        .collect::<Result<Vec<usize>>>()?;

    for vector in vectors {
        if vector.values.len() != candidate_sets.len() {
            return Err(Error::VectorArity {
                expected: candidate_sets.len(),
                actual: vector.values.len(),
            });
        }
    }

    // Value index of each vector cell within its candidate set
    let indexed: Vec<Vec<Option<usize>>> = vectors
        .iter()
        .map(|v| {
            v.values
                .iter()
                .zip(candidate_sets)
                .map(|(value, set)| set.values.iter().position(|c| c == value))
                .collect()
        })
        .collect();

    let mut pairs = Vec::new();
    let mut missing = Vec::new();
    let mut total_pairs = 0;
    let mut covered_pairs = 0;

    for (x, &a) in columns.iter().enumerate() {
        for &b in &columns[x + 1..] {
            let (set_a, set_b) = (&candidate_sets[a], &candidate_sets[b]);
            let seen: HashSet<(usize, usize)> = indexed
                .iter()
                .filter_map(|row| Some((row[a]?, row[b]?)))
                .collect();

            let total = set_a.len() * set_b.len();
            for (i, va) in set_a.values.iter().enumerate() {
                for (j, vb) in set_b.values.iter().enumerate() {
                    if !seen.contains(&(i, j)) {
                        missing.push(MissingPair {
                            first: set_a.attribute.clone(),
                            first_value: va.clone(),
                            second: set_b.attribute.clone(),
                            second_value: vb.clone(),
                        });
                    }
                }
            }

            total_pairs += total;
            covered_pairs += seen.len();
            pairs.push(PairCoverage {
                first: set_a.attribute.clone(),
                second: set_b.attribute.clone(),
                total,
                covered: seen.len(),
                percentage: ratio(seen.len(), total) * 100.0,
            });
        }
    }

    let total_combinations = columns
        .iter()
        .fold(1u128, |acc, &i| acc.saturating_mul(candidate_sets[i].len() as u128));

    Ok(CoverageReport {
        is_complete: missing.is_empty(),
        parameter_count: columns.len(),
        vector_count: vectors.len(),
        total_pairs,
        covered_pairs,
        coverage_ratio: ratio(covered_pairs, total_pairs),
        total_combinations,
        pairs,
        missing,
    })
}

fn ratio(covered: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        covered as f64 / total as f64
    }
}
