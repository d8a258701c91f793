//! Pairwise (2-way) covering-array generation
//!
//! Builds test vectors such that for every two attributes `A`, `B` and every
//! `a ∈ candidates(A)`, `b ∈ candidates(B)` some vector assigns `A = a` and
//! `B = b`.
//!
//! ## Algorithm (in-parameter-order)
//!
//! 1. Order parameters by cardinality, largest first.
//! 2. Seed with every combination of the two largest parameters.
//! 3. For each further parameter:
//!    - *horizontal growth*: give each existing row the value that covers
//!      the most still-uncovered pairs (a row that would cover nothing is
//!      left open);
//!    - *vertical growth*: place each remaining uncovered pair into an
//!      existing row with compatible open slots, or append a new row.
//! 4. Open slots are padded with the parameter's last value.
//!
//! The seed alone is `|A|·|B|` rows for the two largest sets, which is also
//! the lower bound for any covering array; vertical growth adds rows only
//! when horizontal growth cannot absorb a pair.

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Candidate values for one attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CandidateSet {
    /// Attribute path text
    pub attribute: String,
    pub values: Vec<Value>,
}

impl CandidateSet {
    pub fn new(attribute: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One value per attribute, in attribute order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestVector {
    pub values: Vec<Value>,
}

/// Generate pairwise test vectors.
///
/// Fails if any attribute has no candidate values. The returned sequence is
/// computed on first use and can be consumed once.
pub fn generate(candidate_sets: &[CandidateSet]) -> Result<TestVectors<'_>> {
    if let Some(empty) = candidate_sets.iter().find(|s| s.is_empty()) {
        return Err(Error::EmptyCandidateSet {
            attribute: empty.attribute.clone(),
        });
    }
    Ok(TestVectors {
        sets: candidate_sets,
        rows: None,
    })
}

/// Lazily generated test vectors
pub struct TestVectors<'a> {
    sets: &'a [CandidateSet],
    rows: Option<std::vec::IntoIter<Vec<usize>>>,
}

impl Iterator for TestVectors<'_> {
    type Item = TestVector;

    fn next(&mut self) -> Option<TestVector> {
        let sets = self.sets;
        let rows = self.rows.get_or_insert_with(|| {
            let cardinalities: Vec<usize> = sets.iter().map(CandidateSet::len).collect();
            covering_rows(&cardinalities).into_iter()
        });

        let row = rows.next()?;
        Some(TestVector {
            values: row
                .iter()
                .zip(sets)
                .map(|(&i, set)| set.values[i].clone())
                .collect(),
        })
    }
}

/// Covering array over value indices.
///
/// `cardinalities[i]` is the number of values of parameter `i`; every
/// cardinality must be at least 1. Each returned row has one index per
/// parameter, in the caller's parameter order.
pub fn covering_rows(cardinalities: &[usize]) -> Vec<Vec<usize>> {
    let n = cardinalities.len();
    if n == 0 || cardinalities.contains(&0) {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| cardinalities[b].cmp(&cardinalities[a]));
    let cards: Vec<usize> = order.iter().map(|&i| cardinalities[i]).collect();

    let mut rows: Vec<Vec<Option<usize>>> = if n == 1 {
        (0..cards[0]).map(|v| vec![Some(v)]).collect()
    } else {
        let mut seed = Vec::with_capacity(cards[0] * cards[1]);
        for a in 0..cards[0] {
            for b in 0..cards[1] {
                seed.push(vec![Some(a), Some(b)]);
            }
        }
        seed
    };

    for k in 2..n {
        extend_parameter(&mut rows, &cards, k);
    }

    rows.into_iter()
        .map(|row| {
            let mut out = vec![0; n];
            for (pos, &param) in order.iter().enumerate() {
                out[param] = row[pos].unwrap_or(cards[pos] - 1);
            }
            out
        })
        .collect()
}

/// Uncovered `(j, a, b)` pairs between earlier parameters `j` and parameter `k`
struct PairTable {
    width: usize,
    open: Vec<Vec<bool>>,
}

impl PairTable {
    fn new(cards: &[usize], k: usize) -> Self {
        let width = cards[k];
        Self {
            width,
            open: (0..k).map(|j| vec![true; cards[j] * width]).collect(),
        }
    }

    fn is_open(&self, j: usize, a: usize, b: usize) -> bool {
        self.open[j][a * self.width + b]
    }

    fn close(&mut self, j: usize, a: usize, b: usize) {
        self.open[j][a * self.width + b] = false;
    }

    /// Pairs row would newly cover if parameter `k` took value `b`
    fn gain(&self, row: &[Option<usize>], b: usize) -> usize {
        row.iter()
            .enumerate()
            .filter(|(j, a)| a.is_some_and(|a| self.is_open(*j, a, b)))
            .count()
    }

    fn close_row(&mut self, row: &[Option<usize>], b: usize) {
        for (j, a) in row.iter().enumerate() {
            if let Some(a) = a {
                self.close(j, *a, b);
            }
        }
    }
}

fn extend_parameter(rows: &mut Vec<Vec<Option<usize>>>, cards: &[usize], k: usize) {
    let width = cards[k];
    let mut pairs = PairTable::new(cards, k);

    // Horizontal growth
    for (r, row) in rows.iter_mut().enumerate() {
        let mut best: Option<(usize, usize)> = None;
        for offset in 0..width {
            let b = (r + offset) % width;
            let gain = pairs.gain(row, b);
            if best.is_none_or(|(_, g)| gain > g) {
                best = Some((b, gain));
            }
        }
        match best {
            Some((b, gain)) if gain > 0 => {
                pairs.close_row(row, b);
                row.push(Some(b));
            }
            _ => row.push(None),
        }
    }

    // Vertical growth
    for j in 0..k {
        for a in 0..cards[j] {
            for b in 0..width {
                if !pairs.is_open(j, a, b) {
                    continue;
                }
                let slot = rows.iter().position(|row| {
                    row[k].is_none_or(|v| v == b) && row[j].is_none_or(|v| v == a)
                });
                match slot {
                    Some(i) => {
                        let row = &mut rows[i];
                        row[j] = Some(a);
                        if row[k].is_none() {
                            row[k] = Some(b);
                            pairs.close_row(&row[..k], b);
                        } else {
                            pairs.close(j, a, b);
                        }
                    }
                    None => {
                        let mut row = vec![None; k + 1];
                        row[j] = Some(a);
                        row[k] = Some(b);
                        pairs.close(j, a, b);
                        rows.push(row);
                    }
                }
            }
        }
    }
}
