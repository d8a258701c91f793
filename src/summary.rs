//! Human-readable test-value summary and test-count calculations

use crate::attribute::AttributeSpec;
use crate::pairwise::CandidateSet;
use crate::value::describe_candidate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One attribute's line in the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryRow {
    /// Leaf field name
    pub name: String,
    #[serde(rename = "type")]
    pub type_text: String,
    pub example: String,
    pub minimum: String,
    pub maximum: String,
    #[serde(rename = "maxLength")]
    pub max_length: String,
    /// Candidates as read by a person; strings as their lengths
    pub values: String,
    pub count: usize,
}

/// How much pairwise generation saves over full enumeration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Calculations {
    pub attribute_count: usize,
    pub value_counts: Vec<usize>,
    /// Product of all value counts (saturating)
    pub total_combinations: u128,
    pub pairwise_count: usize,
    /// `pairwise_count / total_combinations` in percent
    pub efficiency: f64,
    /// `total_combinations / pairwise_count`; `None` without vectors
    pub reduction_factor: Option<f64>,
}

impl Calculations {
    pub fn new(value_counts: Vec<usize>, pairwise_count: usize) -> Self {
        let total_combinations = value_counts
            .iter()
            .filter(|&&c| c > 0)
            .fold(1u128, |acc, &c| acc.saturating_mul(c as u128));
        let total = total_combinations as f64;

        Self {
            attribute_count: value_counts.len(),
            efficiency: if total > 0.0 {
                pairwise_count as f64 / total * 100.0
            } else {
                0.0
            },
            reduction_factor: (pairwise_count > 0).then(|| total / pairwise_count as f64),
            value_counts,
            total_combinations,
            pairwise_count,
        }
    }
}

/// Summary of one sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SheetSummary {
    pub sheet: String,
    pub rows: Vec<SummaryRow>,
    pub calculations: Calculations,
}

/// Summarize a sheet; `candidate_sets` is aligned with `attributes`
pub fn summarize(
    sheet: &str,
    attributes: &[AttributeSpec],
    candidate_sets: &[CandidateSet],
    pairwise_count: usize,
) -> SheetSummary {
    let rows: Vec<SummaryRow> = attributes
        .iter()
        .zip(candidate_sets)
        .map(|(attr, set)| {
            let values: Vec<String> = set
                .values
                .iter()
                .map(|v| describe_candidate(v, attr.typ.send))
                .collect();
            SummaryRow {
                name: attr.name().to_string(),
                type_text: attr.typ.as_str().to_string(),
                example: attr.example.raw().to_string(),
                minimum: attr.minimum.clone().unwrap_or_default(),
                maximum: attr.maximum.clone().unwrap_or_default(),
                max_length: attr.max_length.clone().unwrap_or_default(),
                values: values.join(", "),
                count: set.len(),
            }
        })
        .collect();

    let counts = rows.iter().map(|r| r.count).collect();
    SheetSummary {
        sheet: sheet.to_string(),
        rows,
        calculations: Calculations::new(counts, pairwise_count),
    }
}

/// `1234567` as `1 234 567`
pub fn group_digits(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

const HEADERS: [&str; 8] = [
    "Attribute",
    "Type",
    "Example",
    "minimum",
    "maximum",
    "maxLength",
    "Test values",
    "Count",
];

impl SummaryRow {
    fn cells(&self) -> [String; 8] {
        [
            self.name.clone(),
            self.type_text.clone(),
            self.example.clone(),
            self.minimum.clone(),
            self.maximum.clone(),
            self.max_length.clone(),
            self.values.clone(),
            self.count.to_string(),
        ]
    }
}

impl fmt::Display for SheetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table: Vec<[String; 8]> = self.rows.iter().map(SummaryRow::cells).collect();
        let mut widths = HEADERS.map(|h| h.chars().count());
        for row in &table {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        writeln!(f, "Sheet: {}", self.sheet)?;
        writeln!(f)?;
        write_line(f, &HEADERS.map(String::from), &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;
        for row in &table {
            write_line(f, row, &widths)?;
        }

        let c = &self.calculations;
        let counts: Vec<String> = c.value_counts.iter().map(ToString::to_string).collect();
        writeln!(f)?;
        writeln!(f, "Attributes:            {}", c.attribute_count)?;
        writeln!(f, "Values per attribute:  {}", counts.join(", "))?;
        writeln!(f, "Full enumeration:      {}", group_digits(c.total_combinations))?;
        writeln!(f, "Pairwise tests:        {}", c.pairwise_count)?;
        writeln!(f, "Efficiency:            {:.2}%", c.efficiency)?;
        match c.reduction_factor {
            Some(r) => writeln!(f, "Reduction:             {:.1}x fewer tests", r),
            None => writeln!(f, "Reduction:             N/A"),
        }
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[String; 8], widths: &[usize; 8]) -> fmt::Result {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect();
    writeln!(f, "{}", padded.join(" | ").trim_end())
}
