//! Per-sheet batch processing
//!
//! ```text
//! AttributeSpec[] ─┬─► canonical values ─► full / minimal payload + assertions
//!                  └─► candidates ─► pairwise vectors ─┬─► payload + assertions per vector
//!                                                      ├─► coverage report
//!                                                      └─► summary
//! ```
//!
//! Sheets are independent: nothing computed for one sheet is visible to the
//! next, and a failing sheet is recorded and skipped.

use crate::assertion::{self, AttributeAssertion};
use crate::attribute::AttributeSpec;
use crate::config::GeneratorConfig;
use crate::coverage::{self, CoverageReport};
use crate::error::Result;
use crate::pairwise::{self, CandidateSet, TestVector};
use crate::sheet::{self, Diagnostic, SkippedSheet, Workbook};
use crate::summary::{self, SheetSummary};
use crate::tree;
use crate::value::{candidates_with, payload_value};
use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

/// A request payload with the response checks that go with it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PayloadCase {
    pub name: String,
    pub payload: Value,
    pub assertions: Vec<AttributeAssertion>,
}

/// One pairwise test vector, ready to send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestCase {
    pub name: String,
    /// Candidate chosen per attribute path
    pub values: Value,
    pub payload: Value,
    pub assertions: Vec<AttributeAssertion>,
}

/// Everything generated for one sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SheetArtifacts {
    pub sheet: String,
    /// Hash of the attribute list, for change detection
    pub fingerprint: String,
    pub generated_at: String,
    /// Attribute paths in table order
    pub attributes: Vec<String>,
    /// All attributes, canonical example values
    pub full: PayloadCase,
    /// Required attributes only
    pub minimal: PayloadCase,
    pub candidates: Vec<CandidateSet>,
    pub cases: Vec<TestCase>,
    pub coverage: CoverageReport,
    pub summary: SheetSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of processing a workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WorkbookReport {
    pub processed: Vec<SheetArtifacts>,
    pub skipped: Vec<SkippedSheet>,
}

impl WorkbookReport {
    /// Every processed sheet reached 100% pairwise coverage
    pub fn fully_covered(&self) -> bool {
        self.processed.iter().all(|s| s.coverage.is_complete)
    }
}

/// Hash of an attribute list, `sha256:` plus 16 hex digits
pub fn fingerprint(attributes: &[AttributeSpec]) -> Result<String> {
    let content = serde_json::to_string(attributes)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(format!("sha256:{}", hex::encode(&hasher.finalize()[..8])))
}

/// Candidate text used for the full and minimal payloads
pub fn canonical_candidate(attr: &AttributeSpec) -> Value {
    Value::String(attr.example.canonical_send().to_string())
}

/// Candidate sets for every attribute, aligned with `attributes`
pub fn candidate_sets(attributes: &[AttributeSpec], config: &GeneratorConfig) -> Vec<CandidateSet> {
    let opts = config.candidate_options();
    attributes
        .iter()
        .map(|a| CandidateSet::new(a.path.as_str(), candidates_with(a, &opts)))
        .collect()
}

/// Payload for one candidate per attribute
pub fn payload_for(attributes: &[AttributeSpec], chosen: &[Value]) -> Result<Value> {
    tree::build(attributes, &payload_values(attributes, chosen))
}

fn payload_values(attributes: &[AttributeSpec], chosen: &[Value]) -> Vec<Value> {
    attributes
        .iter()
        .zip(chosen)
        .map(|(attr, candidate)| payload_value(candidate, attr.typ.send))
        .collect()
}

/// Assertions for the attributes accepted by `include`
fn assertions_for<F>(attributes: &[AttributeSpec], chosen: &[Value], include: F) -> Vec<AttributeAssertion>
where
    F: Fn(&AttributeSpec) -> bool,
{
    attributes
        .iter()
        .zip(chosen)
        .filter(|(attr, _)| include(attr))
        .filter_map(|(attr, candidate)| assertion::compile_attribute(attr, Some(candidate)))
        .collect()
}

/// Process one sheet's attributes.
///
/// Fails only when the payload tree cannot be built (a path treats a scalar
/// as a container); value parse problems are logged and passed through.
pub fn process_sheet(
    sheet: &str,
    attributes: &[AttributeSpec],
    config: &GeneratorConfig,
) -> Result<SheetArtifacts> {
    let canonical: Vec<Value> = attributes.iter().map(canonical_candidate).collect();
    let canonical_payload = payload_values(attributes, &canonical);

    let full = PayloadCase {
        name: "All fields".into(),
        payload: tree::build(attributes, &canonical_payload)?,
        assertions: assertions_for(attributes, &canonical, |_| true),
    };
    let minimal = PayloadCase {
        name: "Required fields".into(),
        payload: tree::build_required(attributes, &canonical_payload)?,
        assertions: if config.assert_minimal_payload {
            assertions_for(attributes, &canonical, |a| a.required)
        } else {
            Vec::new()
        },
    };

    let sets = candidate_sets(attributes, config);
    let vectors: Vec<TestVector> = pairwise::generate(&sets)?.collect();

    let cases = vectors
        .iter()
        .enumerate()
        .map(|(i, vector)| {
            let values: Map<String, Value> = attributes
                .iter()
                .zip(&vector.values)
                .map(|(attr, v)| (attr.path.to_string(), v.clone()))
                .collect();
            Ok(TestCase {
                name: format!("Test {}", i + 1),
                values: Value::Object(values),
                payload: payload_for(attributes, &vector.values)?,
                assertions: assertions_for(attributes, &vector.values, |_| true),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let order: Vec<String> = attributes.iter().map(|a| a.path.to_string()).collect();
    let coverage = coverage::validate(&order, &sets, &vectors)?;
    if !coverage.is_complete {
        warn!(
            sheet,
            covered = coverage.covered_pairs,
            total = coverage.total_pairs,
            "pairwise coverage incomplete"
        );
    }

    let summary = summary::summarize(sheet, attributes, &sets, vectors.len());
    info!(
        sheet,
        attributes = attributes.len(),
        vectors = vectors.len(),
        combinations = %summary.calculations.total_combinations,
        "sheet generated"
    );

    Ok(SheetArtifacts {
        sheet: sheet.to_string(),
        fingerprint: fingerprint(attributes)?,
        generated_at: Utc::now().to_rfc3339(),
        attributes: order,
        full,
        minimal,
        candidates: sets,
        cases,
        coverage,
        summary,
        diagnostics: Vec::new(),
    })
}

/// Process every sheet; failing sheets are skipped with a reason
pub fn process_workbook(workbook: &Workbook, config: &GeneratorConfig) -> WorkbookReport {
    let mut report = WorkbookReport {
        processed: Vec::new(),
        skipped: Vec::new(),
    };

    for sheet in &workbook.sheets {
        let skip = |reason: String| {
            warn!(sheet = %sheet.name, %reason, "skipping sheet");
            SkippedSheet {
                name: sheet.name.clone(),
                reason,
            }
        };

        let parsed = match sheet::parse_sheet(sheet, config) {
            Ok(parsed) => parsed,
            Err(e) => {
                report.skipped.push(skip(e.to_string()));
                continue;
            }
        };
        if parsed.attributes.is_empty() {
            report.skipped.push(skip("no attributes".into()));
            continue;
        }

        match process_sheet(&parsed.name, &parsed.attributes, config) {
            Ok(mut artifacts) => {
                artifacts.diagnostics = parsed.diagnostics;
                report.processed.push(artifacts);
            }
            Err(e) => report.skipped.push(skip(e.to_string())),
        }
    }

    report
}
