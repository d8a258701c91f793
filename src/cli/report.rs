//! Summary and coverage commands

use super::util::load_inputs;
use apimatrix::{process_workbook, CoverageReport, Result, SkippedSheet};
use serde::Serialize;
use std::path::Path;

/// `coverage --json` output, serialized directly: `total_combinations`
/// can exceed the `u64` range of `serde_json::Value`
#[derive(Serialize)]
struct CoverageOutput<'a> {
    complete: bool,
    sheets: Vec<SheetCoverage<'a>>,
    skipped: &'a [SkippedSheet],
}

#[derive(Serialize)]
struct SheetCoverage<'a> {
    sheet: &'a str,
    coverage: &'a CoverageReport,
}

pub fn cmd_summary(workbook: &Path, config: Option<&Path>) -> Result<()> {
    let (book, config) = load_inputs(workbook, config)?;
    let report = process_workbook(&book, &config);

    for sheet in &report.processed {
        println!("{}", sheet.summary);
    }
    for skipped in &report.skipped {
        println!("✗ {}: {}", skipped.name, skipped.reason);
    }
    Ok(())
}

pub fn cmd_coverage(workbook: &Path, config: Option<&Path>, json_output: bool) -> Result<()> {
    let (book, config) = load_inputs(workbook, config)?;
    let report = process_workbook(&book, &config);

    if json_output {
        let output = CoverageOutput {
            complete: report.fully_covered(),
            sheets: report
                .processed
                .iter()
                .map(|s| SheetCoverage {
                    sheet: &s.sheet,
                    coverage: &s.coverage,
                })
                .collect(),
            skipped: &report.skipped,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for sheet in &report.processed {
            let c = &sheet.coverage;
            let mark = if c.is_complete { "✓" } else { "✗" };
            println!(
                "{} {}: {}/{} pairs ({:.2}%) with {} vectors, {} parameters",
                mark,
                sheet.sheet,
                c.covered_pairs,
                c.total_pairs,
                c.percentage(),
                c.vector_count,
                c.parameter_count
            );
            for gap in &c.missing {
                println!(
                    "    missing: {}={} with {}={}",
                    gap.first, gap.first_value, gap.second, gap.second_value
                );
            }
        }
        for skipped in &report.skipped {
            println!("- {} skipped: {}", skipped.name, skipped.reason);
        }
    }

    if report.fully_covered() {
        Ok(())
    } else {
        Err("Pairwise coverage below 100%".into())
    }
}
