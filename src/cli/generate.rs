//! Generate command

use super::util::{default_output_dir, load_inputs, unique_stem, write_file};
use apimatrix::{process_workbook, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

pub fn cmd_generate(
    workbook: &Path,
    config: Option<&Path>,
    output: Option<&Path>,
    json_output: bool,
) -> Result<()> {
    let (book, config) = load_inputs(workbook, config)?;
    let report = process_workbook(&book, &config);

    let out_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_dir(workbook));

    let mut written = Vec::new();
    let mut stems = HashSet::new();
    for sheet in &report.processed {
        let stem = unique_stem(&sheet.sheet, &mut stems);
        let suite = out_dir.join(format!("{}.suite.json", stem));
        let summary = out_dir.join(format!("{}.summary.txt", stem));
        write_file(&suite, &serde_json::to_string_pretty(sheet)?)?;
        write_file(&summary, &sheet.summary.to_string())?;
        written.push(suite.display().to_string());
        written.push(summary.display().to_string());
    }
    info!(output = %out_dir.display(), files = written.len(), "suites written");

    if json_output {
        let processed: Vec<_> = report
            .processed
            .iter()
            .map(|s| {
                serde_json::json!({
                    "sheet": s.sheet,
                    "fingerprint": s.fingerprint,
                    "cases": s.cases.len(),
                    "coverage": s.coverage.percentage(),
                    "diagnostics": s.diagnostics,
                })
            })
            .collect();
        let output = serde_json::json!({
            "output": out_dir.display().to_string(),
            "processed": processed,
            "skipped": report.skipped,
            "files": written,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for sheet in &report.processed {
            println!(
                "✓ {}: {} test cases, {:.1}% pairwise coverage",
                sheet.sheet,
                sheet.cases.len(),
                sheet.coverage.percentage()
            );
            for d in &sheet.diagnostics {
                println!("  ⚠ row {}: {}", d.row, d.message);
            }
        }
        for skipped in &report.skipped {
            println!("✗ {}: {}", skipped.name, skipped.reason);
        }
        println!();
        println!("Written to: {}", out_dir.display());
    }

    if report.processed.is_empty() {
        return Err("No sheet could be processed".into());
    }
    Ok(())
}
