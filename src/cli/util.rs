//! CLI utility helpers

use apimatrix::{GeneratorConfig, Result, Workbook};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load a workbook and its config (explicit file, else `apimatrix.yaml`
/// next to the workbook, else defaults)
pub fn load_inputs(workbook: &Path, config: Option<&Path>) -> Result<(Workbook, GeneratorConfig)> {
    let dir = workbook_dir(workbook);
    let config = GeneratorConfig::resolve(config, &dir)?;
    let workbook = Workbook::load(workbook)?;
    debug!(sheets = workbook.sheets.len(), "workbook loaded");
    Ok((workbook, config))
}

fn workbook_dir(workbook: &Path) -> PathBuf {
    match workbook.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `orders.yaml` -> `orders/` beside it
pub fn default_output_dir(workbook: &Path) -> PathBuf {
    let stem = workbook
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "apimatrix".to_string());
    workbook_dir(workbook).join(stem)
}

/// Sheet name made safe for a file name
pub fn file_stem(sheet: &str) -> String {
    let stem: String = sheet
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | ' ' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "sheet".to_string()
    } else {
        stem
    }
}

/// [`file_stem`] not yet in `used`, suffixed `-2`, `-3`, ... on collision.
///
/// Compared case-insensitively so `Orders` and `orders` stay apart on
/// case-folding filesystems.
pub fn unique_stem(sheet: &str, used: &mut HashSet<String>) -> String {
    let base = file_stem(sheet);
    let mut stem = base.clone();
    let mut n = 1;
    while !used.insert(stem.to_lowercase()) {
        n += 1;
        stem = format!("{}-{}", base, n);
    }
    stem
}

/// Write content to a file, creating parent directories
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    debug!(path = %path.display(), "written");
    Ok(())
}
