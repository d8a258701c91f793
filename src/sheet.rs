//! Workbook ingestion: attribute tables into `AttributeSpec` lists
//!
//! A workbook is a list of named sheets, each a grid of cells whose first row
//! is the header. Hierarchy is expressed by indentation: the number of leading
//! empty cells is the row's depth, and its path is the chain of names above
//! it joined by `.`:
//!
//! ```text
//! | Name     |       | Type   | Required | Example |
//! | order    |       | object | О        |         |   container
//! |          | id    | int    | О        | 7       |   order.id
//! |          | items[0] | array[object] |  |       |   container
//! |          |   ... | ...    |          |         |
//! ```
//!
//! Rows that have children are containers; only leaves become attributes.

use crate::attribute::AttributeSpec;
use crate::config::{ColumnConfig, GeneratorConfig};
use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Input document: `{ sheets: [{ name, rows }] }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

/// One attribute table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Sheet {
    pub name: String,
    /// Header row first; cells may be strings, numbers, booleans or null
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl Workbook {
    /// Load a workbook; `.json` files are read as JSON, anything else as YAML
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_norway::from_str(content)?)
    }
}

/// A recoverable problem found while reading a sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Diagnostic {
    /// 1-based row number in the sheet (header is row 1); 0 for sheet-wide
    pub row: usize,
    pub message: String,
}

/// Sheet skipped entirely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SkippedSheet {
    pub name: String,
    pub reason: String,
}

/// Column index per role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: usize,
    pub data_type: usize,
    pub required: usize,
    pub example: usize,
    pub response_path: Option<usize>,
    pub minimum: Option<usize>,
    pub maximum: Option<usize>,
    pub max_length: Option<usize>,
}

impl ColumnMap {
    /// Cells left of this index can hold (indented) attribute names
    fn name_limit(&self) -> usize {
        [self.data_type, self.required, self.example]
            .into_iter()
            .filter(|&i| i > self.name)
            .min()
            .unwrap_or(usize::MAX)
    }
}

/// Locate the role columns in a header row
pub fn detect_columns(sheet: &str, header: &[String], columns: &ColumnConfig) -> Result<ColumnMap> {
    let find = |aliases: &[String]| {
        header
            .iter()
            .position(|h| aliases.iter().any(|a| h.to_lowercase() == a.trim().to_lowercase()))
    };
    let find_prefix = |prefixes: &[String]| {
        header.iter().position(|h| {
            let h = h.to_lowercase();
            prefixes
                .iter()
                .any(|p| !p.trim().is_empty() && h.starts_with(&p.trim().to_lowercase()))
        })
    };
    let require = |found: Option<usize>, aliases: &[String]| {
        found.ok_or_else(|| Error::MissingColumn {
            sheet: sheet.to_string(),
            column: aliases.first().cloned().unwrap_or_default(),
        })
    };

    Ok(ColumnMap {
        name: require(find(&columns.name), &columns.name)?,
        data_type: require(find(&columns.data_type), &columns.data_type)?,
        required: require(find_prefix(&columns.required), &columns.required)?,
        example: require(find(&columns.example), &columns.example)?,
        response_path: find(&columns.response_path),
        minimum: find(&columns.minimum),
        maximum: find(&columns.maximum),
        max_length: find(&columns.max_length),
    })
}

/// Attributes read from one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSheet {
    pub name: String,
    pub attributes: Vec<AttributeSpec>,
    pub diagnostics: Vec<Diagnostic>,
    /// Response-path column present (value assertions enabled)
    pub has_response_paths: bool,
}

/// Cell text: trimmed strings, numbers and booleans as written, null as empty
pub fn cell_text(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

struct Row {
    number: usize,
    level: usize,
    cells: Vec<String>,
}

impl Row {
    fn get(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or_default()
    }

    fn get_opt(&self, index: Option<usize>) -> &str {
        index.map(|i| self.get(i)).unwrap_or_default()
    }
}

/// Read one sheet.
///
/// Fails with [`Error::MissingColumn`] when a mandatory column is absent; all
/// other problems exclude the offending row and are reported as diagnostics.
pub fn parse_sheet(sheet: &Sheet, config: &GeneratorConfig) -> Result<ParsedSheet> {
    let header: Vec<String> = sheet
        .rows
        .first()
        .map(|row| row.iter().map(cell_text).collect())
        .unwrap_or_default();
    let columns = detect_columns(&sheet.name, &header, &config.columns)?;

    let mut diagnostics = Vec::new();
    if columns.response_path.is_none() {
        warn!(sheet = %sheet.name, "no response path column, value assertions disabled");
        diagnostics.push(Diagnostic {
            row: 0,
            message: "no response path column; value assertions disabled".into(),
        });
    }

    let limit = columns.name_limit();
    let mut rows = Vec::new();
    for (i, raw) in sheet.rows.iter().enumerate().skip(1) {
        let cells: Vec<String> = raw.iter().map(cell_text).collect();
        if cells.iter().all(String::is_empty) {
            continue;
        }
        let level = cells.iter().take_while(|c| c.is_empty()).count();
        if level >= limit {
            diagnostics.push(Diagnostic {
                row: i + 1,
                message: "row has no attribute name".into(),
            });
            continue;
        }
        rows.push(Row {
            number: i + 1,
            level,
            cells,
        });
    }

    let mut attributes = Vec::new();
    let mut seen = HashSet::new();
    let mut ancestors: Vec<String> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let name = row.get(row.level).to_string();
        ancestors.truncate(row.level);
        ancestors.push(name);

        let is_container = rows.get(i + 1).is_some_and(|next| next.level > row.level);
        if is_container {
            continue;
        }

        let path = ancestors.join(".");
        if !seen.insert(path.clone()) {
            warn!(sheet = %sheet.name, %path, "duplicate attribute path");
            diagnostics.push(Diagnostic {
                row: row.number,
                message: format!("duplicate attribute path '{}'", path),
            });
            continue;
        }

        match build_attribute(&path, row, &columns, config) {
            Ok(attr) => attributes.push(attr),
            Err(e) => {
                warn!(sheet = %sheet.name, %path, "excluding attribute: {}", e);
                diagnostics.push(Diagnostic {
                    row: row.number,
                    message: e.to_string(),
                });
            }
        }
    }

    debug!(
        sheet = %sheet.name,
        attributes = attributes.len(),
        diagnostics = diagnostics.len(),
        "sheet parsed"
    );

    Ok(ParsedSheet {
        name: sheet.name.clone(),
        attributes,
        diagnostics,
        has_response_paths: columns.response_path.is_some(),
    })
}

fn build_attribute(
    path: &str,
    row: &Row,
    columns: &ColumnMap,
    config: &GeneratorConfig,
) -> Result<AttributeSpec> {
    AttributeSpec::new(path, row.get(columns.data_type))?
        .with_required(config.is_required(row.get(columns.required)))
        .with_example(row.get(columns.example))
        .with_minimum(row.get_opt(columns.minimum))
        .with_maximum(row.get_opt(columns.maximum))
        .with_max_length(row.get_opt(columns.max_length))
        .with_response_path(row.get_opt(columns.response_path))
}
