//! Generator configuration
//!
//! Everything the pipeline would otherwise discover from process state lives
//! here: which header text marks which column, what counts as "required",
//! and the candidate-generation switches. Loaded from `apimatrix.yaml`
//! (or an explicit file); an absent file means defaults.
//!
//! ```yaml
//! version: 1
//! columns:
//!   name: ["Attribute", "Field"]
//!   required: ["Mandatory"]
//! required_markers: ["x", "yes"]
//! boundary_char: "z"
//! ```

use crate::error::{Error, Result};
use crate::value::CandidateOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// File name looked up by [`GeneratorConfig::load_from_dir`]
pub const CONFIG_FILE: &str = "apimatrix.yaml";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratorConfig {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// Header aliases per column role
    #[serde(default)]
    pub columns: ColumnConfig,

    /// Cell values meaning "required" (case-insensitive)
    #[serde(default = "default_required_markers")]
    pub required_markers: Vec<String>,

    /// Character repeated for length-boundary candidates
    #[serde(default = "default_boundary_char")]
    pub boundary_char: char,

    /// Examples made only of `Y`/`N` yield exactly `{"Y", "N"}`
    #[serde(default = "default_true")]
    pub yes_no_override: bool,

    /// Compile assertions for the minimal payload (required attributes only)
    #[serde(default = "default_true")]
    pub assert_minimal_payload: bool,
}

fn default_version() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_boundary_char() -> char {
    'a'
}

fn default_required_markers() -> Vec<String> {
    to_strings(&["О", "O", "Y", "yes", "true", "required", "+"])
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            columns: ColumnConfig::default(),
            required_markers: default_required_markers(),
            boundary_char: default_boundary_char(),
            yes_no_override: true,
            assert_minimal_payload: true,
        }
    }
}

/// Header text recognized for each column role.
///
/// Matching is case-insensitive on trimmed header cells. `required` entries
/// are prefixes (`Обязательность (О/Н)` matches `Обязательность`); all other
/// entries must match the whole cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnConfig {
    #[serde(default = "default_name_columns")]
    pub name: Vec<String>,

    #[serde(rename = "type", default = "default_type_columns")]
    pub data_type: Vec<String>,

    #[serde(default = "default_required_columns")]
    pub required: Vec<String>,

    #[serde(default = "default_example_columns")]
    pub example: Vec<String>,

    #[serde(default = "default_response_path_columns")]
    pub response_path: Vec<String>,

    #[serde(default = "default_minimum_columns")]
    pub minimum: Vec<String>,

    #[serde(default = "default_maximum_columns")]
    pub maximum: Vec<String>,

    #[serde(default = "default_max_length_columns")]
    pub max_length: Vec<String>,
}

fn default_name_columns() -> Vec<String> {
    to_strings(&["Наименование атрибута", "Attribute name", "Attribute", "Name"])
}

fn default_type_columns() -> Vec<String> {
    to_strings(&["Тип данных", "Data type", "Type"])
}

fn default_required_columns() -> Vec<String> {
    to_strings(&["Обязательность", "Обязательное", "Required"])
}

fn default_example_columns() -> Vec<String> {
    to_strings(&["Пример", "Example"])
}

fn default_response_path_columns() -> Vec<String> {
    to_strings(&["Путь в eDTO", "Response path", "responsePath"])
}

fn default_minimum_columns() -> Vec<String> {
    to_strings(&["minimum", "Min"])
}

fn default_maximum_columns() -> Vec<String> {
    to_strings(&["maximum", "Max"])
}

fn default_max_length_columns() -> Vec<String> {
    to_strings(&["maxLength", "Max length"])
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            name: default_name_columns(),
            data_type: default_type_columns(),
            required: default_required_columns(),
            example: default_example_columns(),
            response_path: default_response_path_columns(),
            minimum: default_minimum_columns(),
            maximum: default_maximum_columns(),
            max_length: default_max_length_columns(),
        }
    }
}

impl GeneratorConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GeneratorConfig = serde_norway::from_str(&content).map_err(|e| {
            Error::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `apimatrix.yaml` from a directory, if present
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let file = dir.join(CONFIG_FILE);
        if !file.exists() {
            return Ok(None);
        }
        Self::load(&file).map(Some)
    }

    /// Explicit file, else `apimatrix.yaml` in `dir`, else defaults
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Ok(Self::load_from_dir(dir)?.unwrap_or_default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(Error::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        let c = &self.columns;
        let mandatory = [
            ("name", &c.name),
            ("type", &c.data_type),
            ("required", &c.required),
            ("example", &c.example),
        ];
        for (role, aliases) in mandatory {
            if aliases.iter().all(|a| a.trim().is_empty()) {
                return Err(Error::Config(format!(
                    "columns.{} needs at least one header alias",
                    role
                )));
            }
        }

        if self.boundary_char.is_whitespace() {
            return Err(Error::Config("boundary_char must not be whitespace".into()));
        }
        Ok(())
    }

    /// Does a requiredness cell mark the attribute as required?
    pub fn is_required(&self, cell: &str) -> bool {
        let cell = cell.trim().to_lowercase();
        !cell.is_empty()
            && self
                .required_markers
                .iter()
                .any(|m| m.trim().to_lowercase() == cell)
    }

    pub fn candidate_options(&self) -> CandidateOptions {
        CandidateOptions {
            boundary_char: self.boundary_char,
            yes_no_override: self.yes_no_override,
        }
    }
}
