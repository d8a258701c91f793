//! Schema CLI command

use apimatrix::{GeneratorConfig, Result, SheetArtifacts, Workbook};
use clap::ValueEnum;

/// Documents with a published JSON schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemaName {
    /// `apimatrix.yaml`
    Config,
    /// Workbook input
    Workbook,
    /// `<sheet>.suite.json`
    Artifacts,
}

pub fn cmd_schema(name: SchemaName) -> Result<()> {
    let schema = match name {
        SchemaName::Config => schemars::schema_for!(GeneratorConfig),
        SchemaName::Workbook => schemars::schema_for!(Workbook),
        SchemaName::Artifacts => schemars::schema_for!(SheetArtifacts),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
