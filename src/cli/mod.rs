//! CLI command implementations
//!
//! - `generate`: Process a workbook and write suite files
//! - `report`: Summary and coverage printing
//! - `config`: Schema output
//! - `util`: Shared utility functions

pub mod config;
pub mod generate;
pub mod report;
pub mod util;

pub use config::{cmd_schema, SchemaName};
pub use generate::cmd_generate;
pub use report::{cmd_coverage, cmd_summary};
