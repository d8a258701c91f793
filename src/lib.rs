// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # apimatrix: attribute tables to API test suites
//!
//! Turns a tabular, path-based API attribute description into request
//! payloads, a pairwise set of test vectors, and response assertions.
//!
//! ## Core Concept
//!
//! Each row of an attribute table is one leaf of the request body:
//!
//! ```text
//! path              type            required  example                     responsePath
//! order.id          integer         О         7                           result.id
//! items[0].sku      string          О         A1;B2
//! items[0].price    number/string             10                          items[sku="A1"].price
//! customer.name     string                    ivan(Ivan);petr(Petr)       customer.displayName
//! ```
//!
//! From that table apimatrix builds:
//!
//! - the **full payload** (every attribute, example values) and the
//!   **minimal payload** (required attributes only);
//! - **candidate values** per attribute (examples plus length and numeric
//!   boundaries);
//! - a **pairwise covering array** of test vectors, each with its payload;
//! - **assertion instructions** per vector, navigating the response by
//!   `responsePath` (including `items[key="value"]` filters);
//! - a **coverage report** proving every 2-way value combination is exercised.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use apimatrix::{AttributeSpec, GeneratorConfig, process_sheet};
//!
//! let attributes = vec![
//!     AttributeSpec::new("items[0].name", "string")?.with_example("A").with_max_length("8"),
//!     AttributeSpec::new("items[0].price", "integer")?
//!         .with_example("1")
//!         .with_minimum("0")
//!         .with_response_path(r#"items[name="A"].price"#)?,
//! ];
//!
//! let artifacts = process_sheet("orders", &attributes, &GeneratorConfig::default())?;
//! assert!(artifacts.coverage.is_complete);
//! for case in &artifacts.cases {
//!     println!("{}: {}", case.name, case.payload);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                                                             │
//! │  WORKBOOK (YAML/JSON sheets)                                │
//! │       │                                                     │
//! │       └──► sheet::parse_sheet ──► AttributeSpec[]           │
//! │                                        │                    │
//! │       ┌────────────────────────────────┤                    │
//! │       │                                │                    │
//! │       ▼                                ▼                    │
//! │  tree::build ──► payloads      value::candidates            │
//! │                                        │                    │
//! │                                        ▼                    │
//! │                               pairwise::generate            │
//! │                                        │                    │
//! │             ┌──────────────────────────┼──────────┐         │
//! │             ▼                          ▼          ▼         │
//! │   assertion::compile        coverage::validate  summary     │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The library never touches process state: configuration comes in as a
//! [`GeneratorConfig`], logging goes through `tracing`, and files are read
//! only by [`Workbook::load`] and [`GeneratorConfig::load`].

pub mod assertion;
pub mod attribute;
pub mod config;
pub mod coverage;
pub mod error;
pub mod pairwise;
pub mod path;
pub mod pipeline;
pub mod sheet;
pub mod summary;
pub mod tree;
pub mod value;

// Re-exports
pub use assertion::{compile, resolve_expected, run, AttributeAssertion, Instruction, Outcome};
pub use attribute::{AttrType, AttributeSpec, ElementType, Example, TypePair};
pub use config::GeneratorConfig;
pub use coverage::{validate, CoverageReport};
pub use error::{Error, Result};
pub use pairwise::{generate, CandidateSet, TestVector};
pub use path::{AttrPath, PathSegment};
pub use pipeline::{process_sheet, process_workbook, SheetArtifacts, WorkbookReport};
pub use sheet::{parse_sheet, SkippedSheet, Workbook};
pub use summary::SheetSummary;
pub use value::{candidates, default_value, typed_value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
