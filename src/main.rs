//! apimatrix CLI - Command-line interface
//!
//! Commands:
//!   generate  - Write payloads, test vectors and assertions per sheet
//!   summary   - Print the per-attribute test-value summary
//!   coverage  - Print pairwise coverage, fail if incomplete
//!   schema    - Print JSON schemas for inputs and outputs

mod cli;

use clap::{Parser, Subcommand};
use cli::SchemaName;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "apimatrix")]
#[command(author, version, about = "Attribute tables to pairwise API test suites")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process every sheet and write `<sheet>.suite.json` and `<sheet>.summary.txt`
    Generate {
        /// Workbook file (YAML or JSON)
        workbook: PathBuf,

        /// Config file (default: apimatrix.yaml next to the workbook)
        #[arg(short, long, env = "APIMATRIX_CONFIG")]
        config: Option<PathBuf>,

        /// Output directory (default: directory named after the workbook)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the test-value summary of every sheet
    Summary {
        workbook: PathBuf,

        #[arg(short, long, env = "APIMATRIX_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Print pairwise coverage; exits with 1 below 100%
    Coverage {
        workbook: PathBuf,

        #[arg(short, long, env = "APIMATRIX_CONFIG")]
        config: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Print a JSON schema
    Schema {
        #[arg(value_enum, default_value = "artifacts")]
        name: SchemaName,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = match &cli.command {
        Command::Generate {
            workbook,
            config,
            output,
            json,
        } => cli::cmd_generate(workbook, config.as_deref(), output.as_deref(), *json),
        Command::Summary { workbook, config } => cli::cmd_summary(workbook, config.as_deref()),
        Command::Coverage {
            workbook,
            config,
            json,
        } => cli::cmd_coverage(workbook, config.as_deref(), *json),
        Command::Schema { name } => cli::cmd_schema(*name),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
