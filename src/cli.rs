//! Command-line interface: argument definitions and the `validate` and
//! `schema` handlers. The `serve` handler lives with the HTTP adapter.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::batch::{validate_batch, validate_batch_parallel};
use crate::config::Config;
use crate::ingest::read_records_from_path;
use crate::report::{self, ReportFormat};
use crate::schema::RecordSchema;
use crate::verdict::ValidationReport;

/// Exit code when every record is valid.
pub const EXIT_VALID: u8 = 0;
/// Exit code for fatal errors (unreadable schema, config or input).
pub const EXIT_FAILURE: u8 = 1;
/// Exit code when at least one record is invalid.
pub const EXIT_INVALID: u8 = 2;

/// Validate CSV records against a JSON Schema contract
#[derive(Parser, Debug)]
#[command(name = "rowguard", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Schema document to validate against.
    #[arg(long, global = true)]
    pub schema: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a CSV file and write a report.
    Validate(ValidateArgs),

    /// Serve the validation API over HTTP.
    Serve(ServeArgs),

    /// Print the loaded schema document.
    Schema,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// CSV file to validate.
    pub csv: PathBuf,

    /// Where to write the report.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Validate records in parallel.
    #[arg(long)]
    pub parallel: bool,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind.
    #[arg(long)]
    pub port: Option<u16>,
}

impl Cli {
    /// Applies command-line flags on top of `config` (highest precedence).
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(schema) = &self.schema {
            config.schema_path = schema.clone();
        }

        match &self.command {
            Commands::Validate(args) => {
                if let Some(output) = &args.output {
                    config.output.path = output.clone();
                }
                if let Some(format) = args.format {
                    config.output.format = format;
                }
                if args.parallel {
                    config.output.parallel = true;
                }
            }
            Commands::Serve(args) => {
                if let Some(host) = &args.host {
                    config.server.host = host.clone();
                }
                if let Some(port) = args.port {
                    config.server.port = port;
                }
            }
            Commands::Schema => {}
        }
    }
}

/// Loads the schema named by the configuration. Fails closed.
pub fn load_schema(config: &Config) -> anyhow::Result<RecordSchema> {
    RecordSchema::from_path(&config.schema_path)
        .with_context(|| format!("loading schema {}", config.schema_path.display()))
}

/// Runs `rowguard validate`, returning the process exit code.
pub fn run_validate(args: &ValidateArgs, config: &Config) -> anyhow::Result<u8> {
    let schema = load_schema(config)?;
    let records = read_records_from_path(&args.csv)
        .with_context(|| format!("reading {}", args.csv.display()))?;

    let verdicts = if config.output.parallel {
        validate_batch_parallel(&schema, &records)
    } else {
        validate_batch(&schema, &records)
    };

    let report = ValidationReport::new(display_name(&args.csv), verdicts);
    report::write_to_path(&report, &config.output.path, config.output.format)?;

    let summary = report.summary();
    println!(
        "Validated {} records: {} valid, {} invalid. Report written to {}",
        summary.total,
        summary.valid,
        summary.invalid,
        config.output.path.display()
    );

    Ok(if summary.all_valid() {
        EXIT_VALID
    } else {
        EXIT_INVALID
    })
}

/// Runs `rowguard schema`: prints the document as loaded.
pub fn run_schema(config: &Config, mut out: impl Write) -> anyhow::Result<u8> {
    let schema = load_schema(config)?;
    serde_json::to_writer_pretty(&mut out, schema.document())?;
    writeln!(out)?;
    Ok(EXIT_VALID)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_validate() {
        let cli = Cli::try_parse_from([
            "rowguard",
            "validate",
            "loans.csv",
            "--format",
            "json",
            "--parallel",
            "-o",
            "out.json",
        ])
        .unwrap();
        if let Commands::Validate(args) = &cli.command {
            assert_eq!(args.csv, PathBuf::from("loans.csv"));
            assert_eq!(args.format, Some(ReportFormat::Json));
            assert!(args.parallel);
            assert_eq!(args.output, Some(PathBuf::from("out.json")));
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "rowguard", "-vv", "serve", "--schema", "s.json", "--port", "9000",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.schema, Some(PathBuf::from("s.json")));
        assert!(matches!(cli.command, Commands::Serve(_)));
    }

    #[test]
    fn cli_flags_override_config() {
        let cli = Cli::try_parse_from([
            "rowguard", "--schema", "cli.json", "serve", "--host", "127.0.0.1", "--port", "9001",
        ])
        .unwrap();
        let mut config = Config::default();
        config.server.port = 9000;
        cli.apply_to(&mut config);
        assert_eq!(config.schema_path, PathBuf::from("cli.json"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9001);
    }

    #[test]
    fn cli_absent_flags_keep_config() {
        let cli = Cli::try_parse_from(["rowguard", "validate", "in.csv"]).unwrap();
        let mut config = Config::default();
        config.output.format = ReportFormat::Json;
        config.output.parallel = true;
        cli.apply_to(&mut config);
        assert_eq!(config.output.format, ReportFormat::Json);
        assert!(config.output.parallel);
        assert_eq!(config.output.path, PathBuf::from("validation_results.csv"));
    }

    #[test]
    fn cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["rowguard", "validate", "a.csv", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/data/in/loans.csv")), "loans.csv");
    }
}
