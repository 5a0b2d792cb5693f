//! Tests for the command-line driver: config layering and report output.

use std::fs;
use std::path::Path;

use clap::Parser;
use rowguard::cli::{run_schema, run_validate, Cli, Commands, EXIT_INVALID, EXIT_VALID};
use rowguard::config::{Config, EnvProvider};
use rowguard::report::ReportFormat;
use serde_json::{json, Value};
use tempfile::TempDir;

struct NoEnv;

impl EnvProvider for NoEnv {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }
}

fn write_schema(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("schema.json");
    let schema = json!({
        "type": "object",
        "properties": {
            "LoanNumber": {"type": "integer", "required": true},
            "OriginationDate": {"type": "string", "format": "date"}
        }
    });
    fs::write(&path, serde_json::to_string_pretty(&schema).unwrap()).unwrap();
    path
}

fn configure(dir: &TempDir, args: &[&str]) -> (Cli, Config) {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut config = Config::load(None, &NoEnv).unwrap();
    config.schema_path = write_schema(dir.path());
    cli.apply_to(&mut config);
    config.validate().unwrap();
    (cli, config)
}

#[test]
fn test_validate_writes_csv_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("loans.csv");
    fs::write(&input, "LoanNumber,OriginationDate\n1,2024-01-01\n2,2024-02-30\n").unwrap();
    let output = dir.path().join("validation_results.csv");

    let (cli, config) = configure(
        &dir,
        &[
            "rowguard",
            "validate",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ],
    );
    let Commands::Validate(args) = &cli.command else {
        panic!("expected validate");
    };

    let code = run_validate(args, &config).unwrap();
    assert_eq!(code, EXIT_INVALID);

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "Valid");
    assert_eq!(&rows[1][0], "Invalid");
    assert!(rows[1][2].contains("OriginationDate"));
}

#[test]
fn test_validate_writes_json_report_in_parallel() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clean.csv");
    fs::write(&input, "LoanNumber,OriginationDate\n1,2024-01-01\n2,NA\n").unwrap();
    let output = dir.path().join("report.json");

    let (cli, config) = configure(
        &dir,
        &[
            "rowguard",
            "validate",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--format",
            "json",
            "--parallel",
        ],
    );
    assert_eq!(config.output.format, ReportFormat::Json);
    assert!(config.output.parallel);

    let Commands::Validate(args) = &cli.command else {
        panic!("expected validate");
    };
    assert_eq!(run_validate(args, &config).unwrap(), EXIT_VALID);

    let report: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(report["filename"], "clean.csv");
    assert_eq!(report["row_count"], 2);
}

#[test]
fn test_missing_schema_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("loans.csv");
    fs::write(&input, "LoanNumber\n1\n").unwrap();

    let cli = Cli::try_parse_from(["rowguard", "validate", input.to_str().unwrap()]).unwrap();
    let mut config = Config::default();
    config.schema_path = dir.path().join("absent.json");
    config.output.path = dir.path().join("out.csv");
    cli.apply_to(&mut config);

    let Commands::Validate(args) = &cli.command else {
        panic!("expected validate");
    };
    let error = run_validate(args, &config).unwrap_err();
    assert!(format!("{error:#}").contains("absent.json"));
    assert!(!config.output.path.exists());
}

#[test]
fn test_schema_command_prints_document() {
    let dir = tempfile::tempdir().unwrap();
    let (_, config) = configure(&dir, &["rowguard", "schema"]);

    let mut out = Vec::new();
    assert_eq!(run_schema(&config, &mut out).unwrap(), EXIT_VALID);

    let printed: Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(printed["properties"]["LoanNumber"]["type"], "integer");
}
