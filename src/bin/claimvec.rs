//! Claimvec CLI - Command-line interface for claimvec
//!
//! Commands:
//! - transform: Vectorize raw claim records against a bundle (batch mode)
//! - inspect: Print bundle diagnostics
//! - doctor: Diagnose bundle health and configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use claimvec::schema::{RawRecord, CANONICAL_FIELDS};
use claimvec::{FeatureBundle, FeatureVector, Vectorizer, VectorizeError, CLAIMVEC_VERSION, PRODUCER_NAME};

/// Claimvec - Feature vectorization engine for medical-claims scoring models
#[derive(Parser)]
#[command(name = "claimvec")]
#[command(author = "Veritas Health Analytics")]
#[command(version = CLAIMVEC_VERSION)]
#[command(about = "Vectorize claim records for model scoring", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Vectorize raw claim records against a bundle (batch mode)
    Transform {
        /// Feature bundle artifact path
        #[arg(short, long)]
        bundle: PathBuf,

        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// Print bundle diagnostics
    Inspect {
        /// Feature bundle artifact path
        #[arg(short, long)]
        bundle: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose bundle health and configuration
    Doctor {
        /// Check a bundle artifact
        #[arg(short, long)]
        bundle: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one vector per line)
    Ndjson,
    /// JSON array of vectors
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ClaimvecCliError> {
    match cli.command {
        Commands::Transform {
            bundle,
            input,
            output,
            input_format,
            output_format,
        } => cmd_transform(&bundle, &input, &output, input_format, output_format),

        Commands::Inspect { bundle, json } => cmd_inspect(&bundle, json),

        Commands::Doctor { bundle, json } => cmd_doctor(bundle.as_deref(), json),
    }
}

fn cmd_transform(
    bundle_path: &PathBuf,
    input: &PathBuf,
    output: &PathBuf,
    input_format: InputFormat,
    output_format: OutputFormat,
) -> Result<(), ClaimvecCliError> {
    let vectorizer = Vectorizer::load(bundle_path)?;

    // Read input
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    // Parse records
    let records = match input_format {
        InputFormat::Ndjson => parse_ndjson(&input_data)?,
        InputFormat::Json => parse_array(&input_data)?,
    };

    if records.is_empty() {
        return Err(ClaimvecCliError::NoRecords);
    }

    let vectors = vectorizer.vectorize_batch(&records)?;

    // Write output
    let output_data = format_output(&vectors, &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_inspect(bundle_path: &PathBuf, json: bool) -> Result<(), ClaimvecCliError> {
    let bundle = FeatureBundle::load(bundle_path)?;
    let info = bundle.describe();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Bundle Report");
        println!("=============");
        println!("Version:      {}", info.version_marker);
        println!("Features:     {}", info.feature_count);
        println!("Categorical:  {}", info.categorical_count);
        println!("Scaler:       {}", if info.scaler_aligned { "aligned" } else { "absent/misaligned" });
        println!("Loaded at:    {}", info.loaded_at_utc);
        println!("\nFeature order (head):");
        for (i, name) in info.feature_preview.iter().enumerate() {
            println!("  {:2}. {}", i, name);
        }
        if info.feature_count > info.feature_preview.len() {
            println!(
                "  ... {} more",
                info.feature_count - info.feature_preview.len()
            );
        }
    }

    Ok(())
}

fn cmd_doctor(bundle_path: Option<&std::path::Path>, json: bool) -> Result<(), ClaimvecCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    // Check claimvec version
    checks.push(DoctorCheck {
        name: "claimvec_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("claimvec version {}", CLAIMVEC_VERSION),
    });

    // Check canonical schema size
    checks.push(DoctorCheck {
        name: "canonical_schema".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} canonical claim fields", CANONICAL_FIELDS.len()),
    });

    // Check bundle artifact if provided
    if let Some(path) = bundle_path {
        if path.exists() {
            match FeatureBundle::load(path) {
                Ok(bundle) => {
                    let info = bundle.describe();
                    checks.push(DoctorCheck {
                        name: "bundle".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Bundle valid: {} features, version {}",
                            info.feature_count, info.version_marker
                        ),
                    });

                    checks.push(scaler_check(&bundle));
                    checks.push(coverage_check(&bundle));
                }
                Err(e) => {
                    checks.push(DoctorCheck {
                        name: "bundle".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid bundle: {}", e),
                    });
                }
            }
        } else {
            checks.push(DoctorCheck {
                name: "bundle".to_string(),
                status: CheckStatus::Error,
                message: "Bundle artifact does not exist".to_string(),
            });
        }
    }

    // Check stdin mode (for piped transform usage)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (batch mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: CLAIMVEC_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Claimvec Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(ClaimvecCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn scaler_check(bundle: &FeatureBundle) -> DoctorCheck {
    match &bundle.scaler {
        Some(scaler) if scaler.aligned_to(bundle.selected_features.len()) => DoctorCheck {
            name: "scaler".to_string(),
            status: CheckStatus::Ok,
            message: "Scaler statistics aligned to feature order".to_string(),
        },
        Some(scaler) => DoctorCheck {
            name: "scaler".to_string(),
            status: CheckStatus::Warning,
            message: format!(
                "Scaler misaligned ({} features, mean_[{}], scale_[{}]); scaling will be skipped",
                bundle.selected_features.len(),
                scaler.mean.len(),
                scaler.scale.len()
            ),
        },
        None => DoctorCheck {
            name: "scaler".to_string(),
            status: CheckStatus::Warning,
            message: "No scaler statistics; numeric features pass through unscaled".to_string(),
        },
    }
}

fn coverage_check(bundle: &FeatureBundle) -> DoctorCheck {
    let uncovered: Vec<&str> = bundle
        .selected_features
        .iter()
        .filter(|name| CANONICAL_FIELDS.iter().all(|spec| spec.name != name.as_str()))
        .map(|name| name.as_str())
        .collect();

    if uncovered.is_empty() {
        DoctorCheck {
            name: "schema_coverage".to_string(),
            status: CheckStatus::Ok,
            message: "All selected features covered by the canonical schema".to_string(),
        }
    } else {
        DoctorCheck {
            name: "schema_coverage".to_string(),
            status: CheckStatus::Warning,
            message: format!(
                "{} selected feature(s) outside the canonical schema (will encode as 0/Unknown): {}",
                uncovered.len(),
                uncovered.join(", ")
            ),
        }
    }
}

// Input parsing helpers

fn parse_ndjson(data: &str) -> Result<Vec<RawRecord>, ClaimvecCliError> {
    let mut records = Vec::new();
    for (line_num, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<RawRecord>(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => {
                return Err(ClaimvecCliError::ParseError(format!(
                    "Failed to parse line {}: {}",
                    line_num + 1,
                    e
                )));
            }
        }
    }
    Ok(records)
}

fn parse_array(data: &str) -> Result<Vec<RawRecord>, ClaimvecCliError> {
    let records: Vec<RawRecord> = serde_json::from_str(data)?;
    Ok(records)
}

fn format_output(
    vectors: &[FeatureVector],
    format: &OutputFormat,
) -> Result<String, ClaimvecCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for vector in vectors {
                lines.push(serde_json::to_string(vector)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(vectors)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(vectors)?),
    }
}

// Error types

#[derive(Debug)]
enum ClaimvecCliError {
    Io(io::Error),
    Vectorize(VectorizeError),
    Json(serde_json::Error),
    NoRecords,
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for ClaimvecCliError {
    fn from(e: io::Error) -> Self {
        ClaimvecCliError::Io(e)
    }
}

impl From<VectorizeError> for ClaimvecCliError {
    fn from(e: VectorizeError) -> Self {
        ClaimvecCliError::Vectorize(e)
    }
}

impl From<serde_json::Error> for ClaimvecCliError {
    fn from(e: serde_json::Error) -> Self {
        ClaimvecCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ClaimvecCliError> for CliError {
    fn from(e: ClaimvecCliError) -> Self {
        match e {
            ClaimvecCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ClaimvecCliError::Vectorize(e) => {
                let (code, hint) = match &e {
                    VectorizeError::Mismatch { .. } => (
                        "MISMATCH_ERROR",
                        "Verify the bundle's encoders/scaler match the input schema",
                    ),
                    VectorizeError::Configuration(_) => (
                        "CONFIGURATION_ERROR",
                        "Check the bundle artifact path and contents",
                    ),
                    _ => ("VECTORIZE_ERROR", "Run 'claimvec doctor' for details"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            ClaimvecCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            ClaimvecCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            ClaimvecCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            ClaimvecCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
