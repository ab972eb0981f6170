//! postpartum-risk: score a patient record and print the JSON report.
//!
//! ```bash
//! postpartum-risk [--models <dir>] [--sequential] <record.json | ->
//! postpartum-risk [--models <dir>] --status
//! ```
//!
//! The report goes to stdout. Logs go to stderr or a file, never stdout.

use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use postpartum_risk::adapters::sanitize::SanitizingMakeWriter;
use postpartum_risk::{EngineConfig, PatientRecord, PredictionService};

const LOG_MODE_ENV: &str = "POSTPARTUM_LOG_MODE";
const LOG_FILE_ENV: &str = "POSTPARTUM_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "postpartum-risk.log";

#[derive(Debug, Default)]
struct Args {
    models: Option<PathBuf>,
    input: Option<String>,
    status: bool,
    sequential: bool,
}

fn usage() -> &'static str {
    "Usage: postpartum-risk [--models <dir>] [--sequential] [--status] [<record.json> | -]"
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--models" => {
                let dir = args.next().with_context(|| usage())?;
                parsed.models = Some(PathBuf::from(dir));
            }
            "--status" => parsed.status = true,
            "--sequential" => parsed.sequential = true,
            "-h" | "--help" => bail!(usage()),
            _ if parsed.input.is_none() => parsed.input = Some(arg),
            _ => bail!(usage()),
        }
    }
    Ok(parsed)
}

fn read_record(input: Option<&str>) -> Result<PatientRecord> {
    let text = match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read patient record from stdin")?;
            buf
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read patient record {path}"))?,
    };
    serde_json::from_str(&text).context("Patient record must be a JSON object of feature values")
}

fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    // auto: file when POSTPARTUM_LOG_FILE is set, stderr otherwise.
    let log_mode = std::env::var(LOG_MODE_ENV).unwrap_or_else(|_| "auto".to_string());
    let use_file = match log_mode.as_str() {
        "file" => true,
        "stderr" => false,
        _ => std::env::var(LOG_FILE_ENV).is_ok(),
    };

    let (writer, guard) = if use_file {
        let log_file = std::env::var(LOG_FILE_ENV).unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        if let Some(parent) = std::path::Path::new(&log_file).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .with_context(|| format!("Failed to open log file {log_file}"))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(!use_file && std::io::stderr().is_terminal())
                .with_writer(SanitizingMakeWriter::new(writer)),
        )
        .init();

    Ok(guard)
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let _guard = init_logging()?;

    let mut config = EngineConfig::from_env();
    if let Some(dir) = args.models {
        config = config.with_model_dir(dir);
    }
    if args.sequential {
        config = config.with_parallel_conditions(false);
    }

    let service = PredictionService::from_config(&config)
        .with_context(|| format!("Failed to load models from {:?}", config.model_dir))?;

    let output = if args.status {
        serde_json::to_string_pretty(&service.status())?
    } else {
        let record = read_record(args.input.as_deref())?;
        let report = service.predict(&record).context("Prediction failed")?;
        serde_json::to_string_pretty(&report)?
    };

    println!("{output}");
    Ok(())
}
