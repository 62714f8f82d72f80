//! # COVID-19 X-Ray Validation Entry Point
//!
//! Scores the pretrained classifier against the enclave's labeled X-rays and
//! posts a performance report.
//!
//! ## Usage
//!
//! ```bash
//! ENCLAVE_URL=http://127.0.0.1:5000/ cargo run --bin covid_validation -- \
//!   --config config/validation.toml --validate
//! ```
//!
//! The default `models/multi-class-pg.json` is a small example model that only
//! separates bright from dark images. Point `--model` (or `model_path`) at a
//! trained model in the same JSON format for real results.
//!
//! The run will:
//! 1. Load configuration (file, then `ENCLAVE_URL` / `SAS_URL`, then flags)
//! 2. Load the model, exiting with status 1 if it can't be loaded
//! 3. List, download and classify every file in the data container
//! 4. Post accuracy, specificity and sensitivity as a report

use clap::Parser;
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

use enclave_algo::common::config::AppConfig;
use enclave_algo::common::logging::init_logger;
use enclave_algo::validation::{load_model, ValidationRunner};
use enclave_algo::EnclaveClient;

/// Command-line arguments for the validation binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (TOML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Model file, overriding the configuration
    #[arg(long)]
    model: Option<PathBuf>,

    /// Report schema file, overriding the configuration
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Also write the report and per-file results to this JSON file
    #[arg(long)]
    report_output: Option<PathBuf>,

    /// Validate the report with the enclave before posting it
    #[arg(long)]
    validate: bool,
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = AppConfig::load(args.config.as_deref())?;

    if let Some(model) = args.model {
        config.validation.model_path = model;
    }
    if let Some(schema) = args.schema {
        config.validation.schema_path = schema;
    }
    if args.report_output.is_some() {
        config.validation.report_output = args.report_output;
    }
    if args.validate {
        config.validation.validate_before_post = true;
    }

    let client = EnclaveClient::new(&config.enclave)?;
    let classifier = load_model(&client, &config.validation.model_path).await?;

    let runner = ValidationRunner::new(client, classifier, config);
    runner.run().await?;

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logger();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ Validation run failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
