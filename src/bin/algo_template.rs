//! # Algorithm Template
//!
//! Minimal walk through the enclave API, meant as a starting point for new
//! algorithm packages.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin algo_template -- --url https://localhost:5000 --insecure
//! ```
//!
//! The template will:
//! 1. List the files in the data container
//! 2. Fetch the first file
//! 3. Post a log message
//! 4. Post a report

use clap::Parser;
use log::info;
use serde_json::json;

use enclave_algo::common::config::AppConfig;
use enclave_algo::common::logging::init_logger;
use enclave_algo::enclave::{LogData, Report, ReportStatus};
use enclave_algo::EnclaveClient;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (TOML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Enclave API URL, overriding configuration and environment
    #[arg(long)]
    url: Option<String>,

    /// Accept self-signed certificates
    #[arg(long)]
    insecure: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(url) = args.url {
        config.enclave.url = url;
    }
    if args.insecure {
        config.enclave.accept_invalid_certs = true;
    }

    let client = EnclaveClient::new(&config.enclave)?;
    let sas_url = config.enclave.sas_url.as_deref();

    // 1. List available data files
    let listing = client.list_files(sas_url).await?;
    info!("Data container holds {} files", listing.files.len());

    // 2. Fetch data files
    if let Some(file) = listing.files.first() {
        let content = client.download_file(&file.name, sas_url).await?;
        info!("Fetched {} ({} bytes)", file.name, content.len());
    }

    // 3. Post a log message
    client
        .post_log(&LogData::message("Log message from algo-template"))
        .await?;

    // 4. Post report
    let report = Report::new(
        "EscrowAI Algorithm Package",
        ReportStatus::Completed,
        json!({"report": "Performance Report"}),
    );
    client.post_report(&report).await?;
    info!("✅ Template finished");

    Ok(())
}
