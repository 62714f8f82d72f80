//! Local enclave sandbox.
//!
//! ```bash
//! cargo run --bin sandbox -- --data-dir ./data --addr 127.0.0.1:5000
//! ```
//!
//! Lay the data directory out the way the enclave container is laid out, e.g.
//! `data/covid/*.png`, `data/nofinding/*.png`, `data/pneumonia/*.png`.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use enclave_algo::common::logging::init_logger;
use enclave_algo::sandbox::{serve, SandboxState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory served as the data container
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:5000")]
    addr: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();
    anyhow::ensure!(
        args.data_dir.is_dir(),
        "data directory {} does not exist",
        args.data_dir.display()
    );

    let state = Arc::new(SandboxState::new(args.data_dir));
    let listener = tokio::net::TcpListener::bind(&args.addr).await?;
    serve(listener, state).await
}
