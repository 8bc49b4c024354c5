#![forbid(unsafe_code)]

use clap::Parser;
use fm_dataservice::{DataService, Database};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Serve the facilities collections over loopback HTTP.
#[derive(Debug, Parser)]
#[command(name = "fm_dataservice", version, about)]
struct Cli {
    /// Port on 127.0.0.1.
    #[arg(long, env = "FM_DATASERVICE_PORT", default_value_t = 3001)]
    port: u16,

    /// JSON document to seed from: `{ "branches": [...], ... }`.
    #[arg(long, env = "FM_DATASERVICE_SEED")]
    seed: Option<PathBuf>,

    /// Write changes back to the seed file after every mutation.
    #[arg(long, requires = "seed")]
    persist: bool,
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("FM_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let db = match &cli.seed {
        Some(path) => Database::load(path)?,
        None => Database::new(),
    };
    tracing::info!(
        collections = ?db.collection_names().collect::<Vec<_>>(),
        "database ready"
    );
    let persist = if cli.persist { cli.seed.clone() } else { None };
    let service = DataService::start_with(db, cli.port, persist)?;
    service.join()?;
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "data service stopped");
            ExitCode::FAILURE
        }
    }
}
