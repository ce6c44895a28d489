//! glomet CLI - build flanged tubes from a table and merge them into one STEP file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use glomet::Config;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "glomet")]
#[command(about = "Generate flanged-tube STEP models from a table and merge them", long_about = None)]
struct Cli {
    /// Input table: identifier,H1,H2,H3,D1,D2,D3,D4,x_position,unused
    #[arg(default_value = "input_data.csv")]
    input: PathBuf,

    /// Merged STEP file to write
    #[arg(default_value = "output.step")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config_path = Path::new(Config::FILE_NAME);
    let config = Config::load_or_default(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let report = glomet::run(&cli.input, &cli.output, &config)
        .with_context(|| format!("processing {}", cli.input.display()))?;

    for (identifier, reason) in &report.skipped {
        warn!(%identifier, %reason, "shape left out of the merged model");
    }
    info!(
        output = %report.output.display(),
        merged = report.merged.len(),
        skipped = report.skipped.len(),
        "done"
    );
    Ok(())
}
