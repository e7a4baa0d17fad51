use clap::Parser;
use std::path::PathBuf;

mod commands;
mod vault;

use commands::Commands;

#[derive(Parser)]
#[command(name = "hashictl")]
#[command(
    about = "Compile declarative secret and policy configuration, and reconcile it with remote state",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Target environment to compile for
    #[arg(short = 'e', long = "environment", global = true, default_value = "")]
    pub environment: String,

    /// Directory of configuration files to scan
    #[arg(long = "config-dir", global = true)]
    pub config_dir: Option<PathBuf>,

    /// A single configuration file to process
    #[arg(long = "config-file", global = true, conflicts_with = "config_dir")]
    pub config_file: Option<PathBuf>,

    /// Template variable as key=value (repeatable)
    #[arg(long = "variable", global = true)]
    pub variables: Vec<String>,

    /// Template variable file: .hcl, .yaml, .yml or .json (repeatable)
    #[arg(long = "variable-file", global = true)]
    pub variable_files: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    commands::execute(cli).await
}
