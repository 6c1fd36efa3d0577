//! Pollwatch CLI - pw command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;
mod config;

/// Pollwatch - report files that appear, disappear or change in a directory
#[derive(Parser)]
#[command(name = "pw")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current snapshot of a directory
    Scan {
        /// Directory to scan
        dir: PathBuf,
        /// Use content hashes instead of size + mtime
        #[arg(long)]
        content: bool,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Poll a directory and print each changed filename
    Watch {
        /// Directory to watch
        dir: PathBuf,
        /// Poll interval in milliseconds (default: 1000)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Use content hashes instead of size + mtime
        #[arg(long)]
        content: bool,
        /// Skip editor and OS temporary files
        #[arg(long)]
        skip_temp_files: bool,
        /// Extra gitignore-style pattern (repeatable)
        #[arg(long = "ignore", value_name = "PATTERN")]
        ignore: Vec<String>,
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Poll once after one interval, then exit
        #[arg(long)]
        once: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays a clean list of filenames
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { dir, content, json } => cmd::scan::run(&dir, content, json),
        Commands::Watch { dir, interval_ms, content, skip_temp_files, ignore, config: config_path, once } => {
            let overrides = config::Overrides {
                interval_ms,
                content,
                skip_temp_files,
                patterns: ignore,
            };
            let settings = config::load(config_path.as_deref())?.apply(overrides)?;
            cmd::watch::run(&dir, settings, once).await
        }
    }
}
