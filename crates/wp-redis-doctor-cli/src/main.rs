use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "wp-redis-doctor")]
#[command(about = "Diagnose and repair WordPress Redis object caching", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the WordPress installation (passed to WP-CLI as --path)
    #[arg(long)]
    path: Option<PathBuf>,

    /// WP-CLI executable
    #[arg(long, default_value = "wp")]
    wp_cli: PathBuf,

    /// Run WP-CLI with --allow-root
    #[arg(long, default_value = "false")]
    allow_root: bool,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    // Priority: RUST_LOG env var > verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match cli.verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Diagnostic text owns stdout
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    commands::diagnose::run(cli.wp_cli, cli.path, cli.allow_root).await
}
