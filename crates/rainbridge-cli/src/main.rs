//! rainbridge CLI - migrate bookmarks from Raindrop.io to Karakeep.

use clap::{Parser, Subcommand};
use rainbridge::{purge_matching, BridgeError, Config, Orchestrator};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "rainbridge")]
#[command(about = "Migrate bookmarks from Raindrop.io to Karakeep")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file (tokens may come from the environment instead)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import every collection and bookmark
    Run {
        /// Override number of concurrent bookmark workers per collection
        #[arg(long)]
        workers: Option<usize>,

        /// Fail a collection read after this many pages
        #[arg(long)]
        max_pages: Option<usize>,

        /// Dry run: read from Raindrop.io and report what would be created
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete Karakeep bookmarks and lists whose title starts with a prefix
    Cleanup {
        /// Title prefix to match
        #[arg(long)]
        prefix: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), BridgeError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => {
            let config = Config::from_env()?;
            info!("Loaded configuration from environment");
            config
        }
    };

    match cli.command {
        Commands::Run {
            workers,
            max_pages,
            dry_run,
        } => {
            // Apply overrides
            if let Some(w) = workers {
                config.transfer.workers = w;
            }
            if max_pages.is_some() {
                config.transfer.max_pages = max_pages;
            }
            config.validate()?;

            let executor = config.executor()?;
            let orchestrator = Orchestrator::new(
                Arc::new(config.raindrop_client(executor.clone())),
                Arc::new(config.karakeep_client(executor)),
            )
            .with_workers(config.transfer.workers)
            .with_dry_run(dry_run);

            let report = orchestrator.run().await?;

            if cli.output_json {
                println!("{}", report.to_json()?);
            } else {
                let status_msg = if dry_run { "Dry run completed!" } else { "Import completed!" };
                println!("\n{}", status_msg);
                println!("  Run ID: {}", report.run_id);
                println!("  Duration: {:.2}s", report.duration_seconds);
                println!(
                    "  Collections: {}/{}",
                    report.folders_created, report.folders_total
                );
                println!(
                    "  Bookmarks: {}/{} ({} linked)",
                    report.items_created, report.items_total, report.items_linked
                );
                if !report.is_clean() {
                    println!("  Failures: {}", report.failure_count());
                    for failure in &report.failures {
                        match &failure.url {
                            Some(url) => println!("    - {} <{}>: {}", failure.title, url, failure.error),
                            None => println!("    - {}: {}", failure.title, failure.error),
                        }
                    }
                }
            }
        }

        Commands::Cleanup { prefix } => {
            let executor = config.executor()?;
            let destination = config.karakeep_client(executor);
            let summary = purge_matching(&destination, &prefix).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("\nCleanup completed!");
                println!(
                    "  Bookmarks deleted: {} ({} failed)",
                    summary.items_deleted, summary.items_failed
                );
                println!(
                    "  Lists deleted: {} ({} failed)",
                    summary.folders_deleted, summary.folders_failed
                );
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so `--output-json` keeps stdout clean.
fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
