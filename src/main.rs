//! Termweave main entry point
//!
//! This is the command-line interface for the termweave batch crawler.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use termweave::config::{load_config_with_hash, Config, SourceConfig};
use termweave::crawler::{CrawlService, FixedDelay, TaskOptions};
use termweave::lang::TableNormalizer;
use termweave::output::{export_task_markdown, load_task_stats, print_task_stats};
use termweave::source::{build_http_client, MediaWikiFactory};
use termweave::storage::SqliteStore;
use tracing_subscriber::EnvFilter;

/// Termweave: a multilingual term-corpus batch crawler
///
/// Termweave crawls an encyclopedic content source term-by-term across a
/// set of languages, expands through discovered links up to a configured
/// depth, and persists everything so batch jobs can be resumed or retried.
#[derive(Parser, Debug)]
#[command(name = "termweave")]
#[command(version)]
#[command(about = "A multilingual term-corpus batch crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new batch task from seed terms
    Create {
        /// Seed terms
        #[arg(value_name = "TERM", required_unless_present = "from_file")]
        terms: Vec<String>,

        /// Read seed terms from a file (.txt: one per line; .csv: first column)
        #[arg(long, value_name = "FILE")]
        from_file: Option<PathBuf>,

        /// Pacing delay between term fetches in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Maximum expansion depth (1 = seeds only)
        #[arg(long)]
        max_depth: Option<u32>,

        /// Maximum new terms enqueued per crawled term
        #[arg(long)]
        fan_out: Option<u32>,

        /// Comma-separated target language codes
        #[arg(long, value_delimiter = ',')]
        languages: Option<Vec<String>>,
    },

    /// Run a task to completion (Ctrl-C cancels cooperatively)
    Run {
        #[arg(value_name = "TASK_ID")]
        task_id: i64,
    },

    /// Reset a task's failed terms and run it again
    Retry {
        #[arg(value_name = "TASK_ID")]
        task_id: i64,
    },

    /// Show a task's progress
    Status {
        #[arg(value_name = "TASK_ID")]
        task_id: i64,
    },

    /// List all tasks
    List,

    /// List supported languages
    Languages,

    /// Export a task's completed terms as markdown files
    Export {
        #[arg(value_name = "TASK_ID")]
        task_id: i64,

        /// Target directory (defaults to the configured export dir)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Delete a task with its terms and associations
    Delete {
        #[arg(value_name = "TASK_ID")]
        task_id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load configuration, falling back to built-in defaults
    let config = match &cli.config {
        Some(path) => {
            let (config, hash) =
                load_config_with_hash(path).context("Failed to load configuration")?;
            tracing::info!(
                "Configuration loaded from {} (hash: {})",
                path.display(),
                hash
            );
            config
        }
        None => default_config(),
    };

    match cli.command {
        Command::Create {
            mut terms,
            from_file,
            interval_ms,
            max_depth,
            fan_out,
            languages,
        } => {
            if let Some(path) = from_file {
                terms.extend(read_seed_file(&path)?);
            }
            let service = build_service(&config)?;
            let options = TaskOptions {
                crawl_interval_ms: interval_ms,
                max_depth,
                fan_out_limit: fan_out,
                target_languages: languages,
            };
            let task_id = service.create_task(&terms, options)?;
            let task = service.get_task(task_id)?;
            println!(
                "Created task {} with {} terms",
                task_id, task.total_terms
            );
            println!("Run it with: termweave run {}", task_id);
        }

        Command::Run { task_id } => {
            let service = build_service(&config)?;
            run_task(&service, task_id).await?;
        }

        Command::Retry { task_id } => {
            let service = build_service(&config)?;
            let reset = service.retry(task_id).await?;
            if reset == 0 {
                println!("Task {} has no failed terms to retry", task_id);
            } else {
                println!("Retrying {} failed terms", reset);
                wait_with_interrupt(&service, task_id).await?;
                print_final_stats(&service, task_id)?;
            }
        }

        Command::Status { task_id } => {
            let service = build_service(&config)?;
            print_final_stats(&service, task_id)?;
        }

        Command::List => {
            let service = build_service(&config)?;
            let tasks = service.list_tasks()?;
            if tasks.is_empty() {
                println!("No tasks");
            }
            for task in tasks {
                println!(
                    "{:>4}  {:<10} {}/{} completed, {} failed  (created {})",
                    task.id,
                    task.status.to_string(),
                    task.completed_terms,
                    task.total_terms,
                    task.failed_terms,
                    task.created_at
                );
            }
        }

        Command::Languages => {
            for (code, name) in CrawlService::supported_languages() {
                println!("{:<6} {}", code, name);
            }
        }

        Command::Export { task_id, dir } => {
            let service = build_service(&config)?;
            let dir = dir.unwrap_or_else(|| PathBuf::from(&config.output.export_dir));
            let store = service.store();
            let store = store.lock().unwrap();
            let written = export_task_markdown(&store, task_id, &dir)?;
            println!("Exported {} terms to {}", written, dir.display());
        }

        Command::Delete { task_id } => {
            let service = build_service(&config)?;
            service.delete_task(task_id)?;
            println!("Deleted task {}", task_id);
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("termweave=info,warn"),
            1 => EnvFilter::new("termweave=debug,info"),
            2 => EnvFilter::new("termweave=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Built-in configuration used when no config file is given
fn default_config() -> Config {
    Config {
        crawl: Default::default(),
        source: SourceConfig {
            crawler_name: "termweave".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/termweave/termweave".to_string(),
            contact_email: "termweave@example.com".to_string(),
            api_endpoint: "https://{lang}.wikipedia.org/w/api.php".to_string(),
        },
        output: Default::default(),
    }
}

/// Reads seed terms from a file: one per line, or the first column of a
/// .csv file
fn read_seed_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let is_csv = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    let terms: Vec<String> = content
        .lines()
        .map(|line| {
            let field = if is_csv {
                line.split(',').next().unwrap_or("")
            } else {
                line
            };
            field.trim().to_string()
        })
        .filter(|t| !t.is_empty())
        .collect();

    Ok(terms)
}

/// Builds the crawl service with production capabilities
fn build_service(config: &Config) -> anyhow::Result<CrawlService> {
    let store = SqliteStore::new(Path::new(&config.output.database_path))
        .context("Failed to open database")?;
    let client = build_http_client(&config.source).context("Failed to build HTTP client")?;
    let sources = Arc::new(MediaWikiFactory::new(client, &config.source.api_endpoint));

    Ok(CrawlService::new(
        store,
        sources,
        Arc::new(TableNormalizer::new()),
        Arc::new(FixedDelay),
        config.crawl.clone(),
    ))
}

/// Starts a task and waits for it, printing final statistics
async fn run_task(service: &CrawlService, task_id: i64) -> anyhow::Result<()> {
    service.start(task_id).await?;
    wait_with_interrupt(service, task_id).await?;
    print_final_stats(service, task_id)?;
    Ok(())
}

/// Waits for a running task; Ctrl-C requests a cooperative cancel
async fn wait_with_interrupt(service: &CrawlService, task_id: i64) -> anyhow::Result<()> {
    tokio::select! {
        result = service.wait(task_id) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupt received, cancelling task {}", task_id);
            service.cancel(task_id).await?;
            println!("Task {} cancelled; unprocessed terms stay pending", task_id);
        }
    }
    Ok(())
}

/// Prints a task's statistics
fn print_final_stats(service: &CrawlService, task_id: i64) -> anyhow::Result<()> {
    let store = service.store();
    let mut store = store.lock().unwrap();
    let stats = load_task_stats(&mut store, task_id)?;
    print_task_stats(&stats);
    Ok(())
}
