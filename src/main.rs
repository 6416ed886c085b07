//! vndb-export main entry point
//!
//! This is the command-line interface for exporting VNDB user lists and
//! length-vote lists to CSV.

use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url::Url;
use vndb_export::config::{load_config_with_hash, validate, Config};
use vndb_export::crawler::{crawl, ListKind, TableTarget};
use vndb_export::output::{
    export_file_name, print_statistics, write_export, write_export_file, ExportStatistics,
    CSV_MIME_TYPE,
};
use vndb_export::url::{lengthvotes_url, parse_location};

/// vndb-export: paginated VNDB list export
///
/// Walks every page of a VNDB user list or length-vote list, extracts the
/// table on each page and writes one CSV file with a single header row.
#[derive(Parser, Debug)]
#[command(name = "vndb-export")]
#[command(version)]
#[command(about = "Export a VNDB list to CSV", long_about = None)]
struct Cli {
    /// Current location, e.g. https://vndb.org/u1/ulist?vnlist=1
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file (defaults apply without one)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory, overrides output.directory
    #[arg(short, long, value_name = "DIR", conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Override the table selector
    #[arg(long, value_name = "CSS")]
    selector: Option<String>,

    /// Crawl the length-vote list belonging to a user list URL
    #[arg(long)]
    lengthvotes: bool,

    /// Write the CSV to stdout instead of a file
    #[arg(long)]
    stdout: bool,

    /// Show resolved settings without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match load_settings(cli.config.as_deref(), cli.output.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    };

    let location = resolve_location(&cli.url, cli.lengthvotes)?;
    let kind = ListKind::detect(&location)?;
    let target = match &cli.selector {
        Some(selector) => TableTarget::new(kind).with_selector(selector.clone()),
        None => TableTarget::new(kind),
    };

    if cli.dry_run {
        handle_dry_run(&config, &location, &target, cli.stdout);
        return Ok(());
    }

    handle_export(&config, &location, &target, cli.stdout).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("vndb_export=info,warn"),
            1 => EnvFilter::new("vndb_export=debug,info"),
            2 => EnvFilter::new("vndb_export=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so `--stdout` output stays a clean CSV
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or defaults, and applies the output override
fn load_settings(path: Option<&Path>, output: Option<&Path>) -> vndb_export::Result<Config> {
    let mut config = match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(dir) = output {
        config.output.directory = dir.to_string_lossy().into_owned();
        validate(&config)?;
    }

    Ok(config)
}

/// Parses the location, switching to the length-vote list when asked
fn resolve_location(raw: &str, lengthvotes: bool) -> Result<Url, Box<dyn std::error::Error>> {
    let location = parse_location(raw)?;
    if !lengthvotes {
        return Ok(location);
    }

    let derived = parse_location(&lengthvotes_url(location.as_str())?)?;
    tracing::info!("Crawling length votes at {}", derived);
    Ok(derived)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, location: &Url, target: &TableTarget, to_stdout: bool) {
    println!("=== vndb-export Dry Run ===\n");

    println!("Target:");
    println!("  Location: {}", location);
    println!("  List kind: {}", target.kind);
    println!("  Table selector: {}", target.selector);
    println!("  Host: {}", config.target.host);

    println!("\nFetch:");
    println!("  Max attempts: {}", config.fetch.max_attempts);
    println!("  Retry delay: {}ms", config.fetch.retry_delay_ms);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  User agent: {}", config.fetch.user_agent);
    println!("  Accept error status: {}", config.fetch.accept_error_status);

    println!("\nPagination:");
    println!("  Page parameter: {}", config.pagination.page_param);
    println!("  Fake URL marker: {}", config.pagination.fake_url_marker);
    if location
        .query_pairs()
        .any(|(key, _)| key == config.pagination.fake_url_marker.as_str())
    {
        println!("  Start: redirect to the first page");
    } else {
        println!("  Start: page 1");
    }

    println!("\nOutput ({}):", CSV_MIME_TYPE);
    if to_stdout {
        println!("  stdout");
    } else {
        let name = export_file_name(target.kind.file_prefix(), Utc::now());
        println!(
            "  {}",
            Path::new(&config.output.directory).join(name).display()
        );
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the export: crawl, write, report
async fn handle_export(
    config: &Config,
    location: &Url,
    target: &TableTarget,
    to_stdout: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Exporting {} from {}", target.kind, location);

    let report = match crawl(config, location, target).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            return Err(e.into());
        }
    };

    if !report.is_complete() {
        tracing::warn!(
            "Export stopped early after {} pages, writing partial result",
            report.pages_fetched
        );
    }

    let output_path = if to_stdout {
        write_export(std::io::stdout().lock(), &report.export)?;
        None
    } else {
        let name = export_file_name(target.kind.file_prefix(), Utc::now());
        Some(write_export_file(
            Path::new(&config.output.directory),
            &name,
            &report.export,
        )?)
    };

    print_statistics(&ExportStatistics::from_report(&report, output_path));

    Ok(())
}
