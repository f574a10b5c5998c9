mod archiver;
mod config;
mod events;
mod fetcher;
mod models;
mod parser;
mod runner;
mod sections;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::Level;

use config::{DEFAULT_BASE_URL, DEFAULT_COMBINED_FILE, DEFAULT_OUT_DIR, FetchConfig, Layout, RunConfig, USER_AGENT};
use events::LogSink;
use fetcher::HttpFetcher;
use sections::Traversal;

#[derive(Parser)]
#[command(name = "bricklink-inventory")]
#[command(about = "Scrape BrickLink set inventories into spreadsheet-ready CSV")]
struct Cli {
    /// Set numbers to scrape, e.g. 6020 10696
    #[arg(value_name = "MODEL", required = true)]
    models: Vec<String>,
    /// Output layout
    #[arg(short, long, value_enum, default_value_t = Layout::Folder)]
    layout: Layout,
    /// How the regular and extra sections are located in the table
    #[arg(short, long, value_enum, default_value_t = Traversal::LabelSearch)]
    traversal: Traversal,
    /// Root directory of the folder layout
    #[arg(short, long, default_value = DEFAULT_OUT_DIR)]
    out_dir: PathBuf,
    /// File written by the combined layout
    #[arg(long, default_value = DEFAULT_COMBINED_FILE)]
    output: PathBuf,
    /// Catalog host
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Request timeout in seconds (no timeout unless given)
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Also save a JSON summary of the run
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,
    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
    /// Log request details
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn run_config(&self) -> RunConfig {
        RunConfig {
            layout: self.layout,
            traversal: self.traversal,
            out_dir: self.out_dir.clone(),
            combined_file: self.output.clone(),
            fetch: FetchConfig {
                base_url: self.base_url.clone(),
                user_agent: USER_AGENT.to_string(),
                timeout: self.timeout_secs.map(Duration::from_secs),
            },
        }
    }

    fn log_level(&self) -> Level {
        if self.quiet {
            Level::WARN
        } else if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.run_config();
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let summary = runner::run(&cli.models, &config, &fetcher, &mut LogSink)?;

    if let Some(path) = &cli.summary {
        archiver::save_summary(&summary, path)?;
    }
    println!("Scraped {} parts ({} pieces) into {} file(s).", summary.parts, summary.quantity, summary.files.len());
    Ok(())
}
