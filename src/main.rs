//! vidsweep - bulk video fetcher for metadata exports
//!
//! Reads a CSV of video metadata in chunks, downloads the matching clips
//! concurrently and writes an HTML page to watch them.

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use vidsweep::core::pipeline::Pipeline;
use vidsweep::storage::config;
use vidsweep::types::{CollisionPolicy, Config, ViewerScope};
use vidsweep::ui::sink::Sink;
use vidsweep::utils::logging;

/// Download every video referenced by a metadata CSV and build a viewer page.
#[derive(Parser, Debug)]
#[command(name = "vidsweep")]
#[command(version, about, long_about = None)]
struct Cli {
    /// CSV file with duration, url, embedded_url and tags columns
    source: Option<PathBuf>,

    /// Folder to save the downloaded videos
    #[arg(short, long)]
    download_dir: Option<PathBuf>,

    /// Rows per chunk
    #[arg(short, long)]
    chunk_size: Option<usize>,

    /// Keep only rows whose tags contain this keyword (repeatable)
    #[arg(short, long = "keyword")]
    keywords: Vec<String>,

    /// Max concurrent downloads (0 = unbounded)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Per-download timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Viewer output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// List only successfully downloaded files in the viewer
    #[arg(long)]
    only_downloaded: bool,

    /// Prefix colliding file names with a hash of their URL
    #[arg(long)]
    hash_names: bool,

    /// Do not open the viewer when done
    #[arg(long)]
    no_open: bool,

    /// No console output
    #[arg(short, long)]
    quiet: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Edit the configuration file
    #[arg(short, long)]
    edit: bool,
}

/// Layer CLI flags over the loaded config
fn apply_overrides(mut cfg: Config, cli: &Cli) -> Config {
    if let Some(ref source) = cli.source {
        cfg.source = source.to_string_lossy().into_owned();
    }
    if let Some(ref dir) = cli.download_dir {
        cfg.download_dir = dir.to_string_lossy().into_owned();
    }
    if let Some(size) = cli.chunk_size {
        cfg.chunk_size = size;
    }
    if !cli.keywords.is_empty() {
        cfg.keywords = cli.keywords.clone();
    }
    if let Some(jobs) = cli.jobs {
        cfg.concurrency = jobs;
    }
    if let Some(secs) = cli.timeout {
        cfg.timeout_secs = secs;
    }
    if let Some(ref output) = cli.output {
        cfg.viewer_output = output.to_string_lossy().into_owned();
    }
    if cli.only_downloaded {
        cfg.viewer_scope = ViewerScope::Succeeded;
    }
    if cli.hash_names {
        cfg.collision_policy = CollisionPolicy::HashQualify;
    }
    if cli.no_open {
        cfg.open_viewer = false;
    }
    cfg
}

async fn run(cli: Cli) -> vidsweep::error::Result<()> {
    let cfg = config::load_config().await?;

    // Handle --edit flag
    if cli.edit {
        return config::edit_config(&cfg.editor).await;
    }

    let cfg = apply_overrides(cfg, &cli);
    let sink = if cli.quiet { Sink::Silent } else { Sink::console() };

    Pipeline::new(cfg, sink).run().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(e.code().exit_code());
    }

    Ok(())
}
