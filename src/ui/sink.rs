//! Presentation sink
//!
//! The pipeline reports progress here instead of printing, so it can run
//! headless.

use crate::types::{DownloadOutcome, DownloadReport, DownloadSummary, Row};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Rows shown per chunk preview
const PREVIEW_ROWS: usize = 5;

/// Sink enum for pipeline events
pub enum Sink {
    Console(ConsoleSink),
    Silent,
}

impl Sink {
    pub fn console() -> Self {
        Sink::Console(ConsoleSink::new())
    }

    /// A chunk came out of the reader and through filter/sort
    pub fn chunk_processed(&mut self, index: usize, read: usize, kept: &[Row]) {
        if let Sink::Console(s) = self {
            s.chunk_processed(index, read, kept);
        }
    }

    pub fn download_started(&mut self, total: usize) {
        if let Sink::Console(s) = self {
            s.download_started(total);
        }
    }

    pub fn task_finished(&mut self, report: &DownloadReport) {
        if let Sink::Console(s) = self {
            s.task_finished(report);
        }
    }

    pub fn download_finished(&mut self, summary: &DownloadSummary) {
        if let Sink::Console(s) = self {
            s.download_finished(summary);
        }
    }

    pub fn viewer_written(&mut self, path: &Path) {
        if let Sink::Console(s) = self {
            s.viewer_written(path);
        }
    }
}

/// One preview line: duration, url, embedded url and tags
fn preview_line(row: &Row) -> String {
    let duration = row
        .duration
        .map(|d| d.to_string())
        .unwrap_or_else(|| "?".into());
    format!(
        "{} {} {} {}",
        format!("[{}]", duration).dimmed(),
        row.url,
        format!("({})", row.embedded_url).dimmed(),
        row.tags.cyan()
    )
}

/// Coloured terminal output with a download progress bar
#[derive(Default)]
pub struct ConsoleSink {
    progress: Option<ProgressBar>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn chunk_processed(&mut self, index: usize, read: usize, kept: &[Row]) {
        println!(
            "{} {} rows read, {} kept",
            format!("Chunk {}:", index + 1).bold(),
            read,
            kept.len()
        );
        for row in kept.iter().take(PREVIEW_ROWS) {
            println!("  {}", preview_line(row));
        }
        if kept.len() > PREVIEW_ROWS {
            println!("  {}", format!("... {} more", kept.len() - PREVIEW_ROWS).dimmed());
        }
    }

    fn download_started(&mut self, total: usize) {
        if total == 0 {
            println!("{}", "No video URLs to download.".yellow());
            return;
        }

        let bar = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message("Downloading...");
        self.progress = Some(bar);
    }

    fn task_finished(&mut self, report: &DownloadReport) {
        let line = match &report.outcome {
            DownloadOutcome::Succeeded { .. } => None,
            DownloadOutcome::Failed(e) => Some(format!(
                "{} {}: {}",
                "Failed:".red(),
                report.task.url,
                e
            )),
        };

        match &self.progress {
            Some(bar) => {
                if let Some(line) = line {
                    bar.println(line);
                }
                bar.inc(1);
            }
            None => {
                if let Some(line) = line {
                    eprintln!("{}", line);
                }
            }
        }
    }

    fn download_finished(&mut self, summary: &DownloadSummary) {
        if let Some(bar) = self.progress.take() {
            bar.finish_and_clear();
        }
        let failed = if summary.failed > 0 {
            summary.failed.to_string().red()
        } else {
            summary.failed.to_string().dimmed()
        };
        println!(
            "✓ {} downloaded, {} failed ({} bytes)",
            summary.succeeded.to_string().green(),
            failed,
            summary.bytes
        );
    }

    fn viewer_written(&mut self, path: &Path) {
        println!("{} {}", "Viewer:".green(), path.display());
    }
}
