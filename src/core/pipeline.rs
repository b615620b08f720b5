//! Pipeline driver: read → filter/sort → collect → download → viewer

use crate::core::collector::TaskCollector;
use crate::core::downloader::{Downloader, summarize};
use crate::core::filter::filter_and_sort;
use crate::core::reader::ChunkReader;
use crate::core::viewer;
use crate::error::{Result, VidSweepError};
use crate::storage::config::validate;
use crate::types::{Config, DownloadReport, DownloadSummary, DownloadTask, ViewerScope};
use crate::ui::sink::Sink;
use std::path::PathBuf;

/// What a finished run produced
#[derive(Debug)]
pub struct RunSummary {
    /// One per collected task, in collection order
    pub reports: Vec<DownloadReport>,
    pub summary: DownloadSummary,
    /// Paths listed in the viewer, in order
    pub viewer_entries: Vec<PathBuf>,
    pub viewer_output: PathBuf,
    /// Malformed source records that were dropped
    pub skipped_rows: usize,
}

/// One run over a source file
pub struct Pipeline {
    config: Config,
    sink: Sink,
}

impl Pipeline {
    pub fn new(config: Config, sink: Sink) -> Self {
        Self { config, sink }
    }

    /// Run every stage. Reading errors abort before anything is downloaded;
    /// per-download failures only show up in the returned reports.
    pub async fn run(self) -> Result<RunSummary> {
        let Pipeline { config, sink } = self;

        if config.source.is_empty() {
            return Err(VidSweepError::InvalidConfig("no source file given".into()));
        }
        validate(&config)?;
        let downloader = Downloader::new(config.download_options())?;

        // CSV reading is blocking file I/O
        let read_config = config.clone();
        let (tasks, skipped_rows, mut sink) = tokio::task::spawn_blocking(move || {
            let mut sink = sink;
            collect_tasks(&read_config, &mut sink).map(|(tasks, skipped)| (tasks, skipped, sink))
        })
        .await??;

        tracing::info!(tasks = tasks.len(), skipped_rows, "source read");

        let download_dir = PathBuf::from(&config.download_dir);
        sink.download_started(tasks.len());
        let reports = downloader
            .download_all_with(tasks, &download_dir, |report| sink.task_finished(report))
            .await?;
        let summary = summarize(&reports);
        sink.download_finished(&summary);

        let viewer_entries = viewer_entries(&reports, config.viewer_scope);
        let viewer_output = PathBuf::from(&config.viewer_output);
        viewer::write(&viewer_entries, &viewer_output).await?;
        sink.viewer_written(&viewer_output);

        if config.open_viewer {
            if let Err(e) = viewer::open(&viewer_output).await {
                tracing::warn!(error = %e, "could not open viewer");
            }
        }

        Ok(RunSummary {
            reports,
            summary,
            viewer_entries,
            viewer_output,
            skipped_rows,
        })
    }
}

/// Read every chunk and accumulate download tasks across all of them
pub fn collect_tasks(config: &Config, sink: &mut Sink) -> Result<(Vec<DownloadTask>, usize)> {
    let mut reader = ChunkReader::open(&config.source, config.chunk_size)?;
    let mut collector = TaskCollector::new(&config.download_dir, config.collision_policy);

    for (index, chunk) in reader.by_ref().enumerate() {
        let rows = chunk?;
        let read = rows.len();
        let kept = filter_and_sort(rows, &config.keywords);
        tracing::debug!(chunk = index, read, kept = kept.len(), "chunk processed");
        sink.chunk_processed(index, read, &kept);
        collector.collect(&kept);
    }

    Ok((collector.into_tasks(), reader.skipped()))
}

/// Paths the viewer should list for the given scope
pub fn viewer_entries(reports: &[DownloadReport], scope: ViewerScope) -> Vec<PathBuf> {
    reports
        .iter()
        .filter(|r| scope == ViewerScope::All || r.is_success())
        .map(|r| r.task.path.clone())
        .collect()
}
