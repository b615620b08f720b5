//! Type definitions for vidsweep
//!
//! Source of truth for all data structures.

use crate::error::DownloadError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ============================================
// Source Types
// ============================================

/// One record from the source CSV. Extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Row {
    /// Clip length; `None` when the cell is empty or not a number
    #[serde(deserialize_with = "csv::invalid_option")]
    pub duration: Option<f64>,
    /// Where the video file lives
    pub url: String,
    /// Informational only
    pub embedded_url: String,
    /// Free text, searched by keyword filters
    pub tags: String,
}

/// Columns every source file must carry
pub const REQUIRED_COLUMNS: [&str; 4] = ["duration", "url", "embedded_url", "tags"];

// ============================================
// Download Types
// ============================================

/// One (url, destination) download unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: String,
    pub path: PathBuf,
}

impl DownloadTask {
    pub fn new(url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            path: path.into(),
        }
    }
}

/// How a single download ended
#[derive(Debug)]
pub enum DownloadOutcome {
    Succeeded { bytes: u64 },
    Failed(DownloadError),
}

/// A task paired with its outcome
#[derive(Debug)]
pub struct DownloadReport {
    pub task: DownloadTask,
    pub outcome: DownloadOutcome,
}

impl DownloadReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, DownloadOutcome::Succeeded { .. })
    }
}

/// Totals over a finished batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub bytes: u64,
}

/// Options for the download engine
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Max in-flight downloads; `None` starts every task at once
    pub concurrency: Option<usize>,
    /// Per-task deadline covering request and body
    pub timeout: Option<Duration>,
}

// ============================================
// Policy Types
// ============================================

/// Which paths end up in the viewer document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewerScope {
    /// Every candidate, whether or not it downloaded
    #[default]
    All,
    /// Only files whose download succeeded
    Succeeded,
}

/// What to do when two URLs share a file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Later downloads overwrite earlier ones
    #[default]
    Overwrite,
    /// Prefix later names with a short hash of their URL
    HashQualify,
}

// ============================================
// Config Types
// ============================================

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CSV source path
    pub source: String,
    /// Download directory path
    pub download_dir: String,
    /// Rows per chunk (default: 100000)
    pub chunk_size: usize,
    /// Keyword filter; empty keeps every row
    pub keywords: Vec<String>,
    /// Max concurrent downloads (0 = unbounded)
    pub concurrency: usize,
    /// Per-download timeout in seconds (0 = none)
    pub timeout_secs: u64,
    /// Viewer output file
    pub viewer_output: String,
    pub viewer_scope: ViewerScope,
    pub collision_policy: CollisionPolicy,
    /// Open the viewer when done
    pub open_viewer: bool,
    /// Editor command (default: "nvim")
    pub editor: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: String::new(),
            download_dir: "downloads".into(),
            chunk_size: 100_000,
            keywords: Vec::new(),
            concurrency: 0,
            timeout_secs: 0,
            viewer_output: crate::core::viewer::DEFAULT_OUTPUT.into(),
            viewer_scope: ViewerScope::default(),
            collision_policy: CollisionPolicy::default(),
            open_viewer: true,
            editor: "nvim".into(),
        }
    }
}

impl Config {
    /// Engine options derived from the 0-means-off fields
    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            concurrency: (self.concurrency > 0).then_some(self.concurrency),
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
        }
    }
}
