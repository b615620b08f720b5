//! Download task collection
//!
//! Turns sorted rows into (url, local path) pairs, accumulating across chunks.

use crate::types::{CollisionPolicy, DownloadTask, Row};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;

/// Recognized video file extensions (case-sensitive)
pub const VIDEO_EXTENSIONS: [&str; 6] = [".mp4", ".avi", ".mkv", ".flv", ".mov", ".wmv"];

/// Whether the url ends with a recognized video extension
pub fn is_video_url(url: &str) -> bool {
    VIDEO_EXTENSIONS.iter().any(|ext| url.ends_with(ext))
}

/// Final `/`-separated segment of the url
pub fn file_name_for(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Short url hash used to disambiguate colliding names
fn url_hash(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..8].to_string()
}

/// Accumulates download tasks in encounter order
pub struct TaskCollector {
    download_dir: PathBuf,
    policy: CollisionPolicy,
    /// file name -> url that first claimed it
    claimed: HashMap<String, String>,
    tasks: Vec<DownloadTask>,
}

impl TaskCollector {
    pub fn new(download_dir: impl Into<PathBuf>, policy: CollisionPolicy) -> Self {
        Self {
            download_dir: download_dir.into(),
            policy,
            claimed: HashMap::new(),
            tasks: Vec::new(),
        }
    }

    /// Append a task for every video row; other rows are dropped
    pub fn collect(&mut self, rows: &[Row]) {
        for row in rows.iter().filter(|r| is_video_url(&r.url)) {
            let name = self.local_name(&row.url);
            let task = DownloadTask::new(row.url.clone(), self.download_dir.join(name));
            tracing::trace!(url = %task.url, path = %task.path.display(), "collected");
            self.tasks.push(task);
        }
    }

    fn local_name(&mut self, url: &str) -> String {
        let name = file_name_for(url).to_string();
        match self.claimed.get(&name).cloned() {
            None => {
                self.claimed.insert(name.clone(), url.to_string());
                name
            }
            Some(owner) if owner == url => name,
            Some(owner) => match self.policy {
                CollisionPolicy::Overwrite => {
                    tracing::warn!(%url, first = %owner, file = %name, "file name collision, later download overwrites");
                    name
                }
                CollisionPolicy::HashQualify => format!("{}-{}", url_hash(url), name),
            },
        }
    }

    pub fn tasks(&self) -> &[DownloadTask] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<DownloadTask> {
        self.tasks
    }
}
