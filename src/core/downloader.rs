//! Download engine - concurrent HTTP fetch with streamed disk writes
//!
//! Every task in a batch is multiplexed on the calling task. A failed task
//! records its error and ends; siblings keep going and the batch only
//! returns once every task has settled.

use crate::error::{DownloadError, Result, VidSweepError};
use crate::types::{DownloadOptions, DownloadOutcome, DownloadReport, DownloadSummary, DownloadTask};
use crate::utils::paths::ensure_dir;
use futures::{StreamExt, TryStreamExt, stream};
use reqwest::Client;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::io::StreamReader;

/// Bytes requested from the response body per read
pub const READ_SIZE: usize = 8192;

const USER_AGENT: &str = concat!("vidsweep/", env!("CARGO_PKG_VERSION"));

/// Concurrent downloader sharing one HTTP client
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    options: DownloadOptions,
}

impl Downloader {
    /// Build the shared client (redirects followed, default TLS verification)
    pub fn new(options: DownloadOptions) -> Result<Self> {
        if options.concurrency == Some(0) {
            return Err(VidSweepError::InvalidConfig(
                "concurrency must be at least 1".into(),
            ));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client, options })
    }

    /// Download every task into place, returning one report per task in
    /// submission order.
    pub async fn download_all(
        &self,
        tasks: Vec<DownloadTask>,
        dir: &Path,
    ) -> Result<Vec<DownloadReport>> {
        self.download_all_with(tasks, dir, |_| {}).await
    }

    /// Like [`download_all`](Self::download_all), calling `on_finished` as
    /// each task settles (in completion order).
    pub async fn download_all_with<F>(
        &self,
        tasks: Vec<DownloadTask>,
        dir: &Path,
        mut on_finished: F,
    ) -> Result<Vec<DownloadReport>>
    where
        F: FnMut(&DownloadReport),
    {
        ensure_dir(dir).await?;

        let total = tasks.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        // Unbounded means every task is polled from the start
        let limit = self.options.concurrency.unwrap_or(total);
        tracing::info!(total, limit, dir = %dir.display(), "starting downloads");

        let mut in_flight = stream::iter(tasks.into_iter().enumerate())
            .map(|(index, task)| async move {
                let outcome = self.run_task(&task).await;
                (index, DownloadReport { task, outcome })
            })
            .buffer_unordered(limit);

        let mut slots: Vec<Option<DownloadReport>> = (0..total).map(|_| None).collect();
        while let Some((index, report)) = in_flight.next().await {
            on_finished(&report);
            slots[index] = Some(report);
        }

        Ok(slots.into_iter().flatten().collect())
    }

    async fn run_task(&self, task: &DownloadTask) -> DownloadOutcome {
        let result = match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, fetch_to_file(&self.client, task))
                .await
                .unwrap_or(Err(DownloadError::Timeout(limit))),
            None => fetch_to_file(&self.client, task).await,
        };

        match result {
            Ok(bytes) => {
                tracing::info!(url = %task.url, path = %task.path.display(), bytes, "downloaded");
                DownloadOutcome::Succeeded { bytes }
            }
            Err(e) => {
                tracing::warn!(url = %task.url, error = %e, "download failed");
                DownloadOutcome::Failed(e)
            }
        }
    }
}

/// GET the url and stream the body to the task's path.
///
/// The file is truncated before the first write; a failure partway through
/// leaves whatever was written so far.
async fn fetch_to_file(client: &Client, task: &DownloadTask) -> std::result::Result<u64, DownloadError> {
    let response = client.get(&task.url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status {
            status: status.as_u16(),
        });
    }

    let mut file = File::create(&task.path).await?;
    let body = response.bytes_stream().map_err(std::io::Error::other);
    let mut reader = StreamReader::new(Box::pin(body));
    let mut buf = vec![0u8; READ_SIZE];
    let mut written = 0u64;

    loop {
        let n = reader.read(&mut buf).await.map_err(DownloadError::Body)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).await?;
        written += n as u64;
    }

    file.flush().await?;
    Ok(written)
}

/// Count successes, failures and bytes over a batch
pub fn summarize(reports: &[DownloadReport]) -> DownloadSummary {
    reports
        .iter()
        .fold(DownloadSummary::default(), |mut acc, report| {
            match report.outcome {
                DownloadOutcome::Succeeded { bytes } => {
                    acc.succeeded += 1;
                    acc.bytes += bytes;
                }
                DownloadOutcome::Failed(_) => acc.failed += 1,
            }
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn task(base: &str, name: &str, dir: &Path) -> DownloadTask {
        DownloadTask::new(format!("{}/{}", base, name), dir.join(name))
    }

    #[tokio::test]
    async fn test_one_404_does_not_stop_siblings() {
        let mut server = mockito::Server::new_async().await;
        let a = server.mock("GET", "/a.mp4").with_body("first").create_async().await;
        let b = server.mock("GET", "/b.mp4").with_status(404).create_async().await;
        let c = server.mock("GET", "/c.mp4").with_body("third").create_async().await;

        let dir = TempDir::new().unwrap();
        let tasks = vec![
            task(&server.url(), "a.mp4", dir.path()),
            task(&server.url(), "b.mp4", dir.path()),
            task(&server.url(), "c.mp4", dir.path()),
        ];

        let downloader = Downloader::new(DownloadOptions::default()).unwrap();
        let reports = downloader.download_all(tasks, dir.path()).await.unwrap();

        a.assert_async().await;
        b.assert_async().await;
        c.assert_async().await;

        assert_eq!(reports.len(), 3);
        assert!(reports[0].is_success());
        assert!(matches!(
            reports[1].outcome,
            DownloadOutcome::Failed(DownloadError::Status { status: 404 })
        ));
        assert!(reports[2].is_success());

        assert_eq!(std::fs::read_to_string(dir.path().join("a.mp4")).unwrap(), "first");
        assert_eq!(std::fs::read_to_string(dir.path().join("c.mp4")).unwrap(), "third");
        assert!(!dir.path().join("b.mp4").exists());

        let summary = summarize(&reports);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.bytes, 10);
    }

    #[tokio::test]
    async fn test_large_body_streamed_intact() {
        let body: Vec<u8> = (0..(READ_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/big.mkv").with_body(&body).create_async().await;

        let dir = TempDir::new().unwrap();
        let downloader = Downloader::new(DownloadOptions::default()).unwrap();
        let reports = downloader
            .download_all(vec![task(&server.url(), "big.mkv", dir.path())], dir.path())
            .await
            .unwrap();

        assert!(matches!(
            reports[0].outcome,
            DownloadOutcome::Succeeded { bytes } if bytes == body.len() as u64
        ));
        assert_eq!(std::fs::read(dir.path().join("big.mkv")).unwrap(), body);
    }

    #[tokio::test]
    async fn test_rerun_overwrites_instead_of_appending() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/a.mp4")
            .with_body("stable")
            .expect(2)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let downloader = Downloader::new(DownloadOptions::default()).unwrap();
        for _ in 0..2 {
            downloader
                .download_all(vec![task(&server.url(), "a.mp4", dir.path())], dir.path())
                .await
                .unwrap();
        }

        assert_eq!(std::fs::read_to_string(dir.path().join("a.mp4")).unwrap(), "stable");
    }

    #[tokio::test]
    async fn test_bounded_concurrency_keeps_submission_order() {
        let mut server = mockito::Server::new_async().await;
        let names: Vec<String> = (0..6).map(|i| format!("clip{}.mov", i)).collect();
        for name in &names {
            server
                .mock("GET", format!("/{}", name).as_str())
                .with_body(name.as_str())
                .create_async()
                .await;
        }

        let dir = TempDir::new().unwrap();
        let tasks: Vec<DownloadTask> = names.iter().map(|n| task(&server.url(), n, dir.path())).collect();
        let downloader = Downloader::new(DownloadOptions {
            concurrency: Some(2),
            timeout: None,
        })
        .unwrap();

        let mut finished = 0;
        let reports = downloader
            .download_all_with(tasks.clone(), dir.path(), |_| finished += 1)
            .await
            .unwrap();

        assert_eq!(finished, 6);
        let reported: Vec<DownloadTask> = reports.iter().map(|r| r.task.clone()).collect();
        assert_eq!(reported, tasks);
        assert!(reports.iter().all(DownloadReport::is_success));
    }

    #[tokio::test]
    async fn test_creates_nested_destination() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("one/two");
        let downloader = Downloader::new(DownloadOptions::default()).unwrap();

        let reports = downloader.download_all(Vec::new(), &nested).await.unwrap();

        assert!(reports.is_empty());
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = TempDir::new().unwrap();
        let downloader = Downloader::new(DownloadOptions::default()).unwrap();
        let reports = downloader
            .download_all(vec![task(&format!("http://{}", addr), "a.mp4", dir.path())], dir.path())
            .await
            .unwrap();

        assert!(matches!(
            reports[0].outcome,
            DownloadOutcome::Failed(DownloadError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_hung_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let dir = TempDir::new().unwrap();
        let downloader = Downloader::new(DownloadOptions {
            concurrency: None,
            timeout: Some(Duration::from_millis(200)),
        })
        .unwrap();
        let reports = downloader
            .download_all(vec![task(&format!("http://{}", addr), "a.mp4", dir.path())], dir.path())
            .await
            .unwrap();

        assert!(matches!(
            reports[0].outcome,
            DownloadOutcome::Failed(DownloadError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_truncated_body_leaves_partial_file() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let head = "HTTP/1.1 200 OK\r\nContent-Length: 100000\r\nConnection: close\r\n\r\n";
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&[1u8; 20_000]).await.unwrap();
            socket.flush().await.unwrap();
        });

        let dir = TempDir::new().unwrap();
        let downloader = Downloader::new(DownloadOptions::default()).unwrap();
        let reports = downloader
            .download_all(vec![task(&format!("http://{}", addr), "cut.flv", dir.path())], dir.path())
            .await
            .unwrap();

        assert!(matches!(
            reports[0].outcome,
            DownloadOutcome::Failed(DownloadError::Body(_))
        ));
        let len = std::fs::metadata(dir.path().join("cut.flv")).unwrap().len();
        assert!(len > 0 && len < 100_000);
    }

    #[tokio::test]
    async fn test_unbounded_starts_every_task_at_once() {
        const TASKS: usize = 5;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Answers nothing until all requests are in flight together
        tokio::spawn(async move {
            let mut sockets = Vec::new();
            while sockets.len() < TASKS {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut request = [0u8; 1024];
                let _ = socket.read(&mut request).await;
                sockets.push(socket);
            }
            for mut socket in sockets {
                let response = "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok";
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        let dir = TempDir::new().unwrap();
        let base = format!("http://{}", addr);
        let tasks: Vec<DownloadTask> = (0..TASKS)
            .map(|i| task(&base, &format!("v{}.wmv", i), dir.path()))
            .collect();
        let downloader = Downloader::new(DownloadOptions::default()).unwrap();

        let reports = tokio::time::timeout(
            Duration::from_secs(5),
            downloader.download_all(tasks, dir.path()),
        )
        .await
        .expect("tasks were not all in flight together")
        .unwrap();

        assert_eq!(reports.len(), TASKS);
        assert!(reports.iter().all(DownloadReport::is_success));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = Downloader::new(DownloadOptions {
            concurrency: Some(0),
            timeout: None,
        })
        .err()
        .unwrap();
        assert!(matches!(err, VidSweepError::InvalidConfig(_)));
    }
}
