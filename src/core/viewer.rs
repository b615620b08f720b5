//! HTML viewer page for downloaded clips

use crate::error::{Result, VidSweepError};
use crate::utils::paths::ensure_dir;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::fs;
use tokio::process::Command;

/// Default viewer file, relative to the working directory
pub const DEFAULT_OUTPUT: &str = "video_viewer.html";

/// MIME type for a video path, by extension
pub fn mime_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("flv") => "video/x-flv",
        Some("mov") => "video/quicktime",
        Some("wmv") => "video/x-ms-wmv",
        _ => "video/mp4",
    }
}

/// Render one `<video>` element per path, in order, stamped with
/// `generated`. Paths are not checked for existence.
pub fn render(paths: &[PathBuf], generated: DateTime<Local>) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Video viewer</title>\n",
    );
    html.push_str(&format!(
        "<meta name=\"generated\" content=\"{}\">\n</head>\n<body>\n",
        generated.to_rfc3339()
    ));

    for path in paths {
        let src = path.to_string_lossy();
        html.push_str(&format!(
            "<video width=\"320\" height=\"240\" controls><source src=\"{}\" type=\"{}\">Your browser does not support the video tag.</video><br>\n",
            html_escape::encode_double_quoted_attribute(&src),
            mime_type(path),
        ));
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Render and write the viewer to `output`
pub async fn write(paths: &[PathBuf], output: &Path) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).await?;
    }
    fs::write(output, render(paths, Local::now())).await?;
    tracing::info!(path = %output.display(), entries = paths.len(), "viewer written");
    Ok(())
}

/// Hand the viewer to the platform opener without waiting on it
pub async fn open(output: &Path) -> Result<()> {
    let (program, args): (&str, &[&str]) = if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(target_os = "windows") {
        ("cmd", &["/C", "start", ""])
    } else {
        ("xdg-open", &[])
    };

    Command::new(program)
        .args(args)
        .arg(output)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| VidSweepError::Spawn(format!("Failed to start {}: {}", program, e)))?;

    Ok(())
}
