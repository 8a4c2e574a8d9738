//! Source resolution.
//!
//! A bulk run accepts a mixed list of sources: bare video IDs, watch
//! URLs, playlist URLs, and channel URLs. Playlists and channels are
//! expanded to their video IDs with `yt-dlp --flat-playlist`; the
//! result is one deduplicated list of video IDs in first-seen order.

use std::collections::HashSet;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{info, warn};

use heatclip_models::VideoId;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};

/// What kind of source a raw input string is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// A single video, by ID.
    Video(VideoId),
    /// A playlist URL, expanded via yt-dlp.
    Playlist(String),
    /// A channel URL, expanded via yt-dlp.
    Channel(String),
    /// Nothing we recognize.
    Unknown(String),
}

/// Classify a raw source string.
pub fn classify_source(raw: &str) -> SourceKind {
    let trimmed = raw.trim();

    if let Ok(id) = VideoId::parse(trimmed) {
        return SourceKind::Video(id);
    }

    if trimmed.contains("playlist?") || trimmed.contains("list=") {
        return SourceKind::Playlist(trimmed.to_string());
    }

    if trimmed.contains("/channel/")
        || trimmed.contains("/user/")
        || trimmed.contains("/c/")
        || trimmed.contains("/@")
    {
        return SourceKind::Channel(trimmed.to_string());
    }

    if let Some(id) = extract_watch_id(trimmed) {
        return SourceKind::Video(id);
    }

    SourceKind::Unknown(trimmed.to_string())
}

/// Pull the video ID out of a watch or short URL.
fn extract_watch_id(url: &str) -> Option<VideoId> {
    let candidate = if let Some(rest) = url.split("watch?v=").nth(1) {
        rest
    } else if let Some(rest) = url.split("youtu.be/").nth(1) {
        rest
    } else {
        return None;
    };

    let id: String = candidate
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    VideoId::parse(id).ok()
}

/// Expand all sources into a deduplicated video ID list.
///
/// IDs keep the order in which they are first seen across the input.
/// A source that fails to expand is logged and skipped; input that
/// resolves to nothing yields an empty list, never an error.
pub async fn resolve_sources(sources: &[String], config: &PipelineConfig) -> Vec<VideoId> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for source in sources {
        let ids = match classify_source(source) {
            SourceKind::Video(id) => vec![id],
            SourceKind::Playlist(url) | SourceKind::Channel(url) => {
                match expand_listing(&url, config.source_video_limit).await {
                    Ok(ids) => ids,
                    Err(e) => {
                        warn!(source = %url, error = %e, "Failed to expand source, skipping");
                        continue;
                    }
                }
            }
            SourceKind::Unknown(raw) => {
                warn!(source = %raw, "Unrecognized source, skipping");
                continue;
            }
        };

        for id in ids {
            if seen.insert(id.clone()) {
                resolved.push(id);
            }
        }
    }

    if resolved.is_empty() {
        warn!("No sources resolved to any video");
    }

    info!(videos = resolved.len(), "Resolved sources");
    resolved
}

/// List the video IDs of a playlist or channel without downloading.
async fn expand_listing(url: &str, limit: usize) -> PipelineResult<Vec<VideoId>> {
    which::which("yt-dlp").map_err(|_| heatclip_media::MediaError::YtDlpNotFound)?;

    let output = Command::new("yt-dlp")
        .args([
            "--flat-playlist",
            "--print",
            "id",
            "--playlist-end",
            &limit.to_string(),
            url,
        ])
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(PipelineError::Io)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PipelineError::InvalidSource(format!(
            "yt-dlp listing failed: {}",
            stderr.lines().last().unwrap_or("unknown error")
        )));
    }

    let ids = String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| VideoId::parse(line.trim()).ok())
        .take(limit)
        .collect();

    Ok(ids)
}
