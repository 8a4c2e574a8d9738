//! Transcript retrieval via yt-dlp subtitle downloads.
//!
//! yt-dlp writes subtitles as json3 sidecar files; we request the
//! preferred language with English as a fallback, parse whichever file
//! appears, and clean up the sidecars afterwards.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info, warn};

use heatclip_models::{TranscriptEntry, VideoId};

use crate::error::{MediaError, MediaResult};

#[derive(Debug, Deserialize)]
struct Json3Document {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs")]
    start_ms: Option<u64>,
    #[serde(rename = "dDurationMs")]
    duration_ms: Option<u64>,
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Fetch the transcript for a video, preferring `language` and falling
/// back to English auto-captions.
pub async fn fetch_transcript(
    video_id: &VideoId,
    work_dir: &Path,
    language: &str,
) -> MediaResult<Vec<TranscriptEntry>> {
    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;
    tokio::fs::create_dir_all(work_dir).await?;

    let output_template = work_dir.join("%(id)s");
    let sub_langs = if language == "en" {
        "en".to_string()
    } else {
        format!("{},en", language)
    };

    let output = Command::new("yt-dlp")
        .args([
            "--skip-download",
            "--write-sub",
            "--write-auto-sub",
            "--sub-lang",
            &sub_langs,
            "--sub-format",
            "json3",
            "-o",
            &output_template.to_string_lossy(),
            &video_id.watch_url(),
        ])
        .stdin(Stdio::null())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(video_id = %video_id, stderr = %stderr, "yt-dlp subtitle fetch failed");
    }

    let subtitle_path = find_subtitle_file(video_id, work_dir, language).await?;
    let raw = tokio::fs::read_to_string(&subtitle_path).await?;
    let entries = parse_json3_transcript(&raw)?;

    cleanup_subtitle_files(video_id, work_dir).await;

    if entries.is_empty() {
        return Err(MediaError::transcript_unavailable(format!(
            "subtitle file for {} contained no usable text",
            video_id
        )));
    }

    info!(video_id = %video_id, entries = entries.len(), "Fetched transcript");
    Ok(entries)
}

/// Parse a json3 subtitle document into transcript entries.
///
/// Events without timing or without visible text (some carry only
/// newline markers) are skipped.
pub fn parse_json3_transcript(raw: &str) -> MediaResult<Vec<TranscriptEntry>> {
    let document: Json3Document = serde_json::from_str(raw)?;

    let entries = document
        .events
        .into_iter()
        .filter_map(|event| {
            let start_ms = event.start_ms?;
            let duration_ms = event.duration_ms?;

            let text: String = event
                .segs
                .iter()
                .map(|seg| seg.utf8.as_str())
                .collect::<String>()
                .replace('\n', " ")
                .trim()
                .to_string();
            if text.is_empty() {
                return None;
            }

            Some(TranscriptEntry::new(
                text,
                start_ms as f64 / 1000.0,
                duration_ms as f64 / 1000.0,
            ))
        })
        .collect();

    Ok(entries)
}

/// Locate the json3 file yt-dlp wrote, preferring the requested
/// language over the English fallback.
async fn find_subtitle_file(
    video_id: &VideoId,
    work_dir: &Path,
    language: &str,
) -> MediaResult<PathBuf> {
    let preferred = work_dir.join(format!("{}.{}.json3", video_id, language));
    if preferred.exists() {
        return Ok(preferred);
    }

    let fallback = work_dir.join(format!("{}.en.json3", video_id));
    if fallback.exists() {
        debug!(video_id = %video_id, "Falling back to English subtitles");
        return Ok(fallback);
    }

    // Auto-captions sometimes come back tagged with a locale variant
    // such as en-US or en-orig.
    let prefix = format!("{}.", video_id);
    let mut dir = tokio::fs::read_dir(work_dir).await?;
    while let Some(entry) = dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(&prefix) && name.ends_with(".json3") {
            return Ok(entry.path());
        }
    }

    Err(MediaError::transcript_unavailable(format!(
        "no subtitles available for {} in '{}' or English",
        video_id, language
    )))
}

/// Remove subtitle sidecar files left behind for a video.
async fn cleanup_subtitle_files(video_id: &VideoId, work_dir: &Path) {
    let prefix = format!("{}.", video_id);
    let Ok(mut dir) = tokio::fs::read_dir(work_dir).await else {
        return;
    };
    while let Ok(Some(entry)) = dir.next_entry().await {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(&prefix) && name.ends_with(".json3") {
            tokio::fs::remove_file(entry.path()).await.ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json3_transcript() {
        let raw = r#"{
            "events": [
                {"tStartMs": 0, "dDurationMs": 2500, "segs": [{"utf8": "hello "}, {"utf8": "world"}]},
                {"tStartMs": 2500, "dDurationMs": 1000, "segs": [{"utf8": "\n"}]},
                {"tStartMs": 3500, "segs": [{"utf8": "no duration"}]},
                {"tStartMs": 4000, "dDurationMs": 1500, "segs": [{"utf8": "second\nline"}]}
            ]
        }"#;

        let entries = parse_json3_transcript(raw).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].text, "hello world");
        assert!((entries[0].start - 0.0).abs() < 1e-9);
        assert!((entries[0].duration - 2.5).abs() < 1e-9);

        assert_eq!(entries[1].text, "second line");
        assert!((entries[1].start - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_json3_empty_document() {
        let entries = parse_json3_transcript("{}").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_parse_json3_rejects_invalid_json() {
        assert!(parse_json3_transcript("not json").is_err());
    }

    #[tokio::test]
    async fn test_find_subtitle_file_prefers_requested_language() {
        let dir = tempfile::tempdir().unwrap();
        let video_id = VideoId::parse("dQw4w9WgXcQ").unwrap();
        let spanish = dir.path().join("dQw4w9WgXcQ.es.json3");
        let english = dir.path().join("dQw4w9WgXcQ.en.json3");
        tokio::fs::write(&spanish, "{}").await.unwrap();
        tokio::fs::write(&english, "{}").await.unwrap();

        let found = find_subtitle_file(&video_id, dir.path(), "es").await.unwrap();
        assert_eq!(found, spanish);
    }

    #[tokio::test]
    async fn test_find_subtitle_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let video_id = VideoId::parse("dQw4w9WgXcQ").unwrap();

        let err = find_subtitle_file(&video_id, dir.path(), "en")
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::TranscriptUnavailable(_)));
    }
}
