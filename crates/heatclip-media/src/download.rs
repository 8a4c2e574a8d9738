//! Video download using yt-dlp.
//!
//! Downloads the video and audio streams separately (yt-dlp's muxed
//! formats top out well below source quality), then merges them with
//! ffmpeg. Each stream download is retried on failure, and percent
//! progress is scraped from yt-dlp's stdout and forwarded to the
//! caller.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;

use regex::Regex;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use heatclip_models::VideoId;

use crate::error::{MediaError, MediaResult};

/// Attempts per stream before the download is declared failed.
const MAX_DOWNLOAD_ATTEMPTS: usize = 3;

/// Best mp4 video stream capped at 1440p; higher resolutions buy
/// nothing for short clips and multiply download time.
const VIDEO_FORMAT: &str = "bestvideo[height<=1440][ext=mp4]";

const AUDIO_FORMAT: &str = "bestaudio[ext=m4a]";

fn percent_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+\.\d+)%").expect("valid regex"))
}

/// Download a video and return the path of the merged mp4.
///
/// An existing merged file is reused without re-downloading (progress
/// reports 100% for both streams in that case).
pub async fn download_video<F>(
    video_id: &VideoId,
    work_dir: &Path,
    progress: F,
) -> MediaResult<PathBuf>
where
    F: Fn(&str, f64) + Send + Sync,
{
    tokio::fs::create_dir_all(work_dir).await?;
    let final_path = work_dir.join(format!("{}.mp4", video_id));

    if final_path.exists() {
        info!(path = %final_path.display(), "Using cached video file");
        progress("video", 100.0);
        progress("audio", 100.0);
        return Ok(final_path);
    }

    which::which("yt-dlp").map_err(|_| MediaError::YtDlpNotFound)?;
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

    let base = work_dir.join(video_id.as_str());
    let url = video_id.watch_url();

    info!(video_id = %video_id, "Starting stream downloads");

    let video_path = download_stream_with_retry(
        &url,
        VIDEO_FORMAT,
        &format!("{}_video.%(ext)s", base.display()),
        work_dir.join(format!("{}_video.mp4", video_id)),
        "video",
        &["--concurrent-fragments", "256", "--http-chunk-size", "300M"],
        &progress,
    )
    .await?;

    let audio_path = download_stream_with_retry(
        &url,
        AUDIO_FORMAT,
        &format!("{}_audio.%(ext)s", base.display()),
        work_dir.join(format!("{}_audio.m4a", video_id)),
        "audio",
        &["--concurrent-fragments", "8"],
        &progress,
    )
    .await?;

    merge_streams(&video_path, &audio_path, &final_path).await?;

    let size = final_path.metadata()?.len();
    info!(
        path = %final_path.display(),
        size_mb = size as f64 / (1024.0 * 1024.0),
        "Downloaded video successfully"
    );

    Ok(final_path)
}

/// Download one stream, retrying transient failures.
async fn download_stream_with_retry<F>(
    url: &str,
    format: &str,
    output_template: &str,
    expected_output: PathBuf,
    stream_type: &str,
    extra_args: &[&str],
    progress: &F,
) -> MediaResult<PathBuf>
where
    F: Fn(&str, f64) + Send + Sync,
{
    let mut last_error = String::new();

    for attempt in 1..=MAX_DOWNLOAD_ATTEMPTS {
        match download_stream(url, format, output_template, stream_type, extra_args, progress)
            .await
        {
            Ok(()) => {
                if expected_output.exists() {
                    return Ok(expected_output);
                }
                last_error = format!("output file missing: {}", expected_output.display());
            }
            Err(e) => last_error = e,
        }

        if attempt < MAX_DOWNLOAD_ATTEMPTS {
            warn!(
                stream = stream_type,
                attempt = attempt,
                error = %last_error,
                "Retrying stream download"
            );
        }
    }

    Err(MediaError::download_failed(format!(
        "{} stream failed after {} attempts: {}",
        stream_type, MAX_DOWNLOAD_ATTEMPTS, last_error
    )))
}

/// Run one yt-dlp invocation, streaming percent progress to the caller.
async fn download_stream<F>(
    url: &str,
    format: &str,
    output_template: &str,
    stream_type: &str,
    extra_args: &[&str],
    progress: &F,
) -> Result<(), String>
where
    F: Fn(&str, f64) + Send + Sync,
{
    let mut args = vec!["-f", format, "--newline"];
    args.extend_from_slice(extra_args);
    args.extend_from_slice(&["-o", output_template, url]);

    let mut child = Command::new("yt-dlp")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("failed to spawn yt-dlp: {}", e))?;

    let stdout = child.stdout.take().expect("stdout piped");
    let mut stderr = child.stderr.take().expect("stderr piped");

    let stdout_task = async {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if let Some(caps) = percent_pattern().captures(&line) {
                if let Ok(percent) = caps[1].parse::<f64>() {
                    progress(stream_type, percent);
                }
            }
        }
    };

    let stderr_task = async {
        let mut buffer = String::new();
        let _ = stderr.read_to_string(&mut buffer).await;
        buffer
    };

    let ((), stderr_output) = tokio::join!(stdout_task, stderr_task);

    let status = child
        .wait()
        .await
        .map_err(|e| format!("failed to wait on yt-dlp: {}", e))?;

    if !status.success() {
        let message = stderr_output
            .lines()
            .last()
            .unwrap_or("unknown error")
            .to_string();
        debug!(stream = stream_type, stderr = %stderr_output, "yt-dlp failed");
        return Err(message);
    }

    Ok(())
}

/// Merge downloaded streams into the final mp4 and remove the temps.
async fn merge_streams(
    video_path: &Path,
    audio_path: &Path,
    final_path: &Path,
) -> MediaResult<()> {
    debug!(
        video = %video_path.display(),
        audio = %audio_path.display(),
        "Merging streams"
    );

    let output = Command::new("ffmpeg")
        .args([
            "-y",
            "-i",
            &video_path.to_string_lossy(),
            "-i",
            &audio_path.to_string_lossy(),
            "-c:v",
            "copy",
            "-c:a",
            "aac",
            "-loglevel",
            "error",
            &final_path.to_string_lossy(),
        ])
        .stdin(Stdio::null())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MediaError::download_failed(format!(
            "stream merge failed: {}",
            stderr.chars().take(200).collect::<String>()
        )));
    }

    tokio::fs::remove_file(video_path).await.ok();
    tokio::fs::remove_file(audio_path).await.ok();

    Ok(())
}
