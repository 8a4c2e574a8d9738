//! Clip extraction with FFmpeg.
//!
//! Clips are cut with stream copy only. Re-encoding would give
//! frame-accurate cuts but takes orders of magnitude longer, and a
//! keyframe of slack is acceptable for attention-driven clips.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{info, warn};

use heatclip_models::Clip;

use crate::error::{MediaError, MediaResult};

/// Cut each clip out of `video_path` into `out_dir` as
/// `clip_{n}.mp4`, numbered from 1 in the order given.
///
/// A clip that fails to cut is logged and skipped; the error is only
/// raised when no clip could be produced at all.
pub async fn cut_clips(
    video_path: &Path,
    clips: &[Clip],
    out_dir: &Path,
) -> MediaResult<Vec<PathBuf>> {
    if !video_path.exists() {
        return Err(MediaError::FileNotFound(video_path.to_path_buf()));
    }
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

    tokio::fs::create_dir_all(out_dir).await?;

    let mut produced = Vec::with_capacity(clips.len());

    for (index, clip) in clips.iter().enumerate() {
        let clip_path = out_dir.join(format!("clip_{}.mp4", index + 1));
        match cut_single_clip(video_path, clip, &clip_path).await {
            Ok(()) => {
                info!(
                    clip = index + 1,
                    start = clip.start,
                    end = clip.end,
                    path = %clip_path.display(),
                    "Cut clip"
                );
                produced.push(clip_path);
            }
            Err(e) => {
                warn!(clip = index + 1, error = %e, "Failed to cut clip, skipping");
            }
        }
    }

    if produced.is_empty() && !clips.is_empty() {
        return Err(MediaError::clip_cutting_failed(format!(
            "all {} clips failed to cut from {}",
            clips.len(),
            video_path.display()
        )));
    }

    Ok(produced)
}

async fn cut_single_clip(video_path: &Path, clip: &Clip, clip_path: &Path) -> MediaResult<()> {
    let output = Command::new("ffmpeg")
        .args(["-ss", &clip.start.to_string(), "-i"])
        .arg(video_path)
        .args([
            "-t",
            &clip.duration().to_string(),
            "-c:v",
            "copy",
            "-c:a",
            "copy",
            "-y",
            "-hide_banner",
            "-loglevel",
            "error",
        ])
        .arg(clip_path)
        .stdin(Stdio::null())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MediaError::clip_cutting_failed(
            stderr.chars().take(200).collect::<String>(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cut_clips_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let clips = vec![Clip::new(0.0, 10.0, 80.0)];

        let result = cut_clips(Path::new("/nonexistent/video.mp4"), &clips, dir.path()).await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}
