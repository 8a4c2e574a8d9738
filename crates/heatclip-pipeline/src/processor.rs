//! Bulk video processing.
//!
//! Each video runs the same staged pipeline: download, transcript
//! fetch, heatmap analysis, clip cutting, result saving. Videos are
//! processed concurrently under a semaphore; one video's failure is
//! captured in its outcome and never aborts the batch.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::info;
use uuid::Uuid;

use heatclip_heatmap::{analyze_heatmap, DetectorConfig, HeatmapClient};
use heatclip_media::{cut_clips, download_video, fetch_transcript, probe_duration};
use heatclip_models::{
    extract_clip_transcripts, Clip, Report, VideoId, VideoOutcome, VideoStage,
};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::VideoLogger;
use crate::progress::ProgressSender;
use crate::resolver::resolve_sources;

/// Orchestrates a bulk run over many videos.
pub struct BulkProcessor {
    config: Arc<PipelineConfig>,
    detector: Arc<DetectorConfig>,
    heatmap: HeatmapClient,
    progress: ProgressSender,
    run_id: Uuid,
}

impl BulkProcessor {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_progress(config, ProgressSender::disabled())
    }

    pub fn with_progress(config: PipelineConfig, progress: ProgressSender) -> Self {
        Self {
            config: Arc::new(config),
            detector: Arc::new(DetectorConfig::default()),
            heatmap: HeatmapClient::new(),
            progress,
            run_id: Uuid::new_v4(),
        }
    }

    /// Process every video the sources resolve to and write the batch
    /// report to `output_dir/report.json`.
    ///
    /// Outcomes land in the report in completion order. Sources that
    /// resolve to no videos still produce a report, with zero totals.
    pub async fn process_sources(
        &self,
        sources: &[String],
        output_dir: &Path,
    ) -> PipelineResult<Report> {
        let video_ids = resolve_sources(sources, &self.config).await;
        tokio::fs::create_dir_all(output_dir).await?;

        info!(
            run_id = %self.run_id,
            videos = video_ids.len(),
            concurrency = self.config.concurrency,
            "Starting bulk run"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut tasks = JoinSet::new();

        for video_id in video_ids {
            let semaphore = Arc::clone(&semaphore);
            let config = Arc::clone(&self.config);
            let detector = Arc::clone(&self.detector);
            let heatmap = self.heatmap.clone();
            let progress = self.progress.clone();
            let logger = VideoLogger::new(self.run_id, &video_id);
            let video_dir = output_dir.join(video_id.as_str());

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore open");

                progress.stage(&video_id, VideoStage::Queued);
                match process_single_video(
                    &config, &detector, &heatmap, &progress, &logger, &video_id, &video_dir,
                )
                .await
                {
                    Ok(outcome) => {
                        logger.completion(outcome.clips.len());
                        outcome
                    }
                    Err(e) => {
                        logger.failure(&e.to_string());
                        VideoOutcome::failed(video_id, e.to_string())
                    }
                }
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    // A panicked task has no video context left; it only
                    // shows up in the counts through the log.
                    tracing::error!(run_id = %self.run_id, error = %e, "Video task panicked");
                }
            }
        }

        let report = Report::from_outcomes(outcomes);
        let report_path = output_dir.join("report.json");
        tokio::fs::write(&report_path, serde_json::to_vec_pretty(&report)?).await?;

        info!(
            run_id = %self.run_id,
            total = report.total_processed,
            succeeded = report.success_count,
            failed = report.failure_count,
            success_rate = report.success_rate,
            report = %report_path.display(),
            "Bulk run complete"
        );

        Ok(report)
    }
}

/// Run the full pipeline for one video.
async fn process_single_video(
    config: &PipelineConfig,
    detector: &DetectorConfig,
    heatmap: &HeatmapClient,
    progress: &ProgressSender,
    logger: &VideoLogger,
    video_id: &VideoId,
    video_dir: &Path,
) -> PipelineResult<VideoOutcome> {
    tokio::fs::create_dir_all(video_dir).await?;

    logger.stage(VideoStage::Downloading);
    progress.stage(video_id, VideoStage::Downloading);
    let video_path = {
        let progress = progress.clone();
        let id = video_id.clone();
        download_video(video_id, &config.work_dir, move |_stream, percent| {
            progress.percent(&id, VideoStage::Downloading, percent);
        })
        .await?
    };

    logger.stage(VideoStage::FetchingTranscript);
    progress.stage(video_id, VideoStage::FetchingTranscript);
    let transcript = fetch_transcript(video_id, &config.work_dir, &config.language).await?;

    logger.stage(VideoStage::AnalyzingHeatmap);
    progress.stage(video_id, VideoStage::AnalyzingHeatmap);
    let duration = probe_duration(&video_path).await?;
    let markup = heatmap.fetch(video_id).await?;
    tokio::fs::write(video_dir.join("heatmap.svg"), &markup).await?;

    let detected = analyze_heatmap(&markup, duration as u32, detector);
    let clips = select_clips(&detected, config.max_clips_per_video);
    if clips.is_empty() {
        return Err(PipelineError::NoValidClips);
    }
    if clips.len() < detected.len() {
        logger.warning(&format!(
            "dropped {} of {} detected clips (degenerate or over the per-video cap)",
            detected.len() - clips.len(),
            detected.len()
        ));
    }
    logger.progress(&format!("{} clips selected", clips.len()));

    logger.stage(VideoStage::CuttingClips);
    progress.stage(video_id, VideoStage::CuttingClips);
    let clip_dir = video_dir.join("clips");
    let clip_paths = cut_clips(&video_path, &clips, &clip_dir).await?;

    logger.stage(VideoStage::SavingResults);
    progress.stage(video_id, VideoStage::SavingResults);
    let clip_transcripts = extract_clip_transcripts(&transcript, &clips);
    let transcript_path = video_dir.join("clip_transcripts.json");
    tokio::fs::write(
        &transcript_path,
        serde_json::to_vec_pretty(&clip_transcripts)?,
    )
    .await?;

    Ok(VideoOutcome::succeeded(
        video_id.clone(),
        clips,
        clip_paths,
        clip_dir,
        transcript_path,
    ))
}

/// Keep the first `max` clips that satisfy `end > start`, preserving
/// detector rank order.
fn select_clips(clips: &[Clip], max: usize) -> Vec<Clip> {
    clips
        .iter()
        .filter(|clip| clip.is_valid())
        .take(max)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_clips_caps_at_max() {
        let clips: Vec<Clip> = (0..12)
            .map(|i| Clip::new(i as f64 * 100.0, i as f64 * 100.0 + 60.0, 90.0 - i as f64))
            .collect();

        let selected = select_clips(&clips, 10);
        assert_eq!(selected.len(), 10);
        // Rank order preserved: the two lowest-attention clips dropped.
        assert!((selected[0].average_attention - 90.0).abs() < 1e-9);
        assert!((selected[9].average_attention - 81.0).abs() < 1e-9);
    }

    #[test]
    fn test_select_clips_drops_degenerate() {
        let clips = vec![
            Clip::new(10.0, 70.0, 85.0),
            Clip::new(70.0, 70.0, 80.0),
            Clip::new(120.0, 100.0, 75.0),
            Clip::new(200.0, 260.0, 70.0),
        ];

        let selected = select_clips(&clips, 10);
        assert_eq!(selected.len(), 2);
        assert!((selected[0].start - 10.0).abs() < 1e-9);
        assert!((selected[1].start - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_select_clips_empty() {
        assert!(select_clips(&[], 10).is_empty());
    }

    #[tokio::test]
    async fn test_unresolvable_sources_produce_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let processor = BulkProcessor::new(PipelineConfig::default());

        let report = processor
            .process_sources(&["garbage".to_string()], dir.path())
            .await
            .unwrap();

        assert_eq!(report.total_processed, 0);
        assert_eq!(report.success_count, 0);
        assert_eq!(report.failure_count, 0);
        assert_eq!(report.success_rate, 0.0);
        assert!(dir.path().join("report.json").exists());
    }
}
