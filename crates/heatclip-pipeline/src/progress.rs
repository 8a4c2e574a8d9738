//! Pipeline progress events.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use heatclip_models::{VideoId, VideoStage};

/// A progress update for one video in a bulk run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Video being processed.
    pub video_id: VideoId,

    /// Pipeline stage the video just entered.
    pub stage: VideoStage,

    /// Stage-local percent complete, when the stage reports one
    /// (currently only downloads do).
    pub percent: Option<f64>,
}

/// Sender half for progress events.
///
/// A dropped receiver never fails the pipeline; updates are simply
/// discarded once nobody listens.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: Option<mpsc::UnboundedSender<ProgressEvent>>,
}

impl ProgressSender {
    /// Create a sender/receiver pair.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sender that drops every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Report a stage transition.
    pub fn stage(&self, video_id: &VideoId, stage: VideoStage) {
        self.send(ProgressEvent {
            video_id: video_id.clone(),
            stage,
            percent: None,
        });
    }

    /// Report percent progress within a stage.
    pub fn percent(&self, video_id: &VideoId, stage: VideoStage, percent: f64) {
        self.send(ProgressEvent {
            video_id: video_id.clone(),
            stage,
            percent: Some(percent),
        });
    }

    fn send(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            tx.send(event).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (sender, mut rx) = ProgressSender::channel();
        let video_id = VideoId::parse("dQw4w9WgXcQ").unwrap();

        sender.stage(&video_id, VideoStage::Downloading);
        sender.percent(&video_id, VideoStage::Downloading, 50.0);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.stage, VideoStage::Downloading);
        assert_eq!(first.percent, None);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.percent, Some(50.0));
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_harmless() {
        let (sender, rx) = ProgressSender::channel();
        drop(rx);
        let video_id = VideoId::parse("dQw4w9WgXcQ").unwrap();
        sender.stage(&video_id, VideoStage::Queued);
    }

    #[test]
    fn test_disabled_sender() {
        let sender = ProgressSender::disabled();
        let video_id = VideoId::parse("dQw4w9WgXcQ").unwrap();
        sender.percent(&video_id, VideoStage::Downloading, 10.0);
    }
}
