//! Attention heatmap analysis.
//!
//! This crate provides:
//! - Heat-map markup retrieval from the watch page
//! - Attention-curve parsing into time-ordered samples
//! - One-second binning with forward fill
//! - Threshold-based clip detection with merge and ranking

pub mod binner;
pub mod detector;
pub mod error;
pub mod fetch;
pub mod parser;

pub use binner::bin_samples;
pub use detector::{attention_threshold, detect_clips, DetectorConfig};
pub use error::{HeatmapError, HeatmapResult};
pub use fetch::HeatmapClient;
pub use parser::{parse_attention_curve, DECLARED_WIDTH};

use heatclip_models::Clip;

/// Run the full analysis chain over raw heat-map markup.
///
/// Parses the attention curve, resamples it into one-second bins over
/// `duration` seconds, and detects ranked clips. Unparseable markup
/// degrades to an empty clip list.
pub fn analyze_heatmap(markup: &str, duration: u32, config: &DetectorConfig) -> Vec<Clip> {
    let samples = parse_attention_curve(markup, duration as f64, DECLARED_WIDTH);
    if samples.is_empty() {
        return Vec::new();
    }
    let bins = bin_samples(&samples, duration);
    detect_clips(&bins, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A markup-to-clips run: one spiky chapter group on an otherwise
    /// flat curve must produce exactly one ranked clip.
    #[test]
    fn test_analyze_heatmap_end_to_end() {
        // 1000-wide graphic over a 1000s video: x maps 1:1 to seconds.
        // Flat stretch near the bottom (y=90), one dip to the top
        // (y=10, high attention) between x=400 and x=440.
        let markup = concat!(
            r#"<svg class="ytp-heat-map-svg" viewBox="0 0 1000 100">"#,
            r#"<g transform="translate(0, 0)">"#,
            r#"<path d="M 0.0,90.0 C 130.0,90.0 270.0,90.0 400.0,90.0"/>"#,
            "</g>",
            r#"<g transform="translate(400, 0)">"#,
            r#"<path d="M 0.0,90.0 C 13.0,10.0 27.0,10.0 40.0,90.0"/>"#,
            "</g>",
            r#"<g transform="translate(440, 0)">"#,
            r#"<path d="M 0.0,90.0 C 190.0,90.0 370.0,90.0 560.0,90.0"/>"#,
            "</g>",
            "</svg>",
        );

        let clips = analyze_heatmap(markup, 1000, &DetectorConfig::default());

        assert_eq!(clips.len(), 1);
        let clip = clips[0];
        // The spike sits around x=400..440; lookback pulls the start a
        // little earlier.
        assert!(clip.start >= 390.0 && clip.start <= 405.0, "start={}", clip.start);
        assert!(clip.end > clip.start);
        assert!(clip.average_attention > 50.0);
    }

    #[test]
    fn test_analyze_heatmap_empty_markup() {
        let clips = analyze_heatmap("", 600, &DetectorConfig::default());
        assert!(clips.is_empty());
    }
}
