//! Clip detection over the binned attention timeline.
//!
//! A single forward scan opens a candidate when attention climbs above
//! the threshold, widens it with lookback/lookahead windows (viewer
//! attention rises and falls gradually around a genuinely interesting
//! moment), and closes it only on a sustained fall so momentary dips do
//! not fragment one engaging segment into many tiny clips.

use tracing::debug;

use heatclip_models::{BinnedPoint, Clip};

/// Tunable constants for the detector.
///
/// The defaults reproduce the observed production behavior; none of
/// them have a recorded tuning rationale beyond that.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Threshold is the series mean times this multiplier.
    pub threshold_multiplier: f64,

    /// Seconds to look back when opening a candidate, capturing the
    /// rise leading into the peak.
    pub lookback_secs: usize,

    /// Seconds to look ahead when closing a candidate, capturing the
    /// tail of the fall.
    pub lookahead_secs: usize,

    /// A fall only closes a candidate when this many consecutive
    /// points (including the current one) sit at or below threshold.
    pub sustained_fall_points: usize,

    /// Fixed buffer appended to a candidate's end at close time, and
    /// again at emission time (see module note on compounding).
    pub end_buffer_secs: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold_multiplier: 1.15,
            lookback_secs: 5,
            lookahead_secs: 5,
            sustained_fall_points: 3,
            end_buffer_secs: 60.0,
        }
    }
}

/// An open or closed candidate interval during the scan.
#[derive(Debug, Clone)]
struct Candidate {
    start: f64,
    end: f64,
    peak: f64,
    points: Vec<f64>,
}

/// Detection threshold for a binned series: mean attention times the
/// configured multiplier.
pub fn attention_threshold(points: &[BinnedPoint], config: &DetectorConfig) -> f64 {
    mean_attention(points) * config.threshold_multiplier
}

fn mean_attention(points: &[BinnedPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    points.iter().map(|p| p.attention).sum::<f64>() / points.len() as f64
}

/// Scan the binned series for sustained high-attention intervals and
/// rank them by average attention, descending.
///
/// Malformed or empty input yields an empty list; the detector never
/// fails outward.
pub fn detect_clips(points: &[BinnedPoint], config: &DetectorConfig) -> Vec<Clip> {
    if points.is_empty() {
        return Vec::new();
    }

    let threshold = attention_threshold(points, config);
    let last = points.len() - 1;

    let mut candidates: Vec<Candidate> = Vec::new();
    let mut open: Option<Candidate> = None;

    for i in 0..points.len() {
        let attention = points[i].attention;

        if attention > threshold {
            match open.as_mut() {
                None => {
                    let start_idx = i.saturating_sub(config.lookback_secs);
                    open = Some(Candidate {
                        start: points[start_idx].second as f64,
                        end: points[i].second as f64,
                        peak: attention,
                        points: vec![attention],
                    });
                }
                Some(candidate) => {
                    candidate.end = points[i].second as f64;
                    if attention > candidate.peak {
                        candidate.peak = attention;
                    }
                    candidate.points.push(attention);
                }
            }
        } else if open.is_some() {
            let window_end = (i + config.sustained_fall_points).min(points.len());
            let sustained = points[i..window_end]
                .iter()
                .all(|p| p.attention <= threshold);

            if sustained {
                let mut closed = open.take().expect("candidate is open");
                let end_idx = (i + config.lookahead_secs).min(last);
                closed.end = points[end_idx].second as f64 + config.end_buffer_secs;
                candidates.push(closed);
            } else if let Some(candidate) = open.as_mut() {
                // Brief dip inside a single clip: absorb it as noise.
                candidate.points.push(attention);
            }
        }
    }

    if let Some(mut candidate) = open.take() {
        candidate.end += config.end_buffer_secs;
        candidates.push(candidate);
    }

    let merged = merge_candidates(candidates);

    let mut clips: Vec<Clip> = merged
        .into_iter()
        .map(|c| {
            let average = c.points.iter().sum::<f64>() / c.points.len().max(1) as f64;
            // Note: the end buffer was already applied at close time;
            // applying it again here compounds to +120s on clips closed
            // mid-scan. Preserved as the observed production behavior.
            Clip::new(
                c.start,
                c.end + config.end_buffer_secs,
                round2(average),
            )
        })
        .collect();

    clips.sort_by(|a, b| b.average_attention.total_cmp(&a.average_attention));

    debug!(
        threshold = threshold,
        clips = clips.len(),
        "Detected attention clips"
    );
    clips
}

/// Merge overlapping candidates left to right.
///
/// Candidates are sorted by start; a candidate folds into its
/// predecessor when its start does not pass the predecessor's end.
/// This removes the overlaps the lookback/lookahead windows create.
fn merge_candidates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match merged.last_mut() {
            Some(previous) if candidate.start <= previous.end => {
                previous.end = previous.end.max(candidate.end);
                previous.peak = previous.peak.max(candidate.peak);
                previous.points.extend(candidate.points);
            }
            _ => merged.push(candidate),
        }
    }

    merged
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
