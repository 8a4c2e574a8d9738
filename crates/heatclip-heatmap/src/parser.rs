//! Attention-curve parser.
//!
//! Turns the heat-map vector graphic into a flat, time-ordered list of
//! [`Sample`]s. The graphic is a row of horizontally offset chapter
//! groups, each containing a path outline whose `M` and `C` commands
//! trace the attention curve. Parsing never fails outward: malformed
//! input degrades to fewer (or zero) samples.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use heatclip_models::Sample;

/// Coordinate-space width the heat-map graphic declares in its viewBox.
pub const DECLARED_WIDTH: f64 = 1000.0;

/// Number of samples emitted per cubic segment (t = 0.0, 0.1, .., 1.0).
const BEZIER_STEPS: usize = 10;

fn translate_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"transform="translate\(\s*(-?[0-9.]+)\s*[, ]\s*(-?[0-9.]+)\s*\)""#)
            .expect("valid regex")
    })
}

fn path_data_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"\bd="([^"]*)""#).expect("valid regex"))
}

/// Parse the heat-map markup into time-ordered attention samples.
///
/// `duration` is the video's length in seconds and `declared_width` the
/// graphic's coordinate-space width (the x axis maps linearly onto the
/// video timeline). Returns an empty list when nothing can be parsed.
pub fn parse_attention_curve(markup: &str, duration: f64, declared_width: f64) -> Vec<Sample> {
    let raw = collect_raw_points(markup);
    if raw.is_empty() {
        warn!("No attention samples parsed from heatmap markup");
        return Vec::new();
    }

    let (min_y, max_y) = raw.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
        (lo.min(p.1), hi.max(p.1))
    });
    // Flat curves would otherwise divide by zero.
    let y_range = (max_y - min_y).max(1.0);

    let mut samples: Vec<Sample> = raw
        .into_iter()
        .map(|(x, y)| {
            let time = x / declared_width * duration;
            // Low attention sits visually lower on the graphic, hence
            // the inversion.
            let attention = (100.0 * (1.0 - (y - min_y) / y_range)).clamp(0.0, 100.0);
            Sample::new(time, attention)
        })
        .collect();

    samples.sort_by(|a, b| a.time.total_cmp(&b.time));

    debug!(samples = samples.len(), "Parsed attention curve");
    samples
}

/// Walk every group and path in the markup, collecting absolute
/// `(x, y)` points in graphic coordinates.
fn collect_raw_points(markup: &str) -> Vec<(f64, f64)> {
    let mut points = Vec::new();

    for (index, chunk) in markup.split("<g").enumerate() {
        // The chunk before the first group carries no transform.
        let offset = if index == 0 {
            0.0
        } else {
            group_offset(chunk)
        };

        for capture in path_data_pattern().captures_iter(chunk) {
            trace_path(&capture[1], offset, &mut points);
        }
    }

    points
}

/// Horizontal offset declared by a group's translate transform.
fn group_offset(chunk: &str) -> f64 {
    let head = chunk.split('>').next().unwrap_or("");
    translate_pattern()
        .captures(head)
        .and_then(|c| c[1].parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Execute a path's drawing commands, appending absolute points.
///
/// Only `M` (move) and `C` (cubic curve) matter for the attention
/// curve; other commands close the outline and are skipped. A command
/// with malformed numeric parameters is dropped without aborting the
/// rest of the path.
fn trace_path(data: &str, offset: f64, points: &mut Vec<(f64, f64)>) {
    let mut cursor: Option<(f64, f64)> = None;

    for (command, raw_params) in split_commands(data) {
        let params = match parse_params(raw_params) {
            Some(params) => params,
            None => {
                debug!(command = %command, "Skipping path command with malformed parameters");
                continue;
            }
        };

        match command {
            'M' => {
                if params.len() < 2 {
                    continue;
                }
                let (x, y) = (params[0], params[1]);
                points.push((offset + x, y));
                cursor = Some((x, y));
            }
            'C' => {
                let Some(start) = cursor else {
                    continue;
                };
                let mut current = start;
                for segment in params.chunks_exact(6) {
                    let p1 = (segment[0], segment[1]);
                    let p2 = (segment[2], segment[3]);
                    let p3 = (segment[4], segment[5]);
                    for step in 0..=BEZIER_STEPS {
                        let t = step as f64 / BEZIER_STEPS as f64;
                        let (x, y) = cubic_point(current, p1, p2, p3, t);
                        points.push((offset + x, y));
                    }
                    current = p3;
                }
                cursor = Some(current);
            }
            _ => {}
        }
    }
}

/// Split path data into `(command, parameter-string)` pairs.
fn split_commands(data: &str) -> Vec<(char, &str)> {
    let mut commands = Vec::new();
    let mut start = None;
    let mut command = ' ';

    for (i, c) in data.char_indices() {
        if c.is_ascii_alphabetic() {
            if let Some(s) = start {
                commands.push((command, &data[s..i]));
            }
            command = c;
            start = Some(i + c.len_utf8());
        }
    }
    if let Some(s) = start {
        commands.push((command, &data[s..]));
    }

    commands
}

/// Parse a command's parameter string into floats. Any malformed token
/// invalidates the whole command.
fn parse_params(raw: &str) -> Option<Vec<f64>> {
    raw.split([',', ' ', '\t', '\n'])
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<f64>().ok())
        .collect()
}

/// Evaluate the cubic Bézier blend at `t`.
fn cubic_point(
    p0: (f64, f64),
    p1: (f64, f64),
    p2: (f64, f64),
    p3: (f64, f64),
    t: f64,
) -> (f64, f64) {
    let u = 1.0 - t;
    let b0 = u * u * u;
    let b1 = 3.0 * u * u * t;
    let b2 = 3.0 * u * t * t;
    let b3 = t * t * t;
    (
        b0 * p0.0 + b1 * p1.0 + b2 * p2.0 + b3 * p3.0,
        b0 * p0.1 + b1 * p1.1 + b2 * p2.1 + b3 * p3.1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cubic_point_symmetry() {
        // Symmetric control polygon: y values mirror around t = 0.5.
        let p0 = (0.0, 0.0);
        let p1 = (0.0, 10.0);
        let p2 = (10.0, 10.0);
        let p3 = (10.0, 0.0);

        for step in 0..=10 {
            let t = step as f64 / 10.0;
            let (_, y) = cubic_point(p0, p1, p2, p3, t);
            let (_, y_mirror) = cubic_point(p0, p1, p2, p3, 1.0 - t);
            assert!((y - y_mirror).abs() < 1e-9, "asymmetric at t={}", t);

            // Closed-form cubic blend for the y coordinate.
            let u = 1.0 - t;
            let expected = 3.0 * u * u * t * 10.0 + 3.0 * u * t * t * 10.0;
            assert!((y - expected).abs() < 1e-9, "wrong blend at t={}", t);
        }
    }

    #[test]
    fn test_parse_single_group() {
        let markup = r#"<svg class="ytp-heat-map-svg" viewBox="0 0 1000 100">
            <g transform="translate(0, 0)">
                <path d="M 0.0,100.0 C 100.0,50.0 200.0,50.0 300.0,0.0"/>
            </g>
        </svg>"#;

        let samples = parse_attention_curve(markup, 100.0, 1000.0);
        // One move sample plus eleven curve samples.
        assert_eq!(samples.len(), 12);

        // y=100 is the visual bottom: lowest attention.
        assert!((samples[0].attention - 0.0).abs() < 1e-9);
        // Curve endpoint y=0 maps to full attention at x=300 -> t=30s.
        let last = samples.last().unwrap();
        assert!((last.time - 30.0).abs() < 1e-9);
        assert!((last.attention - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_group_offsets_shift_time() {
        let markup = concat!(
            r#"<g transform="translate(500, 0)">"#,
            r#"<path d="M 0.0,50.0 C 10.0,40.0 20.0,40.0 30.0,50.0"/>"#,
            "</g>",
        );

        let samples = parse_attention_curve(markup, 200.0, 1000.0);
        assert!(!samples.is_empty());
        // x=500 out of 1000 on a 200s video is t=100s.
        assert!((samples[0].time - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_command_is_skipped() {
        let markup = concat!(
            r#"<g transform="translate(0, 0)">"#,
            r#"<path d="M 0.0,80.0 C oops,50.0 200.0,50.0 300.0,20.0 M 400.0,10.0"/>"#,
            "</g>",
        );

        let samples = parse_attention_curve(markup, 100.0, 1000.0);
        // The bad cubic is dropped; both move samples survive.
        assert_eq!(samples.len(), 2);
        assert!((samples[0].time - 0.0).abs() < 1e-9);
        assert!((samples[1].time - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_markup() {
        assert!(parse_attention_curve("", 100.0, 1000.0).is_empty());
        assert!(parse_attention_curve("<svg></svg>", 100.0, 1000.0).is_empty());
    }

    #[test]
    fn test_flat_curve_does_not_divide_by_zero() {
        let markup = r#"<path d="M 0.0,50.0 C 10.0,50.0 20.0,50.0 30.0,50.0"/>"#;
        let samples = parse_attention_curve(markup, 100.0, 1000.0);
        assert!(!samples.is_empty());
        for sample in &samples {
            assert!(sample.attention.is_finite());
            assert!((0.0..=100.0).contains(&sample.attention));
        }
    }

    #[test]
    fn test_samples_sorted_by_time() {
        // Second group sits left of the first: output must still be
        // time ordered.
        let markup = concat!(
            r#"<g transform="translate(600, 0)">"#,
            r#"<path d="M 0.0,20.0 C 10.0,10.0 20.0,10.0 30.0,20.0"/>"#,
            "</g>",
            r#"<g transform="translate(100, 0)">"#,
            r#"<path d="M 0.0,80.0 C 10.0,70.0 20.0,70.0 30.0,80.0"/>"#,
            "</g>",
        );

        let samples = parse_attention_curve(markup, 100.0, 1000.0);
        for pair in samples.windows(2) {
            assert!(pair[0].time <= pair[1].time);
        }
    }
}
