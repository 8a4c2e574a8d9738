//! Bulk processing binary.
//!
//! Usage: `heatclip <source>... [--output DIR]` where a source is a
//! video ID, watch URL, playlist URL, channel URL, or an `@file` whose
//! lines are sources.

use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use heatclip_pipeline::{BulkProcessor, PipelineConfig, ProgressSender};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::from_default_env()
        .add_directive("heatclip=info".parse().expect("valid directive"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(true)
                .with_target(true)
                .with_file(false)
                .with_line_number(false),
        )
        .with(env_filter)
        .init();

    let (sources, output_dir) = parse_args(std::env::args().skip(1))?;
    if sources.is_empty() {
        bail!("no sources given; pass video IDs, URLs, or @file");
    }

    let config = PipelineConfig::from_env();
    info!(config = ?config, "Loaded configuration");

    let (progress, mut progress_rx) = ProgressSender::channel();
    let progress_task = tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            if let Some(percent) = event.percent {
                info!(
                    video_id = %event.video_id,
                    stage = %event.stage,
                    percent = format!("{:.1}", percent),
                    "Progress"
                );
            }
        }
    });

    let processor = BulkProcessor::with_progress(config, progress);
    let report = processor.process_sources(&sources, &output_dir).await?;

    progress_task.abort();

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serializing report")?
    );

    if report.success_count == 0 && report.total_processed > 0 {
        bail!("every video failed");
    }
    Ok(())
}

/// Split argv into sources and the output directory, expanding `@file`
/// entries into one source per non-empty line.
fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<(Vec<String>, PathBuf)> {
    let mut sources = Vec::new();
    let mut output_dir = PathBuf::from("output");

    while let Some(arg) = args.next() {
        if arg == "--output" || arg == "-o" {
            let dir = args
                .next()
                .context("--output requires a directory argument")?;
            output_dir = PathBuf::from(dir);
        } else if let Some(file) = arg.strip_prefix('@') {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("reading source file {}", file))?;
            sources.extend(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(String::from),
            );
        } else {
            sources.push(arg);
        }
    }

    Ok((sources, output_dir))
}
