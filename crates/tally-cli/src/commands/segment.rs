//! Segment command - show how a statement is split into batches.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use tally_core::document::load_text;
use tally_core::Segmenter;

use super::load_config;

/// Arguments for the segment command.
#[derive(Args)]
pub struct SegmentArgs {
    /// Statement file (PDF, CSV or text)
    #[arg(required = true)]
    input: PathBuf,

    /// Maximum transaction lines per segment (default: from config)
    #[arg(short, long)]
    max: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: SegmentFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum SegmentFormat {
    /// JSON array of segments
    Json,
    /// Human readable listing
    Text,
}

pub fn run(args: SegmentArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let text = load_text(&args.input)?;
    let max = args
        .max
        .unwrap_or(config.segmenter.max_transactions_per_segment);
    let segments = Segmenter::new(max).segment(&text);
    info!("{} split into {} segments", args.input.display(), segments.len());

    match args.format {
        SegmentFormat::Json => println!("{}", serde_json::to_string_pretty(&segments)?),
        SegmentFormat::Text => {
            for segment in &segments {
                println!(
                    "{} {}/{} ({} transaction lines, {} header lines)",
                    style("Segment").bold(),
                    segment.batch_number,
                    segment.total_batches,
                    segment.transaction_lines,
                    segment.header_lines
                );
                println!("{}", segment.text);
                println!();
            }
        }
    }

    Ok(())
}
