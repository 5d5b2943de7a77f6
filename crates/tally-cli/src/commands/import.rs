//! Import command - extract transactions from a statement and flag duplicates.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use tally_core::document::load_text;
use tally_core::{
    BatchExtractor, ExistingRecords, ImportPipeline, ImportPreview, SuggestedAction, TallyConfig,
};
use tally_extract::{FixtureExtractor, LlmExtractor};

use super::load_config;

/// Arguments for the import command.
#[derive(Args)]
pub struct ImportArgs {
    /// Statement file (PDF, CSV or text)
    #[arg(required = true)]
    input: PathBuf,

    /// JSON file with the user's existing expenses and incomes
    #[arg(short, long)]
    existing: Option<PathBuf>,

    /// Replay batch results from batch-N.json files instead of calling the model
    #[arg(long)]
    fixtures: Option<PathBuf>,

    /// Maximum transaction lines per batch (default: from config)
    #[arg(short, long)]
    max: Option<usize>,

    /// Number of batches extracted concurrently (default: from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ImportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(max) = args.max {
        config.segmenter.max_transactions_per_segment = max;
    }
    if let Some(jobs) = args.jobs {
        config.extraction.concurrency = jobs;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let text = load_text(&args.input)?;
    let existing = match &args.existing {
        Some(path) => ExistingRecords::from_file(path)?,
        None => ExistingRecords::default(),
    };
    info!(
        "Importing {} against {} existing expenses and {} incomes",
        args.input.display(),
        existing.expenses.len(),
        existing.incomes.len()
    );

    let preview = match &args.fixtures {
        Some(dir) => import_with(FixtureExtractor::from_dir(dir), &config, &text, &existing).await?,
        None => {
            let extractor = LlmExtractor::from_config(&config.extraction)?;
            import_with(extractor, &config, &text, &existing).await?
        }
    };

    let output = format_preview(&preview, args.format)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total import time: {:?}", start.elapsed());

    Ok(())
}

async fn import_with<E: BatchExtractor>(
    extractor: E,
    config: &TallyConfig,
    text: &str,
    existing: &ExistingRecords,
) -> anyhow::Result<ImportPreview> {
    let pipeline = ImportPipeline::from_config(extractor, config);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches")?
            .progress_chars("=>-"),
    );

    let result = pipeline
        .run_with_progress(text, existing, |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        })
        .await;

    match result {
        Ok(preview) => {
            pb.finish_and_clear();
            Ok(preview)
        }
        Err(e) => {
            pb.abandon();
            Err(e.into())
        }
    }
}

fn format_preview(preview: &ImportPreview, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(preview)?),
        OutputFormat::Csv => format_csv(preview),
        OutputFormat::Text => Ok(format_text(preview)),
    }
}

fn format_csv(preview: &ImportPreview) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date",
        "description",
        "amount",
        "type",
        "category",
        "is_recurring",
        "merchant_name",
        "is_duplicate",
        "suggested_action",
    ])?;

    for annotated in &preview.transactions {
        let t = &annotated.transaction;
        wtr.write_record([
            t.date.to_string(),
            t.description.clone(),
            t.amount.to_string(),
            t.kind.as_str().to_string(),
            t.category.clone(),
            t.is_recurring.to_string(),
            t.merchant_name.clone().unwrap_or_default(),
            annotated.is_duplicate.to_string(),
            action_str(annotated.suggested_action).to_string(),
        ])?;
    }

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(preview: &ImportPreview) -> String {
    let summary = &preview.summary;
    let mut output = String::new();

    output.push_str(&format!(
        "Statement: {} to {}\n",
        summary.date_range.start, summary.date_range.end
    ));
    output.push_str(&format!("Batches: {}\n", preview.batches_processed));
    output.push_str(&format!(
        "Transactions: {} ({} duplicates)\n",
        summary.transaction_count,
        preview.duplicate_count()
    ));
    output.push_str(&format!("Income:   {}\n", summary.total_income));
    output.push_str(&format!("Expenses: {}\n", summary.total_expenses));
    output.push('\n');

    for annotated in &preview.transactions {
        let t = &annotated.transaction;
        let marker = if annotated.is_duplicate { "dup" } else { "   " };
        output.push_str(&format!(
            "{} {} {:<7} {:>10} {:<14} {}\n",
            marker,
            t.date,
            t.kind.as_str(),
            t.amount,
            t.category,
            t.description
        ));
    }

    output
}

fn action_str(action: SuggestedAction) -> &'static str {
    match action {
        SuggestedAction::Import => "import",
        SuggestedAction::Skip => "skip",
    }
}
