//! Merge command - combine per-batch extraction results.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use glob::glob;
use tracing::debug;

use tally_core::statement::merge;
use tally_core::BatchResult;

/// Arguments for the merge command.
#[derive(Args)]
pub struct MergeArgs {
    /// Glob pattern of batch result JSON files, merged in path order
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: MergeArgs) -> anyhow::Result<()> {
    let mut files: Vec<PathBuf> = glob(&args.input)?.filter_map(|r| r.ok()).collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    let mut results = Vec::with_capacity(files.len());
    for path in &files {
        debug!("Reading batch result {}", path.display());
        let content = fs::read_to_string(path)?;
        let result: BatchResult = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
        results.push(result);
    }

    let merged = merge(results);
    let output = serde_json::to_string_pretty(&merged)?;

    match &args.output {
        Some(path) => fs::write(path, output)?,
        None => println!("{}", output),
    }

    Ok(())
}
