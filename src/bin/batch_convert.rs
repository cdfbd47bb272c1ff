use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use glob::glob;
use rayon::prelude::*;
use tabload::{
    config::{LoadArgs, LoadConfig},
    export,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Convert every table matching a glob to Parquet")]
struct Args {
    /// Glob of input tables, e.g. 'data/**/*.csv'
    pattern: String,

    #[arg(long, default_value = "./parquet")]
    output_dir: PathBuf,

    #[command(flatten)]
    load: LoadArgs,
}

/// Where one input's Parquet file and mappings sidecar go.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Outputs {
    parquet: PathBuf,
    mappings: PathBuf,
}

/// Output paths for every input, named by file stem. Two inputs sharing a
/// stem would write the same files concurrently, so that is an error.
fn plan_outputs(inputs: &[PathBuf], output_dir: &Path) -> Result<Vec<Outputs>> {
    let mut seen: HashMap<String, &Path> = HashMap::new();
    let mut plan = Vec::with_capacity(inputs.len());
    for input in inputs {
        let stem = input
            .file_stem()
            .with_context(|| format!("{:?} has no file name", input))?
            .to_string_lossy()
            .into_owned();
        if let Some(first) = seen.insert(stem.clone(), input) {
            bail!(
                "{} and {} would both write {}.parquet",
                first.display(),
                input.display(),
                stem
            );
        }
        plan.push(Outputs {
            parquet: output_dir.join(format!("{}.parquet", stem)),
            mappings: output_dir.join(format!("{}.mappings.json", stem)),
        });
    }
    Ok(plan)
}

fn convert_one(cfg: &LoadConfig, input: &Path, outputs: &Outputs) -> Result<u64> {
    let loaded = cfg
        .load_path(input)
        .with_context(|| format!("loading {}", input.display()))?;
    export::write_loaded(&loaded, &outputs.parquet, Some(&outputs.mappings))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let cfg = args.load.resolve()?;
    fs::create_dir_all(&args.output_dir)?;

    let inputs: Vec<PathBuf> = glob(&args.pattern)
        .with_context(|| format!("Failed to read glob pattern '{}'", args.pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();
    if inputs.is_empty() {
        bail!("No tables found under '{}'", args.pattern);
    }
    let plan = plan_outputs(&inputs, &args.output_dir)?;
    info!(count = inputs.len(), "converting tables");

    let results: Vec<(PathBuf, Result<u64>)> = inputs
        .par_iter()
        .zip(plan.par_iter())
        .map(|(input, outputs)| (input.clone(), convert_one(&cfg, input, outputs)))
        .collect();

    let mut total_bytes = 0u64;
    let mut failed = 0usize;
    for (input, result) in results {
        match result {
            Ok(bytes) => {
                total_bytes += bytes;
                info!(file = %input.display(), bytes, "converted");
            }
            Err(e) => {
                failed += 1;
                error!(file = %input.display(), "conversion failed: {:#}", e);
            }
        }
    }

    info!(
        converted = inputs.len() - failed,
        failed, total_bytes, "batch finished"
    );
    if failed > 0 {
        bail!("{} of {} tables failed", failed, inputs.len());
    }
    Ok(())
}
