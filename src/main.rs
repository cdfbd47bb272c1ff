use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tabload::{config::LoadArgs, export, Datatype};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Load a delimited table into a numeric matrix with categorical codes"
)]
struct Args {
    /// Table to load (.csv, .tsv, .txt, or a .zip holding a .csv)
    input: PathBuf,

    /// Write the matrix here as Parquet
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the dimension mappings here as JSON
    #[arg(long)]
    mappings: Option<PathBuf>,

    #[command(flatten)]
    load: LoadArgs,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();
    let cfg = args.load.resolve()?;
    let loaded = cfg.load_path(&args.input)?;

    let (rows, cols) = loaded.matrix.dim();
    info!(rows, cols, orientation = %loaded.orientation, "matrix ready");
    for (dim, state) in loaded.mapper.dimensions().iter().enumerate() {
        if state.datatype() == Datatype::Categorical {
            info!(dim, categories = state.num_mappings(), "categorical dimension");
        }
    }

    match &args.output {
        Some(out) => {
            let bytes = export::write_loaded(&loaded, out, args.mappings.as_deref())?;
            info!(path = %out.display(), bytes, "wrote parquet");
        }
        None => {
            if let Some(path) = &args.mappings {
                export::write_mappings(&loaded.mapper, path)?;
            }
            println!("{}", loaded.matrix);
        }
    }
    Ok(())
}
