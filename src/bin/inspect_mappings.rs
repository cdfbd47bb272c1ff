use std::path::PathBuf;

use clap::Parser;
use tabload::{export::read_mappings, Datatype, Policy};

#[derive(Parser)]
#[command(author, version, about = "Print the dimension mappings saved next to a matrix")]
struct Args {
    /// JSON written by `tabload --mappings` or `batch_convert`
    path: PathBuf,

    /// Only show categorical dimensions
    #[arg(long)]
    categorical_only: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mapper = read_mappings::<Policy>(&args.path)?;

    println!("dimension,datatype,code,token");
    for (dim, state) in mapper.dimensions().iter().enumerate() {
        let datatype = state.datatype();
        if args.categorical_only && datatype != Datatype::Categorical {
            continue;
        }
        if state.num_mappings() == 0 {
            println!("{},{},,", dim, datatype.as_str());
            continue;
        }
        for (code, token) in state.tokens().enumerate() {
            println!("{},{},{},{}", dim, datatype.as_str(), code, token);
        }
    }

    Ok(())
}
