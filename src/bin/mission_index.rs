use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use mission_path_rs::mission_index::build_index;

#[derive(Parser, Debug)]
#[command(name = "mission_index")]
#[command(about = "Scan a data directory for mission folders and emit a sorted missions.json", long_about = None)]
struct Args {
    /// Directory containing one folder per mission
    #[arg(long)]
    data_dir: PathBuf,

    /// Manifest output path
    #[arg(long, default_value = "missions.json")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let missions = build_index(&args.data_dir)?;

    let json = serde_json::to_string_pretty(&missions)?;
    std::fs::write(&args.output, json)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Generated {} with {} missions",
        args.output.display(),
        missions.len()
    );
    Ok(())
}
