use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "reduce_log")]
#[command(about = "Keep every Nth row of a telemetry CSV to shrink it for sharing", long_about = None)]
struct Args {
    /// Input telemetry CSV
    #[arg(long)]
    input: PathBuf,

    /// Reduced output CSV (default: <input stem>_reduced.csv)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Keep every Nth row
    #[arg(long, default_value = "10")]
    stride: usize,

    /// Overwrite the output file if it already exists
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    anyhow::ensure!(args.stride >= 1, "stride must be at least 1");

    let output = args.output.clone().unwrap_or_else(|| {
        let stem = args
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "telemetry".to_string());
        args.input.with_file_name(format!("{}_reduced.csv", stem))
    });
    if output.exists() && !args.force {
        anyhow::bail!("{} already exists (use --force to overwrite)", output.display());
    }

    let input = File::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(input);
    let headers = reader.headers()?.clone();

    let mut writer = csv::Writer::from_path(&output)
        .with_context(|| format!("writing {}", output.display()))?;
    writer.write_record(&headers)?;

    let mut total = 0usize;
    let mut kept = 0usize;
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        total += 1;
        if index % args.stride == 0 {
            writer.write_record(&record)?;
            kept += 1;
        }
    }
    writer.flush()?;

    println!(
        "Successfully reduced data from {} to {} rows ({})",
        total,
        kept,
        output.display()
    );
    Ok(())
}
