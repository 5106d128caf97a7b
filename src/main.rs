use clap::Parser;
use msort::error::MsortError;
use msort::input::{format_rows, pad_to_power_of_two, read_items};
use msort::sort::submit_sort;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\nNAME\n\tmsort - sort a file of integers in non-decreasing order\n\nSYNOPSIS\n\tmsort [input_file]\n\nDESCRIPTION\n\tThe msort program sorts a file of up to 4096 whitespace-delimited\n\tintegers with a concurrent bottom-up merge sort, fanning the merge\n\toperations of each level out over a pool of worker threads.\n\nRETURN VALUE\n\tReturns 0 on success.\n";

#[derive(Parser)]
#[command(name = "msort")]
#[command(about = "Concurrent merge sort over a file of integers", long_about = None)]
struct Cli {
    /// Path to a whitespace-delimited file of integers
    input_file: Option<PathBuf>,
}

fn run(path: &PathBuf) -> Result<(), MsortError> {
    let mut items = read_items(path)?;
    let count = pad_to_power_of_two(&mut items);
    let padded = items.len();
    info!(count, padded, "input loaded");

    // Original sizing: one worker per level-zero merge operation.
    let handle = submit_sort(items, padded / 2)?;
    handle.wait_for_completion()?;
    let sorted = handle.read_sorted()?;
    info!("sort complete");

    print!("{}", format_rows(&sorted, count));
    Ok(())
}

fn main() -> ExitCode {
    // Logs go to stderr; stdout is reserved for the sorted rows.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(path) = cli.input_file else {
        println!("{}", USAGE);
        return ExitCode::FAILURE;
    };
    match run(&path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("msort: {}", e);
            ExitCode::FAILURE
        }
    }
}
