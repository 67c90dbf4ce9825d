use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use taxcalc_core::TaxTable;
use taxcalc_data::TaxTableLoader;

/// Convert a CSV bracket file into the JSON tax-table format.
///
/// The CSV file should have the following columns:
/// - tax_year: The tax year (e.g., 2023)
/// - jurisdiction: `federal` or a two-letter state key
/// - name: The state's name (empty for federal rows)
/// - tax_type: `graduated`, `flat` or `none` (state rows only)
/// - filing_status: `single` or `married`
/// - rate: The bracket rate as a decimal (e.g., 0.10)
/// - lower: The bracket floor
/// - upper: The bracket ceiling (empty for unlimited)
#[derive(Parser, Debug)]
#[command(name = "taxcalc-convert")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing tax bracket data
    #[arg(short, long)]
    file: PathBuf,

    /// Where to write the JSON tables (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    eprintln!("Reading tax brackets from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = TaxTableLoader::parse_csv(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    eprintln!("Parsed {} records from CSV", records.len());

    let tables = TaxTableLoader::assemble(&records)
        .with_context(|| format!("Invalid bracket data in: {}", args.file.display()))?;
    let json = TaxTableLoader::to_json(&tables).context("Failed to serialize tax tables")?;

    match &args.output {
        Some(path) => {
            let mut out = File::create(path)
                .with_context(|| format!("Failed to create: {}", path.display()))?;
            writeln!(out, "{json}").with_context(|| format!("Failed to write: {}", path.display()))?;
            eprintln!(
                "Successfully wrote {} tax tables ({} brackets) to {}.",
                tables.len(),
                tables.iter().map(TaxTable::bracket_count).sum::<usize>(),
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}
