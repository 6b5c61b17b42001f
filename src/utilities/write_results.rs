use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;

use crate::models::price_row::{PriceRow, CSV_HEADER};

const CSV_FILE: &str = "latest_prices.csv";
const JSON_FILE: &str = "latest_prices.json";

/// Writes `latest_prices.csv` and `latest_prices.json` into `output_dir`,
/// replacing the previous run. Returns the CSV and JSON paths.
pub fn write_results(rows: &[PriceRow], output_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let csv_path = output_dir.join(CSV_FILE);
    write_csv(rows, &csv_path)?;

    let json_path = output_dir.join(JSON_FILE);
    write_json(rows, &json_path)?;

    Ok((csv_path, json_path))
}

fn write_csv(rows: &[PriceRow], path: &Path) -> Result<()> {
    // Header written by hand so an empty run still yields a valid file.
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.write_record(row.as_record())?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

fn write_json(rows: &[PriceRow], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(rows).context("Failed to serialize rows")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}
