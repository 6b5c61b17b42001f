use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::scrape_prices::scrape_prices;
use crate::utilities::csv_reader::read_url_entries;
use crate::utilities::fetch_page::build_client;
use crate::utilities::write_results::write_results;

mod config;
mod models;
mod scrape_prices;
mod scraping;
mod utilities;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration settings
    let config = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{} {}", "Failed to load configuration:".red(), e);
            return Err(e.into());
        }
    };

    let entries = read_url_entries(&config.file.source_data).await?;
    println!(
        "{}: {} URL(s) read from {}",
        config.base.name,
        entries.len(),
        config.file.source_data
    );

    let client = build_client(&config.http)?;
    let rows = scrape_prices(&client, entries, &config).await;

    let output_dir = Path::new(&config.file.output_dir);
    write_results(&rows, output_dir).context("Failed to write results")?;

    let priced = rows.iter().filter(|row| !row.price.is_empty()).count();
    let failed = rows.iter().filter(|row| !row.error.is_empty()).count();
    println!(
        "{} {} rows written to {}/latest_prices.* ({} priced, {} failed)",
        "[ok]".green(),
        rows.len(),
        output_dir.display(),
        priced,
        failed
    );

    Ok(())
}
