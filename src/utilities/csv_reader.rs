use std::collections::HashSet;

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use csv_async::{AsyncReader, AsyncReaderBuilder, StringRecord};
use futures::stream::StreamExt;
use tokio::fs::File as AsyncFile;
use tokio::io::BufReader;

use crate::models::UrlEntry;
use crate::scraping::normalize_text;

/// Sets up CSV file reading.
async fn setup_csv_reader(source_path: &str) -> Result<AsyncReader<BufReader<AsyncFile>>> {
    let file = AsyncFile::open(source_path)
        .await
        .with_context(|| format!("Failed to open URL list {}", source_path))?;
    let reader = BufReader::new(file);
    let csv_reader = AsyncReaderBuilder::new()
        .flexible(true)
        .create_reader(reader);

    Ok(csv_reader)
}

struct Columns {
    id: usize,
    url: usize,
    selector: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        Ok(Self {
            id: position("id").ok_or_else(|| anyhow!("URL list has no `id` column"))?,
            url: position("url").ok_or_else(|| anyhow!("URL list has no `url` column"))?,
            selector: position("selector"),
        })
    }

    fn field(record: &StringRecord, index: usize) -> String {
        normalize_text(record.get(index).unwrap_or_default())
    }
}

/// Reads the `id,url[,selector]` list.
///
/// Rows missing an id or url are skipped, as are bad records and repeated
/// ids (the first occurrence is kept).
pub async fn read_url_entries(source_path: &str) -> Result<Vec<UrlEntry>> {
    let mut csv_reader = setup_csv_reader(source_path).await?;

    let headers = csv_reader
        .headers()
        .await
        .context("Failed to read URL list header")?
        .clone();
    let columns = Columns::locate(&headers)?;

    let mut entries = Vec::new();
    let mut seen_ids = HashSet::new();
    let records: Vec<_> = csv_reader.records().collect().await;

    for record_result in records {
        let record = match record_result {
            Ok(record) => record,
            Err(e) => {
                eprintln!("{} {}", "Failed to read CSV record:".red(), e);
                continue;
            }
        };

        let entry = UrlEntry {
            id: Columns::field(&record, columns.id),
            url: Columns::field(&record, columns.url),
            selector: columns
                .selector
                .map(|index| Columns::field(&record, index))
                .unwrap_or_default(),
        };

        if entry.id.is_empty() || entry.url.is_empty() {
            continue;
        }

        if !seen_ids.insert(entry.id.clone()) {
            println!("{} {}", "Duplicate id skipped:".yellow(), entry.id);
            continue;
        }

        entries.push(entry);
    }

    Ok(entries)
}
