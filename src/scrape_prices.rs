use colored::Colorize;
use futures::{stream, StreamExt};
use reqwest::Client;

use crate::config::AppConfig;
use crate::models::{PriceRow, UrlEntry};
use crate::scraping::extract_price;
use crate::utilities::fetch_page::fetch_page;
use crate::utilities::generate_random_delay::generate_random_delay;

/// Fetches and prices every entry with at most `base.max_concurrency`
/// requests in flight. Rows come back in input order.
pub async fn scrape_prices(client: &Client, entries: Vec<UrlEntry>, config: &AppConfig) -> Vec<PriceRow> {
    let max_concurrency = config.base.max_concurrency.max(1);

    stream::iter(entries)
        .map(|entry| process_entry(client, entry, config))
        .buffered(max_concurrency)
        .collect()
        .await
}

async fn process_entry(client: &Client, entry: UrlEntry, config: &AppConfig) -> PriceRow {
    let row = match fetch_page(client, &entry.url, &config.http).await {
        Ok(html) => {
            let price = extract_price(&html, &entry.selector);
            if price.is_empty() {
                println!("{} {} {}", "No price found:".yellow(), entry.id, entry.url);
            } else {
                println!("{} {} = {}", "Price:".green(), entry.id, price);
            }
            PriceRow::success(&entry, price)
        }
        Err(e) => {
            eprintln!("{} {}: {:#}", "Failed:".red(), entry.id, e);
            PriceRow::failure(&entry, &e)
        }
    };

    generate_random_delay(config.delay.min_delay, config.delay.max_delay).await;

    row
}
