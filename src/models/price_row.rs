use chrono::Utc;
use serde::Serialize;

use crate::models::UrlEntry;

pub const CSV_HEADER: [&str; 5] = ["id", "price", "url", "ts_utc", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRow {
    pub id: String,
    pub price: String,
    pub url: String,
    pub ts_utc: String,
    pub error: String,
}

impl PriceRow {
    /// Row for a page that was fetched; `price` may be empty when no heuristic matched.
    pub fn success(entry: &UrlEntry, price: String) -> Self {
        Self {
            id: entry.id.clone(),
            price,
            url: entry.url.clone(),
            ts_utc: Utc::now().to_rfc3339(),
            error: String::new(),
        }
    }

    pub fn failure(entry: &UrlEntry, error: &anyhow::Error) -> Self {
        Self {
            id: entry.id.clone(),
            price: String::new(),
            url: entry.url.clone(),
            ts_utc: Utc::now().to_rfc3339(),
            error: single_line(&format!("{:#}", error)),
        }
    }

    pub fn as_record(&self) -> [&str; 5] {
        [&self.id, &self.price, &self.url, &self.ts_utc, &self.error]
    }
}

fn single_line(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use anyhow::Context;
    use chrono::DateTime;

    use super::*;

    fn entry() -> UrlEntry {
        UrlEntry {
            id: "sku-1".to_string(),
            url: "https://shop.example/p/1".to_string(),
            selector: String::new(),
        }
    }

    #[test]
    fn success_row_has_empty_error_and_utc_timestamp() {
        let row = PriceRow::success(&entry(), "R$ 19,90".to_string());

        assert_eq!(row.id, "sku-1");
        assert_eq!(row.price, "R$ 19,90");
        assert!(row.error.is_empty());
        let ts = DateTime::parse_from_rfc3339(&row.ts_utc).unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 0);
    }

    #[test]
    fn failure_row_keeps_the_whole_error_chain_on_one_line() {
        let error = Err::<(), _>(anyhow::anyhow!("connection reset\nby peer"))
            .context("Failed to fetch https://shop.example/p/1")
            .unwrap_err();

        let row = PriceRow::failure(&entry(), &error);

        assert!(row.price.is_empty());
        assert_eq!(
            row.error,
            "Failed to fetch https://shop.example/p/1: connection reset by peer"
        );
    }
}
