use colored::Colorize;
use scraper::{Html, Selector};

use crate::scraping::normalize_text::normalize_text;

/// Text of the first element matching a user-supplied selector.
pub fn extract_selector_price(document: &Html, selector: &str) -> Option<String> {
    if selector.is_empty() {
        return None;
    }

    let selector = match Selector::parse(selector) {
        Ok(selector) => selector,
        Err(e) => {
            eprintln!("{} {}: {:?}", "Invalid selector".yellow(), selector, e);
            return None;
        }
    };

    document
        .select(&selector)
        .next()
        .map(|element| normalize_text(&element.text().collect::<String>()))
        .filter(|text| !text.is_empty())
}
