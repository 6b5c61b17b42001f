use scraper::Html;

use crate::scraping::extract_common_price::extract_common_price;
use crate::scraping::extract_jsonld_price::extract_jsonld_price;
use crate::scraping::extract_meta_price::extract_meta_price;
use crate::scraping::extract_selector_price::extract_selector_price;

/// Runs the heuristics from most to least reliable and returns the first
/// price found, or an empty string.
///
/// The per-URL `selector` wins over everything else when it matches.
pub fn extract_price(html_content: &str, selector: &str) -> String {
    let document = Html::parse_document(html_content);

    extract_selector_price(&document, selector)
        .or_else(|| extract_jsonld_price(&document))
        .or_else(|| extract_meta_price(&document))
        .or_else(|| extract_common_price(&document))
        .unwrap_or_default()
}
