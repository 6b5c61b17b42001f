use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::scraping::normalize_text::normalize_text;

static META_PRICE_TAGS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        r#"meta[property="product:price:amount"]"#,
        r#"meta[itemprop="price"]"#,
        r#"meta[name="og:price:amount"]"#,
        r#"meta[property="og:price:amount"]"#,
        r#"meta[name="twitter:data1"]"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("valid meta selector"))
    .collect()
});

/// Price from the first known meta tag whose `content` holds a digit.
pub fn extract_meta_price(document: &Html) -> Option<String> {
    META_PRICE_TAGS.iter().find_map(|selector| {
        document
            .select(selector)
            .next()
            .and_then(|tag| tag.value().attr("content"))
            .filter(|content| content.chars().any(|c| c.is_ascii_digit()))
            .map(normalize_text)
    })
}
