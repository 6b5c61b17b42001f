use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::scraping::normalize_text::normalize_text;

fn selectors(list: &[&str]) -> Vec<Selector> {
    list.iter()
        .map(|s| Selector::parse(s).expect("valid marketplace selector"))
        .collect()
}

// Mercado Livre
static ANDES_FRACTION: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        "span.andes-money-amount__fraction",
        ".ui-pdp-price__second-line .andes-money-amount__fraction",
        ".andes-money-amount__fraction",
    ])
});

static ANDES_CENTS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("span.andes-money-amount__cents").expect("valid cents selector")
});

// Shopee, only present when the page was server-rendered
static SHOPEE_PRICE: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    selectors(&[
        "div[class*='product-price__current-price']",
        "div[data-sqe='price'] span",
        "div[class*='pmmxKc']",
    ])
});

static BRL_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"R\$\s*\d{1,3}(?:\.\d{3})*,\d{2}").expect("valid BRL amount pattern")
});

const HIDDEN_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Marketplace-specific probes, then the first `R$ 1.234,56` amount in the visible text.
pub fn extract_common_price(document: &Html) -> Option<String> {
    mercado_livre_price(document)
        .or_else(|| first_text(document, &SHOPEE_PRICE))
        .or_else(|| {
            BRL_AMOUNT
                .find(&visible_text(document))
                .map(|amount| normalize_text(amount.as_str()))
        })
}

fn mercado_livre_price(document: &Html) -> Option<String> {
    let fraction = first_text(document, &ANDES_FRACTION)?;

    let cents = document
        .select(&ANDES_CENTS)
        .next()
        .map(element_text)
        .filter(|cents| !cents.is_empty() && cents.chars().all(|c| c.is_ascii_digit()));

    Some(match cents {
        Some(cents) => format!("R$ {},{}", fraction, cents),
        None => fraction,
    })
}

fn first_text(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        document
            .select(selector)
            .next()
            .map(element_text)
            .filter(|text| !text.is_empty())
    })
}

fn element_text(element: ElementRef) -> String {
    normalize_text(&element.text().collect::<String>())
}

/// Text nodes outside scripts and styles, each trimmed, joined by single spaces.
fn visible_text(document: &Html) -> String {
    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|element| HIDDEN_TAGS.contains(&element.name()))
            });
            (!hidden).then(|| text.trim())
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
