use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde_json::{Map, Value};

use crate::scraping::normalize_text::normalize_text;

static LD_JSON: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script[type='application/ld+json']").expect("valid ld+json selector")
});

/// Offer price from the first JSON-LD block that carries one.
///
/// Looks at `offers.price`, `offers.priceSpecification.price` (for a single
/// offer or each offer of a list) and finally the object's own `price`.
/// Objects nested in an `@graph` array are searched as well.
pub fn extract_jsonld_price(document: &Html) -> Option<String> {
    document.select(&LD_JSON).find_map(|element| {
        let script_content = element.text().collect::<String>();
        let data: Value = serde_json::from_str(&script_content).ok()?;

        candidate_objects(&data)
            .into_iter()
            .find_map(object_price)
    })
}

fn candidate_objects(data: &Value) -> Vec<&Map<String, Value>> {
    let roots: Vec<&Value> = match data {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut objects = Vec::new();
    for root in roots {
        if let Value::Object(obj) = root {
            objects.push(obj);
            if let Some(Value::Array(graph)) = obj.get("@graph") {
                objects.extend(graph.iter().filter_map(Value::as_object));
            }
        }
    }
    objects
}

fn object_price(obj: &Map<String, Value>) -> Option<String> {
    let from_offers = match obj.get("offers") {
        Some(Value::Object(offer)) => offer_price(offer),
        Some(Value::Array(offers)) => offers
            .iter()
            .filter_map(Value::as_object)
            .find_map(offer_price),
        _ => None,
    };

    from_offers.or_else(|| obj.get("price").and_then(price_text))
}

fn offer_price(offer: &Map<String, Value>) -> Option<String> {
    offer.get("price").and_then(price_text).or_else(|| {
        offer
            .get("priceSpecification")
            .and_then(|spec| spec.get("price"))
            .and_then(price_text)
    })
}

// Zero, empty strings, null and booleans are not prices.
fn price_text(value: &Value) -> Option<String> {
    let raw = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.as_f64() == Some(0.0) => return None,
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let text = normalize_text(&raw);
    (!text.is_empty()).then_some(text)
}
