pub mod extract_common_price;
pub mod extract_jsonld_price;
pub mod extract_meta_price;
pub mod extract_price;
pub mod extract_selector_price;
pub mod normalize_text;

pub use extract_price::extract_price;
pub use normalize_text::normalize_text;
