pub mod price_row;
pub mod url_entry;

pub use price_row::PriceRow;
pub use url_entry::UrlEntry;
