/// One line of the URL list, already whitespace-normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    pub id: String,
    pub url: String,
    /// CSS selector probed before the generic heuristics; empty when unset.
    pub selector: String,
}
