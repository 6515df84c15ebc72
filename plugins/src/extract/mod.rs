//! Extraction modules (`ext:` category): pull structured values out of
//! free text with no network access.

mod domain;
mod email;
mod ip;
mod url;

pub use domain::DomainExtractor;
pub use email::EmailExtractor;
pub use ip::IpExtractor;
pub use url::UrlExtractor;

/// First-occurrence dedup shared by all extractors.
fn dedup(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values.into_iter().filter(|v| seen.insert(v.clone())).collect()
}
