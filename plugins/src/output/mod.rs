//! Output modules (`out:` category): reshape values for downstream tools.
//! Typically the last stage of a chain.

mod csv;
mod json;

pub use csv::CsvFormatter;
pub use json::JsonFormatter;
