//! Collection modules (`clc:` category): enrich a value by talking to the
//! network. Faults surface as `Err` and are degraded by the chain resolver.

mod dns;
mod web;

pub use dns::DnsCollector;
pub use web::WebCollector;
