//! Connection modules (`cnc:` category): active reachability probes.

mod tcp;

pub use tcp::TcpConnector;
