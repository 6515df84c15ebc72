use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;

use skein_core::module::{ModuleOptions, ModulePlugin};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_PORT: u16 = 80;

/// TCP connect probe. Input is `host` or `host:port`; output is one line,
/// `host:port open` or `host:port closed`.
pub struct TcpConnector;

#[async_trait]
impl ModulePlugin for TcpConnector {
    fn name(&self) -> &str {
        "tcp"
    }

    fn category(&self) -> &str {
        "cnc"
    }

    fn description(&self) -> &str {
        "tcp connect probe, reports open or closed"
    }

    async fn run(&self, opts: &ModuleOptions) -> anyhow::Result<Vec<String>> {
        let raw = opts.data.trim();
        if raw.is_empty() {
            return Ok(vec![]);
        }
        let target = if raw.contains(':') {
            raw.to_string()
        } else {
            format!("{raw}:{DEFAULT_PORT}")
        };

        let verdict = match tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(&target)).await
        {
            Ok(Ok(_)) => "open",
            // Refused, unreachable and timed out all read as closed.
            _ => "closed",
        };
        Ok(vec![format!("{target} {verdict}")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn reports_open_for_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let out = TcpConnector
            .run(&ModuleOptions::new(addr.to_string()))
            .await
            .unwrap();
        assert_eq!(out, vec![format!("{addr} open")]);
    }

    #[tokio::test]
    async fn reports_closed_for_unbound_port() {
        // Bind then drop to get a port that is very likely free.
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let out = TcpConnector
            .run(&ModuleOptions::new(addr.to_string()))
            .await
            .unwrap();
        assert_eq!(out, vec![format!("{addr} closed")]);
    }
}
