//! Input sources: a file of lines, a single literal string, or piped stdin.
//!
//! Exactly one source is active per run. Piped data is probed first, but
//! explicit file/string flags override it.

use std::path::PathBuf;

use tokio::io::AsyncReadExt;

use crate::engine::WorkItem;
use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Literal(String),
    Stdin,
}

impl InputSource {
    /// Resolve which source is active. `stdin_is_piped` comes from a
    /// non-blocking TTY probe done by the caller.
    pub fn detect(
        file: Option<PathBuf>,
        literal: Option<String>,
        stdin_is_piped: bool,
    ) -> Result<Self, EngineError> {
        match (file, literal) {
            (Some(_), Some(_)) => Err(EngineError::Config(
                "input file and literal string are mutually exclusive".into(),
            )),
            (Some(f), None) => Ok(InputSource::File(f)),
            (None, Some(s)) => Ok(InputSource::Literal(s)),
            (None, None) if stdin_is_piped => Ok(InputSource::Stdin),
            (None, None) => Err(EngineError::Config(
                "no input: supply a file, a literal string, or piped stdin".into(),
            )),
        }
    }

    /// Read the source fully into an ordered sequence of work items, one per
    /// line, trimmed of line terminators. Blank lines are skipped.
    pub async fn materialize(&self) -> Result<Vec<WorkItem>, EngineError> {
        let raw = match self {
            InputSource::File(path) => tokio::fs::read_to_string(path).await?,
            InputSource::Literal(s) => s.clone(),
            InputSource::Stdin => {
                let mut buf = String::new();
                tokio::io::stdin().read_to_string(&mut buf).await?;
                buf
            }
        };

        let items = raw
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.trim().is_empty())
            .enumerate()
            .map(|(index, value)| WorkItem {
                index,
                value: value.to_string(),
            })
            .collect();
        Ok(items)
    }
}
