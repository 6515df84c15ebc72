mod error;

pub use error::{CliError, EngineError};
