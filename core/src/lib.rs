pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod gate;
pub mod input;
pub mod module;
pub mod scheduler;
pub mod sink;
pub mod template;
