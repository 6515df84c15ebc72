pub mod collect;
pub mod connect;
pub mod extract;
pub mod output;
pub mod renderers;
pub mod strategies;
pub mod factory;
