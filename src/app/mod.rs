//! CLI and configuration management.

pub mod cli;
pub mod config;

pub use config::Config;
