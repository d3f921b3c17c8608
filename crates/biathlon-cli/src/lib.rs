//! Biathlon results CLI library.
//!
//! This crate provides the command-line interface around `biathlon-core`.

mod cli;
mod config;
pub mod race;

pub use cli::{Cli, ReportFormat};
pub use config::{LoadError, load_config};
