//! BR tracker CLI library.
//!
//! This crate provides the CLI interface for the interval tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, WhenArgs};
pub use config::Config;
