//! COPY concurrency CLI library.
//!
//! This crate provides the command-line interface for the profiler.

mod cli;
pub mod commands;
mod config;

pub use cli::Cli;
pub use config::Config;
