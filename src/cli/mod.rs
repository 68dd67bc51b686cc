//! CLI module for snapr - command-line interface and subcommands.
//!
//! Provides the main entry point with subcommands for publishing and
//! fetching year branches.

pub mod commands;

pub use commands::Cli;
