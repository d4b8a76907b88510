//! CLI module - Command-line interface for Recipebox
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Recipebox - recipe collection API
/// Accounts, tags, ingredients and recipes behind token authentication
#[derive(Parser)]
#[command(name = "recipebox")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API until interrupted
    #[command(alias = "daemon", alias = "web")]
    Serve,

    /// Block until the database accepts connections
    #[command(alias = "wait_for_db")]
    WaitForDb,

    /// Create an account with staff and superuser rights
    CreateSuperuser {
        /// Login email
        email: String,
        /// Initial password
        password: String,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
