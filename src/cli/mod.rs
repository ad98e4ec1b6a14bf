//! CLI module
//!
//! Provides the `serve` subcommand that runs the HTTP API.

pub mod serve;

use clap::{Parser, Subcommand};

/// Token Issuer - credential verification and bearer token issuance
#[derive(Parser)]
#[command(name = "token-issuer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,
}
