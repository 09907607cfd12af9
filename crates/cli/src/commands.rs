//! Command-line interface definition.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "brindes")]
#[command(about = "Crawl, index and search the promotional gifts catalog")]
#[command(version)]
#[command(after_help = "Environment:\n  BRINDES_CONFIG  Path to config file (default: config.toml)\n  RUST_LOG        Log filter (default: info)")]
pub struct Cli {
    /// Print Prometheus metrics after the command
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Crawl every category and rebuild the index
    Crawl,

    /// Re-crawl one category
    Update {
        /// Category name or id
        #[arg(required = true, num_args = 1..)]
        category: Vec<String>,
    },

    /// Search indexed products
    Search {
        /// Search term; empty lists everything
        term: Vec<String>,
    },

    /// Answer a customer message
    Ask {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Show index statistics
    Stats,
}

/// Join positional words back into one phrase.
pub fn join_words(words: &[String]) -> String {
    words.join(" ").trim().to_string()
}
