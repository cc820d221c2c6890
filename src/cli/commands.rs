use clap::{Parser, Subcommand};

use crate::config::CONFIG_ENV_VAR;

#[derive(Parser)]
#[command(name = "tourfeed")]
#[command(about = "Curates tourism pages via OpenGraph metadata into a static RSS feed")]
#[command(version)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, env = CONFIG_ENV_VAR)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch all sources and write the feed (default)
    Run {
        /// Output file path (overrides feed.output and TOURFEED_OUTPUT)
        #[arg(short, long)]
        output: Option<String>,

        /// Dry run - print the feed to stdout instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// List configured sources
    List {
        /// Print the source list as OPML
        #[arg(long)]
        opml: bool,
    },

    /// Fetch one page and show the extracted metadata
    Inspect {
        /// Page URL to inspect
        url: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}
