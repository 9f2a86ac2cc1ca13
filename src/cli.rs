use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::api::DEFAULT_API_BASE;

#[derive(Parser, Debug)]
#[command(name = "route-tracker")]
#[command(version, about = "Track route completion and the encounters on each route")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch encounter data into the database, resuming from the checkpoint
    Ingest {
        /// SQLite database path
        #[arg(short, long)]
        db: Option<PathBuf>,

        /// Checkpoint file (default: next to the database)
        #[arg(short, long)]
        checkpoint: Option<PathBuf>,

        /// Only walk these regions (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        region: Option<Vec<String>>,

        /// Pause after each area fetch, in milliseconds
        #[arg(long, default_value_t = 500)]
        delay_ms: u64,

        /// API base URL
        #[arg(long, default_value = DEFAULT_API_BASE)]
        api_base: String,

        /// Drop all stored data and start over from the first location
        #[arg(short, long)]
        fresh: bool,

        /// Show a full-screen progress display
        #[arg(long)]
        tui: bool,
    },

    /// Serve the tracker page and API
    Serve {
        /// SQLite database path
        #[arg(short, long)]
        db: Option<PathBuf>,

        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:5000")]
        addr: SocketAddr,
    },

    /// Print stored routes
    Routes {
        /// SQLite database path
        #[arg(short, long)]
        db: Option<PathBuf>,
    },

    /// List known regions and the versions counted for each
    Regions,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
