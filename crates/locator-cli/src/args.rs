// crates/locator-cli/src/args.rs
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for locator
#[derive(Debug, Parser)]
#[command(
    name = "locator",
    version,
    about = "Search a server catalog by country, city or server name and manage recent searches"
)]
pub struct CliArgs {
    /// Server catalog: JSON array of servers (.json or .json.gz)
    #[arg(short = 's', long = "servers", global = true)]
    pub servers: Option<PathBuf>,

    /// Recent searches file (default: locator-recents.json)
    #[arg(short = 'r', long = "recents", global = true)]
    pub recents: Option<PathBuf>,

    /// Partnerships payload ({"partnerTypes": [...]})
    #[arg(short = 'p', long = "partners", global = true)]
    pub partners: Option<PathBuf>,

    /// Engine configuration (TOML)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a summary of the server catalog
    Stats,

    /// List all countries with server counts
    Countries,

    /// Show one country with its cities
    Country {
        /// ISO2 code (e.g. CH)
        code: String,
    },

    /// Run a search query
    Search {
        /// Free-text query; append #PARTNER to list partnered servers only
        query: String,

        /// User plan tier (0 = free, 1 = basic, 2 = plus, 3 = visionary)
        #[arg(short = 't', long = "tier", default_value_t = 2)]
        tier: u8,

        /// Mark results as connected through this server id
        #[arg(long = "connected")]
        connected: Option<String>,

        /// Store the query in recent searches
        #[arg(long = "remember")]
        remember: bool,
    },

    /// Manage recent searches
    Recents {
        #[command(subcommand)]
        action: RecentsAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum RecentsAction {
    /// List recent searches, most recent first
    List,

    /// Add (or move to the top) a query
    Add { query: String },

    /// Remove a single query
    Remove { query: String },

    /// Forget all recent searches
    Clear,
}
