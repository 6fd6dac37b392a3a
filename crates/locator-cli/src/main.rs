//! locator - command-line interface for locator-core
//!
//! Inspect a server catalog, run searches the way the search screen does and
//! manage the recent-searches file.
//!
//! Usage examples
//! --------------
//!
//! - Show catalog stats
//!   $ locator --servers servers.json stats
//!
//! - Search, as a free-tier user connected through server `ca1`
//!   $ locator --servers servers.json search tor --tier 0 --connected ca1
//!
//! - List partnered servers only
//!   $ locator --servers servers.json --partners partners.json search "#PARTNER"
//!
//! - Manage recents
//!   $ locator recents list
//!   $ locator recents clear
//!
//! Set `RUST_LOG=locator_core=debug` to see index and recents activity.

use anyhow::Result;
use clap::Parser;
use locator_cli::args::CliArgs;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = CliArgs::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(locator_cli::run(args))
}
