//! locator-cli
//! ===========
//!
//! Command-line interface for the `locator-core` search engine.
//!
//! Quick start
//! -----------
//!
//! ```text
//! locator --servers servers.json stats
//! locator --servers servers.json search "new yo"
//! locator --servers servers.json --partners partners.json search "#PARTNER"
//! locator recents list
//! ```
//!
//! The binary is a thin shell around [`run`]; everything it prints is built
//! from the public `locator-core` API.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod args;

use anyhow::{bail, Context, Result};
use args::{CliArgs, Commands, RecentsAction};
use locator_core::loader::{load_index, load_partnerships_or_empty};
use locator_core::{
    Availability, ConnectionStatus, EngineConfig, JsonFileBackend, LocationIndex,
    PartnershipSnapshot, RankedResult, RecentsStore, SearchEngine, SearchResults, ServerId, Tier,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_RECENTS_FILE: &str = "locator-recents.json";

pub async fn run(args: CliArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let recents_path = args
        .recents
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RECENTS_FILE));

    match args.command {
        Commands::Stats => {
            let index = open_index(args.servers.as_deref())?;
            let stats = index.stats();
            println!("Catalog statistics:");
            println!("  Countries: {}", stats.countries);
            println!("  Cities: {}", stats.cities);
            println!("  Servers: {}", stats.servers);
            println!("  Skipped records: {}", stats.skipped);
        }

        Commands::Countries => {
            let index = open_index(args.servers.as_deref())?;
            for c in index.countries() {
                println!("{} ({}) - {} servers", c.name, c.code, c.servers.len());
            }
        }

        Commands::Country { code } => {
            let index = open_index(args.servers.as_deref())?;
            match index.country(&code) {
                Some(c) => {
                    println!("Country: {} ({})", c.name, c.code);
                    println!("Servers: {}", c.servers.len());
                    for city in &c.cities {
                        println!("- {} ({} servers)", city.name, city.servers.len());
                    }
                }
                None => eprintln!("No country found for: {code}"),
            }
        }

        Commands::Search {
            query,
            tier,
            connected,
            remember,
        } => {
            let index = open_index(args.servers.as_deref())?;
            let partnerships = match &args.partners {
                Some(path) => load_partnerships_or_empty(path),
                None => PartnershipSnapshot::empty(),
            };

            let engine = SearchEngine::new(config, Arc::new(JsonFileBackend::new(recents_path)))?;
            engine.update_index(Arc::new(index));
            engine.update_partnerships(partnerships);
            engine.update_user_tier(Tier(tier));
            if let Some(id) = connected {
                engine.update_connection_status(ConnectionStatus::connected(ServerId::new(id)));
            }

            tracing::debug!(query = %query, tier, remember, "running search");
            if remember {
                engine.set_query_from_recents(&query);
            } else {
                engine.set_query(&query);
            }
            match engine.current().results() {
                Some(results) => print_results(results),
                None => println!("Empty query."),
            }
            engine.shutdown();
        }

        Commands::Recents { action } => {
            let store = RecentsStore::open(
                Arc::new(JsonFileBackend::new(recents_path)),
                config.max_recents,
            );
            match action {
                RecentsAction::List => {
                    if store.is_empty() {
                        println!("No recent searches.");
                    }
                    for query in store.list() {
                        println!("{query}");
                    }
                }
                RecentsAction::Add { query } => {
                    if !store.commit(&query) {
                        bail!("refusing to store an empty query");
                    }
                }
                RecentsAction::Remove { query } => {
                    if !store.remove(&query) {
                        eprintln!("Not in recent searches: {query}");
                    }
                }
                RecentsAction::Clear => store.clear(),
            }
        }
    }

    Ok(())
}

fn open_index(servers: Option<&Path>) -> Result<LocationIndex> {
    let Some(path) = servers else {
        bail!("--servers <path> is required for this command");
    };
    load_index(path).with_context(|| format!("loading server catalog {}", path.display()))
}

fn print_results(results: &SearchResults) {
    if results.is_empty() {
        println!("No matches for: {}", results.query);
        return;
    }
    print_section("Countries", &results.countries, |r| r.text().to_owned());
    print_section("Cities", &results.cities, |r| r.text().to_owned());
    print_section("Servers", &results.servers, |r| {
        let mut line = r.value().name().to_owned();
        if !r.partnerships.is_empty() {
            let names: Vec<&str> = r.partnerships.iter().map(|p| p.name.as_str()).collect();
            line.push_str(&format!(" (partners: {})", names.join(", ")));
        }
        line
    });
}

fn print_section<T>(title: &str, rows: &[RankedResult<T>], label: impl Fn(&RankedResult<T>) -> String) {
    if rows.is_empty() {
        return;
    }
    println!("{title}:");
    for row in rows {
        let mut line = format!("  {}", label(row));
        match row.availability() {
            Availability::Online => {}
            Availability::UnavailablePlan => line.push_str(" [upgrade required]"),
            Availability::Offline => line.push_str(" [maintenance]"),
        }
        if row.is_connected {
            line.push_str(" [connected]");
        } else if row.is_connecting {
            line.push_str(" [connecting]");
        }
        println!("{line}");
    }
}
