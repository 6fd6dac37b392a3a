//! Basic usage example for locator-rs
//!
//! This example demonstrates how to:
//! - Build a location index from a server list
//! - Run searches through the engine
//! - Watch the debounce turn a typed query into a recent search

use locator_rs::prelude::*;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== locator-rs Basic Usage Example ===\n");

    let servers = vec![
        Server::new("ch1", "CH#1", "Zurich", "CH"),
        Server::new("ch2", "CH#2", "Geneva", "CH").with_tier(Tier::PLUS),
        Server::new("se1", "SE#1", "Stockholm", "SE"),
        Server::new("us9", "US-NY#9", "New York", "US"),
        Server::new("us10", "US-NY#10", "New York", "US").with_online(false),
    ];

    // Example 1: index statistics
    println!("--- Example 1: Build the index ---");
    let index = LocationIndex::build(servers.clone());
    let stats = index.stats();
    println!(
        "{} countries, {} cities, {} servers\n",
        stats.countries, stats.cities, stats.servers
    );

    // Example 2: search as a free-tier user
    println!("--- Example 2: Search ---");
    let config = EngineConfig::default().with_debounce(Duration::from_millis(300));
    let engine = SearchEngine::new(config, Arc::new(MemoryBackend::new()))?;
    engine.update_servers(servers);
    engine.update_user_tier(Tier::FREE);
    engine.update_connection_status(ConnectionStatus::connected(ServerId::new("ch1")));

    for query in ["s", "new yo", "ch#"] {
        engine.set_query(query);
        if let Some(results) = engine.current().results() {
            println!("{query:?}");
            for r in &results.countries {
                println!("  country {} connected={}", r.text(), r.is_connected);
            }
            for r in &results.cities {
                println!("  city    {} connected={}", r.text(), r.is_connected);
            }
            for r in &results.servers {
                println!("  server  {} {:?}", r.value().name(), r.availability());
            }
        }
    }
    println!();

    // Example 3: recents
    println!("--- Example 3: Recent searches ---");
    engine.set_query("zurich");
    tokio::time::sleep(Duration::from_millis(400)).await;
    engine.set_query("");
    match engine.current() {
        ViewState::SearchHistory { queries } => println!("History: {queries:?}"),
        other => println!("Unexpected state: {other:?}"),
    }

    Ok(())
}
