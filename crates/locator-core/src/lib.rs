// crates/locator-core/src/lib.rs
//! # locator-core
//!
//! Search and recents engine for a catalog of connection servers.
//!
//! Servers are grouped into a [`LocationIndex`] of countries and cities,
//! matched against free-text queries, annotated with live connection,
//! entitlement and partnership state, and presented through a
//! [`SearchEngine`] that also keeps a debounced list of recent searches.
//!
//! ```
//! use locator_core::{match_query, LocationIndex, Server};
//!
//! let index = LocationIndex::build(vec![
//!     Server::new("1", "CH#1", "Zurich", "CH"),
//!     Server::new("2", "SE#1", "Stockholm", "SE"),
//! ]);
//! let found = match_query("zur", &index);
//! assert_eq!(found.cities[0].text, "Zurich");
//! ```

pub mod config;
pub mod countries;
pub mod engine;
pub mod error;
pub mod index;
#[cfg(feature = "json")]
pub mod loader;
pub mod matcher;
pub mod model;
pub mod overlay;
pub mod partners;
pub mod recents;
pub mod text;
pub mod traits;

// Re-exports
pub use crate::config::EngineConfig;
pub use crate::engine::{SearchEngine, SearchResults, ViewState, ViewStateStream};
pub use crate::error::{LocatorError, Result};
pub use crate::index::{City, CityKey, Country, IndexStats, LocationIndex, LocationRef};
#[cfg(feature = "json")]
pub use crate::loader::JsonFileBackend;
pub use crate::matcher::{match_query, match_query_with, Match, MatchSet, Query, PARTNER_MARKER};
pub use crate::model::{
    ConnectionPhase, ConnectionStatus, Partner, PartnerType, Server, ServerFeature, ServerId, Tier,
};
pub use crate::overlay::{enrich, rank, Availability, LiveStatus, RankedResult, RankedSet};
pub use crate::partners::PartnershipSnapshot;
pub use crate::recents::{MemoryBackend, RecentEntry, RecentsBackend, RecentsStore};
pub use crate::text::{equals_folded, fold_key};
pub use crate::traits::{Candidate, NameMatch};
