//! locator-rs
//!
//! Facade over [`locator_core`] for the demos in this workspace.

pub use locator_core::*;

/// Everything a typical search-screen integration needs.
pub mod prelude {
    pub use locator_core::{
        Availability, ConnectionStatus, EngineConfig, LocationIndex, LocatorError, MemoryBackend,
        PartnershipSnapshot, Result, SearchEngine, SearchResults, Server, ServerId, Tier,
        ViewState,
    };
}
