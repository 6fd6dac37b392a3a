// crates/locator-core/src/overlay.rs
//! # Status Overlay
//!
//! Annotates matches with live state: online/maintenance, entitlement,
//! active connection and partnerships. Everything here is a pure function of
//! the snapshots passed in.

use crate::index::{City, Country, LocationIndex, LocationRef};
use crate::matcher::{Match, MatchSet};
use crate::model::{ConnectionPhase, ConnectionStatus, Partner, Server, Tier};
use crate::partners::PartnershipSnapshot;
use crate::traits::Candidate;
use std::sync::Arc;

/// Connection status with the active server mapped into the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveStatus {
    pub phase: ConnectionPhase,
    pub location: Option<LocationRef>,
}

impl LiveStatus {
    /// Resolves the active server against `index`. An active server missing
    /// from the index resolves to no location.
    pub fn resolve(status: &ConnectionStatus, index: &LocationIndex) -> Self {
        LiveStatus {
            phase: status.phase,
            location: status
                .active_server
                .as_ref()
                .and_then(|id| index.resolve(id)),
        }
    }
}

/// What a user can do with a result, used for row decoration and dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    Online,
    /// Requires a higher plan than the user holds.
    UnavailablePlan,
    /// Accessible but every server is in maintenance.
    Offline,
}

/// A match annotated with live state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedResult<T> {
    pub matched: Match<T>,
    pub is_online: bool,
    pub is_connected: bool,
    pub is_connecting: bool,
    pub is_accessible_to_user: bool,
    /// Only ever non-empty for servers.
    pub partnerships: Vec<Partner>,
}

impl<T> RankedResult<T> {
    pub fn text(&self) -> &str {
        &self.matched.text
    }

    pub fn value(&self) -> &T {
        &self.matched.value
    }

    pub fn availability(&self) -> Availability {
        if !self.is_accessible_to_user {
            Availability::UnavailablePlan
        } else if !self.is_online {
            Availability::Offline
        } else {
            Availability::Online
        }
    }
}

/// Ranked, annotated results for all three categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedSet {
    pub countries: Vec<RankedResult<Arc<Country>>>,
    pub cities: Vec<RankedResult<Arc<City>>>,
    pub servers: Vec<RankedResult<Arc<Server>>>,
}

/// Annotates a single match.
pub fn enrich<T: Candidate>(
    matched: Match<T>,
    live: &LiveStatus,
    user_tier: Tier,
    partnerships: &PartnershipSnapshot,
) -> RankedResult<T> {
    let mut any_online = false;
    let mut any_accessible = false;
    for server in matched.value.servers() {
        any_online |= server.is_online;
        any_accessible |= user_tier.grants(server.tier);
    }

    let here = live
        .location
        .as_ref()
        .is_some_and(|loc| matched.value.contains(loc));

    let partners = matched
        .value
        .partner_key()
        .map(|id| partnerships.partners_for(id).to_vec())
        .unwrap_or_default();

    RankedResult {
        is_online: any_online,
        is_connected: here && live.phase == ConnectionPhase::Connected,
        is_connecting: here && live.phase == ConnectionPhase::Connecting,
        is_accessible_to_user: any_accessible,
        partnerships: partners,
        matched,
    }
}

/// Enriches every match and moves accessible candidates ahead of
/// inaccessible ones, keeping the matcher's order otherwise.
pub fn rank(
    set: MatchSet,
    live: &LiveStatus,
    user_tier: Tier,
    partnerships: &PartnershipSnapshot,
) -> RankedSet {
    RankedSet {
        countries: rank_category(set.countries, live, user_tier, partnerships),
        cities: rank_category(set.cities, live, user_tier, partnerships),
        servers: rank_category(set.servers, live, user_tier, partnerships),
    }
}

fn rank_category<T: Candidate>(
    matches: Vec<Match<T>>,
    live: &LiveStatus,
    user_tier: Tier,
    partnerships: &PartnershipSnapshot,
) -> Vec<RankedResult<T>> {
    let mut ranked: Vec<RankedResult<T>> = matches
        .into_iter()
        .map(|m| enrich(m, live, user_tier, partnerships))
        .collect();
    // stable: ties keep base order
    ranked.sort_by_key(|r| !r.is_accessible_to_user);
    ranked
}
