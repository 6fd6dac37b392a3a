// crates/locator-core/src/model.rs
//! Catalog records and live-state values consumed by the engine.
//!
//! Everything here is a plain snapshot value: collaborators (server list
//! manager, VPN status monitor, account service) hand these over and the
//! engine never mutates them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque logical server identifier as issued by the server list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(pub String);

impl ServerId {
    pub fn new(id: impl Into<String>) -> Self {
        ServerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServerId {
    fn from(s: &str) -> Self {
        ServerId(s.to_owned())
    }
}

/// Plan level. Servers require a tier, users hold one; a server is usable
/// when `server.tier <= user tier`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tier(pub u8);

impl Tier {
    pub const FREE: Tier = Tier(0);
    pub const BASIC: Tier = Tier(1);
    pub const PLUS: Tier = Tier(2);
    pub const VISIONARY: Tier = Tier(3);

    #[inline]
    pub fn grants(self, required: Tier) -> bool {
        required <= self
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Tier::FREE => f.write_str("free"),
            Tier::BASIC => f.write_str("basic"),
            Tier::PLUS => f.write_str("plus"),
            Tier::VISIONARY => f.write_str("visionary"),
            Tier(other) => write!(f, "tier {other}"),
        }
    }
}

/// Capabilities advertised by a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServerFeature {
    SecureCore,
    Tor,
    P2p,
    Streaming,
    Ipv6,
    #[serde(other)]
    Unknown,
}

/// A single server record as delivered by the server catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub server_id: ServerId,
    pub server_name: String,
    #[serde(default)]
    pub city_name: String,
    pub country_code: String,
    /// Country the tunnel enters through. Equal to `country_code` except
    /// for secure-core routes.
    #[serde(default)]
    pub entry_country_code: String,
    #[serde(default)]
    pub tier: Tier,
    #[serde(default = "default_online")]
    pub is_online: bool,
    #[serde(default)]
    pub features: Vec<ServerFeature>,
}

fn default_online() -> bool {
    true
}

impl Server {
    /// Free-tier, online server with no features.
    pub fn new(id: &str, name: &str, city: &str, country_code: &str) -> Self {
        Server {
            server_id: ServerId::new(id),
            server_name: name.to_owned(),
            city_name: city.to_owned(),
            country_code: country_code.to_owned(),
            entry_country_code: String::new(),
            tier: Tier::FREE,
            is_online: true,
            features: Vec::new(),
        }
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_online(mut self, is_online: bool) -> Self {
        self.is_online = is_online;
        self
    }

    pub fn name(&self) -> &str {
        &self.server_name
    }

    pub fn city(&self) -> Option<&str> {
        let city = self.city_name.trim();
        (!city.is_empty()).then_some(city)
    }

    pub fn has_feature(&self, feature: ServerFeature) -> bool {
        self.features.contains(&feature)
    }

    /// True when entry and exit countries differ.
    pub fn is_secure_core(&self) -> bool {
        !self.entry_country_code.is_empty()
            && !self
                .entry_country_code
                .eq_ignore_ascii_case(&self.country_code)
    }
}

/// A third party a server is operated in cooperation with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    /// Logical server ids this partner is attached to.
    #[serde(default, rename = "logicalIDs", alias = "logicalIds")]
    pub logical_ids: Vec<ServerId>,
}

/// A named group of partners, as the partnership service returns them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerType {
    #[serde(default, rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub partners: Vec<Partner>,
}

/// Tunnel phase as reported by the connection manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionPhase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Live connection status snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub phase: ConnectionPhase,
    pub active_server: Option<ServerId>,
}

impl ConnectionStatus {
    pub fn disconnected() -> Self {
        ConnectionStatus::default()
    }

    pub fn connecting(server: ServerId) -> Self {
        ConnectionStatus {
            phase: ConnectionPhase::Connecting,
            active_server: Some(server),
        }
    }

    pub fn connected(server: ServerId) -> Self {
        ConnectionStatus {
            phase: ConnectionPhase::Connected,
            active_server: Some(server),
        }
    }
}
