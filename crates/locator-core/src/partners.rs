// crates/locator-core/src/partners.rs
//! Partnership snapshot: server id → partner descriptors.
//!
//! Refreshing the snapshot is the caller's job (an explicit call to the
//! partnership service). The engine only reads whatever snapshot it was
//! last given.

use crate::model::{Partner, PartnerType, ServerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Wire shape of the partnership service response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnersResponse {
    #[serde(default)]
    pub partner_types: Vec<PartnerType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartnershipSnapshot {
    by_server: HashMap<ServerId, Vec<Partner>>,
}

impl PartnershipSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Indexes partners by every logical server id they list.
    pub fn from_partners<I>(partners: I) -> Self
    where
        I: IntoIterator<Item = Partner>,
    {
        let mut by_server: HashMap<ServerId, Vec<Partner>> = HashMap::new();
        for partner in partners {
            for id in &partner.logical_ids {
                let entry = by_server.entry(id.clone()).or_default();
                if !entry.contains(&partner) {
                    entry.push(partner.clone());
                }
            }
        }
        PartnershipSnapshot { by_server }
    }

    pub fn from_response(response: PartnersResponse) -> Self {
        Self::from_partners(
            response
                .partner_types
                .into_iter()
                .flat_map(|t| t.partners.into_iter()),
        )
    }

    /// Partners of `id`; empty when the server has none.
    pub fn partners_for(&self, id: &ServerId) -> &[Partner] {
        self.by_server.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_partners(&self, id: &ServerId) -> bool {
        !self.partners_for(id).is_empty()
    }

    /// Number of servers carrying at least one partner.
    pub fn len(&self) -> usize {
        self.by_server.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_server.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partner(name: &str, ids: &[&str]) -> Partner {
        Partner {
            name: name.into(),
            description: String::new(),
            icon_url: None,
            logical_ids: ids.iter().map(|s| ServerId::new(*s)).collect(),
        }
    }

    #[test]
    fn maps_every_logical_id() {
        let snapshot = PartnershipSnapshot::from_response(PartnersResponse {
            partner_types: vec![PartnerType {
                type_name: "News".into(),
                description: String::new(),
                partners: vec![partner("A", &["1", "2"]), partner("B", &["2"])],
            }],
        });
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.partners_for(&ServerId::new("1")).len(), 1);
        assert_eq!(snapshot.partners_for(&ServerId::new("2")).len(), 2);
        assert!(!snapshot.has_partners(&ServerId::new("3")));
    }

    #[test]
    fn duplicate_listing_is_collapsed() {
        let a = partner("A", &["1", "1"]);
        let snapshot = PartnershipSnapshot::from_partners(vec![a.clone(), a]);
        assert_eq!(snapshot.partners_for(&ServerId::new("1")).len(), 1);
    }
}
