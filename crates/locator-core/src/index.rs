// crates/locator-core/src/index.rs
//! # Location Index
//!
//! Immutable catalog of countries → cities → servers built from a flat
//! server list. A new server list means a new index; there is no in-place
//! editing. Share it as `Arc<LocationIndex>` and swap the `Arc` on rebuild.

use crate::countries::country_name;
use crate::model::{Server, ServerId};
use crate::text::fold_key;
use crate::traits::NameMatch;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// A country aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    /// Upper-case ISO2 code.
    pub code: String,
    pub name: String,
    pub cities: Vec<Arc<City>>,
    pub servers: Vec<Arc<Server>>,
}

/// A city aggregate. Identity is the `(country code, folded name)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    pub name: String,
    pub country_code: String,
    pub servers: Vec<Arc<Server>>,
}

impl City {
    pub fn key(&self) -> CityKey {
        CityKey::new(&self.country_code, &self.name)
    }
}

/// Identity of a city.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CityKey {
    pub country_code: String,
    pub name_key: String,
}

impl CityKey {
    pub fn new(country_code: &str, name: &str) -> Self {
        CityKey {
            country_code: country_code.trim().to_ascii_uppercase(),
            name_key: fold_key(name.trim()),
        }
    }
}

/// Country / city / server identities of one server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationRef {
    pub country_code: String,
    pub city: Option<CityKey>,
    pub server_id: ServerId,
}

/// Aggregate counts for an index build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub countries: usize,
    pub cities: usize,
    pub servers: usize,
    /// Records dropped as malformed or duplicate.
    pub skipped: usize,
}

/// The searchable catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    countries: Vec<Arc<Country>>,
    cities: Vec<Arc<City>>,
    servers: Vec<Arc<Server>>,
    by_server: HashMap<ServerId, usize>,
    by_country: HashMap<String, usize>,
    skipped: usize,
}

#[derive(Default)]
struct CountryAcc {
    servers: Vec<Arc<Server>>,
    // folded name -> (display name, servers)
    cities: BTreeMap<String, (String, Vec<Arc<Server>>)>,
}

impl LocationIndex {
    /// Builds an index using the built-in country name table.
    ///
    /// ```rust
    /// use locator_core::index::LocationIndex;
    /// use locator_core::model::Server;
    ///
    /// let index = LocationIndex::build(vec![Server::new("1", "CA#1", "Toronto", "ca")]);
    /// assert_eq!(index.country("CA").unwrap().name, "Canada");
    /// assert_eq!(index.stats().cities, 1);
    /// ```
    pub fn build(servers: Vec<Server>) -> Self {
        Self::build_with_names(servers, &HashMap::new())
    }

    /// Builds an index; `names` overrides display names per ISO2 code.
    pub fn build_with_names(servers: Vec<Server>, names: &HashMap<String, String>) -> Self {
        let mut skipped = 0usize;
        let mut seen: HashSet<ServerId> = HashSet::with_capacity(servers.len());
        let mut grouped: BTreeMap<String, CountryAcc> = BTreeMap::new();
        let mut all_servers: Vec<Arc<Server>> = Vec::with_capacity(servers.len());

        for mut server in servers {
            if server.server_id.as_str().trim().is_empty()
                || server.server_name.trim().is_empty()
                || server.country_code.trim().is_empty()
            {
                tracing::warn!(
                    server_id = %server.server_id,
                    server_name = %server.server_name,
                    "skipping malformed server record"
                );
                skipped += 1;
                continue;
            }
            if !seen.insert(server.server_id.clone()) {
                tracing::warn!(server_id = %server.server_id, "skipping duplicate server id");
                skipped += 1;
                continue;
            }

            server.country_code = server.country_code.trim().to_ascii_uppercase();
            server.entry_country_code = if server.entry_country_code.trim().is_empty() {
                server.country_code.clone()
            } else {
                server.entry_country_code.trim().to_ascii_uppercase()
            };

            let server = Arc::new(server);
            let acc = grouped.entry(server.country_code.clone()).or_default();
            acc.servers.push(Arc::clone(&server));
            if let Some(city) = server.city() {
                acc.cities
                    .entry(fold_key(city))
                    .or_insert_with(|| (city.to_owned(), Vec::new()))
                    .1
                    .push(Arc::clone(&server));
            }
            all_servers.push(server);
        }

        let mut countries = Vec::with_capacity(grouped.len());
        let mut cities = Vec::new();
        for (code, acc) in grouped {
            let name = names
                .get(&code)
                .cloned()
                .or_else(|| country_name(&code).map(str::to_owned))
                .unwrap_or_else(|| code.clone());

            let country_cities: Vec<Arc<City>> = acc
                .cities
                .into_values()
                .map(|(city_name, servers)| {
                    Arc::new(City {
                        name: city_name,
                        country_code: code.clone(),
                        servers,
                    })
                })
                .collect();
            cities.extend(country_cities.iter().cloned());

            countries.push(Arc::new(Country {
                code,
                name,
                cities: country_cities,
                servers: acc.servers,
            }));
        }

        let by_server = all_servers
            .iter()
            .enumerate()
            .map(|(i, s)| (s.server_id.clone(), i))
            .collect();
        let by_country = countries
            .iter()
            .enumerate()
            .map(|(i, c)| (c.code.clone(), i))
            .collect();

        let index = LocationIndex {
            countries,
            cities,
            servers: all_servers,
            by_server,
            by_country,
            skipped,
        };
        let stats = index.stats();
        tracing::debug!(
            countries = stats.countries,
            cities = stats.cities,
            servers = stats.servers,
            skipped = stats.skipped,
            "location index built"
        );
        index
    }

    pub fn countries(&self) -> &[Arc<Country>] {
        &self.countries
    }

    pub fn cities(&self) -> &[Arc<City>] {
        &self.cities
    }

    pub fn servers(&self) -> &[Arc<Server>] {
        &self.servers
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Find a country by ISO2 code, case-insensitive (e.g. "DE", "us").
    pub fn country(&self, code: &str) -> Option<&Arc<Country>> {
        let code = code.trim().to_ascii_uppercase();
        self.by_country.get(&code).map(|&i| &self.countries[i])
    }

    /// Find a city by country code and name (accent/case-insensitive).
    pub fn city(&self, country_code: &str, name: &str) -> Option<&Arc<City>> {
        self.country(country_code)?
            .cities
            .iter()
            .find(|c| c.is_named(name))
    }

    pub fn server(&self, id: &ServerId) -> Option<&Arc<Server>> {
        self.by_server.get(id).map(|&i| &self.servers[i])
    }

    /// Maps a server id to its country / city / server identities.
    pub fn resolve(&self, id: &ServerId) -> Option<LocationRef> {
        let server = self.server(id)?;
        Some(LocationRef {
            country_code: server.country_code.clone(),
            city: server.city().map(|c| CityKey::new(&server.country_code, c)),
            server_id: server.server_id.clone(),
        })
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            countries: self.countries.len(),
            cities: self.cities.len(),
            servers: self.servers.len(),
            skipped: self.skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tier;

    fn server(id: &str, name: &str, city: &str, country: &str) -> Server {
        Server {
            server_id: ServerId::new(id),
            server_name: name.into(),
            city_name: city.into(),
            country_code: country.into(),
            entry_country_code: String::new(),
            tier: Tier::FREE,
            is_online: true,
            features: Vec::new(),
        }
    }

    #[test]
    fn groups_by_country_and_city() {
        let index = LocationIndex::build(vec![
            server("1", "CH#1", "Zurich", "CH"),
            server("2", "CH#2", "Zürich", "ch"),
            server("3", "CH#3", "Geneva", "CH"),
            server("4", "SE#1", "Stockholm", "SE"),
        ]);

        let stats = index.stats();
        assert_eq!(stats.countries, 2);
        assert_eq!(stats.cities, 3);
        assert_eq!(stats.servers, 4);

        let ch = index.country("ch").unwrap();
        assert_eq!(ch.name, "Switzerland");
        assert_eq!(ch.servers.len(), 3);
        let zurich = index.city("CH", "zurich").unwrap();
        assert_eq!(zurich.name, "Zurich");
        assert_eq!(zurich.servers.len(), 2);
    }

    #[test]
    fn malformed_and_duplicate_records_are_skipped() {
        let index = LocationIndex::build(vec![
            server("", "CH#1", "Zurich", "CH"),
            server("2", "  ", "Zurich", "CH"),
            server("3", "CH#3", "Zurich", ""),
            server("4", "CH#4", "Zurich", "CH"),
            server("4", "CH#4-dup", "Zurich", "CH"),
        ]);
        let stats = index.stats();
        assert_eq!(stats.servers, 1);
        assert_eq!(stats.skipped, 4);
        assert_eq!(index.server(&ServerId::new("4")).unwrap().server_name, "CH#4");
    }

    #[test]
    fn resolve_maps_server_to_identities() {
        let index = LocationIndex::build(vec![
            server("1", "CA#1", "Toronto", "CA"),
            server("2", "CA-FREE#1", "", "CA"),
        ]);
        let loc = index.resolve(&ServerId::new("1")).unwrap();
        assert_eq!(loc.country_code, "CA");
        assert_eq!(loc.city, Some(CityKey::new("ca", "TORONTO")));

        let cityless = index.resolve(&ServerId::new("2")).unwrap();
        assert_eq!(cityless.city, None);
        assert!(index.resolve(&ServerId::new("nope")).is_none());
    }

    #[test]
    fn entry_country_defaults_to_exit_and_names_can_be_overridden() {
        let mut names = HashMap::new();
        names.insert("XK".to_owned(), "Kosovo".to_owned());
        let index = LocationIndex::build_with_names(
            vec![server("1", "XK#1", "Pristina", "xk"), server("2", "ZZ#1", "", "ZZ")],
            &names,
        );
        assert_eq!(index.country("XK").unwrap().name, "Kosovo");
        assert_eq!(index.country("ZZ").unwrap().name, "ZZ");
        let s = index.server(&ServerId::new("1")).unwrap();
        assert_eq!(s.entry_country_code, "XK");
    }
}
