// crates/locator-core/src/matcher.rs
//! # Matcher
//!
//! Multi-token prefix matching over country, city and server names.
//!
//! A candidate matches when **every** query token is a prefix of **some**
//! word of the candidate's display text, so `"k"` finds "Hong Kong" through
//! its second word. Within a category results are ordered:
//!
//! 1. matches on the first word before matches on later words,
//! 2. servers by numeric suffix (`UA#9` before `UA#10`),
//! 3. alphabetically.

use crate::index::{City, Country, LocationIndex};
use crate::model::Server;
use crate::partners::PartnershipSnapshot;
use crate::text::{fold_key, tokenize, NaturalKey};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Virtual tag appended to partnered servers' names.
pub const PARTNER_MARKER: &str = "#PARTNER";

/// A candidate that matched, with the display text and hit words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<T> {
    pub value: T,
    pub text: String,
    /// Indexes of the words in `text` that some query token hit.
    pub matched_token_indexes: BTreeSet<usize>,
}

impl<T> Match<T> {
    pub fn is_first_word(&self) -> bool {
        self.matched_token_indexes.contains(&0)
    }
}

/// Per-category match results, each already in base order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    pub countries: Vec<Match<Arc<Country>>>,
    pub cities: Vec<Match<Arc<City>>>,
    pub servers: Vec<Match<Arc<Server>>>,
}

impl MatchSet {
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty() && self.cities.is_empty() && self.servers.is_empty()
    }
}

/// A normalized query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    tokens: Vec<String>,
    partner_only: bool,
}

impl Query {
    /// Folds and tokenizes `raw`. A last token ending in `marker` switches
    /// the query into partner-only mode. A bare marker token is dropped;
    /// otherwise the token is kept whole and only matches partner-tagged
    /// server names.
    pub fn parse(raw: &str, marker: &str) -> Self {
        let mut tokens = tokenize(raw);
        let marker = fold_key(marker.trim());
        let mut partner_only = false;

        if !marker.is_empty() {
            let tagged_len = tokens
                .last()
                .filter(|last| last.ends_with(marker.as_str()))
                .map(String::len);
            if let Some(len) = tagged_len {
                partner_only = true;
                if len == marker.len() {
                    tokens.pop();
                }
            }
        }
        Query {
            tokens,
            partner_only,
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_partner_only(&self) -> bool {
        self.partner_only
    }

    /// An empty query routes to history instead of results.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && !self.partner_only
    }
}

/// Matches `query` without any partnership data.
pub fn match_query(query: &str, index: &LocationIndex) -> MatchSet {
    match_query_with(query, index, &PartnershipSnapshot::empty(), PARTNER_MARKER)
}

/// Matches `query` against every country, city and server of `index`.
pub fn match_query_with(
    query: &str,
    index: &LocationIndex,
    partnerships: &PartnershipSnapshot,
    marker: &str,
) -> MatchSet {
    let query = Query::parse(query, marker);
    run(&query, index, partnerships, marker)
}

/// Matches an already parsed [`Query`].
pub fn run(
    query: &Query,
    index: &LocationIndex,
    partnerships: &PartnershipSnapshot,
    marker: &str,
) -> MatchSet {
    if query.is_empty() {
        return MatchSet::default();
    }
    let tokens = query.tokens();
    let mut out = MatchSet::default();

    if !query.is_partner_only() {
        for country in index.countries() {
            if let Some(m) = match_text(tokens, &country.name, country) {
                out.countries.push(m);
            }
        }
        for city in index.cities() {
            if let Some(m) = match_text(tokens, &city.name, city) {
                out.cities.push(m);
            }
        }
    }

    let tagged_marker = fold_key(marker.trim());
    for server in index.servers() {
        let partnered = partnerships.has_partners(&server.server_id);
        if query.is_partner_only() && !partnered {
            continue;
        }
        let mut hit = match_words(tokens, &tokenize(&server.server_name));
        if hit.is_none() && partnered && !tagged_marker.is_empty() {
            let tagged = format!("{}{}", server.server_name, tagged_marker);
            hit = match_words(tokens, &tokenize(&tagged));
        }
        if let Some(matched_token_indexes) = hit {
            out.servers.push(Match {
                value: Arc::clone(server),
                text: server.server_name.clone(),
                matched_token_indexes,
            });
        }
    }

    out.countries.sort_by(base_order);
    out.cities.sort_by(base_order);
    out.servers.sort_by(server_order);
    out
}

fn match_text<T: Clone>(tokens: &[String], text: &str, value: &T) -> Option<Match<T>> {
    match_words(tokens, &tokenize(text)).map(|matched_token_indexes| Match {
        value: value.clone(),
        text: text.to_owned(),
        matched_token_indexes,
    })
}

/// Every token must prefix some word; returns the hit word indexes.
fn match_words(tokens: &[String], words: &[String]) -> Option<BTreeSet<usize>> {
    let mut hits = BTreeSet::new();
    for token in tokens {
        let i = words.iter().position(|w| w.starts_with(token.as_str()))?;
        hits.insert(i);
    }
    Some(hits)
}

/// Base order for countries and cities.
fn base_order<T>(a: &Match<T>, b: &Match<T>) -> Ordering {
    b.is_first_word()
        .cmp(&a.is_first_word())
        .then_with(|| alphabetical(&a.text, &b.text))
}

/// Base order for servers: numeric suffix before alphabetical.
fn server_order<T>(a: &Match<T>, b: &Match<T>) -> Ordering {
    b.is_first_word()
        .cmp(&a.is_first_word())
        .then_with(|| NaturalKey::new(&a.text).cmp(&NaturalKey::new(&b.text)))
        .then_with(|| alphabetical(&a.text, &b.text))
}

fn alphabetical(a: &str, b: &str) -> Ordering {
    fold_key(a).cmp(&fold_key(b)).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Partner, ServerId, Tier};

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

    fn index() -> LocationIndex {
        LocationIndex::build(vec![
            server("1", "UA#10", "Kyiv", "UA"),
            server("2", "UA#9", "Kyiv", "UA"),
            server("3", "HK#1", "Hong Kong", "HK"),
            server("4", "US-NY#1", "New York", "US"),
            server("5", "SE#1", "Stockholm", "SE"),
            server("6", "CH#1", "Zurich", "CH"),
        ])
    }

    fn texts<T>(matches: &[Match<T>]) -> Vec<&str> {
        matches.iter().map(|m| m.text.as_str()).collect()
    }

    #[test]
    fn empty_query_matches_nothing() {
        assert!(match_query("   ", &index()).is_empty());
    }

    #[test]
    fn later_word_matches_follow_first_word_matches() {
        let set = match_query("s", &index());
        assert_eq!(
            texts(&set.countries),
            vec!["Sweden", "Switzerland", "Hong Kong SAR China", "United States"]
        );
        assert!(set.countries[0].is_first_word());
        assert!(!set.countries[3].is_first_word());
    }

    #[test]
    fn every_token_must_match() {
        let set = match_query("new yo", &index());
        assert_eq!(texts(&set.cities), vec!["New York"]);
        assert_eq!(
            set.cities[0].matched_token_indexes,
            BTreeSet::from([0usize, 1])
        );
        assert!(match_query("new zz", &index()).cities.is_empty());
    }

    #[test]
    fn servers_sort_numerically() {
        let set = match_query("ua", &index());
        assert_eq!(texts(&set.servers), vec!["UA#9", "UA#10"]);
        // "ua" is a code, not a prefix of "Ukraine".
        assert!(set.countries.is_empty());
        assert_eq!(texts(&match_query("ukr", &index()).countries), vec!["Ukraine"]);
    }

    #[test]
    fn numeric_suffix_outranks_prefix() {
        let idx = LocationIndex::build(vec![
            server("1", "CA#2", "Toronto", "CA"),
            server("2", "CH#1", "Zurich", "CH"),
            server("3", "CA#10", "Toronto", "CA"),
            server("4", "Cloud", "", "CH"),
        ]);
        let set = match_query("c", &idx);
        assert_eq!(texts(&set.servers), vec!["CH#1", "CA#2", "CA#10", "Cloud"]);
    }

    #[test]
    fn matching_ignores_accents_and_case() {
        let set = match_query("ZÜR", &index());
        assert_eq!(texts(&set.cities), vec!["Zurich"]);
    }

    #[test]
    fn partner_marker_restricts_to_partnered_servers() {
        let partners = PartnershipSnapshot::from_partners(vec![Partner {
            name: "Paper".into(),
            description: String::new(),
            icon_url: None,
            logical_ids: vec![ServerId::new("6")],
        }]);
        let idx = index();

        let set = match_query_with("CH#1#PARTNER", &idx, &partners, PARTNER_MARKER);
        assert_eq!(texts(&set.servers), vec!["CH#1"]);
        assert!(set.countries.is_empty() && set.cities.is_empty());

        let all = match_query_with("#partner", &idx, &partners, PARTNER_MARKER);
        assert_eq!(texts(&all.servers), vec!["CH#1"]);

        // Typing the tag partially still narrows to partnered servers.
        let partial = match_query_with("ch#1#par", &idx, &partners, PARTNER_MARKER);
        assert_eq!(texts(&partial.servers), vec!["CH#1"]);

        let none = match_query_with("SE#1#PARTNER", &idx, &partners, PARTNER_MARKER);
        assert!(none.servers.is_empty());
    }

    #[test]
    fn tagged_query_does_not_prefix_longer_names() {
        let partners = PartnershipSnapshot::from_partners(vec![Partner {
            name: "Paper".into(),
            description: String::new(),
            icon_url: None,
            logical_ids: vec![ServerId::new("301"), ServerId::new("3010")],
        }]);
        let idx = LocationIndex::build(vec![
            server("301", "CH#301", "Zurich", "CH"),
            server("3010", "CH#3010", "Zurich", "CH"),
        ]);

        let exact = match_query_with("CH#301#PARTNER", &idx, &partners, PARTNER_MARKER);
        assert_eq!(texts(&exact.servers), vec!["CH#301"]);

        let both = match_query_with("ch#30", &idx, &partners, PARTNER_MARKER);
        assert_eq!(texts(&both.servers), vec!["CH#301", "CH#3010"]);
    }

    #[test]
    fn query_parse_flags_marker() {
        let q = Query::parse("ch#301#PARTNER", PARTNER_MARKER);
        assert!(q.is_partner_only());
        assert_eq!(q.tokens(), ["ch#301#partner".to_owned()]);
        assert!(Query::parse("#PARTNER", PARTNER_MARKER).tokens().is_empty());
        assert!(Query::parse("", PARTNER_MARKER).is_empty());
        assert!(!Query::parse("#partner", PARTNER_MARKER).is_empty());
    }
}
