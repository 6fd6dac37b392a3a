// crates/locator-core/src/loader/mod.rs

//! # Data Loader
//!
//! Reads server catalogs and partnership payloads from JSON files and
//! persists the recents list. Transport (buffering, gzip) lives in
//! `common_io`; this module only deals with payloads.

use crate::error::Result;
use crate::index::LocationIndex;
use crate::model::Server;
use crate::partners::{PartnersResponse, PartnershipSnapshot};
use crate::recents::{RecentEntry, RecentsBackend};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

mod common_io;

pub use common_io::open_stream;

/// Parses a JSON array of servers.
pub fn parse_servers(reader: impl Read) -> Result<Vec<Server>> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn load_servers(path: impl AsRef<Path>) -> Result<Vec<Server>> {
    let path = path.as_ref();
    let servers = parse_servers(open_stream(path)?)?;
    tracing::debug!(path = %path.display(), servers = servers.len(), "server catalog loaded");
    Ok(servers)
}

/// Loads a server catalog and builds the index in one step.
pub fn load_index(path: impl AsRef<Path>) -> Result<LocationIndex> {
    Ok(LocationIndex::build(load_servers(path)?))
}

/// Parses `{"partnerTypes": [...]}`.
pub fn parse_partnerships(reader: impl Read) -> Result<PartnershipSnapshot> {
    let response: PartnersResponse = serde_json::from_reader(reader)?;
    Ok(PartnershipSnapshot::from_response(response))
}

pub fn load_partnerships(path: impl AsRef<Path>) -> Result<PartnershipSnapshot> {
    parse_partnerships(open_stream(path.as_ref())?)
}

/// Like [`load_partnerships`], but a missing or broken file yields an
/// empty snapshot.
pub fn load_partnerships_or_empty(path: impl AsRef<Path>) -> PartnershipSnapshot {
    let path = path.as_ref();
    load_partnerships(path).unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), error = %err, "partnerships unavailable");
        PartnershipSnapshot::empty()
    })
}

/// Recents persisted as a JSON array of [`RecentEntry`].
///
/// A missing file loads as an empty list. Saves replace the file through a
/// temporary sibling, so a crash never leaves half-written JSON behind.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileBackend { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecentsBackend for JsonFileBackend {
    fn load(&self) -> Result<Vec<RecentEntry>> {
        match std::fs::File::open(&self.path) {
            Ok(file) => Ok(serde_json::from_reader(std::io::BufReader::new(file))?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &[RecentEntry]) -> Result<()> {
        common_io::write_json(&self.path, entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LocatorError;
    use crate::model::ServerId;

    const SERVERS: &str = r#"[
        {"serverId": "1", "serverName": "CH#1", "cityName": "Zurich", "countryCode": "CH", "tier": 2},
        {"serverId": "2", "serverName": "SE#3", "cityName": "Stockholm", "countryCode": "se", "isOnline": false, "features": ["p2p", "somethingNew"]}
    ]"#;

    #[test]
    fn parses_camel_case_servers() {
        let servers = parse_servers(SERVERS.as_bytes()).unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].server_id, ServerId::from("1"));
        assert!(servers[0].is_online);
        assert!(!servers[1].is_online);
    }

    #[test]
    fn parses_partner_types() {
        let raw = r#"{"partnerTypes": [{"type": "News", "partners": [
            {"name": "Daily", "description": "", "iconUrl": null, "logicalIDs": ["7"]}
        ]}]}"#;
        let snapshot = parse_partnerships(raw.as_bytes()).unwrap();
        assert_eq!(snapshot.partners_for(&ServerId::from("7"))[0].name, "Daily");
    }

    #[test]
    fn missing_files_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_servers(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, LocatorError::NotFound(_)));
        assert!(load_partnerships_or_empty(dir.path().join("nope.json")).is_empty());
    }

    #[test]
    fn json_backend_round_trips_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("state/recents.json"));
        assert!(backend.load().unwrap().is_empty());

        let entries = vec![
            RecentEntry { query: "bbb".into(), last_used_at: 2 },
            RecentEntry { query: "aaa".into(), last_used_at: 1 },
        ];
        backend.save(&entries).unwrap();
        assert_eq!(backend.load().unwrap(), entries);
    }

    #[cfg(feature = "compact")]
    #[test]
    fn reads_gzip_catalogs() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("servers.json.gz");
        let mut enc = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
        enc.write_all(SERVERS.as_bytes()).unwrap();
        enc.finish().unwrap();

        let index = load_index(&path).unwrap();
        assert_eq!(index.stats().servers, 2);
    }
}
