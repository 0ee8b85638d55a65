// src/lookup.rs
//
// Extension-facing projection of the merge:
//   lookup.json  = { "_meta": { generated_at, total }, "<app_id>": LookupEntry, ... }
//   version.json = { generated_at, total, alias_updated_at }
// Only id-keyed games are published; consumers look up by numeric id.

use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::alias::AliasTable;
use crate::merge::MergedGame;
use crate::record::PatchType;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
    #[serde(rename = "type")]
    pub patch_type: PatchType,
    pub sources: Vec<String>,
    pub links: Vec<String>,
    #[serde(default)]
    pub patch_descriptions: Vec<String>,
    #[serde(default)]
    pub patch_sources: Vec<String>,
    #[serde(default)]
    pub source_site_urls: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qp_appid: Option<String>,
}

impl From<&MergedGame> for LookupEntry {
    fn from(game: &MergedGame) -> Self {
        Self {
            patch_type: game.patch_type,
            sources: game.sources.clone(),
            links: game.patch_links.clone(),
            patch_descriptions: game.patch_descriptions.clone(),
            patch_sources: game.patch_sources.clone(),
            source_site_urls: game.source_site_urls.clone(),
            qp_appid: game.qp_appid.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupMeta {
    pub generated_at: String,
    pub total: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupTable {
    #[serde(rename = "_meta")]
    pub meta: LookupMeta,
    #[serde(flatten)]
    pub entries: IndexMap<String, LookupEntry>,
}

impl LookupTable {
    /// Project id-keyed games. Title-keyed ones (no `app_id`) are ignored.
    pub fn build(games: &[MergedGame], generated_at: &str) -> Self {
        let entries: IndexMap<String, LookupEntry> = games
            .iter()
            .filter_map(|g| g.app_id.as_ref().map(|id| (id.clone(), LookupEntry::from(g))))
            .collect();
        Self {
            meta: LookupMeta { generated_at: s!(generated_at), total: entries.len() },
            entries,
        }
    }

    pub fn get(&self, app_id: &str) -> Option<&LookupEntry> {
        self.entries.get(app_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cheap staleness check for consumers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub generated_at: String,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub alias_updated_at: Option<String>,
}

impl VersionInfo {
    pub fn for_table(table: &LookupTable, alias_updated_at: Option<String>) -> Self {
        Self {
            generated_at: table.meta.generated_at.clone(),
            total: table.meta.total,
            alias_updated_at,
        }
    }

    /// Whether a consumer holding `self` must refetch after seeing `latest`.
    pub fn is_stale(&self, latest: &VersionInfo) -> bool {
        self.generated_at != latest.generated_at || self.alias_updated_at != latest.alias_updated_at
    }
}

/// RFC 3339, UTC, millisecond precision (`2024-05-01T12:00:00.000Z`).
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn file_timestamp(modified: SystemTime) -> String {
    timestamp(DateTime::<Utc>::from(modified))
}

pub fn now() -> String {
    timestamp(Utc::now())
}

/// Consumer side: remap through the alias table, then look up.
/// `None` means "no known patch".
#[derive(Clone, Debug, Default)]
pub struct PatchIndex {
    aliases: AliasTable,
    table: LookupTable,
}

impl PatchIndex {
    pub fn new(aliases: AliasTable, table: LookupTable) -> Self {
        Self { aliases, table }
    }

    /// Canonical id used for the lookup, plus the entry if there is one.
    pub fn lookup<'a>(&'a self, app_id: &'a str) -> (&'a str, Option<&'a LookupEntry>) {
        let canonical = self.aliases.canonical(app_id.trim());
        (canonical, self.table.get(canonical))
    }

    pub fn get(&self, app_id: &str) -> Option<&LookupEntry> {
        self.table.get(self.aliases.canonical(app_id.trim()))
    }

    pub fn meta(&self) -> &LookupMeta {
        &self.table.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(generated_at: &str, alias_updated_at: Option<&str>) -> VersionInfo {
        VersionInfo {
            generated_at: s!(generated_at),
            total: 1,
            alias_updated_at: alias_updated_at.map(str::to_string),
        }
    }

    #[test]
    fn stale_when_either_stamp_moves() {
        let held = version("2024-05-01T00:00:00.000Z", Some("2024-04-30T00:00:00.000Z"));

        assert!(!held.is_stale(&held.clone()));
        assert!(held.is_stale(&version("2024-05-02T00:00:00.000Z", Some("2024-04-30T00:00:00.000Z"))));
        assert!(held.is_stale(&version("2024-05-01T00:00:00.000Z", Some("2024-05-01T09:00:00.000Z"))));
        assert!(held.is_stale(&version("2024-05-01T00:00:00.000Z", None)));
    }

    #[test]
    fn total_alone_does_not_force_refetch() {
        let held = version("2024-05-01T00:00:00.000Z", None);
        let latest = VersionInfo { total: 99, ..held.clone() };
        assert!(!held.is_stale(&latest));
    }

    #[test]
    fn index_remaps_before_lookup() {
        let game = MergedGame {
            app_id: Some(s!("620")),
            game_title: s!("Portal 2"),
            ..MergedGame::default()
        };
        let table = LookupTable::build(&[game], "2024-05-01T00:00:00.000Z");
        let aliases: AliasTable = [("456", "620")].into_iter().collect();
        let index = PatchIndex::new(aliases, table);

        assert!(index.get(" 456 ").is_some());
        assert!(index.get("620").is_some());
        assert!(index.get("1").is_none());
        assert_eq!(index.lookup("456").0, "620");
        assert_eq!(index.meta().total, 1);
        assert_eq!(index.meta().generated_at, "2024-05-01T00:00:00.000Z");
    }

    #[test]
    fn timestamps_are_millisecond_utc() {
        let at = DateTime::parse_from_rfc3339("2024-05-01T12:00:00.5+09:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(timestamp(at), "2024-05-01T03:00:00.500Z");
    }
}
