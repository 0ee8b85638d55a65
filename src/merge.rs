// src/merge.rs
//
// Fold every source's records into one bucket per game.
//
// Buckets are keyed by canonical app id (alias-remapped before lookup) or, for
// records with no resolvable id, by normalized title. Multi-valued evidence
// (links, descriptions, who said it) accumulates in parallel lists; scalar
// fields keep the first non-empty value in source order; the official flag
// only ever goes up.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::alias::AliasTable;
use crate::core::sanitize::non_empty;
use crate::core::steam;
use crate::dedup;
use crate::identity::{self, BucketKey};
use crate::record::{PatchType, RawRecord};

/// One source's records, in the order the source file listed them.
#[derive(Clone, Debug, Default)]
pub struct SourceBatch {
    /// Published source name (what ends up in `sources` / `patch_sources`).
    pub name: String,
    pub curator: bool,
    pub records: Vec<RawRecord>,
}

impl SourceBatch {
    pub fn new(name: &str, records: Vec<RawRecord>) -> Self {
        Self { name: s!(name), curator: false, records }
    }

    pub fn curator(mut self) -> Self {
        self.curator = true;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedGame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default)]
    pub game_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steam_link: Option<String>,
    #[serde(default)]
    pub patch_type: PatchType,
    #[serde(default)]
    pub patch_links: Vec<String>,
    #[serde(default)]
    pub patch_descriptions: Vec<String>,
    #[serde(default)]
    pub patch_sources: Vec<String>,
    #[serde(default)]
    pub source_site_urls: IndexMap<String, String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qp_appid: Option<String>,
}

impl MergedGame {
    fn keyed_by_id(app_id: &str) -> Self {
        Self { app_id: Some(s!(app_id)), ..Self::default() }
    }

    /// Append one piece of evidence to all three parallel lists at once.
    pub fn push_patch(&mut self, link: &str, description: &str, source: &str) {
        self.patch_links.push(s!(link));
        self.patch_descriptions.push(s!(description));
        self.patch_sources.push(s!(source));
    }

    /// `patch_links`, `patch_descriptions` and `patch_sources` line up.
    pub fn is_aligned(&self) -> bool {
        self.patch_links.len() == self.patch_descriptions.len()
            && self.patch_links.len() == self.patch_sources.len()
    }

    pub fn patch_count(&self) -> usize {
        self.patch_links.len()
    }

    fn absorb(&mut self, source: &str, curator: bool, rec: &RawRecord) {
        for (i, link) in rec.patch_links.iter().enumerate() {
            self.push_patch(link, rec.description_at(i), source);
        }

        if rec.patch_type.is_official() {
            self.patch_type = PatchType::Official;
        }

        // An official listing with no links of its own is just a mirror of the
        // store page; its URL adds nothing. Curator pages are the payload.
        if let Some(url) = rec.site_url() {
            let worth_keeping = !rec.patch_type.is_official() || !rec.patch_links.is_empty() || curator;
            if worth_keeping && !self.source_site_urls.contains_key(source) {
                self.source_site_urls.insert(s!(source), s!(url));
            }
        }

        if !self.sources.iter().any(|s| s == source) {
            self.sources.push(s!(source));
        }

        if self.game_title.trim().is_empty() && !rec.game_title.trim().is_empty() {
            self.game_title = rec.game_title.trim().to_string();
        }

        if self.app_id.is_some() && self.steam_link.is_none() {
            self.steam_link = non_empty(rec.steam_link.as_deref()).map(str::to_string);
        }

        if let Some(qp) = non_empty(rec.qp_appid.as_deref()) {
            self.qp_appid = Some(s!(qp));
        }
    }

    fn finish(mut self) -> Self {
        if self.steam_link.is_none() {
            self.steam_link = self.app_id.as_deref().map(steam::store_link);
        }
        let removed = dedup::dedup_patches(&mut self);
        if removed > 0 {
            logd!("Dropped {removed} duplicate patch entries for '{}'", self.game_title);
        }
        self
    }
}

/// Fold state for one run: id-keyed and title-keyed buckets, in first-seen order.
#[derive(Debug, Default)]
pub struct Partitions {
    pub by_app_id: IndexMap<String, MergedGame>,
    pub by_title: IndexMap<String, MergedGame>,
}

impl Partitions {
    pub fn bucket_mut(&mut self, key: BucketKey) -> &mut MergedGame {
        match key {
            BucketKey::AppId(id) => self
                .by_app_id
                .entry(id)
                .or_insert_with_key(|id| MergedGame::keyed_by_id(id)),
            BucketKey::Title(title) => self.by_title.entry(title).or_default(),
        }
    }

    pub fn absorb(&mut self, batch: &SourceBatch, rec: &RawRecord, aliases: &AliasTable) {
        let key = identity::bucket_key(rec, aliases);
        self.bucket_mut(key).absorb(&batch.name, batch.curator, rec);
    }

    /// Dedup every bucket and sort both partitions by title.
    pub fn finish(self) -> MergeOutput {
        let mut games: Vec<MergedGame> = self.by_app_id.into_values().map(MergedGame::finish).collect();
        let mut games_no_steam_link: Vec<MergedGame> =
            self.by_title.into_values().map(MergedGame::finish).collect();
        games.sort_by(by_title);
        games_no_steam_link.sort_by(by_title);
        MergeOutput { games, games_no_steam_link }
    }
}

fn by_title(a: &MergedGame, b: &MergedGame) -> Ordering {
    a.game_title
        .to_lowercase()
        .cmp(&b.game_title.to_lowercase())
        .then_with(|| a.game_title.cmp(&b.game_title))
        .then_with(|| a.app_id.cmp(&b.app_id))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeOutput {
    /// Id-keyed games; the only ones that get published.
    pub games: Vec<MergedGame>,
    /// Title-keyed games, kept for audit.
    pub games_no_steam_link: Vec<MergedGame>,
}

/// Fold `batches` in order. Earlier batches win scalar ties.
pub fn fold(batches: &[SourceBatch], aliases: &AliasTable) -> Partitions {
    let mut parts = Partitions::default();
    for batch in batches {
        for rec in &batch.records {
            parts.absorb(batch, rec, aliases);
        }
    }
    parts
}

pub fn merge(batches: &[SourceBatch], aliases: &AliasTable) -> MergeOutput {
    fold(batches, aliases).finish()
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedMeta {
    pub generated_at: String,
    pub total_with_steam_link: usize,
    pub total_without_steam_link: usize,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// `merged.json`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedDocument {
    pub meta: MergedMeta,
    #[serde(default)]
    pub games: Vec<MergedGame>,
    #[serde(default)]
    pub games_no_steam_link: Vec<MergedGame>,
}

impl MergedDocument {
    pub fn new(out: MergeOutput, generated_at: &str, sources: Vec<String>) -> Self {
        Self {
            meta: MergedMeta {
                generated_at: s!(generated_at),
                total_with_steam_link: out.games.len(),
                total_without_steam_link: out.games_no_steam_link.len(),
                sources,
            },
            games: out.games,
            games_no_steam_link: out.games_no_steam_link,
        }
    }
}
