// src/alias.rs
//
// observed app id → canonical app id.
// Append-only: the first mapping written for a key is permanent, so records
// bearing a new store id keep collapsing onto the id the dataset already uses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::net::HeadProbe;
use crate::core::steam;
use crate::merge::MergedGame;
use crate::progress::Progress;
use crate::resolve::RedirectResolver;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable {
    entries: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-level remap; ids without an entry come back unchanged.
    pub fn canonical<'a>(&'a self, id: &'a str) -> &'a str {
        self.entries.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn get(&self, observed: &str) -> Option<&str> {
        self.entries.get(observed).map(String::as_str)
    }

    pub fn contains(&self, observed: &str) -> bool {
        self.entries.contains_key(observed)
    }

    /// Whether some other id already maps onto `id`.
    pub fn is_target(&self, id: &str) -> bool {
        self.iter().any(|(_, canonical)| canonical == id)
    }

    /// Insert-if-absent, keeping the table one level deep: `canonical` is
    /// resolved through the table first, and an id that is already somebody's
    /// canonical is never turned into an alias. Returns false when nothing
    /// was inserted.
    pub fn insert(&mut self, observed: &str, canonical: &str) -> bool {
        let canonical = s!(self.canonical(canonical));
        if observed == canonical || self.contains(observed) || self.is_target(observed) {
            return false;
        }
        self.entries.insert(s!(observed), canonical);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AliasTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = AliasTable::new();
        for (k, v) in iter {
            let (k, v): (String, String) = (k.into(), v.into());
            table.insert(&k, &v);
        }
        table
    }
}

/// A newly discovered redirect: `observed` now answers for `canonical`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAlias {
    pub observed: String,
    pub canonical: String,
    pub title: String,
}

#[derive(Debug, Default)]
pub struct MaintenanceReport {
    pub checked: usize,
    pub skipped: usize,
    pub errors: usize,
    /// Redirects that would have chained onto an existing canonical id.
    pub refused: usize,
    pub added: Vec<NewAlias>,
}

/// Replay every merged game's store link through the resolver and record
/// redirects to a different store id. Strictly sequential; pacing is the
/// resolver's job.
pub fn maintain<P: HeadProbe>(
    games: &[MergedGame],
    table: &mut AliasTable,
    resolver: &mut RedirectResolver<P>,
    every: usize,
    mut progress: Option<&mut dyn Progress>,
) -> MaintenanceReport {
    let mut report = MaintenanceReport::default();
    let every = every.max(1);

    if let Some(p) = progress.as_deref_mut() {
        p.begin(games.len());
    }

    for (i, game) in games.iter().enumerate() {
        if let (Some(canonical), Some(link)) = (game.app_id.as_deref(), game.steam_link.as_deref()) {
            report.checked += 1;
            let res = resolver.resolve(link);

            if res.skipped_reason.is_some() {
                report.skipped += 1;
            } else if res.error.is_some() {
                report.errors += 1;
            } else if res.moved() {
                if let Some(observed) = steam::store_app_id(&res.final_url) {
                    let target = s!(table.canonical(canonical));
                    let known = observed == target || table.contains(observed);
                    if !known && table.is_target(observed) {
                        logw!(
                            "Not aliasing {observed} → {target} ({}): {observed} is already canonical for other ids",
                            game.game_title
                        );
                        report.refused += 1;
                    } else if !known && table.insert(observed, &target) {
                        logf!("[Found] New redirect: {target} → {observed} ({})", game.game_title);
                        report.added.push(NewAlias {
                            observed: s!(observed),
                            canonical: target,
                            title: game.game_title.clone(),
                        });
                    }
                }
            }
        }

        let done = i + 1;
        if let Some(p) = progress.as_deref_mut() {
            p.item_done(done);
            if done % every == 0 {
                p.log(&format!(
                    "Progress: {done}/{} (new aliases found: {})",
                    games.len(),
                    report.added.len()
                ));
            }
        }
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    report
}
