// src/identity.rs
use crate::alias::AliasTable;
use crate::core::sanitize::{non_empty, title_key};
use crate::core::steam;
use crate::record::RawRecord;

/// Where a record lands in the merge.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BucketKey {
    AppId(String),
    Title(String),
}

/// Id the record itself claims: explicit `app_id` first, then the
/// `/app/<digits>` segment of its store link. No alias applied.
pub fn observed_app_id(rec: &RawRecord) -> Option<&str> {
    non_empty(rec.app_id.as_deref())
        .or_else(|| rec.steam_link.as_deref().and_then(steam::app_id_from_link))
}

/// Observed id remapped through the alias table.
pub fn canonical_app_id(rec: &RawRecord, aliases: &AliasTable) -> Option<String> {
    let observed = observed_app_id(rec)?;
    let canonical = aliases.canonical(observed);
    if canonical != observed {
        logd!("[Alias] Normalizing {observed} -> {canonical}");
    }
    Some(s!(canonical))
}

pub fn bucket_key(rec: &RawRecord, aliases: &AliasTable) -> BucketKey {
    match canonical_app_id(rec, aliases) {
        Some(id) => BucketKey::AppId(id),
        None => BucketKey::Title(title_key(&rec.game_title)),
    }
}
