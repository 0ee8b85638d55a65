// src/specs/curator.rs
//
// Steam curator dumps: { curator_id, curator_name, curator_url, games: [ { appid, url, curator_url, review } ] }
// A curator review that links somewhere points at a user patch; a review without
// any link means the game ships Korean officially.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::config::consts::CURATOR_LINK_MARKER;
use crate::core::steam;
use super::Parsed;
use crate::record::{PatchType, RawRecord};

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>]+"#).expect("static pattern"));
static LINK_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"링크\s*:").expect("static pattern"));
static NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").expect("static pattern"));
static TRAILING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,\s]+$").expect("static pattern"));

#[derive(Debug, Deserialize)]
pub struct CuratorDump {
    pub curator_id: Value,
    #[serde(default)]
    pub curator_name: Option<String>,
    // Kept raw so one broken game does not sink the rest of the dump
    #[serde(default)]
    pub games: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct CuratorGame {
    #[serde(default)]
    pub appid: Option<Value>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub curator_url: Option<String>,
    #[serde(default)]
    pub review: Option<String>,
}

pub fn is_curator_dump(doc: &Value) -> bool {
    doc.get("games").is_some() && doc.get("curator_id").is_some()
}

impl CuratorDump {
    pub fn into_parsed(self) -> Parsed {
        logd!(
            "Converting curator dump {} ({}): {} games",
            self.curator_id,
            self.curator_name.as_deref().unwrap_or("unnamed"),
            self.games.len()
        );

        let mut parsed = Parsed { records: Vec::with_capacity(self.games.len()), skipped: 0 };
        for (i, item) in self.games.into_iter().enumerate() {
            let rec = serde_json::from_value::<CuratorGame>(item)
                .map_err(|e| e.to_string())
                .and_then(|game| game.into_record().ok_or_else(|| s!("no app id")));
            match rec {
                Ok(rec) => parsed.records.push(rec),
                Err(e) => {
                    logw!("Skipping curator game #{i}: {e}");
                    parsed.skipped += 1;
                }
            }
        }
        parsed
    }
}

impl CuratorGame {
    /// Id from `appid`, else from the store link. None when neither has one.
    fn app_id(&self) -> Option<String> {
        match &self.appid {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => self.url.as_deref().and_then(steam::app_id_from_link).map(str::to_string),
        }
    }

    fn into_record(self) -> Option<RawRecord> {
        let app_id = self.app_id()?;

        let review = self.review.unwrap_or_default();
        let has_url = URL_RE.is_match(&review);
        let steam_link = self
            .url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| steam::store_link(&app_id));

        let (patch_type, patch_links, patch_descriptions) = if has_url {
            (PatchType::User, vec![s!(CURATOR_LINK_MARKER)], vec![review_description(&review)])
        } else {
            (PatchType::Official, Vec::new(), Vec::new())
        };

        Some(RawRecord {
            app_id: Some(app_id),
            steam_link: Some(steam_link),
            source_site_url: self.curator_url,
            patch_type,
            patch_links,
            patch_descriptions,
            ..RawRecord::default()
        })
    }
}

/// Review text with links and link labels removed, one pair of wrapping
/// quotes dropped, blank lines collapsed, trailing commas trimmed.
pub fn review_description(review: &str) -> String {
    let text = URL_RE.replace_all(review, "");
    let text = LINK_LABEL_RE.replace_all(&text, "");

    let mut text: &str = &text;
    if let Some(rest) = text.strip_prefix(['"', '\'']) { text = rest; }
    if let Some(rest) = text.strip_suffix(['"', '\'']) { text = rest; }

    let text = NEWLINES_RE.replace_all(text, "\n");
    let text = text.trim();
    TRAILING_RE.replace(text, "").into_owned()
}
