// src/core/steam.rs
use std::sync::LazyLock;

use regex::Regex;

use crate::config::consts::STORE_APP_PREFIX;

static APP_SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/app/(\d+)").expect("static pattern"));
static STORE_APP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"store\.steampowered\.com/app/(\d+)").expect("static pattern"));

/// Digits of the first `/app/<digits>` segment, on any host.
pub fn app_id_from_link(link: &str) -> Option<&str> {
    APP_SEGMENT_RE.captures(link).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Like [`app_id_from_link`] but only for the Steam store itself.
pub fn store_app_id(url: &str) -> Option<&str> {
    STORE_APP_RE.captures(url).and_then(|c| c.get(1)).map(|m| m.as_str())
}

pub fn is_store_app_url(url: &str) -> bool {
    STORE_APP_RE.is_match(url)
}

pub fn store_link(app_id: &str) -> String {
    format!("{STORE_APP_PREFIX}{app_id}")
}
