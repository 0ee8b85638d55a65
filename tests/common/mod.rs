// tests/common/mod.rs
//
// Shared fixtures: a scripted HEAD probe and terse record builders.
#![allow(dead_code)]

use std::collections::HashMap;

use krpatch::config::options::ResolveOptions;
use krpatch::core::{HeadProbe, Hop};
use krpatch::error::{Error, Result};
use krpatch::record::{PatchType, RawRecord};
use reqwest::Url;

/// Answers from a fixed table; unknown URLs fail like a dead host.
#[derive(Default)]
pub struct ScriptedProbe {
    hops: HashMap<String, Hop>,
    pub calls: Vec<String>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirect(mut self, from: &str, status: u16, to: &str) -> Self {
        self.hops.insert(from.to_string(), Hop { status, location: Some(to.to_string()) });
        self
    }

    pub fn ok(mut self, url: &str) -> Self {
        self.hops.insert(url.to_string(), Hop { status: 200, location: None });
        self
    }
}

impl HeadProbe for ScriptedProbe {
    fn head(&mut self, url: &Url) -> Result<Hop> {
        self.calls.push(url.to_string());
        self.hops.get(url.as_str()).cloned().ok_or_else(|| Error::Network {
            url: url.to_string(),
            reason: "connection refused".into(),
        })
    }
}

pub fn fast_resolve() -> ResolveOptions {
    ResolveOptions { pause_ms: 0, ..ResolveOptions::default() }
}

pub fn rec(app_id: Option<&str>, title: &str) -> RawRecord {
    RawRecord {
        app_id: app_id.map(str::to_string),
        game_title: title.to_string(),
        ..RawRecord::default()
    }
}

pub fn official(mut r: RawRecord) -> RawRecord {
    r.patch_type = PatchType::Official;
    r
}

pub fn with_patch(mut r: RawRecord, link: &str, desc: &str) -> RawRecord {
    r.patch_links.push(link.to_string());
    r.patch_descriptions.push(desc.to_string());
    r
}

pub fn with_site(mut r: RawRecord, url: &str) -> RawRecord {
    r.source_site_url = Some(url.to_string());
    r
}
