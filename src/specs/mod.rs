// src/specs/mod.rs
//! # Source “specs” module
//!
//! Per-source read rules for the raw files the external extractors leave in the
//! data directory. Each [`SourceSpec`] says *which file* holds a source, *under
//! which name* its evidence is published, and whether the source is a curator
//! feed (its page is the payload rather than a mirror of an official listing).
//!
//! ## What lives here
//! - The **source table** and its precedence order (earlier sources win scalar
//!   ties during the merge).
//! - **Format sniffing**: a plain record array, or a Steam curator dump that is
//!   converted into records (`curator`).
//! - **Tolerant parsing**: one malformed record (or curator game) is skipped,
//!   not the whole file.
//!
//! ## What does **not** live here
//! - File IO and the "missing file means zero records" policy (`store`).
//! - Identity resolution, merging, dedup (`identity`, `merge`, `dedup`).
//!
//! In short: **`specs` knows how to read the sources.**
use serde::Deserialize;
use serde_json::Value;

use crate::record::RawRecord;

pub mod curator;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSpec {
    /// File stem under the data directory (`<file>.json`).
    pub file: String,
    /// Published source name; defaults to `file`.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub curator: bool,
}

impl SourceSpec {
    pub fn new(file: &str) -> Self {
        Self { file: s!(file), name: None, curator: false }
    }

    pub fn published_as(mut self, name: &str) -> Self {
        self.name = Some(s!(name));
        self
    }

    pub fn curator(mut self) -> Self {
        self.curator = true;
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.file)
    }
}

/// Precedence order. quasarzone is the newer curator run by the same people as
/// quasarplay, so it goes first and is published under the quasarplay name.
pub fn default_sources() -> Vec<SourceSpec> {
    vec![
        SourceSpec::new("steamapp"),
        SourceSpec::new("quasarzone").published_as("quasarplay").curator(),
        SourceSpec::new("quasarplay").curator(),
        SourceSpec::new("directg"),
        SourceSpec::new("stove"),
    ]
}

/// Records parsed from one source file plus how many entries were dropped.
#[derive(Debug, Default)]
pub struct Parsed {
    pub records: Vec<RawRecord>,
    pub skipped: usize,
}

/// Parse one source file's text. Errors only when the document itself is not
/// JSON or has neither known shape.
pub fn parse_source(text: &str) -> Result<Parsed, serde_json::Error> {
    let doc: Value = serde_json::from_str(text)?;

    if curator::is_curator_dump(&doc) {
        let dump: curator::CuratorDump = serde_json::from_value(doc)?;
        return Ok(dump.into_parsed());
    }

    let items = match doc {
        Value::Array(items) => items,
        other => {
            // Surfaces a proper "expected a sequence" error
            serde_json::from_value::<Vec<RawRecord>>(other)?;
            return Ok(Parsed::default());
        }
    };

    let mut parsed = Parsed { records: Vec::with_capacity(items.len()), skipped: 0 };
    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<RawRecord>(item) {
            Ok(rec) => parsed.records.push(rec),
            Err(e) => {
                logw!("Skipping record #{i}: {e}");
                parsed.skipped += 1;
            }
        }
    }
    Ok(parsed)
}
