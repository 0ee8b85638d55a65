// src/store.rs
//
// Reading and writing the data directory. Missing or broken inputs that the
// pipeline can live without (a source file, the alias table, version.json)
// degrade to empty with a warning; everything written goes through
// `file::write_json_atomic`.

use std::{fs, io, path::Path};

use serde::de::DeserializeOwned;

use crate::alias::AliasTable;
use crate::config::options::AppOptions;
use crate::error::{Error, Result};
use crate::file::write_json_atomic;
use crate::lookup::{self, LookupTable, VersionInfo};
use crate::merge::{MergedDocument, SourceBatch};
use crate::specs;

/// `Ok(None)` when the file does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| Error::Json { path: path.to_path_buf(), source })
}

/* ---------------- Sources ---------------- */

#[derive(Debug, Default)]
pub struct LoadedSources {
    pub batches: Vec<SourceBatch>,
    /// Source files that existed and parsed.
    pub files_read: usize,
}

impl LoadedSources {
    pub fn record_count(&self) -> usize {
        self.batches.iter().map(|b| b.records.len()).sum()
    }
}

/// One batch per configured source, in precedence order. A source that is
/// missing or unparseable contributes an empty batch.
pub fn load_sources(opts: &AppOptions) -> LoadedSources {
    let mut loaded = LoadedSources::default();

    for spec in &opts.sources {
        let path = opts.source_path(spec);
        let records = match fs::read_to_string(&path) {
            Ok(text) => match specs::parse_source(&text) {
                Ok(parsed) => {
                    loaded.files_read += 1;
                    if parsed.skipped > 0 {
                        logw!("{}: skipped {} malformed records", spec.file, parsed.skipped);
                    }
                    parsed.records
                }
                Err(e) => {
                    logw!("No data found for {}: {e}", spec.file);
                    Vec::new()
                }
            },
            Err(e) => {
                logw!("No data found for {}: {e}", spec.file);
                Vec::new()
            }
        };
        logf!("Loaded {} entries from {}", records.len(), spec.file);

        let mut batch = SourceBatch::new(spec.name(), records);
        batch.curator = spec.curator;
        loaded.batches.push(batch);
    }
    logd!(
        "{} records from {} of {} source files",
        loaded.record_count(),
        loaded.files_read,
        opts.sources.len()
    );
    loaded
}

/// Like [`load_sources`], but fails when not a single source file was readable.
pub fn load_sources_required(opts: &AppOptions) -> Result<Vec<SourceBatch>> {
    let loaded = load_sources(opts);
    if loaded.files_read == 0 {
        return Err(Error::NoSourceData { dir: opts.data_dir.clone() });
    }
    Ok(loaded.batches)
}

/* ---------------- Alias table ---------------- */

/// Missing or corrupt → empty table (no aliasing applied).
pub fn load_alias(path: &Path) -> AliasTable {
    match read_json::<AliasTable>(path) {
        Ok(Some(table)) => {
            logf!("Loaded {} aliases from {}", table.len(), path.display());
            table
        }
        Ok(None) => {
            logf!("No {} found, skipping alias normalization.", path.display());
            AliasTable::new()
        }
        Err(e) => {
            logw!("Ignoring alias table: {e}");
            AliasTable::new()
        }
    }
}

pub fn save_alias(path: &Path, table: &AliasTable) -> Result<()> {
    write_json_atomic(path, table)
}

/// Last-modified time of the alias file, if there is one.
pub fn alias_updated_at(path: &Path) -> Option<String> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(lookup::file_timestamp(modified))
}

/* ---------------- Merge outputs ---------------- */

pub fn load_merged(path: &Path) -> Result<MergedDocument> {
    read_json(path)?.ok_or_else(|| Error::MissingMerged { path: path.to_path_buf() })
}

pub fn save_merged(path: &Path, doc: &MergedDocument) -> Result<()> {
    write_json_atomic(path, doc)
}

pub fn load_lookup(path: &Path) -> Result<LookupTable> {
    read_json(path)?.ok_or_else(|| {
        Error::Io(io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display())))
    })
}

pub fn save_lookup(path: &Path, table: &LookupTable) -> Result<()> {
    write_json_atomic(path, table)
}

/// None when there is no usable version.json (no merge has written one yet).
pub fn load_version(path: &Path) -> Option<VersionInfo> {
    match read_json::<VersionInfo>(path) {
        Ok(v) => v,
        Err(e) => {
            logw!("Ignoring version info: {e}");
            None
        }
    }
}

pub fn save_version(path: &Path, info: &VersionInfo) -> Result<()> {
    write_json_atomic(path, info)
}
