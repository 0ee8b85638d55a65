// tests/pipeline_e2e.rs
//
// Whole runs against a scratch data directory.
mod common;

use std::fs;
use std::path::Path;

use common::{fast_resolve, ScriptedProbe};
use krpatch::config::options::AppOptions;
use krpatch::error::Error;
use krpatch::lookup::{LookupTable, VersionInfo};
use krpatch::merge::MergedDocument;
use krpatch::record::PatchType;
use krpatch::runner;
use krpatch::store;
use serde_json::Value;
use tempfile::TempDir;

const STAMP: &str = "2024-05-01T12:00:00.000Z";

const STEAMAPP: &str = r#"[
  {"source": "steamapp", "app_id": "456", "game_title": "Portal 2 New",
   "patch_type": "user", "patch_links": ["http://dl"], "patch_descriptions": [null]},
  {"game_title": "No Id Game", "patch_links": ["http://n"]},
  "not a record"
]"#;

const QUASARZONE: &str = r#"{
  "curator_id": 1, "curator_name": "Q", "curator_url": "https://curator.example",
  "games": [
    {"appid": 620, "url": "", "curator_url": "https://c.example/620", "review": "패치 https://p.example/620"},
    {"appid": 400, "review": "공식 한국어"}
  ]
}"#;

fn data_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("steamapp.json"), STEAMAPP).unwrap();
    fs::write(dir.path().join("quasarzone.json"), QUASARZONE).unwrap();
    fs::write(dir.path().join("alias.json"), r#"{"456": "620"}"#).unwrap();
    dir
}

fn read<T: serde::de::DeserializeOwned>(path: &Path) -> T {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn merge_writes_all_three_artifacts() {
    let dir = data_dir();
    let opts = AppOptions::with_data_dir(dir.path());

    let summary = runner::run_merge_at(&opts, STAMP).unwrap();
    assert_eq!(summary.games, 2);
    assert_eq!(summary.games_no_steam_link, 1);
    assert_eq!(summary.aliases, 1);
    assert_eq!(summary.files_written.len(), 3);

    let merged: MergedDocument = read(&opts.merged_path());
    assert_eq!(merged.meta.generated_at, STAMP);
    assert_eq!(merged.meta.total_with_steam_link, 2);
    assert_eq!(merged.meta.total_without_steam_link, 1);
    assert_eq!(merged.meta.sources, vec!["steamapp", "quasarzone", "quasarplay", "directg", "stove"]);

    let portal = merged.games.iter().find(|g| g.app_id.as_deref() == Some("620")).unwrap();
    assert_eq!(portal.game_title, "Portal 2 New");
    assert_eq!(portal.patch_links, vec!["http://dl", "exist"]);
    assert_eq!(portal.patch_descriptions, vec!["", "패치"]);
    assert_eq!(portal.patch_sources, vec!["steamapp", "quasarplay"]);
    assert_eq!(portal.sources, vec!["steamapp", "quasarplay"]);
    assert_eq!(portal.source_site_urls["quasarplay"], "https://c.example/620");
    assert_eq!(portal.steam_link.as_deref(), Some("https://store.steampowered.com/app/620"));

    let official = merged.games.iter().find(|g| g.app_id.as_deref() == Some("400")).unwrap();
    assert_eq!(official.patch_type, PatchType::Official);
    assert!(official.patch_links.is_empty());

    assert_eq!(merged.games_no_steam_link[0].game_title, "No Id Game");
}

#[test]
fn lookup_json_leads_with_meta() {
    let dir = data_dir();
    let opts = AppOptions::with_data_dir(dir.path());
    runner::run_merge_at(&opts, STAMP).unwrap();

    let text = fs::read_to_string(opts.lookup_path()).unwrap();
    assert!(text.starts_with("{\n  \"_meta\": {"));

    let table: LookupTable = read(&opts.lookup_path());
    assert_eq!(table.meta.total, 2);
    assert_eq!(table.meta.generated_at, STAMP);
    assert!(table.get("456").is_none());

    let raw: Value = read(&opts.lookup_path());
    assert_eq!(raw["620"]["type"], "user");
    assert_eq!(raw["620"]["links"][1], "exist");
    assert_eq!(raw["400"]["type"], "official");
}

#[test]
fn version_tracks_alias_file() {
    let dir = data_dir();
    let opts = AppOptions::with_data_dir(dir.path());
    runner::run_merge_at(&opts, STAMP).unwrap();

    let version: VersionInfo = read(&opts.version_path());
    assert_eq!(version.generated_at, STAMP);
    assert_eq!(version.total, 2);
    let alias_at = version.alias_updated_at.unwrap();
    assert!(alias_at.ends_with('Z'));
    assert!(chrono::DateTime::parse_from_rfc3339(&alias_at).is_ok());
}

#[test]
fn rerun_is_byte_identical() {
    let dir = data_dir();
    let opts = AppOptions::with_data_dir(dir.path());

    runner::run_merge_at(&opts, STAMP).unwrap();
    let first = fs::read(opts.merged_path()).unwrap();
    let first_lookup = fs::read(opts.lookup_path()).unwrap();
    runner::run_merge_at(&opts, STAMP).unwrap();

    assert_eq!(first, fs::read(opts.merged_path()).unwrap());
    assert_eq!(first_lookup, fs::read(opts.lookup_path()).unwrap());
}

#[test]
fn no_sources_at_all_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let opts = AppOptions::with_data_dir(dir.path());

    let err = runner::run_merge_at(&opts, STAMP).unwrap_err();
    assert!(matches!(err, Error::NoSourceData { .. }));
    assert!(!opts.merged_path().exists());
}

#[test]
fn corrupt_alias_table_means_no_aliasing() {
    let dir = data_dir();
    fs::write(dir.path().join("alias.json"), "{not json").unwrap();
    let opts = AppOptions::with_data_dir(dir.path());

    let summary = runner::run_merge_at(&opts, STAMP).unwrap();
    assert_eq!(summary.aliases, 0);
    assert_eq!(summary.games, 3);

    let table: LookupTable = read(&opts.lookup_path());
    assert!(table.get("456").is_some());
}

#[test]
fn lookup_goes_through_alias() {
    let dir = data_dir();
    let opts = AppOptions::with_data_dir(dir.path());
    runner::run_merge_at(&opts, STAMP).unwrap();

    let hit = runner::lookup_app(&opts, "456").unwrap();
    assert_eq!(hit.canonical, "620");
    assert_eq!(hit.entry.unwrap().sources, vec!["steamapp", "quasarplay"]);

    let miss = runner::lookup_app(&opts, "999").unwrap();
    assert_eq!(miss.canonical, "999");
    assert!(miss.entry.is_none());
}

#[test]
fn update_alias_needs_a_merge_first() {
    let dir = data_dir();
    let opts = AppOptions::with_data_dir(dir.path());
    let err = runner::update_alias(&opts, ScriptedProbe::new(), None).unwrap_err();
    assert!(matches!(err, Error::MissingMerged { .. }));
}

#[test]
fn update_alias_then_merge_collapses_new_id() {
    let dir = data_dir();
    let mut opts = AppOptions::with_data_dir(dir.path());
    opts.resolve = fast_resolve();
    runner::run_merge_at(&opts, STAMP).unwrap();

    let probe = ScriptedProbe::new()
        .ok("https://store.steampowered.com/app/620")
        .redirect("https://store.steampowered.com/app/400", 301, "/app/401/")
        .ok("https://store.steampowered.com/app/401/");
    let summary = runner::update_alias(&opts, probe, None).unwrap();

    assert_eq!(summary.total_aliases, 2);
    assert_eq!(summary.report.added.len(), 1);

    let aliases: Value = read(&opts.alias_path());
    assert_eq!(aliases["401"], "400");
    assert_eq!(aliases["456"], "620");

    let version: VersionInfo = read(&opts.version_path());
    assert_eq!(version.generated_at, STAMP);
    assert!(version.alias_updated_at.is_some());

    // A source that now reports the new id folds onto the old one
    fs::write(
        dir.path().join("stove.json"),
        r#"[{"app_id": 401, "game_title": "HL", "patch_links": ["http://s"], "source_site_url": "https://stove.example/401"}]"#,
    )
    .unwrap();
    runner::run_merge_at(&opts, STAMP).unwrap();
    let hit = runner::lookup_app(&opts, "401").unwrap();
    assert_eq!(hit.canonical, "400");
    let entry = hit.entry.unwrap();
    assert_eq!(entry.patch_type, PatchType::Official);
    assert_eq!(entry.links, vec!["http://s"]);
    assert_eq!(entry.source_site_urls["stove"], "https://stove.example/401");
}

#[test]
fn config_file_in_data_dir_is_picked_up() {
    let dir = data_dir();
    fs::write(
        dir.path().join("krpatch.toml"),
        "[resolve]\npause_ms = 0\nmax_redirects = 2\n\n[[sources]]\nfile = \"steamapp\"\n",
    )
    .unwrap();

    let opts = AppOptions::load(dir.path(), None).unwrap();
    assert_eq!(opts.resolve.pause_ms, 0);
    assert_eq!(opts.resolve.max_redirects, 2);
    assert_eq!(opts.sources.len(), 1);

    let summary = runner::run_merge_at(&opts, STAMP).unwrap();
    assert_eq!(summary.games, 1);
}

#[test]
fn bad_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "[resolve]\nmax_hops = 3\n").unwrap();
    assert!(matches!(AppOptions::load(dir.path(), Some(&path)), Err(Error::Config { .. })));

    let missing = dir.path().join("missing.toml");
    assert!(AppOptions::load(dir.path(), Some(&missing)).is_err());
}

#[test]
fn missing_sources_load_as_empty_batches() {
    let dir = data_dir();
    let opts = AppOptions::with_data_dir(dir.path());
    let loaded = store::load_sources(&opts);

    // steamapp: two good records and one junk entry; quasarzone: two curator games
    assert_eq!(loaded.files_read, 2);
    assert_eq!(loaded.record_count(), 4);
    assert_eq!(loaded.batches.len(), opts.sources.len());
    assert_eq!(loaded.batches[1].name, "quasarplay");
    assert!(loaded.batches[1].curator);
    assert!(loaded.batches[2].records.is_empty());
}

#[test]
fn update_alias_leaves_missing_version_alone() {
    let dir = data_dir();
    let mut opts = AppOptions::with_data_dir(dir.path());
    opts.resolve = fast_resolve();
    runner::run_merge_at(&opts, STAMP).unwrap();
    fs::remove_file(opts.version_path()).unwrap();

    let probe = ScriptedProbe::new()
        .ok("https://store.steampowered.com/app/400")
        .ok("https://store.steampowered.com/app/620");
    let summary = runner::update_alias(&opts, probe, None).unwrap();

    assert!(!opts.version_path().exists());
    assert_eq!(summary.files_written, vec![opts.alias_path()]);
}

#[test]
fn curator_dump_survives_a_game_without_appid() {
    let text = r#"{"curator_id": 3, "games": [
        {"appid": 1, "review": "공식"},
        {"appid": 2, "review": "패치 https://p.example/2"},
        {"review": "id nowhere"}
    ]}"#;
    let parsed = krpatch::specs::parse_source(text).unwrap();
    assert_eq!(parsed.records.len(), 2);
    assert_eq!(parsed.skipped, 1);
}
