// src/runner.rs
use std::path::PathBuf;

use crate::{
    alias::{self, MaintenanceReport},
    config::options::AppOptions,
    core::net::{HeadProbe, HttpProbe},
    error::Result,
    lookup::{self, LookupEntry, LookupTable, PatchIndex, VersionInfo},
    merge::{self, MergedDocument},
    progress::Progress,
    resolve::{RedirectResolver, Resolution},
    store,
};

/// What to do this invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    Merge,
    UpdateAlias,
    Resolve(String),
    Lookup(String),
}

/// Summary of what was produced.
#[derive(Debug)]
pub enum Outcome {
    Merged(MergeSummary),
    AliasUpdated(AliasSummary),
    Resolved(Resolution),
    Looked(LookupAnswer),
}

#[derive(Debug)]
pub struct MergeSummary {
    pub files_written: Vec<PathBuf>,
    pub games: usize,
    pub games_no_steam_link: usize,
    pub aliases: usize,
}

#[derive(Debug)]
pub struct AliasSummary {
    pub files_written: Vec<PathBuf>,
    pub report: MaintenanceReport,
    pub total_aliases: usize,
}

#[derive(Debug)]
pub struct LookupAnswer {
    pub requested: String,
    pub canonical: String,
    pub entry: Option<LookupEntry>,
}

/// Top-level runner: dispatch on task and run.
/// `progress` can be None (no UI updates) or Some(&mut impl Progress).
pub fn run(opts: &AppOptions, task: &Task, progress: Option<&mut dyn Progress>) -> Result<Outcome> {
    match task {
        Task::Merge => run_merge(opts).map(Outcome::Merged),
        Task::UpdateAlias => {
            let probe = HttpProbe::new(&opts.resolve)?;
            update_alias(opts, probe, progress).map(Outcome::AliasUpdated)
        }
        Task::Resolve(url) => {
            let probe = HttpProbe::new(&opts.resolve)?;
            Ok(Outcome::Resolved(RedirectResolver::new(probe, &opts.resolve).resolve(url)))
        }
        Task::Lookup(app_id) => lookup_app(opts, app_id).map(Outcome::Looked),
    }
}

/* ---------------- Merge ---------------- */

pub fn run_merge(opts: &AppOptions) -> Result<MergeSummary> {
    run_merge_at(opts, &lookup::now())
}

/// Merge with a fixed `generated_at`; everything else is a pure function of
/// the source files and the alias table.
pub fn run_merge_at(opts: &AppOptions, generated_at: &str) -> Result<MergeSummary> {
    logf!("Merging data from all sources...");

    let batches = store::load_sources_required(opts)?;
    let alias_path = opts.alias_path();
    let aliases = store::load_alias(&alias_path);

    let out = merge::merge(&batches, &aliases);
    let sources = opts.sources.iter().map(|s| s.file.clone()).collect();
    let doc = MergedDocument::new(out, generated_at, sources);

    let merged_path = opts.merged_path();
    store::save_merged(&merged_path, &doc)?;
    logf!("- Games with Steam link: {}", doc.games.len());
    logf!("- Games without Steam link: {}", doc.games_no_steam_link.len());

    let table = LookupTable::build(&doc.games, generated_at);
    let lookup_path = opts.lookup_path();
    store::save_lookup(&lookup_path, &table)?;
    logf!("Lookup table saved to {} (Games: {})", lookup_path.display(), table.len());

    let version = VersionInfo::for_table(&table, store::alias_updated_at(&alias_path));
    let version_path = opts.version_path();
    store::save_version(&version_path, &version)?;

    Ok(MergeSummary {
        files_written: vec![merged_path, lookup_path, version_path],
        games: doc.games.len(),
        games_no_steam_link: doc.games_no_steam_link.len(),
        aliases: aliases.len(),
    })
}

/* ---------------- Alias maintenance ---------------- */

/// Replay merged store links through `probe` and grow the alias table.
/// The table and version.json are written once, after the last game.
pub fn update_alias<P: HeadProbe>(
    opts: &AppOptions,
    probe: P,
    progress: Option<&mut dyn Progress>,
) -> Result<AliasSummary> {
    logf!("=== AppID Alias Updater ===");

    let doc = store::load_merged(&opts.merged_path())?;
    let alias_path = opts.alias_path();
    let mut table = store::load_alias(&alias_path);

    let mut resolver = RedirectResolver::new(probe, &opts.resolve);
    let report = alias::maintain(
        &doc.games,
        &mut table,
        &mut resolver,
        opts.resolve.progress_every,
        progress,
    );

    store::save_alias(&alias_path, &table)?;
    logf!("Saved {} aliases to {}", table.len(), alias_path.display());

    let mut files_written = vec![alias_path];
    let version_path = opts.version_path();
    // The next merge stamps alias_updated_at from the alias file anyway
    match store::load_version(&version_path) {
        Some(mut version) => {
            version.alias_updated_at = Some(lookup::now());
            store::save_version(&version_path, &version)?;
            files_written.push(version_path);
        }
        None => logd!("No {} yet, leaving it to the next merge", version_path.display()),
    }

    if report.errors > 0 || report.skipped > 0 || report.refused > 0 {
        logf!(
            "{} links failed, {} skipped (agecheck/login), {} refused (would chain)",
            report.errors,
            report.skipped,
            report.refused
        );
    }
    if !report.added.is_empty() {
        logf!("AppID changes detected. Run `merge` to update lookup.json.");
    }

    Ok(AliasSummary {
        files_written,
        total_aliases: table.len(),
        report,
    })
}

/* ---------------- Consumer lookup ---------------- */

pub fn lookup_app(opts: &AppOptions, app_id: &str) -> Result<LookupAnswer> {
    let table = store::load_lookup(&opts.lookup_path())?;
    let aliases = store::load_alias(&opts.alias_path());
    let index = PatchIndex::new(aliases, table);
    logd!("Lookup table generated at {} ({} games)", index.meta().generated_at, index.meta().total);

    let (canonical, entry) = index.lookup(app_id);
    Ok(LookupAnswer {
        requested: s!(app_id),
        canonical: s!(canonical),
        entry: entry.cloned(),
    })
}
