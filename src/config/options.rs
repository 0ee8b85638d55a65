// src/config/options.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::consts::*;
use crate::error::{Error, Result};
use crate::specs::{self, SourceSpec};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppOptions {
    pub data_dir: PathBuf,
    pub sources: Vec<SourceSpec>,
    pub resolve: ResolveOptions,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            sources: specs::default_sources(),
            resolve: ResolveOptions::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveOptions {
    pub max_redirects: usize,
    pub pause_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub progress_every: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_redirects: MAX_REDIRECTS,
            pause_ms: REQUEST_PAUSE_MS,
            timeout_secs: REQUEST_TIMEOUT_SECS,
            user_agent: s!(USER_AGENT),
            progress_every: PROGRESS_EVERY,
        }
    }
}

impl ResolveOptions {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// On-disk overrides (`krpatch.toml`). Every key is optional.
///
/// ```toml
/// [resolve]
/// max_redirects = 5
/// pause_ms = 250
///
/// [[sources]]
/// file = "quasarzone"
/// name = "quasarplay"
/// curator = true
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub sources: Option<Vec<SourceSpec>>,
    pub resolve: ResolveOverrides,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveOverrides {
    pub max_redirects: Option<usize>,
    pub pause_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub progress_every: Option<usize>,
}

impl ConfigFile {
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| Error::Config { path: path.to_path_buf(), source })
    }

    pub fn apply(self, opts: &mut AppOptions) {
        if let Some(sources) = self.sources {
            opts.sources = sources;
        }
        let r = self.resolve;
        if let Some(v) = r.max_redirects { opts.resolve.max_redirects = v; }
        if let Some(v) = r.pause_ms { opts.resolve.pause_ms = v; }
        if let Some(v) = r.timeout_secs { opts.resolve.timeout_secs = v; }
        if let Some(v) = r.user_agent { opts.resolve.user_agent = v; }
        if let Some(v) = r.progress_every { opts.resolve.progress_every = v.max(1); }
    }
}

impl AppOptions {
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: dir.into(), ..Self::default() }
    }

    /// Defaults, then the config file. An explicit `config` path must exist;
    /// the implicit `<data_dir>/krpatch.toml` is only read when present.
    pub fn load(data_dir: impl Into<PathBuf>, config: Option<&Path>) -> Result<Self> {
        let mut opts = Self::with_data_dir(data_dir);

        let path = match config {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let implicit = opts.data_dir.join(CONFIG_FILE);
                implicit.is_file().then_some(implicit)
            }
        };

        if let Some(path) = path {
            let text = fs::read_to_string(&path)?;
            ConfigFile::parse(&path, &text)?.apply(&mut opts);
            logd!("Loaded config from {}", path.display());
        }
        Ok(opts)
    }

    pub fn alias_path(&self) -> PathBuf { json_file!(self.data_dir, ALIAS_STEM) }
    pub fn merged_path(&self) -> PathBuf { json_file!(self.data_dir, MERGED_STEM) }
    pub fn lookup_path(&self) -> PathBuf { json_file!(self.data_dir, LOOKUP_STEM) }
    pub fn version_path(&self) -> PathBuf { json_file!(self.data_dir, VERSION_STEM) }

    pub fn source_path(&self, spec: &SourceSpec) -> PathBuf {
        json_file!(self.data_dir, spec.file)
    }
}
