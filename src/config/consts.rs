// src/config/consts.rs

// Data directory layout (stems; every artifact is `<stem>.json`)
pub const DEFAULT_DATA_DIR: &str = "data";
pub const CONFIG_FILE: &str = "krpatch.toml";
pub const ALIAS_STEM: &str = "alias";
pub const MERGED_STEM: &str = "merged";
pub const LOOKUP_STEM: &str = "lookup";
pub const VERSION_STEM: &str = "version";

// Steam
pub const STORE_APP_PREFIX: &str = "https://store.steampowered.com/app/";

// Curator dumps carry no patch URL of their own; a review with a link gets this marker
pub const CURATOR_LINK_MARKER: &str = "exist";

// Net config
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const REQUEST_TIMEOUT_SECS: u64 = 15;
pub const MAX_REDIRECTS: usize = 5;
pub const REQUEST_PAUSE_MS: u64 = 100; // be polite

// Progress
pub const PROGRESS_EVERY: usize = 100;
