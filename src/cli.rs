// src/cli.rs
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};

use crate::config::consts::DEFAULT_DATA_DIR;
use crate::config::options::AppOptions;
use crate::progress::LogProgress;
use crate::runner::{self, Outcome, Task};

#[derive(Debug, Parser)]
#[command(name = "krpatch", version, about = "Merge Korean localization patch listings into a Steam app id lookup table")]
pub struct Cli {
    /// Directory holding the source files and every generated artifact
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Config file (default: <data-dir>/krpatch.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Merge all sources into merged.json, lookup.json and version.json
    Merge,
    /// Follow every merged store link and record new app id redirects in alias.json
    UpdateAlias {
        /// Pause between requests, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Redirect hop cap per link
        #[arg(long)]
        max_redirects: Option<usize>,
    },
    /// Resolve one URL and print the outcome as JSON
    Resolve {
        url: String,
        #[arg(long)]
        max_redirects: Option<usize>,
    },
    /// Look an app id up the way the extension does (alias first)
    Lookup { app_id: String },
}

impl Cli {
    fn options(&self) -> Result<AppOptions> {
        let mut opts = AppOptions::load(&self.data_dir, self.config.as_deref())
            .wrap_err("loading configuration")?;

        match &self.command {
            Command::UpdateAlias { delay_ms, max_redirects } => {
                if let Some(ms) = delay_ms { opts.resolve.pause_ms = *ms; }
                if let Some(n) = max_redirects { opts.resolve.max_redirects = *n; }
            }
            Command::Resolve { max_redirects: Some(n), .. } => opts.resolve.max_redirects = *n,
            _ => {}
        }
        Ok(opts)
    }

    fn task(&self) -> Task {
        match &self.command {
            Command::Merge => Task::Merge,
            Command::UpdateAlias { .. } => Task::UpdateAlias,
            Command::Resolve { url, .. } => Task::Resolve(url.clone()),
            Command::Lookup { app_id } => Task::Lookup(app_id.clone()),
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::log::init(cli.verbose, cli.log_file.as_deref()).wrap_err("initializing logging")?;

    let opts = cli.options()?;
    let task = cli.task();
    let mut progress = LogProgress::default();

    match runner::run(&opts, &task, Some(&mut progress))? {
        Outcome::Merged(summary) => {
            for path in &summary.files_written {
                println!("Wrote {}", path.display());
            }
        }
        Outcome::AliasUpdated(summary) => {
            for alias in &summary.report.added {
                println!("{} -> {}  {}", alias.observed, alias.canonical, alias.title);
            }
            println!(
                "{} new aliases ({} total), {} links checked",
                summary.report.added.len(),
                summary.total_aliases,
                summary.report.checked
            );
        }
        Outcome::Resolved(res) => {
            println!("{}", serde_json::to_string_pretty(&res)?);
        }
        Outcome::Looked(answer) => {
            if answer.canonical != answer.requested.trim() {
                eprintln!("{} is an alias of {}", answer.requested, answer.canonical);
            }
            match answer.entry {
                Some(entry) => println!("{}", serde_json::to_string_pretty(&entry)?),
                None => println!("{}: no known patch", answer.canonical),
            }
        }
    }
    Ok(())
}
