// src/lib.rs
#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod specs;

pub mod alias;
pub mod dedup;
pub mod file;
pub mod identity;
pub mod lookup;
pub mod merge;
pub mod progress;
pub mod record;
pub mod resolve;
pub mod runner;
pub mod store;

pub use error::{Error, Result};
