// src/core/mod.rs

pub mod net;
pub mod sanitize;
pub mod steam;

pub use net::{HeadProbe, Hop, HttpProbe, Pacer};
