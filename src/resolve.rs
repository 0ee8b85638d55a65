// src/resolve.rs
//
// Bounded, hand-driven redirect following.
//
//   PENDING ──probe──▶ REDIRECTED ──probe──▶ … (at most `max_hops` times)
//      │                    │
//      ├── non-3xx / no Location / hop cap ──▶ TERMINAL
//      ├── lands on age gate or login wall  ──▶ SKIPPED
//      └── request failed                   ──▶ ERRORED
//
// Cycles are harmless: the hop cap ends them.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use serde::Serialize;

use crate::config::options::ResolveOptions;
use crate::core::net::{HeadProbe, Pacer};
use crate::core::steam;

static IGNORED_DESTINATIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"store\.steampowered\.com/agecheck/",
        r"store\.steampowered\.com/login/",
        r"steampowered\.com/login",
        r"steampowered\.com/age",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("static pattern"))
    .collect()
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The store bounced an anonymous session to its age gate or login page.
    SteamAgecheckOrLogin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub original: String,
    #[serde(rename = "final")]
    pub final_url: String,
    pub redirected: bool,
    pub redirect_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_reason: Option<SkipReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Resolution {
    fn unresolved(original: &str) -> Self {
        Self {
            original: s!(original),
            final_url: s!(original),
            redirected: false,
            redirect_count: 0,
            skipped_reason: None,
            error: None,
        }
    }

    fn skipped(original: &str, hops: usize) -> Self {
        Self {
            redirect_count: hops,
            skipped_reason: Some(SkipReason::SteamAgecheckOrLogin),
            ..Self::unresolved(original)
        }
    }

    fn errored(original: &str, reason: String) -> Self {
        Self { error: Some(reason), ..Self::unresolved(original) }
    }

    /// Redirected somewhere authoritative (not skipped, not failed).
    pub fn moved(&self) -> bool {
        self.redirected && self.skipped_reason.is_none() && self.error.is_none()
    }
}

#[derive(Debug)]
enum State {
    Pending,
    Redirected,
    Terminal,
    Skipped,
    Errored(String),
}

/// An interstitial only counts as "not the real destination" when the
/// original already named one specific store app.
pub fn is_ignored_redirect(original: &str, destination: &str) -> bool {
    steam::is_store_app_url(original)
        && IGNORED_DESTINATIONS.iter().any(|re| re.is_match(destination))
}

/// Resolve a Location header against the URL that produced it.
/// Relative locations hang off the current origin.
pub fn join_location(current: &Url, location: &str) -> Option<Url> {
    let loc = location.trim();
    if loc.is_empty() {
        return None;
    }
    if loc.starts_with("http") {
        Url::parse(loc).ok()
    } else if loc.starts_with('/') {
        current.join(loc).ok()
    } else {
        current.join(&format!("/{loc}")).ok()
    }
}

pub struct RedirectResolver<P> {
    probe: P,
    pacer: Pacer,
    max_hops: usize,
}

impl<P: HeadProbe> RedirectResolver<P> {
    pub fn new(probe: P, opts: &ResolveOptions) -> Self {
        Self {
            probe,
            pacer: Pacer::new(opts.pause()),
            max_hops: opts.max_redirects,
        }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Follow `url` until it settles. Never fails; problems end up in
    /// `skipped_reason` or `error` with `final == original`.
    pub fn resolve(&mut self, url: &str) -> Resolution {
        let mut current = match Url::parse(url.trim()) {
            Ok(u) => u,
            Err(e) => return Resolution::errored(url, format!("invalid URL: {e}")),
        };
        let mut hops = 0usize;
        let mut state = State::Pending;

        loop {
            state = match state {
                State::Pending | State::Redirected if hops < self.max_hops => {
                    self.step(url, &mut current, &mut hops)
                }
                State::Pending | State::Redirected | State::Terminal => {
                    return self.settle(url, &current, hops);
                }
                State::Skipped => {
                    logd!("Skipped {url}: landed on age gate or login");
                    return Resolution::skipped(url, hops);
                }
                State::Errored(reason) => {
                    logd!("Could not resolve {url}: {reason}");
                    return Resolution::errored(url, reason);
                }
            };
        }
    }

    fn step(&mut self, original: &str, current: &mut Url, hops: &mut usize) -> State {
        self.pacer.wait();
        let hop = match self.probe.head(current) {
            Ok(hop) => hop,
            Err(e) => return State::Errored(e.to_string()),
        };
        if !hop.is_redirect() {
            return State::Terminal;
        }
        let Some(next) = hop.location.as_deref().and_then(|loc| join_location(current, loc)) else {
            return State::Terminal;
        };
        if is_ignored_redirect(original, next.as_str()) {
            return State::Skipped;
        }
        logd!("{} -> {} ({})", current, next, hop.status);
        *current = next;
        *hops += 1;
        State::Redirected
    }

    fn settle(&self, original: &str, current: &Url, hops: usize) -> Resolution {
        if hops == 0 {
            return Resolution::unresolved(original);
        }
        if is_ignored_redirect(original, current.as_str()) {
            return Resolution::skipped(original, hops);
        }
        Resolution {
            final_url: current.to_string(),
            redirected: true,
            redirect_count: hops,
            ..Resolution::unresolved(original)
        }
    }
}
