// src/core/net.rs
// HEAD-only probing with redirects left to the caller.

use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::Url;

use crate::config::options::ResolveOptions;
use crate::error::{Error, Result};

/// One response in a redirect chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hop {
    pub status: u16,
    pub location: Option<String>,
}

impl Hop {
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

/// Issues a single header-only request and reports status + Location,
/// never following the redirect itself.
pub trait HeadProbe {
    fn head(&mut self, url: &Url) -> Result<Hop>;
}

pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new(opts: &ResolveOptions) -> Result<Self> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(opts.timeout())
            .user_agent(opts.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

impl HeadProbe for HttpProbe {
    fn head(&mut self, url: &Url) -> Result<Hop> {
        let resp = self.client.head(url.clone()).send().map_err(|e| Error::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let location = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(Hop { status: resp.status().as_u16(), location })
    }
}

/// Fixed spacing between outgoing requests. The first call never waits.
#[derive(Debug)]
pub struct Pacer {
    pause: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(pause: Duration) -> Self {
        Self { pause, last: None }
    }

    pub fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.pause {
                thread::sleep(self.pause - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}
