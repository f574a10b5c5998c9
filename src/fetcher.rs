use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::redirect;
use tracing::debug;

use crate::config::{FetchConfig, MAX_REDIRECTS};

/// Anything that can hand back the HTML behind a URL.
pub trait PageSource {
    fn fetch_html(&self, url: &str) -> Result<String>;
}

pub fn catalog_url(base_url: &str, model: &str) -> String {
    format!("{}/catalogItemInv.asp?S={}-1", base_url.trim_end_matches('/'), model)
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let redirect_policy = redirect::Policy::custom(|attempt| {
            if attempt.previous().len() > MAX_REDIRECTS {
                attempt.error(format!("too many redirects (>{MAX_REDIRECTS})"))
            } else {
                attempt.follow()
            }
        });

        let client = Client::builder()
            .redirect(redirect_policy)
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl PageSource for HttpFetcher {
    fn fetch_html(&self, url: &str) -> Result<String> {
        debug!(%url, "fetching");
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("failed to fetch {url}"))?
            .error_for_status()
            .with_context(|| format!("bad response from {url}"))?;
        response
            .text()
            .with_context(|| format!("failed to read response from {url}"))
    }
}
