//! reqwest-backed fetcher (made by FontLab https://www.fontlab.com/)

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::USER_AGENT;

use fontmeta_core::error::{FontMetaError, Result};
use fontmeta_core::fetch::Fetcher;

const TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(TIMEOUT).build()?;
        Ok(Self { client })
    }
}

fn upstream(url: &str, message: impl ToString) -> FontMetaError {
    FontMetaError::UpstreamFetch {
        url: url.to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str, user_agent: &str) -> Result<String> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|err| upstream(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(upstream(url, status));
        }

        response.text().await.map_err(|err| upstream(url, err))
    }
}
