//! Network collaborators.
//!
//! The generator only needs "GET this URL with this user agent and give me the
//! body". The HTTP client lives in the CLI; tests plug in an in-memory map.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::{ApiFont, ApiResponse};
use crate::error::Result;
use crate::record::FontFormat;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a text body. Non-2xx responses must become
    /// [`FontMetaError::UpstreamFetch`](crate::error::FontMetaError::UpstreamFetch)
    /// carrying the URL.
    async fn fetch_text(&self, url: &str, user_agent: &str) -> Result<String>;
}

/// The CSS API picks the served format from the user agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAgents {
    pub woff2: String,
    pub woff: String,
    pub truetype: String,
}

impl Default for UserAgents {
    fn default() -> Self {
        Self {
            woff2: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            woff: "Mozilla/5.0 (Windows NT 6.1; WOW64; Trident/7.0; rv:11.0) like Gecko".to_string(),
            truetype: "Mozilla/5.0 (Linux; U; Android 2.2; en-us; DROID2 GLOBAL Build/S273) AppleWebKit/533.1 (KHTML, like Gecko) Version/4.0 Mobile Safari/533.1".to_string(),
        }
    }
}

impl UserAgents {
    pub fn for_format(&self, format: FontFormat) -> Option<&str> {
        match format {
            FontFormat::Woff2 => Some(&self.woff2),
            FontFormat::Woff => Some(&self.woff),
            FontFormat::Truetype => Some(&self.truetype),
            FontFormat::Opentype => None,
        }
    }
}

/// Fetch and decode a developer API font list.
pub async fn fetch_api_list<F: Fetcher + ?Sized>(fetcher: &F, url: &str) -> Result<Vec<ApiFont>> {
    let body = fetcher.fetch_text(url, "fontmeta").await?;
    let response: ApiResponse = serde_json::from_str(&body)?;
    Ok(response.items)
}
