//! Texturina fixtures and an in-memory fetcher shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use fontmeta_core::api::{ApiAxis, ApiFont};
use fontmeta_core::builder::Stylesheet;
use fontmeta_core::error::{FontMetaError, Result};
use fontmeta_core::fetch::Fetcher;

/// Developer API variant list of Texturina: weights 100 to 900, upright and italic.
pub const TEXTURINA_VARIANTS: [&str; 18] = [
    "100", "200", "300", "regular", "500", "600", "700", "800", "900", "100italic", "200italic",
    "300italic", "italic", "500italic", "600italic", "700italic", "800italic", "900italic",
];

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("{}: {err}", path.display()))
}

pub fn texturina() -> ApiFont {
    ApiFont {
        family: "Texturina".into(),
        variants: TEXTURINA_VARIANTS.iter().map(|v| v.to_string()).collect(),
        subsets: vec!["latin".into(), "latin-ext".into(), "vietnamese".into()],
        version: "v28".into(),
        last_modified: "2024-05-02".into(),
        category: "serif".into(),
        ..ApiFont::default()
    }
}

/// The woff2, woff and truetype answers to Texturina's css2 link.
pub fn texturina_sheets() -> Vec<Stylesheet> {
    ["woff2", "woff", "truetype"]
        .into_iter()
        .map(|format| Stylesheet::new(format, fixture(&format!("texturina/{format}.css"))))
        .collect()
}

/// css2 link of the full Texturina variant list.
pub const TEXTURINA_CSS2: &str =
    "https://fonts.googleapis.com/css2?family=Texturina:ital,wght@0,100;0,200;0,300;0,400;0,500;0,600;0,700;0,800;0,900;1,100;1,200;1,300;1,400;1,500;1,600;1,700;1,800;1,900";

pub const GSTATIC: &str = "https://fonts.gstatic.com/s/texturina/v28/";
pub const NORMAL_QUERY: &str = "https://fonts.googleapis.com/css2?family=Texturina:ital,wght@0,100..900";
pub const ITALIC_QUERY: &str = "https://fonts.googleapis.com/css2?family=Texturina:ital,wght@1,100..900";

pub fn variable_entry() -> ApiFont {
    ApiFont {
        variants: vec!["regular".into(), "italic".into()],
        files: [
            ("regular".to_string(), format!("{GSTATIC}Texturina.ttf")),
            ("italic".to_string(), format!("{GSTATIC}Texturina-Italic.ttf")),
        ]
        .into(),
        axes: Some(vec![ApiAxis {
            tag: "wght".into(),
            start: 100.0,
            end: 900.0,
        }]),
        ..texturina()
    }
}

pub fn variable_woff2(style: &str) -> String {
    ["latin-ext", "latin"]
        .iter()
        .map(|subset| {
            format!(
                "/* {subset} */\n@font-face {{\n  font-family: 'Texturina';\n  font-style: {style};\n  \
                 font-weight: 100 900;\n  src: url({GSTATIC}v-{style}-{subset}.woff2) format('woff2');\n  \
                 unicode-range: U+0100-02AF;\n}}\n"
            )
        })
        .collect()
}

pub fn variable_woff(style: &str) -> String {
    format!(
        "@font-face {{\n  font-family: 'Texturina';\n  font-style: {style};\n  font-weight: 100 900;\n  \
         src: url({GSTATIC}v-{style}.woff) format('woff');\n}}\n"
    )
}

/// Serves canned bodies keyed by URL, optionally narrowed by user agent.
#[derive(Default)]
pub struct MockFetcher {
    by_url: HashMap<String, String>,
    by_agent: HashMap<(String, String), String>,
    calls: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.by_url.insert(url.into(), body.into());
        self
    }

    pub fn serve_for(
        mut self,
        url: impl Into<String>,
        user_agent: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        self.by_agent
            .insert((url.into(), user_agent.into()), body.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requested URLs that start with `prefix`.
    pub fn requests_to(&self, prefix: &str) -> usize {
        self.log
            .lock()
            .expect("log lock")
            .iter()
            .filter(|url| url.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch_text(&self, url: &str, user_agent: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().expect("log lock").push(url.to_string());

        self.by_agent
            .get(&(url.to_string(), user_agent.to_string()))
            .or_else(|| self.by_url.get(url))
            .cloned()
            .ok_or_else(|| FontMetaError::UpstreamFetch {
                url: url.to_string(),
                message: "404 Not Found".to_string(),
            })
    }
}
