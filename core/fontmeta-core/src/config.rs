//! Generator settings shared by every pipeline.

use std::path::PathBuf;

use crate::fetch::UserAgents;
use crate::runner::LOOP_LIMIT;

/// In-flight fonts for the v1/v2 pipelines.
pub const STATIC_CONCURRENCY: usize = 24;
/// In-flight fonts for the variable and hybrid pipelines (more requests each).
pub const VARIABLE_CONCURRENCY: usize = 8;

pub const API_URL: &str = "https://www.googleapis.com/webfonts/v1/webfonts";

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: Option<String>,
    pub data_dir: PathBuf,
    /// Rebuild records even when their upstream stamp is unchanged.
    pub force: bool,
    /// `None` picks the per-pipeline default.
    pub concurrency: Option<usize>,
    pub loop_limit: usize,
    pub user_agents: UserAgents,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            data_dir: PathBuf::from("data"),
            force: false,
            concurrency: None,
            loop_limit: LOOP_LIMIT,
            user_agents: UserAgents::default(),
        }
    }
}

impl GeneratorConfig {
    /// Developer API list URL; `variable` asks for axis data.
    pub fn api_url(&self, variable: bool) -> String {
        let mut url = API_URL.to_string();
        let mut sep = '?';
        if let Some(key) = &self.api_key {
            url.push_str(&format!("{sep}key={key}"));
            sep = '&';
        }
        if variable {
            url.push_str(&format!("{sep}capability=VF"));
        }
        url
    }
}
