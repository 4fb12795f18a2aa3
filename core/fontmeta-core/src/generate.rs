//! Dataset generation pipelines (made by FontLab https://www.fontlab.com/)
//!
//! Each pipeline lists fonts from the developer API, loads the previous
//! dataset once, runs the per-font work through the [`Runner`] and writes the
//! dataset back only when the whole batch succeeded.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;

use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::{ApiFont, FontIdentity};
use crate::axis::AxisRegistry;
use crate::builder::{Built, MetadataBuilder, Stylesheet, TreeOrder};
use crate::config::{GeneratorConfig, STATIC_CONCURRENCY, VARIABLE_CONCURRENCY};
use crate::error::Result;
use crate::fetch::{fetch_api_list, Fetcher, UserAgents};
use crate::query::{css2_link, css_v1_link};
use crate::record::{FontFormat, FontRecord, Stamped};
use crate::runner::{Job, Runner};
use crate::store::{Dataset, JsonStore};
use crate::variable::{build_variable_record, VariableMerger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    V1,
    V2,
    Variable,
    Hybrid,
}

impl Generation {
    pub fn as_str(self) -> &'static str {
        match self {
            Generation::V1 => "v1",
            Generation::V2 => "v2",
            Generation::Variable => "variable",
            Generation::Hybrid => "hybrid",
        }
    }

    /// File stem of the persisted dataset.
    pub fn dataset_name(self) -> &'static str {
        match self {
            Generation::V1 => "google-fonts-v1",
            Generation::V2 => "google-fonts-v2",
            Generation::Variable => "variable",
            Generation::Hybrid => "google-fonts-v2-hybrid",
        }
    }

    pub fn default_concurrency(self) -> usize {
        match self {
            Generation::V1 | Generation::V2 => STATIC_CONCURRENCY,
            Generation::Variable | Generation::Hybrid => VARIABLE_CONCURRENCY,
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub generation: Generation,
    pub path: PathBuf,
    pub records: usize,
    pub built: usize,
    pub reused: usize,
}

struct FontJob<'a>(&'a ApiFont);

impl Job for FontJob<'_> {
    fn id(&self) -> String {
        self.0.id()
    }

    fn last_modified(&self) -> &str {
        &self.0.last_modified
    }
}

struct HybridJob<'a> {
    font: &'a ApiFont,
    variable: Option<&'a ApiFont>,
}

impl Job for HybridJob<'_> {
    fn id(&self) -> String {
        self.font.id()
    }

    fn last_modified(&self) -> &str {
        &self.font.last_modified
    }

    fn is_fresh(&self, previous: &str) -> bool {
        previous == self.font.last_modified
            && self.variable.map_or(true, |v| v.last_modified == previous)
    }
}

/// Fetch one static link once per served format.
pub async fn fetch_stylesheets<F: Fetcher + ?Sized>(
    fetcher: &F,
    link: &str,
    user_agents: &UserAgents,
) -> Result<Vec<Stylesheet>> {
    let mut sheets = Vec::new();
    for format in [FontFormat::Woff2, FontFormat::Woff, FontFormat::Truetype] {
        if let Some(user_agent) = user_agents.for_format(format) {
            let css = fetcher.fetch_text(link, user_agent).await?;
            sheets.push(Stylesheet::new(format.as_str(), css));
        }
    }
    Ok(sheets)
}

/// Build the static record of one font from its v1 or v2 link.
pub async fn build_static_record<F: Fetcher + ?Sized>(
    fetcher: &F,
    font: &ApiFont,
    generation: Generation,
    order: TreeOrder,
    user_agents: &UserAgents,
) -> Result<Built<FontRecord>> {
    let link = match generation {
        Generation::V1 => css_v1_link(font),
        _ => css2_link(font)?,
    };
    let sheets = fetch_stylesheets(fetcher, &link, user_agents).await?;
    MetadataBuilder::new(order).build(&sheets, &FontIdentity::from(font))
}

/// Run one generation end to end and persist its dataset under `store`.
pub async fn generate<F: Fetcher + ?Sized>(
    generation: Generation,
    fetcher: &F,
    store: &JsonStore,
    registry: &AxisRegistry,
    config: &GeneratorConfig,
) -> Result<Summary> {
    info!("generating {generation} dataset");
    let agents = &config.user_agents;

    match generation {
        Generation::V1 | Generation::V2 => {
            let fonts = fetch_api_list(fetcher, &config.api_url(false)).await?;
            let previous: Dataset<FontRecord> = store.read(generation.dataset_name())?;
            let jobs = fonts.iter().map(FontJob);
            run_and_store(store, generation, config, &previous, jobs, |job| async move {
                build_static_record(fetcher, job.0, generation, TreeOrder::WeightStyle, agents)
                    .await
                    .map(|built| built.record)
            })
            .await
        }
        Generation::Variable => {
            let fonts = fetch_api_list(fetcher, &config.api_url(true)).await?;
            let previous = store.read(generation.dataset_name())?;
            let jobs = fonts.iter().filter(|font| font.has_axes()).map(FontJob);
            run_and_store(store, generation, config, &previous, jobs, |job| async move {
                build_variable_record(fetcher, job.0, registry, agents)
                    .await
                    .map(|built| built.record)
            })
            .await
        }
        Generation::Hybrid => {
            let fonts = fetch_api_list(fetcher, &config.api_url(false)).await?;
            let variable_fonts = fetch_api_list(fetcher, &config.api_url(true)).await?;
            let by_family: BTreeMap<&str, &ApiFont> = variable_fonts
                .iter()
                .filter(|font| font.has_axes())
                .map(|font| (font.family.as_str(), font))
                .collect();

            let previous: Dataset<FontRecord> = store.read(generation.dataset_name())?;
            let merger = VariableMerger::new(fetcher, registry, agents, &previous);
            let merger = &merger;
            let jobs = fonts.iter().map(|font| HybridJob {
                font,
                variable: by_family.get(font.family.as_str()).copied(),
            });

            run_and_store(store, generation, config, &previous, jobs, |job| async move {
                let built =
                    build_static_record(fetcher, job.font, Generation::V2, TreeOrder::StyleWeight, agents)
                        .await?;
                merger
                    .merge(built.record, job.variable, config.force)
                    .await
                    .map(|merged| merged.record)
            })
            .await
        }
    }
}

async fn run_and_store<R, T, I, W, Fut>(
    store: &JsonStore,
    generation: Generation,
    config: &GeneratorConfig,
    previous: &Dataset<R>,
    jobs: I,
    worker: W,
) -> Result<Summary>
where
    R: Clone + Stamped + Serialize + DeserializeOwned,
    T: Job,
    I: IntoIterator<Item = T>,
    W: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let report = Runner::new(previous)
        .concurrency(config.concurrency.unwrap_or(generation.default_concurrency()))
        .loop_limit(config.loop_limit)
        .force(config.force)
        .run(jobs, worker)
        .await?;

    let path = store.write(generation.dataset_name(), &report.data)?;
    info!("wrote {} record(s) to {}", report.data.len(), path.display());

    Ok(Summary {
        generation,
        path,
        records: report.data.len(),
        built: report.built,
        reused: report.reused,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font(stamp: &str) -> ApiFont {
        ApiFont {
            family: "Texturina".into(),
            last_modified: stamp.into(),
            ..ApiFont::default()
        }
    }

    #[test]
    fn hybrid_jobs_compare_both_stamps() {
        let static_font = font("2024-01-01");
        let same = font("2024-01-01");
        let newer = font("2024-02-01");

        let job = HybridJob {
            font: &static_font,
            variable: Some(&same),
        };
        assert!(job.is_fresh("2024-01-01"));

        let job = HybridJob {
            font: &static_font,
            variable: Some(&newer),
        };
        assert!(!job.is_fresh("2024-01-01"));

        let job = HybridJob {
            font: &static_font,
            variable: None,
        };
        assert!(job.is_fresh("2024-01-01"));
    }

    #[test]
    fn dataset_names_are_stable() {
        assert_eq!(Generation::V1.dataset_name(), "google-fonts-v1");
        assert_eq!(Generation::Hybrid.dataset_name(), "google-fonts-v2-hybrid");
        assert_eq!(Generation::Variable.default_concurrency(), VARIABLE_CONCURRENCY);
    }
}
