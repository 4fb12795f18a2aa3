//! fontmeta CLI (made by FontLab https://www.fontlab.com/)

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use fontmeta_core::api::font_id;
use fontmeta_core::axis::{validate_tag, AxisDefinition, AxisRegistry, AxisSet};
use fontmeta_core::config::GeneratorConfig;
use fontmeta_core::generate::{generate, Generation};
use fontmeta_core::query::{build_queries, QueryPlan};
use fontmeta_core::runner::LOOP_LIMIT;
use fontmeta_core::store::{write_json_pretty, JsonStore};

mod http;

pub use http::HttpFetcher;

/// CLI entrypoint for fontmeta.
#[derive(Debug, Parser)]
#[command(
    name = "fontmeta",
    about = "Google Fonts metadata generator (made by FontLab https://www.fontlab.com/)"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build and persist one dataset generation
    Generate(GenerateArgs),
    /// Print the css2 axis-range queries for a variable family
    Queries(QueriesArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Dataset to build
    #[arg(value_enum)]
    generation: GenerationArg,

    /// Rebuild every font even when its upstream stamp is unchanged
    #[arg(long = "force", action = ArgAction::SetTrue)]
    force: bool,

    /// Google Fonts developer API key
    #[arg(long = "api-key", env = "GOOGLE_FONTS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Directory holding the JSON datasets
    #[arg(
        long = "data-dir",
        env = "FONTMETA_DATA_DIR",
        default_value = "data",
        value_hint = ValueHint::DirPath
    )]
    data_dir: PathBuf,

    /// Fonts processed concurrently (defaults depend on the generation)
    #[arg(short = 'j', long = "jobs", value_parser = clap::value_parser!(u16).range(1..))]
    jobs: Option<u16>,

    /// Failed fonts tolerated before the run is abandoned
    #[arg(long = "loop-limit", default_value_t = LOOP_LIMIT)]
    loop_limit: usize,

    /// JSON list of extra axis registry entries
    #[arg(long = "axis-registry", value_hint = ValueHint::FilePath)]
    axis_registry: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct QueriesArgs {
    /// Family name, e.g. "Roboto Flex"
    family: String,

    /// Axes as tag=min..max (ital=0..1 for italics)
    #[arg(required = true, value_hint = ValueHint::Other)]
    axes: Vec<String>,

    /// Emit a JSON object instead of name/url lines
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,

    /// JSON list of extra axis registry entries
    #[arg(long = "axis-registry", value_hint = ValueHint::FilePath)]
    axis_registry: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum GenerationArg {
    V1,
    V2,
    Variable,
    Hybrid,
}

impl From<GenerationArg> for Generation {
    fn from(arg: GenerationArg) -> Self {
        match arg {
            GenerationArg::V1 => Generation::V1,
            GenerationArg::V2 => Generation::V2,
            GenerationArg::Variable => Generation::Variable,
            GenerationArg::Hybrid => Generation::Hybrid,
        }
    }
}

/// Parse CLI args and execute the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Queries(args) => run_queries(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let registry = load_registry(args.axis_registry.as_deref())?;
    let config = generator_config(&args)?;
    let generation = Generation::from(args.generation);

    let store = JsonStore::new(&config.data_dir);
    let fetcher = HttpFetcher::new().context("building HTTP client")?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;

    let summary = runtime.block_on(generate(generation, &fetcher, &store, &registry, &config))?;
    println!(
        "{}: {} record(s), {} built, {} reused -> {}",
        summary.generation,
        summary.records,
        summary.built,
        summary.reused,
        summary.path.display()
    );
    Ok(())
}

fn generator_config(args: &GenerateArgs) -> Result<GeneratorConfig> {
    let api_key = args
        .api_key
        .clone()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| anyhow!("missing API key (pass --api-key or set GOOGLE_FONTS_API_KEY)"))?;

    Ok(GeneratorConfig {
        api_key: Some(api_key),
        data_dir: args.data_dir.clone(),
        force: args.force,
        concurrency: args.jobs.map(usize::from),
        loop_limit: args.loop_limit,
        ..GeneratorConfig::default()
    })
}

fn run_queries(args: QueriesArgs) -> Result<()> {
    let registry = load_registry(args.axis_registry.as_deref())?;
    let axes = parse_axis_args(&args.axes)?;
    let id = font_id(&args.family);
    let plan = build_queries(&args.family, &id, &axes, &registry);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_queries(&plan, args.json, &mut handle)
}

fn write_queries(plan: &QueryPlan, json: bool, out: &mut impl Write) -> Result<()> {
    if json {
        write_json_pretty(&plan.queries, &mut *out)?;
        writeln!(out)?;
    } else {
        for (name, url) in &plan.queries {
            writeln!(out, "{name}\t{url}")?;
        }
    }
    Ok(())
}

fn load_registry(extra: Option<&Path>) -> Result<AxisRegistry> {
    let mut registry = AxisRegistry::builtin();
    if let Some(path) = extra {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading axis registry {}", path.display()))?;
        let loaded = AxisRegistry::from_json(&raw)
            .with_context(|| format!("parsing axis registry {}", path.display()))?;
        registry.extend(loaded);
    }
    Ok(registry)
}

/// `wght=100..900` → (`wght`, 100..900 with default at the minimum).
fn parse_axis_args(raw: &[String]) -> Result<AxisSet> {
    let mut axes = AxisSet::new();
    for item in raw {
        let (tag, range) = item
            .split_once('=')
            .ok_or_else(|| anyhow!("expected tag=min..max, got {item}"))?;
        let (min, max) = range
            .split_once("..")
            .ok_or_else(|| anyhow!("expected min..max range in {item}"))?;
        let tag = tag.trim();
        validate_tag(tag)?;

        for bound in [min, max] {
            bound
                .trim()
                .parse::<f64>()
                .with_context(|| format!("invalid axis bound '{bound}' in {item}"))?;
        }
        if axes.contains_key(tag) {
            bail!("axis {tag} given twice");
        }

        axes.insert(
            tag.to_string(),
            AxisDefinition {
                default: min.trim().to_string(),
                min: min.trim().to_string(),
                max: max.trim().to_string(),
                step: "1".to_string(),
            },
        );
    }
    Ok(axes)
}
