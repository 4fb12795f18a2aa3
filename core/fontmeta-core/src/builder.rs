//! Stylesheet → [`FontRecord`] builder (made by FontLab https://www.fontlab.com/)
//!
//! One font is fetched several times, once per user agent (and so per binary
//! format). Each response is folded into a single variant tree:
//!
//! - a comment names the subset of the `@font-face` blocks that follow it;
//!   `fallback` resets to the default subset;
//! - sheets without any comment take the subset from the `.N.` index in the
//!   resource filename (`[N]`), else the default subset;
//! - woff2 URLs are per subset, every other format is served once per
//!   weight/style and gets copied onto each subset already known there.

use std::sync::OnceLock;

use log::warn;
use regex::Regex;

use crate::api::{style_list_gen, weight_list_gen, FontIdentity};
use crate::css::{parse_stylesheet, Declaration, Rule};
use crate::error::{Diagnostic, FontMetaError, Result};
use crate::record::{FontFormat, FontRecord, UnicodeRangeMap, VariantSource, VariantTree};
use crate::unicode::{parse_unicode_range, CodepointRange, DEFAULT_LATIN_RANGE};

/// Nesting of the first two variant levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeOrder {
    /// `weight → style → subset` (v1/v2 datasets).
    #[default]
    WeightStyle,
    /// `style → weight → subset` (hybrid dataset, where `variable` sits
    /// beside the numeric weights).
    StyleWeight,
}

impl TreeOrder {
    fn keys<'a>(self, weight: &'a str, style: &'a str) -> (&'a str, &'a str) {
        match self {
            TreeOrder::WeightStyle => (weight, style),
            TreeOrder::StyleWeight => (style, weight),
        }
    }
}

/// One fetched stylesheet; `tag` names the fetch (usually the format).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    pub tag: String,
    pub css: String,
}

impl Stylesheet {
    pub fn new(tag: impl Into<String>, css: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            css: css.into(),
        }
    }
}

/// A built record plus the non-fatal diagnostics raised on the way.
#[derive(Debug, Clone)]
pub struct Built<R> {
    pub record: R,
    pub diagnostics: Vec<Diagnostic>,
}

/// Everything one `@font-face` block contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedFace {
    pub subset: String,
    pub style: String,
    pub weight: String,
    pub unicode_range: Option<Vec<CodepointRange>>,
    pub sources: Vec<(FontFormat, String)>,
}

#[derive(Debug, Clone, Default)]
pub struct MetadataBuilder {
    order: TreeOrder,
}

impl MetadataBuilder {
    pub fn new(order: TreeOrder) -> Self {
        Self { order }
    }

    /// Fold the stylesheets of one font into a validated record.
    pub fn build(
        &self,
        stylesheets: &[Stylesheet],
        identity: &FontIdentity,
    ) -> Result<Built<FontRecord>> {
        let def_subset = identity.def_subset();
        let weights = weight_list_gen(&identity.variants)?;
        let styles = style_list_gen(&identity.variants);

        let mut acc = VariantAccumulator::new(self.order);
        for sheet in stylesheets {
            for face in parse_faces(&identity.family, &sheet.css, &def_subset)? {
                acc.fold(&face, None);
            }
        }

        let mut diagnostics = Vec::new();
        if acc.unicode_range.is_empty() {
            warn!(
                "{}: no unicode-range in any stylesheet, assuming default Latin coverage for {}",
                identity.id, def_subset
            );
            acc.unicode_range
                .insert(def_subset.clone(), DEFAULT_LATIN_RANGE.to_vec());
            diagnostics.push(Diagnostic::DefaultUnicodeRange {
                id: identity.id.clone(),
                subset: def_subset.clone(),
            });
        }

        let record = FontRecord {
            family: identity.family.clone(),
            id: identity.id.clone(),
            subsets: identity.subsets.clone(),
            weights,
            styles,
            unicode_range: acc.unicode_range,
            variants: acc.variants,
            axes: None,
            is_variable: false,
            def_subset,
            last_modified: identity.last_modified.clone(),
            version: identity.version.clone(),
            category: identity.category.clone(),
        };
        record.validate()?;

        Ok(Built {
            record,
            diagnostics,
        })
    }
}

/// Variant tree and unicode ranges under construction.
#[derive(Debug, Clone, Default)]
pub(crate) struct VariantAccumulator {
    pub order: TreeOrder,
    pub variants: VariantTree,
    pub unicode_range: UnicodeRangeMap,
}

impl VariantAccumulator {
    pub fn new(order: TreeOrder) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    pub fn from_parts(order: TreeOrder, variants: VariantTree, unicode_range: UnicodeRangeMap) -> Self {
        Self {
            order,
            variants,
            unicode_range,
        }
    }

    /// Record one face; `weight` overrides the face's own weight key.
    pub fn fold(&mut self, face: &ParsedFace, weight: Option<&str>) {
        let weight = weight.unwrap_or(&face.weight);
        let (first, second) = self.order.keys(weight, &face.style);
        let subsets = self
            .variants
            .entry(first.to_string())
            .or_default()
            .entry(second.to_string())
            .or_default();

        for (format, url) in &face.sources {
            if *format != FontFormat::Woff2 && !subsets.is_empty() {
                for source in subsets.values_mut() {
                    source.url.set(*format, url);
                }
            } else {
                subsets
                    .entry(face.subset.clone())
                    .or_insert_with(VariantSource::default)
                    .url
                    .set(*format, url);
            }
        }

        if let Some(range) = &face.unicode_range {
            if !range.is_empty() {
                self.unicode_range
                    .entry(face.subset.clone())
                    .or_insert_with(|| range.clone());
            }
        }
    }
}

/// Walk one stylesheet and resolve the subset of every `@font-face`.
pub(crate) fn parse_faces(family: &str, css: &str, def_subset: &str) -> Result<Vec<ParsedFace>> {
    let rules = parse_stylesheet(css).map_err(|err| FontMetaError::structural(family, err.to_string()))?;
    // Faces ahead of the first comment are keyed by their `[N]` file index.
    let mut subset: Option<String> = None;
    let mut faces = Vec::new();

    for rule in rules {
        match rule {
            Rule::Comment(text) => {
                let text = text.trim();
                subset = Some(if text == "fallback" || text.is_empty() {
                    def_subset.to_string()
                } else {
                    text.to_string()
                });
            }
            Rule::FontFace(declarations) => {
                let mut face = read_face(family, &declarations)?;
                face.subset = match &subset {
                    Some(subset) => subset.clone(),
                    None => face
                        .sources
                        .first()
                        .and_then(|(_, url)| subset_index(url))
                        .unwrap_or_else(|| def_subset.to_string()),
                };
                faces.push(face);
            }
        }
    }

    Ok(faces)
}

fn read_face(family: &str, declarations: &[Declaration]) -> Result<ParsedFace> {
    let mut style = "normal".to_string();
    let mut weight = "400".to_string();
    let mut unicode_range = None;
    let mut sources = None;

    for decl in declarations {
        match decl.name.as_str() {
            "font-style" => style = decl.value.clone(),
            "font-weight" => weight = decl.value.clone(),
            "unicode-range" => {
                let parsed = parse_unicode_range(&decl.value)
                    .map_err(|err| FontMetaError::structural(family, err.to_string()))?;
                unicode_range = Some(parsed);
            }
            "src" => sources = Some(parse_src(family, &decl.value)?),
            _ => {}
        }
    }

    let sources = sources
        .ok_or_else(|| FontMetaError::structural(family, "@font-face without src"))?;
    if sources.is_empty() {
        return Err(FontMetaError::structural(family, "src lists no url()"));
    }

    Ok(ParsedFace {
        subset: String::new(),
        style,
        weight,
        unicode_range,
        sources,
    })
}

fn url_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^url\(\s*['"]?([^'")\s]+)['"]?\s*\)\s*(?:format\(\s*['"]?([^'")\s]+)['"]?\s*\))?$"#,
        )
        .expect("valid url regex")
    })
}

fn subset_index_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.(\d+)\.[A-Za-z0-9]+$").expect("valid index regex"))
}

/// Parse a `src` list; `local()` alternatives are dropped.
fn parse_src(family: &str, value: &str) -> Result<Vec<(FontFormat, String)>> {
    let mut sources = Vec::new();

    for item in value.split(',') {
        let item = item.trim();
        if item.starts_with("local(") {
            continue;
        }

        let caps = url_item_re()
            .captures(item)
            .ok_or_else(|| FontMetaError::structural(family, format!("unexpected src item: {item}")))?;
        let url = &caps[1];
        let format = match caps.get(2) {
            Some(hint) => FontFormat::from_css(hint.as_str()),
            None => FontFormat::from_extension(url),
        }
        .ok_or_else(|| FontMetaError::structural(family, format!("unknown format for {url}")))?;

        sources.push((format, url.to_string()));
    }

    Ok(sources)
}

/// `.../v55/hash.3.woff2` → `[3]`.
fn subset_index(url: &str) -> Option<String> {
    let file = url.rsplit('/').next().unwrap_or(url);
    subset_index_re()
        .captures(file)
        .map(|caps| format!("[{}]", &caps[1]))
}
