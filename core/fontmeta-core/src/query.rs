//! Google Fonts CSS API query construction (made by FontLab https://www.fontlab.com/)
//!
//! Static fonts are fetched with one css (v1) or css2 (v2) link listing every
//! variant. Variable fonts need several css2 axis-range queries, since the API
//! serves one file per query and a single query over every axis would hide
//! the per-axis files consumers want.

use std::collections::BTreeMap;

use log::warn;

use crate::api::{weight_list_gen, ApiFont};
use crate::axis::{sort_axes, AxisRegistry, AxisSet, QueryAxis, ITALIC, STANDARD_AXES, WEIGHT};
use crate::error::{Diagnostic, Result};

pub const CSS_BASE: &str = "https://fonts.googleapis.com/css?family=";
pub const CSS2_BASE: &str = "https://fonts.googleapis.com/css2?family=";

/// Named axis-range queries for one variable font.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPlan {
    /// `<name>.normal` / `<name>.italic` → css2 URL.
    pub queries: BTreeMap<String, String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Build the covering set of css2 queries for a font's axes.
///
/// Axes unknown to `registry` are reported and left out of every query.
pub fn build_queries(family: &str, id: &str, axes: &AxisSet, registry: &AxisRegistry) -> QueryPlan {
    let mut plan = QueryPlan::default();

    let mut known: Vec<&str> = Vec::new();
    for tag in axes.keys() {
        if registry.contains(tag) {
            known.push(tag);
        } else {
            warn!("{id}: axis {tag} is not in the axis registry, leaving it out of queries");
            plan.diagnostics.push(Diagnostic::UnknownAxis {
                id: id.to_string(),
                tag: tag.clone(),
            });
        }
    }

    let italic = known.contains(&ITALIC);
    let weight = known.contains(&WEIGHT);
    let remainder: Vec<&str> = known
        .iter()
        .copied()
        .filter(|tag| *tag != ITALIC && *tag != WEIGHT)
        .collect();

    let mut emit = |name: &str, tags: &[&str]| {
        let mut tags = tags.to_vec();
        if weight && !tags.contains(&WEIGHT) {
            tags.push(WEIGHT);
        }
        plan.queries
            .insert(format!("{name}.normal"), axis_query(family, axes, &tags));
        if italic {
            tags.push(ITALIC);
            plan.queries
                .insert(format!("{name}.italic"), axis_query(family, axes, &tags));
        }
    };

    if weight {
        emit(WEIGHT, &[]);
    }

    for tag in &remainder {
        emit(tag, &[*tag]);
    }

    let non_standard = remainder
        .iter()
        .filter(|tag| !STANDARD_AXES.contains(tag))
        .count();
    if non_standard > 1 {
        emit("full", &remainder);
    }

    let standard: Vec<&str> = remainder
        .iter()
        .copied()
        .filter(|tag| STANDARD_AXES.contains(tag))
        .collect();
    if !standard.is_empty() {
        emit("standard", &standard);
    }

    plan
}

/// One css2 query over every registered axis except `ital`; `italic` pins
/// the toggle.
pub fn combined_query(
    family: &str,
    axes: &AxisSet,
    registry: &AxisRegistry,
    italic: Option<u32>,
) -> String {
    let mut query_axes: Vec<QueryAxis> = axes
        .iter()
        .filter(|(tag, _)| tag.as_str() != ITALIC && registry.contains(tag.as_str()))
        .map(|(tag, def)| def.to_query_axis(tag))
        .collect();
    if let Some(value) = italic {
        query_axes.push(QueryAxis::Toggle { value });
    }
    format_query(family, &query_axes)
}

fn axis_query(family: &str, axes: &AxisSet, tags: &[&str]) -> String {
    let query_axes: Vec<QueryAxis> = tags
        .iter()
        .filter_map(|tag| axes.get(*tag).map(|def| def.to_query_axis(tag)))
        .collect();
    format_query(family, &query_axes)
}

/// `base + family:<sorted tags>@<aligned values>`.
pub fn format_query(family: &str, axes: &[QueryAxis]) -> String {
    let mut url = format!("{CSS2_BASE}{}", family_param(family));
    if axes.is_empty() {
        return url;
    }

    let tags: Vec<&str> = axes.iter().map(QueryAxis::tag).collect();
    let sorted = sort_axes(&tags);
    let values: Vec<String> = sorted
        .iter()
        .filter_map(|tag| axes.iter().find(|axis| axis.tag() == tag.as_str()))
        .map(QueryAxis::render)
        .collect();

    url.push(':');
    url.push_str(&sorted.join(","));
    url.push('@');
    url.push_str(&values.join(","));
    url
}

fn family_param(family: &str) -> String {
    family.split_whitespace().collect::<Vec<_>>().join("+")
}

/// v1 link: `css?family=Family:400,400italic,700&subset=latin,latin-ext`.
pub fn css_v1_link(font: &ApiFont) -> String {
    let variants: Vec<String> = font
        .variants
        .iter()
        .map(|variant| match variant.as_str() {
            "regular" => "400".to_string(),
            "italic" => "400italic".to_string(),
            other => other.to_string(),
        })
        .collect();

    let mut url = format!("{CSS_BASE}{}", family_param(&font.family));
    if !variants.is_empty() {
        url.push(':');
        url.push_str(&variants.join(","));
    }
    if !font.subsets.is_empty() {
        url.push_str("&subset=");
        url.push_str(&font.subsets.join(","));
    }
    url
}

/// v2 link: `css2?family=Family:ital,wght@0,400;1,700`.
pub fn css2_link(font: &ApiFont) -> Result<String> {
    let mut tuples: Vec<(u8, u16)> = Vec::with_capacity(font.variants.len());
    for variant in &font.variants {
        let weight = weight_list_gen(std::slice::from_ref(variant))?[0];
        let ital = u8::from(variant.contains("italic"));
        tuples.push((ital, weight));
    }
    tuples.sort_unstable();
    tuples.dedup();

    let mut url = format!("{CSS2_BASE}{}", family_param(&font.family));
    if tuples.is_empty() || tuples == [(0, 400)] {
        return Ok(url);
    }

    if tuples.iter().any(|(ital, _)| *ital == 1) {
        let body: Vec<String> = tuples.iter().map(|(i, w)| format!("{i},{w}")).collect();
        url.push_str(":ital,wght@");
        url.push_str(&body.join(";"));
    } else {
        let body: Vec<String> = tuples.iter().map(|(_, w)| w.to_string()).collect();
        url.push_str(":wght@");
        url.push_str(&body.join(";"));
    }
    Ok(url)
}
