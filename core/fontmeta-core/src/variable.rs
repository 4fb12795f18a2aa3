//! Variable fonts: axis conversion, the hybrid merge and `variable` records.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::api::{style_list_gen, ApiFont};
use crate::axis::{AxisDefinition, AxisRegistry, AxisSet, ITALIC, WEIGHT};
use crate::builder::{parse_faces, Built, TreeOrder, VariantAccumulator};
use crate::error::{Diagnostic, FontMetaError, Result};
use crate::fetch::{Fetcher, UserAgents};
use crate::query::{build_queries, combined_query};
use crate::record::{FontFormat, FontRecord, VariableRecord};
use crate::store::Dataset;

/// Weight key the variable files sit under, beside the numeric weights.
pub const VARIABLE_WEIGHT: &str = "variable";

/// `ital` stand-in for fonts that list italics without the axis.
pub fn synthesize_italic<S: AsRef<str>>(styles: &[S]) -> Option<AxisDefinition> {
    if !styles.iter().any(|s| s.as_ref().contains("italic")) {
        return None;
    }
    let has_upright = styles.iter().any(|s| !s.as_ref().contains("italic"));
    let base = if has_upright { "0" } else { "1" };
    Some(AxisDefinition {
        default: base.to_string(),
        min: base.to_string(),
        max: "1".to_string(),
        step: "1".to_string(),
    })
}

/// `wght` stand-in spanning the static weights. Regular-only fonts get none.
pub fn synthesize_weight(weights: &[u16]) -> Option<AxisDefinition> {
    let (&min, &max) = (weights.first()?, weights.last()?);
    if weights == [400] {
        return None;
    }
    let default = if (min..=max).contains(&400) { 400 } else { min };
    Some(AxisDefinition {
        default: default.to_string(),
        min: min.to_string(),
        max: max.to_string(),
        step: "1".to_string(),
    })
}

/// Axis set of a static font: synthesized `ital` and `wght` only.
pub fn static_axes(styles: &[String], weights: &[u16]) -> AxisSet {
    let mut axes = AxisSet::new();
    if let Some(ital) = synthesize_italic(styles) {
        axes.insert(ITALIC.to_string(), ital);
    }
    if let Some(wght) = synthesize_weight(weights) {
        axes.insert(WEIGHT.to_string(), wght);
    }
    axes
}

/// Convert the upstream axes of a variable entry.
///
/// Unknown tags still produce a definition; they are reported as
/// [`Diagnostic::UnknownAxis`]. An italic variant without an `ital` axis gets
/// a synthesized one.
pub fn variable_axes(entry: &ApiFont, registry: &AxisRegistry) -> Built<AxisSet> {
    let id = entry.id();
    let mut axes = AxisSet::new();
    let mut diagnostics = Vec::new();

    for axis in entry.axes.iter().flatten() {
        let (definition, missing) = registry.define(axis);
        if let Some(err) = missing {
            warn!("{id}: {err}, using range start as default");
            diagnostics.push(Diagnostic::UnknownAxis {
                id: id.clone(),
                tag: axis.tag.clone(),
            });
        }
        axes.insert(axis.tag.clone(), definition);
    }

    if !axes.contains_key(ITALIC) {
        if let Some(ital) = synthesize_italic(&style_list_gen(&entry.variants)) {
            info!("{id}: italic variants without an ital axis, synthesizing one");
            axes.insert(ITALIC.to_string(), ital);
            diagnostics.push(Diagnostic::SynthesizedItalic { id });
        }
    }

    Built {
        record: axes,
        diagnostics,
    }
}

/// Folds variable-font files into a static record built in
/// [`TreeOrder::StyleWeight`] order.
pub struct VariableMerger<'a, F: Fetcher + ?Sized> {
    fetcher: &'a F,
    registry: &'a AxisRegistry,
    user_agents: &'a UserAgents,
    previous: &'a Dataset<FontRecord>,
}

impl<'a, F: Fetcher + ?Sized> VariableMerger<'a, F> {
    pub fn new(
        fetcher: &'a F,
        registry: &'a AxisRegistry,
        user_agents: &'a UserAgents,
        previous: &'a Dataset<FontRecord>,
    ) -> Self {
        Self {
            fetcher,
            registry,
            user_agents,
            previous,
        }
    }

    /// Merge the variable counterpart `entry` (if any) into `record`.
    pub async fn merge(
        &self,
        mut record: FontRecord,
        entry: Option<&ApiFont>,
        force: bool,
    ) -> Result<Built<FontRecord>> {
        if !force {
            if let Some(previous) = self.reusable(&record, entry) {
                debug!("{}: hybrid record unchanged, reusing", record.id);
                return Ok(Built {
                    record: previous.clone(),
                    diagnostics: Vec::new(),
                });
            }
        }

        let Some(entry) = entry.filter(|entry| entry.has_axes()) else {
            let axes = static_axes(&record.styles, &record.weights);
            record.axes = (!axes.is_empty()).then_some(axes);
            record.is_variable = false;
            record.validate()?;
            return Ok(Built {
                record,
                diagnostics: Vec::new(),
            });
        };

        let Built {
            record: axes,
            diagnostics,
        } = variable_axes(entry, self.registry);

        let slots: Vec<(&str, String)> = match axes.get(ITALIC) {
            Some(ital) => ital
                .toggle_values()?
                .into_iter()
                .map(|value| {
                    let style = if value == 0 { "normal" } else { "italic" };
                    (style, combined_query(&record.family, &axes, self.registry, Some(value)))
                })
                .collect(),
            None => vec![("normal", combined_query(&record.family, &axes, self.registry, None))],
        };

        let mut acc = VariantAccumulator::from_parts(
            TreeOrder::StyleWeight,
            std::mem::take(&mut record.variants),
            std::mem::take(&mut record.unicode_range),
        );

        for (style, url) in &slots {
            for user_agent in [&self.user_agents.woff2, &self.user_agents.woff] {
                let css = self.fetcher.fetch_text(url, user_agent).await?;
                for mut face in parse_faces(&record.family, &css, &record.def_subset)? {
                    face.style = style.to_string();
                    acc.fold(&face, Some(VARIABLE_WEIGHT));
                }
            }

            if let Some(file) = entry.file_for_style(style) {
                let subsets = acc
                    .variants
                    .get_mut(*style)
                    .and_then(|weights| weights.get_mut(VARIABLE_WEIGHT));
                for source in subsets.into_iter().flat_map(|s| s.values_mut()) {
                    source.url.set(FontFormat::Truetype, file);
                }
            }
        }

        for style in &record.styles {
            let covered = acc
                .variants
                .get(style)
                .and_then(|weights| weights.get(VARIABLE_WEIGHT))
                .is_some_and(|subsets| !subsets.is_empty());
            if !covered {
                return Err(FontMetaError::MissingStyle {
                    family: record.family.clone(),
                    style: style.clone(),
                });
            }
        }

        record.variants = acc.variants;
        record.unicode_range = acc.unicode_range;
        record.axes = Some(axes);
        record.is_variable = true;
        record.validate()?;

        Ok(Built {
            record,
            diagnostics,
        })
    }

    fn reusable(&self, record: &FontRecord, entry: Option<&ApiFont>) -> Option<&'a FontRecord> {
        self.previous.get(&record.id).filter(|previous| {
            previous.last_modified == record.last_modified
                && entry.map_or(true, |e| e.last_modified == previous.last_modified)
        })
    }
}

/// Build a `variable` dataset record: every axis-range query fetched as woff2.
pub async fn build_variable_record<F: Fetcher + ?Sized>(
    fetcher: &F,
    entry: &ApiFont,
    registry: &AxisRegistry,
    user_agents: &UserAgents,
) -> Result<Built<VariableRecord>> {
    let id = entry.id();
    let def_subset = crate::api::FontIdentity::from(entry).def_subset();
    let Built {
        record: axes,
        mut diagnostics,
    } = variable_axes(entry, registry);

    let plan = build_queries(&entry.family, &id, &axes, registry);
    for diagnostic in plan.diagnostics {
        if !diagnostics.contains(&diagnostic) {
            diagnostics.push(diagnostic);
        }
    }

    let mut variants: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for (name, url) in &plan.queries {
        let css = fetcher.fetch_text(url, &user_agents.woff2).await?;
        let subsets = variants.entry(name.clone()).or_default();
        for face in parse_faces(&entry.family, &css, &def_subset)? {
            let woff2 = face
                .sources
                .iter()
                .find(|(format, _)| *format == FontFormat::Woff2)
                .or_else(|| face.sources.first());
            if let Some((_, file)) = woff2 {
                subsets.entry(face.subset.clone()).or_insert_with(|| file.clone());
            }
        }
    }

    Ok(Built {
        record: VariableRecord {
            family: entry.family.clone(),
            id,
            category: entry.category.clone(),
            last_modified: entry.last_modified.clone(),
            axes,
            variants,
        },
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn italic_only_fonts_start_the_toggle_at_one() {
        let ital = synthesize_italic(&["italic"]).expect("ital");
        assert_eq!((ital.min.as_str(), ital.max.as_str()), ("1", "1"));

        let mixed = synthesize_italic(&["normal", "italic"]).expect("ital");
        assert_eq!((mixed.default.as_str(), mixed.min.as_str()), ("0", "0"));

        assert!(synthesize_italic(&["normal"]).is_none());
    }

    #[test]
    fn weight_axis_skipped_for_regular_only() {
        assert!(synthesize_weight(&[400]).is_none());
        assert!(synthesize_weight(&[]).is_none());

        let wght = synthesize_weight(&[300, 400, 700]).expect("wght");
        assert_eq!(
            (wght.default.as_str(), wght.min.as_str(), wght.max.as_str()),
            ("400", "300", "700")
        );

        let heavy = synthesize_weight(&[700, 900]).expect("wght");
        assert_eq!(heavy.default, "700");
    }

    #[test]
    fn unknown_axes_are_reported_not_fatal() {
        let entry = ApiFont {
            family: "Odd Sans".into(),
            variants: vec!["regular".into(), "italic".into()],
            axes: Some(vec![
                crate::api::ApiAxis {
                    tag: "ZZZZ".into(),
                    start: 3.0,
                    end: 9.0,
                },
                crate::api::ApiAxis {
                    tag: "wght".into(),
                    start: 100.0,
                    end: 900.0,
                },
            ]),
            ..ApiFont::default()
        };
        let built = variable_axes(&entry, &AxisRegistry::builtin());

        assert_eq!(built.record["ZZZZ"].default, "3");
        assert_eq!(built.record["wght"].default, "400");
        assert_eq!(built.record["ital"].min, "0");
        assert_eq!(
            built.diagnostics,
            vec![
                Diagnostic::UnknownAxis {
                    id: "odd-sans".into(),
                    tag: "ZZZZ".into()
                },
                Diagnostic::SynthesizedItalic {
                    id: "odd-sans".into()
                },
            ]
        );
    }
}
