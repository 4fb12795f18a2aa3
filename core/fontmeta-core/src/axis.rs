//! Design axes: registry lookup, definitions and tag ordering.
//!
//! Axis tags are 2-4 printable ASCII characters. Lowercase tags are registered
//! (`wght`, `wdth`, `opsz`, ...), uppercase tags are foundry extensions
//! (`GRAD`, `FILL`, ...). The css2 API wants them in a fixed order inside a
//! query, which is what [`sort_axes`] produces.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::ApiAxis;
use crate::error::{FontMetaError, Result};

pub const ITALIC: &str = "ital";
pub const WEIGHT: &str = "wght";

/// Registered axes the css2 API groups into the `standard` query.
pub const STANDARD_AXES: [&str; 4] = ["opsz", "slnt", "wdth", "wght"];

/// Axis definition as persisted in the datasets: every field a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisDefinition {
    pub default: String,
    pub min: String,
    pub max: String,
    pub step: String,
}

/// Tag → definition. A map keeps tags unique.
pub type AxisSet = BTreeMap<String, AxisDefinition>;

/// How an axis is expressed inside a css2 query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryAxis {
    /// Rendered as `min..max`.
    Range {
        tag: String,
        min: String,
        max: String,
    },
    /// `ital`: the API only accepts a single instance value.
    Toggle { value: u32 },
}

impl QueryAxis {
    pub fn tag(&self) -> &str {
        match self {
            QueryAxis::Range { tag, .. } => tag,
            QueryAxis::Toggle { .. } => ITALIC,
        }
    }

    pub fn render(&self) -> String {
        match self {
            QueryAxis::Range { min, max, .. } => format!("{min}..{max}"),
            QueryAxis::Toggle { value } => value.to_string(),
        }
    }
}

impl AxisDefinition {
    /// Query form of this axis. `ital` is the only toggle; it starts switched on.
    pub fn to_query_axis(&self, tag: &str) -> QueryAxis {
        if tag == ITALIC {
            QueryAxis::Toggle { value: 1 }
        } else {
            QueryAxis::Range {
                tag: tag.to_string(),
                min: self.min.clone(),
                max: self.max.clone(),
            }
        }
    }

    /// Integer instances of a toggle axis, `min..=max` by `step`.
    pub fn toggle_values(&self) -> Result<Vec<u32>> {
        let min = parse_toggle(&self.min)?;
        let max = parse_toggle(&self.max)?;
        let step = parse_toggle(&self.step)?.max(1);
        Ok((min..=max).step_by(step as usize).collect())
    }
}

fn parse_toggle(raw: &str) -> Result<u32> {
    raw.parse::<u32>()
        .map_err(|_| FontMetaError::invalid(raw, "italic axis values must be integers"))
}

/// Per-tag values the registry contributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisInfo {
    pub tag: String,
    pub default: f64,
    pub precision: i32,
}

/// Source of axis defaults and precisions.
#[derive(Debug, Clone, Default)]
pub struct AxisRegistry {
    axes: BTreeMap<String, AxisInfo>,
}

/// (tag, default, precision) for the axes Google Fonts serves today.
const BUILTIN_AXES: &[(&str, f64, i32)] = &[
    ("ARRR", 10.0, 0),
    ("BLED", 0.0, 0),
    ("BNCE", 0.0, 0),
    ("CASL", 0.0, 2),
    ("CRSV", 0.5, 1),
    ("EDPT", 100.0, 0),
    ("EHLT", 12.0, 0),
    ("ELGR", 1.0, 1),
    ("ELSH", 0.0, 0),
    ("FILL", 0.0, 2),
    ("FLAR", 0.0, 0),
    ("GRAD", 0.0, 0),
    ("HEXP", 0.0, 0),
    ("INFM", 0.0, 0),
    ("MONO", 0.0, 2),
    ("MORF", 0.0, 0),
    ("ROND", 0.0, 0),
    ("SCAN", 0.0, 0),
    ("SHLN", 50.0, 0),
    ("SOFT", 0.0, 0),
    ("SPAC", 0.0, 1),
    ("VOLM", 0.0, 0),
    ("WONK", 0.0, 0),
    ("XOPQ", 88.0, 0),
    ("XROT", 0.0, 0),
    ("XTRA", 400.0, 0),
    ("YEAR", 2000.0, 0),
    ("YELA", 0.0, 0),
    ("YOPQ", 116.0, 0),
    ("YROT", 0.0, 0),
    ("YTAS", 750.0, 0),
    ("YTDE", -250.0, 0),
    ("YTFI", 600.0, 0),
    ("YTLC", 500.0, 0),
    ("YTUC", 725.0, 0),
    ("ital", 0.0, 0),
    ("opsz", 14.0, 1),
    ("slnt", 0.0, 0),
    ("wdth", 100.0, 1),
    ("wght", 400.0, 0),
];

impl AxisRegistry {
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_AXES.iter().map(|(tag, default, precision)| AxisInfo {
            tag: tag.to_string(),
            default: *default,
            precision: *precision,
        }))
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = AxisInfo>,
    {
        let axes = entries
            .into_iter()
            .map(|info| (info.tag.clone(), info))
            .collect();
        Self { axes }
    }

    /// Load a registry dump: a JSON array of `{tag, default, precision}`.
    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: Vec<AxisInfo> = serde_json::from_str(raw)?;
        for entry in &entries {
            validate_tag(&entry.tag)?;
        }
        Ok(Self::from_entries(entries))
    }

    /// Overlay another registry; its entries win.
    pub fn extend(&mut self, other: AxisRegistry) {
        self.axes.extend(other.axes);
    }

    pub fn lookup(&self, tag: &str) -> Result<&AxisInfo> {
        self.axes
            .get(tag)
            .ok_or_else(|| FontMetaError::UnknownAxis {
                tag: tag.to_string(),
            })
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.axes.contains_key(tag)
    }

    /// Convert one upstream `{tag, start, end}` axis.
    ///
    /// Unknown tags fall back to the range start as default and precision 0;
    /// the lookup error is handed back alongside so the caller can report it.
    pub fn define(&self, axis: &ApiAxis) -> (AxisDefinition, Option<FontMetaError>) {
        let (default, precision, missing) = match self.lookup(&axis.tag) {
            Ok(info) => (info.default, info.precision, None),
            Err(err) => (axis.start, 0, Some(err)),
        };

        let definition = AxisDefinition {
            default: format_decimal(default),
            min: format_decimal(axis.start),
            max: format_decimal(axis.end),
            step: step_for_precision(precision),
        };
        (definition, missing)
    }
}

/// Check a tag is 2-4 printable ASCII characters.
pub fn validate_tag(raw: &str) -> Result<()> {
    if raw.len() < 2 || raw.len() > 4 {
        return Err(FontMetaError::invalid(raw, "axis tag must be 2-4 chars"));
    }
    if !raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(FontMetaError::invalid(raw, "axis tag must be ASCII alphanumeric"));
    }
    Ok(())
}

/// Lowercase (registered) tags alphabetically, then uppercase tags alphabetically.
pub fn sort_axes<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut lower: Vec<String> = Vec::new();
    let mut upper: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref();
        if tag.bytes().any(|b| b.is_ascii_uppercase()) {
            upper.push(tag.to_string());
        } else {
            lower.push(tag.to_string());
        }
    }
    lower.sort();
    upper.sort();
    lower.dedup();
    upper.dedup();
    lower.extend(upper);
    lower
}

/// `10^-precision` as a decimal string: 0 → "1", 2 → "0.01", -1 → "10".
pub fn step_for_precision(precision: i32) -> String {
    if precision <= 0 {
        let mut step = String::from("1");
        step.extend(std::iter::repeat('0').take(precision.unsigned_abs() as usize));
        step
    } else {
        let zeros = "0".repeat(precision as usize - 1);
        format!("0.{zeros}1")
    }
}

/// Render API numbers the way the datasets store them (`100`, `0.5`, `-250`).
pub fn format_decimal(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_registered_before_extension_tags() {
        assert_eq!(
            sort_axes(&["wght", "ital", "GRAD", "FILL"]),
            vec!["ital", "wght", "FILL", "GRAD"]
        );
    }

    #[test]
    fn step_follows_precision() {
        assert_eq!(step_for_precision(0), "1");
        assert_eq!(step_for_precision(1), "0.1");
        assert_eq!(step_for_precision(2), "0.01");
        assert_eq!(step_for_precision(-1), "10");
    }

    #[test]
    fn decimals_drop_trailing_zero() {
        assert_eq!(format_decimal(100.0), "100");
        assert_eq!(format_decimal(-250.0), "-250");
        assert_eq!(format_decimal(0.5), "0.5");
        assert_eq!(format_decimal(12.25), "12.25");
    }

    #[test]
    fn defines_registered_axis_from_registry() {
        let registry = AxisRegistry::builtin();
        let (def, missing) = registry.define(&ApiAxis {
            tag: "opsz".into(),
            start: 8.0,
            end: 144.0,
        });

        assert!(missing.is_none());
        assert_eq!(
            def,
            AxisDefinition {
                default: "14".into(),
                min: "8".into(),
                max: "144".into(),
                step: "0.1".into(),
            }
        );
    }

    #[test]
    fn unknown_axis_falls_back_to_start() {
        let registry = AxisRegistry::builtin();
        let (def, missing) = registry.define(&ApiAxis {
            tag: "ZZZZ".into(),
            start: -10.0,
            end: 10.0,
        });

        assert!(matches!(missing, Some(FontMetaError::UnknownAxis { .. })));
        assert_eq!(def.default, "-10");
        assert_eq!(def.step, "1");
    }

    #[test]
    fn ital_is_the_only_toggle() {
        let def = AxisDefinition {
            default: "0".into(),
            min: "0".into(),
            max: "1".into(),
            step: "1".into(),
        };
        assert_eq!(def.to_query_axis("ital"), QueryAxis::Toggle { value: 1 });
        assert_eq!(def.to_query_axis("ital").render(), "1");
        assert_eq!(def.to_query_axis("wght").render(), "0..1");
        assert_eq!(def.toggle_values().unwrap(), vec![0, 1]);
    }

    #[test]
    fn registry_json_overrides_builtin() {
        let mut registry = AxisRegistry::builtin();
        let extra =
            AxisRegistry::from_json(r#"[{"tag": "wght", "default": 300.0, "precision": 0}]"#)
                .expect("json");
        registry.extend(extra);
        assert_eq!(registry.lookup("wght").unwrap().default, 300.0);
        assert!(AxisRegistry::from_json(r#"[{"tag": "w", "default": 0, "precision": 0}]"#).is_err());
    }
}
