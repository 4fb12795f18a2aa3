//! Google Fonts developer API entries and the identity derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FontMetaError, Result};

/// Developer API list response (`/webfonts/v1/webfonts`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub items: Vec<ApiFont>,
}

/// One `items[]` entry of the developer API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFont {
    pub family: String,
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub subsets: Vec<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub category: String,
    /// Variant name (`regular`, `700italic`, ...) to static TTF URL.
    #[serde(default)]
    pub files: BTreeMap<String, String>,
    /// Only present when the list was requested with `capability=VF`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axes: Option<Vec<ApiAxis>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiAxis {
    pub tag: String,
    pub start: f64,
    pub end: f64,
}

impl ApiFont {
    pub fn id(&self) -> String {
        font_id(&self.family)
    }

    /// True when the entry carries at least one design axis.
    pub fn has_axes(&self) -> bool {
        self.axes.as_ref().is_some_and(|axes| !axes.is_empty())
    }

    /// Static file for a CSS style, with `normal` looked up as `regular`.
    pub fn file_for_style(&self, style: &str) -> Option<&str> {
        let key = if style == "normal" { "regular" } else { style };
        self.files.get(key).map(String::as_str)
    }
}

/// Dataset key of a family: `Roboto Flex` → `roboto-flex`.
pub fn font_id(family: &str) -> String {
    slug::slugify(family)
}

/// Immutable per-font facts the builder needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontIdentity {
    pub family: String,
    pub id: String,
    pub subsets: Vec<String>,
    pub variants: Vec<String>,
    pub last_modified: String,
    pub version: String,
    pub category: String,
}

impl FontIdentity {
    pub fn def_subset(&self) -> String {
        if self.subsets.iter().any(|s| s == "latin") {
            return "latin".to_string();
        }
        self.subsets
            .first()
            .cloned()
            .unwrap_or_else(|| "latin".to_string())
    }
}

impl From<&ApiFont> for FontIdentity {
    fn from(font: &ApiFont) -> Self {
        let mut subsets = Vec::new();
        for subset in &font.subsets {
            if !subsets.contains(subset) {
                subsets.push(subset.clone());
            }
        }

        FontIdentity {
            family: font.family.clone(),
            id: font.id(),
            subsets,
            variants: font.variants.clone(),
            last_modified: font.last_modified.clone(),
            version: font.version.clone(),
            category: font.category.clone(),
        }
    }
}

/// Derive the sorted, deduplicated weight list from API variant names.
///
/// `regular` and `italic` both mean 400; other names must be a number with an
/// optional `italic` suffix.
pub fn weight_list_gen<S: AsRef<str>>(variants: &[S]) -> Result<Vec<u16>> {
    let mut weights = Vec::with_capacity(variants.len());
    for variant in variants {
        weights.push(variant_weight(variant.as_ref())?);
    }
    weights.sort_unstable();
    weights.dedup();
    Ok(weights)
}

fn variant_weight(variant: &str) -> Result<u16> {
    if variant == "regular" || variant == "italic" {
        return Ok(400);
    }

    let digits = variant.strip_suffix("italic").unwrap_or(variant);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FontMetaError::invalid(variant, "not a weight variant"));
    }
    digits
        .parse::<u16>()
        .map_err(|_| FontMetaError::invalid(variant, "weight out of range"))
}

/// Distinct CSS styles of the variant list, in first-seen order.
pub fn style_list_gen<S: AsRef<str>>(variants: &[S]) -> Vec<String> {
    let mut styles: Vec<String> = Vec::new();
    for variant in variants {
        let style = if variant.as_ref().contains("italic") {
            "italic"
        } else {
            "normal"
        };
        if !styles.iter().any(|s| s == style) {
            styles.push(style.to_string());
        }
    }
    styles
}
