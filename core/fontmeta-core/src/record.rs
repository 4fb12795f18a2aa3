//! Dataset records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::axis::AxisSet;
use crate::error::{FontMetaError, Result};
use crate::unicode::CodepointRange;

/// Binary formats the API serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFormat {
    Woff2,
    Woff,
    Truetype,
    Opentype,
}

impl FontFormat {
    /// Parse a CSS `format()` hint.
    pub fn from_css(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "woff2" => Some(FontFormat::Woff2),
            "woff" => Some(FontFormat::Woff),
            "truetype" | "ttf" => Some(FontFormat::Truetype),
            "opentype" | "otf" => Some(FontFormat::Opentype),
            _ => None,
        }
    }

    /// Guess from a resource URL's file extension.
    pub fn from_extension(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let ext = path.rsplit_once('.')?.1;
        Self::from_css(ext)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FontFormat::Woff2 => "woff2",
            FontFormat::Woff => "woff",
            FontFormat::Truetype => "truetype",
            FontFormat::Opentype => "opentype",
        }
    }
}

impl fmt::Display for FontFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format → URL for one weight/style/subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub woff2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub woff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opentype: Option<String>,
}

impl FormatMap {
    pub fn set(&mut self, format: FontFormat, url: &str) {
        let slot = match format {
            FontFormat::Woff2 => &mut self.woff2,
            FontFormat::Woff => &mut self.woff,
            FontFormat::Truetype => &mut self.truetype,
            FontFormat::Opentype => &mut self.opentype,
        };
        *slot = Some(url.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.woff2.is_none() && self.woff.is_none() && self.truetype.is_none() && self.opentype.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSource {
    pub url: FormatMap,
}

/// Subset key → sources.
pub type SubsetMap = BTreeMap<String, VariantSource>;

/// `first → second → subset`. Static trees are weight → style, hybrid trees
/// style → weight; see [`TreeOrder`](crate::builder::TreeOrder).
pub type VariantTree = BTreeMap<String, BTreeMap<String, SubsetMap>>;

pub type UnicodeRangeMap = BTreeMap<String, Vec<CodepointRange>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontRecord {
    pub family: String,
    pub id: String,
    pub subsets: Vec<String>,
    pub weights: Vec<u16>,
    pub styles: Vec<String>,
    pub unicode_range: UnicodeRangeMap,
    pub variants: VariantTree,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axes: Option<AxisSet>,
    #[serde(default)]
    pub is_variable: bool,
    pub def_subset: String,
    pub last_modified: String,
    pub version: String,
    pub category: String,
}

impl FontRecord {
    /// Post-check run before a record is accepted into a dataset.
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| FontMetaError::InvalidRecord {
            id: self.id.clone(),
            reason,
        };

        if !self.subsets.is_empty() && !self.subsets.contains(&self.def_subset) {
            return Err(fail(format!(
                "defSubset '{}' is not one of {:?}",
                self.def_subset, self.subsets
            )));
        }

        if self.weights.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(fail(format!("weights {:?} are not strictly ascending", self.weights)));
        }

        for (outer, inner) in &self.variants {
            for (middle, subsets) in inner {
                for (subset, source) in subsets {
                    if source.url.is_empty() {
                        return Err(fail(format!("{outer}/{middle}/{subset} has no format")));
                    }
                }
            }
        }

        for style in &self.styles {
            let present = self.variants.contains_key(style)
                || self.variants.values().any(|inner| inner.contains_key(style));
            if !present {
                return Err(fail(format!("style '{style}' has no variants")));
            }
        }

        Ok(())
    }
}

/// Record of the `variable` dataset: css2 query name → subset → woff2 URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableRecord {
    pub family: String,
    pub id: String,
    pub category: String,
    pub last_modified: String,
    pub axes: AxisSet,
    pub variants: BTreeMap<String, BTreeMap<String, String>>,
}

/// Common face of everything persisted in a dataset.
pub trait Stamped {
    fn last_modified(&self) -> &str;
}

impl Stamped for FontRecord {
    fn last_modified(&self) -> &str {
        &self.last_modified
    }
}

impl Stamped for VariableRecord {
    fn last_modified(&self) -> &str {
        &self.last_modified
    }
}
