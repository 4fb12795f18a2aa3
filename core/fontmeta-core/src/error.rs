//! Error taxonomy for metadata generation.

use thiserror::Error;

pub type Result<T, E = FontMetaError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum FontMetaError {
    /// The stylesheet had a shape the walker does not accept. Fatal for one font.
    #[error("unexpected stylesheet structure for {family}: {message}")]
    StructuralParse { family: String, message: String },

    /// Non-2xx response or transport failure.
    #[error("fetch failed for {url}: {message}")]
    UpstreamFetch { url: String, message: String },

    /// The axis registry has no entry for this tag. Diagnostic only.
    #[error("axis {tag} is not in the axis registry")]
    UnknownAxis { tag: String },

    #[error("invalid value '{value}': {reason}")]
    InvalidValue { value: String, reason: String },

    #[error("{family} has no variable variants for style '{style}'")]
    MissingStyle { family: String, style: String },

    #[error("invalid record for {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    /// Error budget exceeded mid-run, or errors left over when the queue drained.
    #[error("batch aborted after {} error(s):\n{}", .errors.len(), .errors.join("\n"))]
    BatchAbort { errors: Vec<String> },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FontMetaError {
    pub(crate) fn structural(family: &str, message: impl Into<String>) -> Self {
        FontMetaError::StructuralParse {
            family: family.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid(value: &str, reason: impl Into<String>) -> Self {
        FontMetaError::InvalidValue {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Non-fatal signals raised while building a record.
///
/// These are logged where they happen and also handed back to the caller so a
/// run can report them without scraping logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No `unicode-range` was observed; the default Latin range was used.
    DefaultUnicodeRange { id: String, subset: String },
    /// An axis tag missing from the registry.
    UnknownAxis { id: String, tag: String },
    /// Upstream listed italic styles without an `ital` axis.
    SynthesizedItalic { id: String },
}
