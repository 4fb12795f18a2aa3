//! fontmeta-core: Google Fonts stylesheets in, canonical font metadata out.
//!
//! The Google Fonts CSS API answers every request with a small pile of
//! `@font-face` blocks whose shape depends on the user agent asking. This
//! crate reads those piles and folds them into one nested record per font:
//! weights, styles, subsets, unicode ranges and a URL per binary format.
//!
//! ## Pieces
//!
//! - [`css`]: strict walker over `@font-face` stylesheets (cssparser based)
//! - [`builder`]: folds stylesheets into a [`record::FontRecord`]
//! - [`query`]: css/css2 links, plus the axis-range queries for variable fonts
//! - [`variable`]: axis conversion and the hybrid static+variable merge
//! - [`runner`]: bounded-concurrency batch runner with a cache and an error budget
//! - [`store`]: sorted, pretty JSON datasets on disk
//! - [`generate`]: the v1, v2, variable and hybrid pipelines end to end
//!
//! ## A short example
//!
//! ```rust
//! use fontmeta_core::api::FontIdentity;
//! use fontmeta_core::builder::{MetadataBuilder, Stylesheet, TreeOrder};
//!
//! let identity = FontIdentity {
//!     family: "Texturina".into(),
//!     id: "texturina".into(),
//!     subsets: vec!["latin".into()],
//!     variants: vec!["regular".into()],
//!     last_modified: "2024-01-01".into(),
//!     version: "v28".into(),
//!     category: "serif".into(),
//! };
//! let css = "/* latin */
//! @font-face {
//!   font-family: 'Texturina';
//!   font-style: normal;
//!   font-weight: 400;
//!   src: url(https://fonts.gstatic.com/s/texturina/v28/a.woff2) format('woff2');
//!   unicode-range: U+0000-00FF;
//! }";
//!
//! let built = MetadataBuilder::new(TreeOrder::WeightStyle)
//!     .build(&[Stylesheet::new("woff2", css)], &identity)?;
//! assert_eq!(built.record.weights, vec![400]);
//! assert!(built.record.variants["400"]["normal"].contains_key("latin"));
//! # Ok::<(), fontmeta_core::error::FontMetaError>(())
//! ```
//!
//! Made by FontLab https://www.fontlab.com/

pub mod api;
pub mod axis;
pub mod builder;
pub mod config;
pub mod css;
pub mod error;
pub mod fetch;
pub mod generate;
pub mod query;
pub mod record;
pub mod runner;
pub mod store;
pub mod unicode;
pub mod variable;
