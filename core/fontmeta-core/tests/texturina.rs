mod common;

use pretty_assertions::assert_eq;

use common::{fixture, texturina, texturina_sheets as sheets};
use fontmeta_core::api::{ApiFont, FontIdentity};
use fontmeta_core::builder::{MetadataBuilder, Stylesheet, TreeOrder};
use fontmeta_core::error::{Diagnostic, FontMetaError};

#[test]
fn texturina_matches_checked_in_record() {
    let identity = FontIdentity::from(&texturina());
    let built = MetadataBuilder::new(TreeOrder::WeightStyle)
        .build(&sheets(), &identity)
        .expect("build");

    let expected: serde_json::Value =
        serde_json::from_str(&fixture("texturina.json")).expect("fixture json");
    let actual = serde_json::to_value(&built.record).expect("to value");

    assert_eq!(actual, expected);
    assert!(built.diagnostics.is_empty());
}

#[test]
fn every_weight_and_style_reaches_every_subset() {
    let built = MetadataBuilder::new(TreeOrder::WeightStyle)
        .build(&sheets(), &FontIdentity::from(&texturina()))
        .expect("build");
    let record = built.record;

    assert_eq!(record.weights, vec![100, 200, 300, 400, 500, 600, 700, 800, 900]);
    assert_eq!(record.styles, vec!["normal", "italic"]);
    for weight in &record.weights {
        let styles = &record.variants[&weight.to_string()];
        assert_eq!(styles.keys().collect::<Vec<_>>(), vec!["italic", "normal"], "{weight}");
        for subsets in styles.values() {
            assert_eq!(subsets.len(), 3, "{weight}");
            for source in subsets.values() {
                let url = &source.url;
                assert!(url.woff2.is_some() && url.woff.is_some() && url.truetype.is_some());
            }
        }
    }

    // One variable-backed woff2 per style and subset, one static woff per instance.
    let thin = &record.variants["100"]["italic"]["latin"].url;
    let black = &record.variants["900"]["italic"]["latin"].url;
    assert_eq!(thin.woff2, black.woff2);
    assert_ne!(thin.woff, black.woff);
    assert_ne!(
        record.variants["100"]["italic"]["latin"].url.woff2,
        record.variants["100"]["normal"]["latin"].url.woff2
    );
}

#[test]
fn building_twice_gives_the_same_record() {
    let identity = FontIdentity::from(&texturina());
    let builder = MetadataBuilder::new(TreeOrder::WeightStyle);

    let first = builder.build(&sheets(), &identity).expect("first");
    let second = builder.build(&sheets(), &identity).expect("second");
    assert_eq!(first.record, second.record);
}

#[test]
fn style_weight_order_holds_the_same_leaves() {
    let identity = FontIdentity::from(&texturina());
    let flat = MetadataBuilder::new(TreeOrder::WeightStyle)
        .build(&sheets(), &identity)
        .expect("weight/style");
    let nested = MetadataBuilder::new(TreeOrder::StyleWeight)
        .build(&sheets(), &identity)
        .expect("style/weight");

    assert_eq!(
        nested.record.variants["italic"]["400"],
        flat.record.variants["400"]["italic"]
    );
    assert_eq!(
        nested.record.variants.keys().collect::<Vec<_>>(),
        vec!["italic", "normal"]
    );
}

#[test]
fn uncommented_sheets_key_subsets_by_filename_index() {
    let css = r#"
@font-face {
  font-family: 'Noto Sans JP';
  font-style: normal;
  font-weight: 400;
  src: url(https://fonts.gstatic.com/s/notosansjp/v52/abc.0.woff2) format('woff2');
  unicode-range: U+25EE8, U+25F23;
}
@font-face {
  font-family: 'Noto Sans JP';
  font-style: normal;
  font-weight: 400;
  src: url(https://fonts.gstatic.com/s/notosansjp/v52/abc.1.woff2) format('woff2');
  unicode-range: U+1F235-1F23B;
}
"#;
    let identity = FontIdentity {
        family: "Noto Sans JP".into(),
        id: "noto-sans-jp".into(),
        subsets: vec!["japanese".into(), "latin".into()],
        variants: vec!["regular".into()],
        last_modified: "2024-01-01".into(),
        version: "v52".into(),
        category: "sans-serif".into(),
    };

    let built = MetadataBuilder::default()
        .build(&[Stylesheet::new("woff2", css)], &identity)
        .expect("build");
    let subsets = &built.record.variants["400"]["normal"];

    assert_eq!(subsets.keys().collect::<Vec<_>>(), vec!["[0]", "[1]"]);
    assert_eq!(built.record.unicode_range["[1]"], vec![[0x1F235, 0x1F23B]]);

    let mixed = r#"
@font-face {
  font-family: 'Noto Sans JP';
  font-style: normal;
  font-weight: 400;
  src: url(https://fonts.gstatic.com/s/notosansjp/v52/hash.0.woff2) format('woff2');
  unicode-range: U+4E00-4E01;
}
@font-face {
  font-family: 'Noto Sans JP';
  font-style: normal;
  font-weight: 400;
  src: url(https://fonts.gstatic.com/s/notosansjp/v52/hash.1.woff2) format('woff2');
  unicode-range: U+4E02;
}
/* latin */
@font-face {
  font-family: 'Noto Sans JP';
  font-style: normal;
  font-weight: 400;
  src: url(https://fonts.gstatic.com/s/notosansjp/v52/latin.woff2) format('woff2');
  unicode-range: U+0000-00FF;
}
"#;
    let built = MetadataBuilder::default()
        .build(&[Stylesheet::new("woff2", mixed)], &identity)
        .expect("build");
    let subsets = &built.record.variants["400"]["normal"];

    assert_eq!(subsets.keys().collect::<Vec<_>>(), vec!["[0]", "[1]", "latin"]);
    assert_eq!(
        subsets["[0]"].url.woff2.as_deref(),
        Some("https://fonts.gstatic.com/s/notosansjp/v52/hash.0.woff2")
    );
    assert_eq!(
        subsets["latin"].url.woff2.as_deref(),
        Some("https://fonts.gstatic.com/s/notosansjp/v52/latin.woff2")
    );
    assert_eq!(built.record.unicode_range["latin"], vec![[0x0000, 0x00FF]]);
    assert_eq!(built.record.unicode_range["[0]"], vec![[0x4E00, 0x4E01]]);
}

#[test]
fn missing_unicode_ranges_fall_back_to_latin_with_a_diagnostic() {
    let identity = FontIdentity::from(&ApiFont {
        variants: vec!["regular".into()],
        ..texturina()
    });
    let css = "@font-face { font-family: 'Texturina'; src: url(https://x/t.ttf) format('truetype'); }";

    let built = MetadataBuilder::default()
        .build(&[Stylesheet::new("truetype", css)], &identity)
        .expect("build");

    assert_eq!(
        built.diagnostics,
        vec![Diagnostic::DefaultUnicodeRange {
            id: "texturina".into(),
            subset: "latin".into()
        }]
    );
    assert_eq!(built.record.unicode_range["latin"][0], [0x0000, 0x00FF]);
}

#[test]
fn malformed_sheet_is_a_structural_error() {
    let identity = FontIdentity::from(&texturina());
    let err = MetadataBuilder::default()
        .build(&[Stylesheet::new("woff2", "@media screen { }")], &identity)
        .unwrap_err();
    assert!(matches!(err, FontMetaError::StructuralParse { ref family, .. } if family == "Texturina"));
}
