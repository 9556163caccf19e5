use std::path::{Path, PathBuf};

use anyhow::Result;
use proptest::prelude::*;

use spritemoji::spritemoji::hexcode::hex_id;
use spritemoji::spritemoji::{
    Catalog, Document, MatchContext, NodeId, RenderStrategy, Replacer, SpriteCoord, SpriteOptions,
    transform_html,
};

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/catalog.json")
}

fn catalog() -> Catalog {
    Catalog::load(&fixture_path()).expect("fixture catalog")
}

/// Runs a transform and records `(raw, sheet)` for every producer call.
fn replace_recording(catalog: &Catalog, html: &str) -> (String, Vec<(String, SpriteCoord)>) {
    let mut seen = vec![];
    let out = transform_html(
        html,
        catalog,
        RenderStrategy::custom(|doc: &mut Document, ctx: &MatchContext<'_>| -> Result<NodeId> {
            seen.push((ctx.raw.to_string(), ctx.emoji.sheet));
            Ok(doc.create_element("img", [("alt", ctx.raw)]))
        }),
    )
    .unwrap();
    (out, seen)
}

#[test]
fn every_catalog_sequence_is_replaced() {
    let catalog = catalog();
    let mut expected = vec![];
    for record in catalog.records() {
        expected.push((record.unified.clone(), record.sheet));
        for variation in &record.skin_variations {
            expected.push((variation.unified.clone(), variation.sheet));
        }
    }
    let text: Vec<&str> = catalog.records().iter().flat_map(|r| r.natives()).collect();

    let (out, seen) = replace_recording(&catalog, &format!("<p>{}</p>", text.join(" | ")));

    let seen: Vec<(String, SpriteCoord)> = seen
        .into_iter()
        .map(|(raw, sheet)| (hex_id(&raw), sheet))
        .collect();
    assert_eq!(seen, expected);
    assert_eq!(out.matches("<img").count(), expected.len());
    assert_eq!(out.matches(" | ").count(), expected.len() - 1);
}

#[test]
fn longest_sequence_wins() {
    let catalog = catalog();
    let (out, seen) = replace_recording(&catalog, "👍🏽👍");
    assert_eq!(out, r#"<img alt="👍🏽"><img alt="👍">"#);
    assert_eq!(seen[0].1, SpriteCoord::new(14, 19));
    assert_eq!(seen[1].1, SpriteCoord::new(14, 16));
}

#[test]
fn tones_missing_from_the_catalog_fall_back_to_the_base_glyph() {
    // 👍🏿 is not listed, so the base matches and the modifier stays as text.
    let (out, _) = replace_recording(&catalog(), "👍🏿");
    assert_eq!(out, "<img alt=\"👍\">🏿");
}

#[test]
fn regex_metacharacters_match_literally() {
    let (out, seen) = replace_recording(&catalog(), "a*b #1 *️⃣ #️⃣");
    assert_eq!(out, "a*b #1 <img alt=\"*️⃣\"> <img alt=\"#️⃣\">");
    assert_eq!(seen.len(), 2);
}

#[test]
fn nested_markup_keeps_its_shape() {
    let html = "<ul><li>ok 👌</li><li><em>☺️</em> and <strong>🧛🏿‍♀️</strong></li></ul>";
    let (out, seen) = replace_recording(&catalog(), html);
    assert_eq!(
        out,
        "<ul><li>ok <img alt=\"👌\"></li><li><em><img alt=\"☺️\"></em> and <strong><img alt=\"🧛🏿‍♀️\"></strong></li></ul>"
    );
    assert_eq!(seen.len(), 3);
}

#[test]
fn matcher_is_built_once_per_catalog() {
    let catalog = catalog();
    assert_eq!(catalog.matcher_builds(), 0);
    for _ in 0..3 {
        transform_html("👌 👍", &catalog, SpriteOptions::default().into()).unwrap();
    }
    assert_eq!(catalog.matcher_builds(), 1);
}

#[test]
fn extending_the_catalog_rebuilds_the_matcher() {
    let mut catalog = catalog();
    let (before, _) = replace_recording(&catalog, "😀");
    assert_eq!(before, "😀");

    let extra = Catalog::from_json(r#"[{ "unified": "1F600", "sheet_x": 30, "sheet_y": 35 }]"#)
        .unwrap()
        .records()
        .to_vec();
    catalog.extend(extra);

    let (after, seen) = replace_recording(&catalog, "😀");
    assert_eq!(after, "<img alt=\"😀\">");
    assert_eq!(seen[0].1, SpriteCoord::new(30, 35));
    assert_eq!(catalog.matcher_builds(), 2);
}

#[test]
fn replacer_counts_across_elements() {
    let catalog = catalog();
    let mut doc = Document::parse_fragment("<p>👌</p><script>var x = '👌';</script><p>👍 👍</p>");
    let root = doc.root();
    let n = Replacer::new(&catalog, SpriteOptions::default().into())
        .with_skipped_elements(["script"])
        .replace(&mut doc, root)
        .unwrap();
    assert_eq!(n, 3);
    assert!(doc.html().contains("<script>var x = '👌';</script>"));
}

#[test]
fn sprite_spans_use_catalog_coordinates() {
    let opts = SpriteOptions {
        size: 22,
        ..SpriteOptions::default()
    };
    let expected_style = opts.style(SpriteCoord::new(14, 13));
    let out = transform_html("👌🏽", &catalog(), opts.into()).unwrap();
    assert!(out.contains(&expected_style.replace('"', "&quot;")));
    assert!(out.contains("width: 22px; height: 22px;"));
}

#[test]
fn entities_and_foreign_markup_survive() {
    let html = r##"<p title="a &quot;b&quot; &amp; c">x &lt; y &amp;&nbsp;z 👌</p><svg><use xlink:href="#icon"></use></svg>"##;
    let (out, seen) = replace_recording(&catalog(), html);
    assert_eq!(
        out,
        r##"<p title="a &quot;b&quot; &amp; c">x &lt; y &amp;&nbsp;z <img alt="👌"></p><svg><use xlink:href="#icon"></use></svg>"##
    );
    assert_eq!(seen.len(), 1);
}

proptest! {
    #[test]
    fn text_without_emoji_is_unchanged(text in "\\PC{0,64}") {
        let catalog = catalog();
        let html = format!("<p>{text}</p>");
        let parsed = Document::parse_fragment(&html);
        let decoded = parsed.text_content(parsed.root());
        prop_assume!(catalog.matcher().unwrap().find_at(&decoded, 0).is_none());

        let (out, seen) = replace_recording(&catalog, &html);
        prop_assert_eq!(out, parsed.html());
        prop_assert!(seen.is_empty());
    }
}
