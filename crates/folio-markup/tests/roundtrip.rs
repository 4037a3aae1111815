//! Round-trip properties of the canonical serializer.

use folio_core::{
    Block, ContentHash, Document, FitMode, Heading, ImageTransform, Inline, InlineRun, List,
    ListItem, MediaItem, MediaRow,
};
use folio_markup::{canonicalize, parse, serialize, serialize_page};
use proptest::prelude::*;
use std::time::{Duration, Instant};

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z .!?&<>;\n\t]{0,24}"
}

fn inline() -> impl Strategy<Value = Inline> {
    text().prop_map(Inline::Text).prop_recursive(3, 16, 4, |inner| {
        let children = prop::collection::vec(inner, 0..4);
        prop_oneof![
            children.clone().prop_map(|children| Inline::Bold { children }),
            children.clone().prop_map(|children| Inline::Italic { children }),
            ("[a-z/?=&\"]{0,8}", children).prop_map(|(href, children)| Inline::Link { href, children }),
        ]
    })
}

fn run() -> impl Strategy<Value = InlineRun> {
    prop::collection::vec(inline(), 0..5)
}

fn fit() -> impl Strategy<Value = FitMode> {
    prop_oneof![
        Just(FitMode::None),
        Just(FitMode::TooWide),
        Just(FitMode::TooTall),
        Just(FitMode::Square),
    ]
}

fn media() -> impl Strategy<Value = MediaItem> {
    (
        "[a-f0-9]{12}",
        any::<bool>(),
        "[a-zA-Z \"&<]{0,6}",
        fit(),
        (-400i64..400, 0i64..300, -80i64..80, -80i64..80),
        prop::option::of((0u32..3000, 0u32..3000)),
        prop::option::of(0.0f64..1e4),
        any::<bool>(),
    )
        .prop_map(|(id, video, alt, fit, (r, z, x, y), dims, duration, pending)| {
            let id = ContentHash::parse(&id).unwrap();
            let mut item = if video {
                MediaItem::video(id)
            } else {
                MediaItem::image(id)
            };
            item = item
                .with_alt(alt)
                .with_fit(fit)
                .with_transform(ImageTransform::new(r, z, x, y));
            if let Some((w, h)) = dims {
                item = item.with_dimensions(w, h);
            }
            if let Some(seconds) = duration {
                item = item.with_duration(seconds);
            }
            if pending {
                item = item.with_preview("blob:local/1");
            }
            item
        })
}

fn list() -> impl Strategy<Value = List> {
    let leaf = prop::collection::vec(run(), 0..3).prop_map(|runs| List {
        items: runs
            .into_iter()
            .map(|inline| ListItem { inline, nested: None })
            .collect(),
    });
    leaf.prop_recursive(2, 12, 3, |inner| {
        prop::collection::vec((run(), prop::option::of(inner)), 0..3).prop_map(|items| List {
            items: items
                .into_iter()
                .map(|(inline, nested)| ListItem { inline, nested })
                .collect(),
        })
    })
}

fn block() -> impl Strategy<Value = Block> {
    prop_oneof![
        (1u8..=6, run()).prop_map(|(level, inline)| Block::Heading(Heading::new(level, inline))),
        run().prop_map(Block::Paragraph),
        list().prop_map(Block::List),
        prop::collection::vec(media(), 1..4)
            .prop_map(|items| Block::MediaRow(MediaRow::new(items).unwrap())),
    ]
}

fn document() -> impl Strategy<Value = Document> {
    prop::collection::vec(block(), 0..6).prop_map(Document::new)
}

proptest! {
    #[test]
    fn serialize_is_byte_stable(doc in document()) {
        let first = serialize(&doc);
        let second = serialize(&parse(&first));
        prop_assert_eq!(&first, &second);
    }

    #[test]
    fn parsed_documents_round_trip(doc in document()) {
        let parsed = parse(&serialize(&doc));
        prop_assert!(!parsed.has_pending());
        prop_assert_eq!(parse(&serialize(&parsed)), parsed);
    }

    #[test]
    fn parse_is_total(input in "(<[a-z/!]{0,4}[ a-z=\"']{0,6}>?|[a-zA-Z .&;\n]{0,8}){0,24}") {
        let once = canonicalize(&input);
        prop_assert_eq!(canonicalize(&once), once);
    }
}

#[test]
fn test_scenario_pending_image_serializes_canonical_path() {
    let id = ContentHash::parse("a1b2c3d4e5f6").unwrap();
    let item = MediaItem::image(id).with_preview("data:image/jpeg;base64,/9j/4AAQ");
    assert!(item.pending);
    let doc = Document::new(vec![Block::MediaRow(MediaRow::new([item]).unwrap())]);
    assert_eq!(serialize(&doc), "<img src=\"assets/a1b2c3d4e5f6.jpg\">\n");
}

#[test]
fn test_scenario_explicit_break_keeps_rows_apart() {
    let text = concat!(
        "<img src=\"assets/aaaaaaaaaaaa.jpg\"><img src=\"assets/bbbbbbbbbbbb.jpg\">\n",
        "<img src=\"assets/cccccccccccc.jpg\">\n",
    );
    let doc = parse(text);
    let rows: Vec<usize> = doc
        .blocks
        .iter()
        .filter_map(Block::as_media_row)
        .map(MediaRow::len)
        .collect();
    assert_eq!(rows, vec![2, 1]);
    assert_eq!(serialize(&doc), text);
}

#[test]
fn test_page_round_trip() {
    let text = concat!(
        "<h1>\n    Notes\n</h1>\n",
        "<p>\n    First line.\n    Second <a href=\"https://example.com/?a=1&amp;b=2\">link</a>.\n</p>\n",
        "<ul>\n    <li>one</li>\n    <li><em>two</em>\n        <ul>\n            <li>deep</li>\n        </ul>\n    </li>\n</ul>\n",
        "<video src=\"assets/0123456789ab.mp4\" poster=\"assets/0123456789ab-poster.jpg\" alt=\"clip\" data-width=\"1920\" data-height=\"1080\" data-duration=\"4.25\" controls></video>\n",
    );
    let page = serialize_page(&parse(text), "../");
    assert!(page.ends_with(text));
    assert_eq!(serialize(&parse(&page)), text);
}

#[test]
fn test_deep_nesting_is_flattened() {
    let input = format!("<p>{}x", "<em>".repeat(100_000));
    let once = canonicalize(&input);
    assert!(once.contains('x'));
    assert_eq!(canonicalize(&once), once);
}

#[test]
fn test_unclosed_end_tags_parse_in_linear_time() {
    let input = "</a".repeat(350_000);
    let started = Instant::now();
    let doc = parse(&input);
    assert!(started.elapsed() < Duration::from_secs(20));
    assert_eq!(doc.blocks, vec![Block::paragraph(input.as_str())]);
}

#[test]
fn test_many_raw_text_elements_parse_in_linear_time() {
    let input = "<script></script>x".repeat(60_000);
    let started = Instant::now();
    let doc = parse(&input);
    assert!(started.elapsed() < Duration::from_secs(20));
    assert_eq!(doc.blocks, vec![Block::paragraph("x".repeat(60_000).as_str())]);
}
