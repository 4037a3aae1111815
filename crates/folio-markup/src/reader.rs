//! Sanitized element tree to document model.
//!
//! Text blocks become headings and paragraphs, `<ul>` becomes lists and
//! consecutive media become rows. Whitespace or `<br>` between media starts
//! a new row. Media found inside text or list items is hoisted into rows of
//! its own, so the resulting document always satisfies the block invariants.

use std::mem;

use folio_assets::{is_local_preview, AssetPath};
use folio_core::{
    Block, ContentHash, Dimensions, Document, FitMode, Heading, ImageTransform, Inline, InlineRun,
    List, ListItem, MediaItem, MediaKind, MediaRow,
};

use crate::tree::{Element, Node};

/// Inline-level content of a block, with media and breaks kept apart.
#[derive(Debug)]
enum Piece {
    Inline(Inline),
    Media(MediaItem),
    Break,
}

fn collect_pieces(nodes: Vec<Node>, out: &mut Vec<Piece>) {
    for node in nodes {
        let element = match node {
            Node::Text(text) => {
                out.push(Piece::Inline(Inline::Text(text)));
                continue;
            }
            Node::Element(element) => element,
        };
        match element.name.as_str() {
            "br" => out.push(Piece::Break),
            "img" | "video" => out.extend(media_item(&element).map(Piece::Media)),
            "strong" => wrap(element.children, out, |children| Inline::Bold { children }),
            "em" => wrap(element.children, out, |children| Inline::Italic { children }),
            "a" => {
                let href = element.attr("href").unwrap_or_default().to_string();
                wrap(element.children, out, |children| Inline::Link {
                    href: href.clone(),
                    children,
                });
            }
            // Block structure has no meaning inside inline content.
            _ => collect_pieces(element.children, out),
        }
    }
}

/// Wrap the inline pieces of `children` in spans built by `make`, splitting
/// the span around any media or break.
fn wrap(children: Vec<Node>, out: &mut Vec<Piece>, make: impl Fn(InlineRun) -> Inline) {
    let mut inner = Vec::new();
    collect_pieces(children, &mut inner);

    let mut run = InlineRun::new();
    for piece in inner {
        match piece {
            Piece::Inline(span) => run.push(span),
            other => {
                if !run.is_empty() {
                    out.push(Piece::Inline(make(mem::take(&mut run))));
                }
                out.push(other);
            }
        }
    }
    if !run.is_empty() {
        out.push(Piece::Inline(make(run)));
    }
}

fn pieces(nodes: Vec<Node>) -> Vec<Piece> {
    let mut out = Vec::new();
    collect_pieces(nodes, &mut out);
    out
}

#[derive(Debug, Clone, Copy)]
enum TextKind {
    Paragraph,
    Heading(u8),
}

/// Accumulates blocks from a stream of pieces.
struct BlockBuilder {
    kind: TextKind,
    blocks: Vec<Block>,
    inline: InlineRun,
    rows: Vec<Vec<MediaItem>>,
    new_row: bool,
}

impl BlockBuilder {
    fn new(kind: TextKind) -> Self {
        Self {
            kind,
            blocks: Vec::new(),
            inline: InlineRun::new(),
            rows: Vec::new(),
            new_row: false,
        }
    }

    fn push(&mut self, piece: Piece) {
        match piece {
            Piece::Media(item) => self.push_media(item),
            Piece::Break if self.rows.is_empty() => self.inline.push(Inline::Text(" ".into())),
            Piece::Break => self.new_row = true,
            Piece::Inline(Inline::Text(text)) if !self.rows.is_empty() && is_blank(&text) => {
                self.new_row = true;
            }
            Piece::Inline(span) => {
                self.flush_media();
                self.inline.push(span);
            }
        }
    }

    fn push_all(&mut self, pieces: Vec<Piece>) {
        for piece in pieces {
            self.push(piece);
        }
    }

    fn push_media(&mut self, item: MediaItem) {
        self.flush_text();
        match self.rows.last_mut() {
            Some(row) if !self.new_row => row.push(item),
            _ => self.rows.push(vec![item]),
        }
        self.new_row = false;
    }

    fn push_block(&mut self, block: Block) {
        self.flush();
        self.blocks.push(block);
    }

    fn push_rows(&mut self, rows: Vec<Vec<MediaItem>>) {
        self.flush();
        self.blocks
            .extend(rows.into_iter().filter_map(MediaRow::new).map(Block::MediaRow));
    }

    fn flush_text(&mut self) {
        let inline = normalize(mem::take(&mut self.inline));
        if inline.is_empty() {
            return;
        }
        self.blocks.push(match self.kind {
            TextKind::Paragraph => Block::Paragraph(inline),
            TextKind::Heading(level) => Block::Heading(Heading::new(level, inline)),
        });
    }

    fn flush_media(&mut self) {
        let rows = mem::take(&mut self.rows);
        self.blocks
            .extend(rows.into_iter().filter_map(MediaRow::new).map(Block::MediaRow));
        self.new_row = false;
    }

    fn flush(&mut self) {
        self.flush_text();
        self.flush_media();
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }
}

fn heading_level(name: &str) -> Option<u8> {
    match name.as_bytes() {
        [b'h', level @ b'1'..=b'6'] => Some(level - b'0'),
        _ => None,
    }
}

/// Convert a sanitized element tree into a document.
pub fn read(nodes: Vec<Node>) -> Document {
    let mut top = BlockBuilder::new(TextKind::Paragraph);

    for node in nodes {
        let element = match node {
            Node::Element(element) => element,
            text => {
                top.push_all(pieces(vec![text]));
                continue;
            }
        };

        let kind = match element.name.as_str() {
            "p" => Some(TextKind::Paragraph),
            name => heading_level(name).map(TextKind::Heading),
        };
        if let Some(kind) = kind {
            top.flush();
            let mut block = BlockBuilder::new(kind);
            block.push_all(pieces(element.children));
            top.blocks.extend(block.finish());
            continue;
        }

        if element.is("ul") || element.is("li") {
            let list = if element.is("li") {
                Element {
                    children: vec![Node::Element(element)],
                    ..Element::new("ul")
                }
            } else {
                element
            };
            let mut hoisted = Vec::new();
            if let Some(list) = read_list(list, &mut hoisted) {
                top.push_block(Block::List(list));
            }
            top.push_rows(hoisted);
            continue;
        }

        top.push_all(pieces(vec![Node::Element(element)]));
    }

    Document::new(top.finish())
}

fn merge_list(slot: &mut Option<List>, list: List) {
    match slot {
        Some(existing) => existing.items.extend(list.items),
        None => *slot = Some(list),
    }
}

/// Read a `<ul>`. Media inside its items is appended to `hoisted`, one row
/// per item.
fn read_list(ul: Element, hoisted: &mut Vec<Vec<MediaItem>>) -> Option<List> {
    let mut items: Vec<ListItem> = Vec::new();
    let mut stray: Vec<Node> = Vec::new();

    for child in ul.children {
        match child {
            Node::Element(li) if li.is("li") => {
                items.extend(read_item(mem::take(&mut stray), hoisted));
                items.extend(read_item(li.children, hoisted));
            }
            Node::Element(nested) if nested.is("ul") => {
                items.extend(read_item(mem::take(&mut stray), hoisted));
                if let Some(nested) = read_list(nested, hoisted) {
                    match items.last_mut() {
                        Some(prev) => merge_list(&mut prev.nested, nested),
                        None => items.extend(nested.items),
                    }
                }
            }
            other => stray.push(other),
        }
    }
    items.extend(read_item(stray, hoisted));

    (!items.is_empty()).then_some(List { items })
}

fn read_item(children: Vec<Node>, hoisted: &mut Vec<Vec<MediaItem>>) -> Option<ListItem> {
    let mut nested = None;
    let mut inline = InlineRun::new();
    let mut media = Vec::new();

    for child in children {
        match child {
            Node::Element(ul) if ul.is("ul") => {
                if let Some(list) = read_list(ul, hoisted) {
                    merge_list(&mut nested, list);
                }
                inline.push(Inline::Text(" ".into()));
            }
            other => {
                for piece in pieces(vec![other]) {
                    match piece {
                        Piece::Inline(span) => inline.push(span),
                        Piece::Break => inline.push(Inline::Text(" ".into())),
                        Piece::Media(item) => media.push(item),
                    }
                }
            }
        }
    }

    if !media.is_empty() {
        hoisted.push(media);
    }
    let inline = normalize(inline);
    if inline.is_empty() && nested.is_none() {
        return None;
    }
    Some(ListItem { inline, nested })
}

fn is_blank(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_whitespace())
}

/// Canonical inline form: no empty spans, no adjacent text spans, whitespace
/// runs spanning a line break collapsed to one space, and no whitespace at
/// either end of the run.
pub(crate) fn normalize(run: InlineRun) -> InlineRun {
    let mut run = clean(run);
    trim_start(&mut run);
    trim_end(&mut run);
    run
}

fn is_empty_span(span: &Inline) -> bool {
    match span {
        Inline::Text(text) => text.is_empty(),
        Inline::Link { children, .. } | Inline::Bold { children } | Inline::Italic { children } => {
            children.is_empty()
        }
    }
}

fn clean(run: InlineRun) -> InlineRun {
    let mut out = InlineRun::with_capacity(run.len());
    for span in run {
        let span = match span {
            Inline::Bold { children } => Inline::Bold {
                children: clean(children),
            },
            Inline::Italic { children } => Inline::Italic {
                children: clean(children),
            },
            Inline::Link { href, children } => Inline::Link {
                href,
                children: clean(children),
            },
            text => text,
        };
        if is_empty_span(&span) {
            continue;
        }
        if let (Some(Inline::Text(prev)), Inline::Text(next)) = (out.last_mut(), &span) {
            prev.push_str(next);
            continue;
        }
        out.push(span);
    }
    for span in &mut out {
        if let Inline::Text(text) = span {
            *text = collapse_line_breaks(text);
        }
    }
    out
}

/// Replace each whitespace run containing a line break with one space.
fn collapse_line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = String::new();
    let flush = |out: &mut String, pending: &mut String| {
        if pending.contains(['\n', '\r']) {
            out.push(' ');
        } else {
            out.push_str(pending);
        }
        pending.clear();
    };
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            pending.push(c);
        } else {
            flush(&mut out, &mut pending);
            out.push(c);
        }
    }
    flush(&mut out, &mut pending);
    out
}

fn children_mut(span: &mut Inline) -> Option<&mut InlineRun> {
    match span {
        Inline::Text(_) => None,
        Inline::Link { children, .. } | Inline::Bold { children } | Inline::Italic { children } => {
            Some(children)
        }
    }
}

fn trim_start(run: &mut InlineRun) {
    while let Some(first) = run.first_mut() {
        match first {
            Inline::Text(text) => {
                let trimmed = text.trim_start_matches(|c: char| c.is_ascii_whitespace());
                if trimmed.len() == text.len() {
                    return;
                }
                *text = trimmed.to_string();
            }
            span => {
                if let Some(children) = children_mut(span) {
                    trim_start(children);
                }
            }
        }
        if !is_empty_span(&run[0]) {
            return;
        }
        run.remove(0);
    }
}

fn trim_end(run: &mut InlineRun) {
    while let Some(last) = run.last_mut() {
        match last {
            Inline::Text(text) => {
                let trimmed = text.trim_end_matches(|c: char| c.is_ascii_whitespace());
                if trimmed.len() == text.len() {
                    return;
                }
                let keep = trimmed.len();
                text.truncate(keep);
            }
            span => {
                if let Some(children) = children_mut(span) {
                    trim_end(children);
                }
            }
        }
        match run.last() {
            Some(span) if is_empty_span(span) => {
                run.pop();
            }
            _ => return,
        }
    }
}

/// Parse an integer attribute, accepting decimal forms such as `"90.0"`.
fn int_attr(element: &Element, key: &str) -> Option<i64> {
    let raw = element.attr(key)?.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.round().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
    })
}

fn dimension(element: &Element, key: &str) -> Option<u32> {
    int_attr(element, key)
        .filter(|&v| v > 0)
        .map(|v| v.min(i64::from(u32::MAX)) as u32)
}

/// Build a media item from an `<img>` or `<video>` element.
///
/// The asset id comes from the canonical path in `src`, or from `data-hash`
/// while the item is pending. Items with neither are dropped.
fn media_item(element: &Element) -> Option<MediaItem> {
    let kind = if element.is("video") {
        MediaKind::Video
    } else {
        MediaKind::Image
    };
    let src = element.attr("src").unwrap_or_default().trim();
    let local = is_local_preview(src);
    let pending = local || element.attr("class") == Some("pending");

    let from_hash = element
        .attr("data-hash")
        .and_then(|h| ContentHash::parse(h.trim()).ok());
    let from_src = AssetPath::find(src).map(|path| path.id);
    let id = if pending {
        from_hash.or(from_src)
    } else {
        from_src.or(from_hash)
    };
    let Some(id) = id else {
        log::warn!("dropping <{}> with no resolvable asset (src {src:?})", element.name);
        return None;
    };

    let mut item = MediaItem::new(kind, id)
        .with_alt(element.attr("alt").unwrap_or_default())
        .with_fit(FitMode::from_attr(element.attr("data-fit").unwrap_or_default()));
    item.pending = pending;
    if local {
        item.preview_ref = Some(src.to_string());
    }
    if let (Some(width), Some(height)) = (dimension(element, "data-width"), dimension(element, "data-height")) {
        item.dimensions = Some(Dimensions::new(width, height));
    }

    match kind {
        MediaKind::Image => {
            item.transform = ImageTransform::new(
                int_attr(element, "data-rotate").unwrap_or(i64::from(ImageTransform::DEFAULT_ROTATE)),
                int_attr(element, "data-zoom").unwrap_or(i64::from(ImageTransform::DEFAULT_ZOOM)),
                int_attr(element, "data-pan-x").unwrap_or(i64::from(ImageTransform::DEFAULT_PAN)),
                int_attr(element, "data-pan-y").unwrap_or(i64::from(ImageTransform::DEFAULT_PAN)),
            );
        }
        MediaKind::Video => {
            item.duration_seconds = element
                .attr("data-duration")
                .and_then(|d| d.trim().parse::<f64>().ok())
                .filter(|d| d.is_finite() && *d >= 0.0);
        }
    }
    Some(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::sanitize::sanitize;
    use crate::tree::build;

    fn parse(input: &str) -> Document {
        read(sanitize(build(tokenize(input))))
    }

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    fn row_ids(block: &Block) -> Vec<&str> {
        match block {
            Block::MediaRow(row) => row.items.iter().map(|m| m.asset_id.as_str()).collect(),
            other => panic!("expected media row, got {other:?}"),
        }
    }

    const A: &str = r#"<img src="assets/aaaaaaaaaaaa.jpg">"#;
    const B: &str = r#"<img src="assets/bbbbbbbbbbbb.jpg">"#;
    const C: &str = r#"<img src="assets/cccccccccccc.jpg">"#;

    #[test]
    fn test_paragraph_normalized() {
        let doc = parse("<p>\n    Hello\n    <b>big</b>   world.\n    Next\n</p>");
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph(vec![
                text("Hello "),
                Inline::Bold {
                    children: vec![text("big")]
                },
                text("   world. Next"),
            ])]
        );
    }

    #[test]
    fn test_headings() {
        let doc = parse("<h2> Title </h2><h7>x</h7>");
        assert_eq!(doc.blocks[0], Block::heading(2, "Title"));
        assert_eq!(doc.blocks[1], Block::paragraph("x"));
    }

    #[test]
    fn test_empty_spans_and_blocks_dropped() {
        let doc = parse("<p><strong></strong><em> </em></p><p>  </p><a href=\"x\"></a>");
        assert!(doc.is_empty());
    }

    #[test]
    fn test_stray_inline_wrapped_in_paragraph() {
        let doc = parse("loose <em>text</em><h1>T</h1>tail");
        assert_eq!(
            doc.blocks,
            vec![
                Block::Paragraph(vec![
                    text("loose "),
                    Inline::Italic {
                        children: vec![text("text")]
                    }
                ]),
                Block::heading(1, "T"),
                Block::paragraph("tail"),
            ]
        );
    }

    #[test]
    fn test_media_rows() {
        let doc = parse(&format!("{A}{B}\n{C}\n<p>after</p>"));
        assert_eq!(doc.blocks.len(), 3);
        assert_eq!(row_ids(&doc.blocks[0]), vec!["aaaaaaaaaaaa", "bbbbbbbbbbbb"]);
        assert_eq!(row_ids(&doc.blocks[1]), vec!["cccccccccccc"]);
    }

    #[test]
    fn test_br_between_media_breaks_row() {
        let doc = parse(&format!("<p>{A}<br>{B}{C}</p>"));
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(row_ids(&doc.blocks[1]), vec!["bbbbbbbbbbbb", "cccccccccccc"]);
    }

    #[test]
    fn test_media_hoisted_out_of_text() {
        let doc = parse(&format!("<p>Before <a href=\"/x\">link {A} more</a> after</p>"));
        assert_eq!(doc.blocks.len(), 3);
        assert_eq!(
            doc.blocks[0],
            Block::Paragraph(vec![
                text("Before "),
                Inline::Link {
                    href: "/x".into(),
                    children: vec![text("link")]
                },
            ])
        );
        assert_eq!(row_ids(&doc.blocks[1]), vec!["aaaaaaaaaaaa"]);
        assert_eq!(
            doc.blocks[2],
            Block::Paragraph(vec![
                Inline::Link {
                    href: "/x".into(),
                    children: vec![text("more")]
                },
                text(" after"),
            ])
        );
    }

    #[test]
    fn test_lists() {
        let doc = parse(
            "<ul>\n    <li>one</li>\n    <li>two\n        <ul>\n            <li>n</li>\n        </ul>\n    </li>\n</ul>",
        );
        let expected = List {
            items: vec![
                ListItem::text("one"),
                ListItem {
                    inline: vec![text("two")],
                    nested: Some(List {
                        items: vec![ListItem::text("n")],
                    }),
                },
            ],
        };
        assert_eq!(doc.blocks, vec![Block::List(expected)]);
    }

    #[test]
    fn test_list_cleanup() {
        let doc = parse(&format!(
            "<ul><li><p>para</p></li><li> </li><ul><li>orphan</li></ul><li>pic {A}</li></ul><ul></ul>"
        ));
        let expected = List {
            items: vec![
                ListItem {
                    inline: vec![text("para")],
                    nested: Some(List {
                        items: vec![ListItem::text("orphan")],
                    }),
                },
                ListItem::text("pic"),
            ],
        };
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0], Block::List(expected));
        assert_eq!(row_ids(&doc.blocks[1]), vec!["aaaaaaaaaaaa"]);
    }

    #[test]
    fn test_media_attributes() {
        let doc = parse(
            r#"<img src="../assets/a1b2c3d4e5f6-800.jpg?x=1" alt="Sea &amp; sky" data-fit="toowide" data-rotate="-90" data-zoom="250" data-pan-x="12" data-pan-y="-70" data-width="1600" data-height="1200">"#,
        );
        let Block::MediaRow(row) = &doc.blocks[0] else {
            panic!("expected media row");
        };
        let item = &row.items[0];
        assert_eq!(item.asset_id.as_str(), "a1b2c3d4e5f6");
        assert_eq!(item.alt, "Sea & sky");
        assert_eq!(item.fit, FitMode::TooWide);
        assert_eq!(item.transform, ImageTransform::new(270, 200, 12, -50));
        assert_eq!(item.dimensions, Some(Dimensions::new(1600, 1200)));
        assert!(!item.pending);
    }

    #[test]
    fn test_video_attributes() {
        let doc = parse(
            r#"<video src="assets/0123456789ab.mp4" poster="assets/0123456789ab-poster.jpg" data-duration="12.5" data-width="0" data-height="720" data-rotate="90" controls></video>"#,
        );
        let Block::MediaRow(row) = &doc.blocks[0] else {
            panic!("expected media row");
        };
        let item = &row.items[0];
        assert_eq!(item.kind, MediaKind::Video);
        assert_eq!(item.duration_seconds, Some(12.5));
        assert_eq!(item.dimensions, None);
        assert!(item.transform.is_identity());
    }

    #[test]
    fn test_pending_media() {
        let doc = parse(
            r#"<img src="data:image/jpeg;base64,AAAA" data-hash="a1b2c3d4e5f6"><video class="pending" src="blob:https://x/1" data-hash="0123456789ab"></video>"#,
        );
        let Block::MediaRow(row) = &doc.blocks[0] else {
            panic!("expected media row");
        };
        assert!(row.items.iter().all(|m| m.pending));
        assert_eq!(row.items[0].asset_id.as_str(), "a1b2c3d4e5f6");
        assert_eq!(row.items[0].preview_ref.as_deref(), Some("data:image/jpeg;base64,AAAA"));
        assert_eq!(row.items[1].kind, MediaKind::Video);
    }

    #[test]
    fn test_unresolvable_media_dropped() {
        let doc = parse(r#"<img src="photo.jpg"><img src="data:image/png;base64,AAAA"><p>x</p>"#);
        assert_eq!(doc.blocks, vec![Block::paragraph("x")]);
    }

    #[test]
    fn test_collapse_line_breaks() {
        assert_eq!(collapse_line_breaks("a \n\t b  c\r\nd"), "a b  c d");
        assert_eq!(collapse_line_breaks("\n"), " ");
    }
}
