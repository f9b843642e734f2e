//! Rich-text blocks as delivered by the CMS, rendered to text or HTML

use serde::{Deserialize, Serialize};

use super::normalize::lenient_text;
use crate::helpers::html_escape;

/// A single rich-text block (paragraph, heading, list item, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextBlock {
    #[serde(rename = "type", default = "default_block_type")]
    pub kind: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub text: String,

    #[serde(default)]
    pub spans: Vec<Span>,

    /// Source URL of image blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Alternative text of image blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

fn default_block_type() -> String {
    "paragraph".to_string()
}

impl RichTextBlock {
    /// Create a plain paragraph
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::with_kind("paragraph", text)
    }

    /// Create a block of any type without spans
    pub fn with_kind(kind: &str, text: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            text: text.into(),
            spans: Vec::new(),
            url: None,
            alt: None,
        }
    }
}

/// Inline markup over a range of a block's text.
///
/// `start` and `end` are UTF-16 code unit offsets, the way the CMS counts them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

/// Extra payload of hyperlink and label spans
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Concatenate the text of all blocks, separated by a single space
pub fn as_text(blocks: &[RichTextBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render blocks to HTML, grouping consecutive list items
pub fn as_html(blocks: &[RichTextBlock]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list_tag = match block.kind.as_str() {
            "list-item" => Some("ul"),
            "o-list-item" => Some("ol"),
            _ => None,
        };

        if open_list != list_tag {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{}>", tag));
            }
            if let Some(tag) = list_tag {
                html.push_str(&format!("<{}>", tag));
            }
            open_list = list_tag;
        }

        html.push_str(&render_block(block));
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{}>", tag));
    }

    html
}

fn render_block(block: &RichTextBlock) -> String {
    let kind = block.kind.as_str();

    if let Some(level) = kind
        .strip_prefix("heading")
        .filter(|l| matches!(*l, "1" | "2" | "3" | "4" | "5" | "6"))
    {
        return format!(
            "<h{0}>{1}</h{0}>",
            level,
            render_inline(&block.text, &block.spans, true)
        );
    }

    match kind {
        "preformatted" => format!(
            "<pre>{}</pre>",
            render_inline(&block.text, &block.spans, false)
        ),
        "list-item" | "o-list-item" => format!(
            "<li>{}</li>",
            render_inline(&block.text, &block.spans, true)
        ),
        "image" => match &block.url {
            Some(url) => format!(
                r#"<p class="block-img"><img src="{}" alt="{}"></p>"#,
                html_escape(url),
                html_escape(block.alt.as_deref().unwrap_or(""))
            ),
            None => String::new(),
        },
        _ => format!(
            "<p>{}</p>",
            render_inline(&block.text, &block.spans, true)
        ),
    }
}

/// Apply spans over escaped text. Overlapping spans are split so the
/// resulting tags always nest properly.
fn render_inline(text: &str, spans: &[Span], line_breaks: bool) -> String {
    let mut ranges: Vec<(usize, usize, &Span)> = spans
        .iter()
        .filter_map(|s| {
            let start = utf16_to_byte(text, s.start);
            let end = utf16_to_byte(text, s.end);
            (start < end).then_some((start, end, s))
        })
        .collect();
    ranges.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut boundaries: Vec<usize> = ranges
        .iter()
        .flat_map(|(start, end, _)| [*start, *end])
        .chain([0, text.len()])
        .collect();
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut html = String::with_capacity(text.len());
    let mut stack: Vec<(usize, &Span)> = Vec::new();
    let mut next = 0;

    for window in boundaries.windows(2) {
        let (pos, until) = (window[0], window[1]);
        close_spans(&mut html, &mut stack, pos);

        while next < ranges.len() && ranges[next].0 == pos {
            let (_, end, span) = ranges[next];
            html.push_str(&open_tag(span));
            stack.push((end, span));
            next += 1;
        }

        let segment = html_escape(&text[pos..until]);
        if line_breaks {
            html.push_str(&segment.replace('\n', "<br />"));
        } else {
            html.push_str(&segment);
        }
    }

    close_spans(&mut html, &mut stack, text.len());
    html
}

/// Close every span ending at or before `pos`, reopening the ones that
/// were nested inside them but continue past `pos`.
fn close_spans<'a>(html: &mut String, stack: &mut Vec<(usize, &'a Span)>, pos: usize) {
    let mut reopen = Vec::new();

    while stack.iter().any(|(end, _)| *end <= pos) {
        let Some((end, span)) = stack.pop() else {
            break;
        };
        html.push_str(close_tag(span));
        if end > pos {
            reopen.push((end, span));
        }
    }

    for (end, span) in reopen.into_iter().rev() {
        html.push_str(&open_tag(span));
        stack.push((end, span));
    }
}

fn open_tag(span: &Span) -> String {
    let data = span.data.clone().unwrap_or_default();
    match span.kind.as_str() {
        "strong" => "<strong>".to_string(),
        "em" => "<em>".to_string(),
        "hyperlink" => {
            let href = data.url.as_deref().unwrap_or("#");
            match data.target.as_deref() {
                Some(target) => format!(
                    r#"<a href="{}" target="{}" rel="noopener">"#,
                    html_escape(href),
                    html_escape(target)
                ),
                None => format!(r#"<a href="{}">"#, html_escape(href)),
            }
        }
        "label" => format!(
            r#"<span class="{}">"#,
            html_escape(data.label.as_deref().unwrap_or(""))
        ),
        _ => "<span>".to_string(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind.as_str() {
        "strong" => "</strong>",
        "em" => "</em>",
        "hyperlink" => "</a>",
        _ => "</span>",
    }
}

/// Convert a UTF-16 offset into a byte offset on a char boundary
fn utf16_to_byte(text: &str, offset: usize) -> usize {
    let mut units = 0;
    for (byte, ch) in text.char_indices() {
        if units >= offset {
            return byte;
        }
        units += ch.len_utf16();
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, kind: &str) -> Span {
        Span {
            start,
            end,
            kind: kind.to_string(),
            data: None,
        }
    }

    #[test]
    fn test_as_text_joins_blocks() {
        let blocks = vec![
            RichTextBlock::paragraph("one two"),
            RichTextBlock::paragraph("three"),
        ];
        assert_eq!(as_text(&blocks), "one two three");
        assert_eq!(as_text(&[]), "");
    }

    #[test]
    fn test_render_paragraph_escapes_text() {
        let blocks = vec![RichTextBlock::paragraph("a < b & c")];
        assert_eq!(as_html(&blocks), "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_render_headings_and_lists() {
        let blocks = vec![
            RichTextBlock::with_kind("heading2", "Title"),
            RichTextBlock::with_kind("list-item", "a"),
            RichTextBlock::with_kind("list-item", "b"),
            RichTextBlock::with_kind("o-list-item", "c"),
            RichTextBlock::paragraph("end"),
        ];
        assert_eq!(
            as_html(&blocks),
            "<h2>Title</h2><ul><li>a</li><li>b</li></ul><ol><li>c</li></ol><p>end</p>"
        );
    }

    #[test]
    fn test_render_nested_spans() {
        let mut block = RichTextBlock::paragraph("hello bold world");
        block.spans = vec![span(6, 16, "strong"), span(11, 16, "em")];
        assert_eq!(
            as_html(&[block]),
            "<p>hello <strong>bold <em>world</em></strong></p>"
        );
    }

    #[test]
    fn test_render_overlapping_spans_nest_properly() {
        let mut block = RichTextBlock::paragraph("abcdef");
        block.spans = vec![span(0, 4, "strong"), span(2, 6, "em")];
        assert_eq!(
            as_html(&[block]),
            "<p><strong>ab<em>cd</em></strong><em>ef</em></p>"
        );
    }

    #[test]
    fn test_render_hyperlink() {
        let mut block = RichTextBlock::paragraph("see docs");
        block.spans = vec![Span {
            start: 4,
            end: 8,
            kind: "hyperlink".to_string(),
            data: Some(SpanData {
                url: Some("https://example.com".to_string()),
                ..Default::default()
            }),
        }];
        assert_eq!(
            as_html(&[block]),
            r#"<p>see <a href="https://example.com">docs</a></p>"#
        );
    }

    #[test]
    fn test_span_offsets_are_utf16() {
        let mut block = RichTextBlock::paragraph("é 😀 ok");
        // "é" = 1 unit, " " = 1, "😀" = 2, " " = 1 -> "ok" starts at 5
        block.spans = vec![span(5, 7, "strong")];
        assert_eq!(as_html(&[block]), "<p>é 😀 <strong>ok</strong></p>");
    }

    #[test]
    fn test_line_breaks_in_paragraphs() {
        let blocks = vec![
            RichTextBlock::paragraph("a\nb"),
            RichTextBlock::with_kind("preformatted", "x\ny"),
        ];
        assert_eq!(as_html(&blocks), "<p>a<br />b</p><pre>x\ny</pre>");
    }

    #[test]
    fn test_deserialize_lenient_block() {
        let json = r#"[{"type": "paragraph", "text": null, "spans": []}, {"text": "x"}]"#;
        let blocks: Vec<RichTextBlock> = serde_json::from_str(json).unwrap();
        assert_eq!(blocks[0].text, "");
        assert_eq!(blocks[1].kind, "paragraph");
    }
}
