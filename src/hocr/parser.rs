//! Line-oriented scanner for the hOCR subset produced by OCR engines.
//!
//! Each line is scanned for `div`/`p`/`span` start and end tags. Start tags
//! carrying an hOCR class are decoded into a [`NodeTag`] that remembers
//! where its `id` and `bbox` live, so a line can be rewritten in place with
//! every other byte, quoting style included, left untouched.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

use super::node::{IdCounters, NodeKind};
use crate::error::{Error, Result};
use crate::geometry::Rect;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<(/?)(?:div|p|span)\b[^>]*>").unwrap();
    static ref CLASS_ATTR: Regex = Regex::new(r#"\sclass=(?:'([^']*)'|"([^"]*)")"#).unwrap();
    static ref ID_ATTR: Regex = Regex::new(r#"\sid=(?:'([^']*)'|"([^"]*)")"#).unwrap();
    static ref BBOX: Regex =
        Regex::new(r"\bbbox\s+(-?\d+)\s+(-?\d+)\s+(-?\d+)\s+(-?\d+)").unwrap();
    static ref BBOX_KEYWORD: Regex = Regex::new(r"\bbbox\b").unwrap();
    static ref NUMBERED_ID: Regex = Regex::new(r"^([A-Za-z]+)_\d+_\d+$").unwrap();
}

/// A structural start tag and the positions of its editable parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTag {
    /// Node kind from the `class` attribute
    pub kind: NodeKind,
    /// Bounding box, if the tag has one
    pub bbox: Option<Rect>,
    /// Current identifier, if any
    pub id: Option<String>,
    /// Byte range of the tag within its line
    span: Range<usize>,
    /// End of the `class` attribute, relative to the tag
    class_end: usize,
    /// Range of the id value inside its quotes, relative to the tag
    id_value: Option<Range<usize>>,
    /// Range of `bbox a b c d`, relative to the tag
    bbox_span: Option<Range<usize>>,
}

impl NodeTag {
    /// Counter prefix the node is renumbered from, if it is renumbered.
    ///
    /// Known kinds use their fixed prefix. Other hOCR nodes are renumbered
    /// only when their id already follows the `<prefix>_<page>_<n>` form.
    fn renumber_prefix(&self) -> Option<String> {
        if let Some(prefix) = self.kind.id_prefix() {
            return Some(prefix.to_string());
        }
        match self.kind {
            NodeKind::Other(_) => self
                .id
                .as_deref()
                .and_then(|id| NUMBERED_ID.captures(id))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
            _ => None,
        }
    }
}

/// One tag event within a line, in order of appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEvent {
    /// A start tag; `Some` when it is a structural hOCR node
    Open(Option<NodeTag>),
    /// An end tag
    Close,
}

/// A scanned markup line.
#[derive(Debug, Clone)]
pub struct ScannedLine<'a> {
    /// Raw line text, line terminator included
    pub text: &'a str,
    /// 1-based line number within its fragment
    pub number: usize,
    /// Tag events in order
    pub events: Vec<TagEvent>,
    /// Byte range of each event's tag within the line
    pub(crate) spans: Vec<Range<usize>>,
}

impl<'a> ScannedLine<'a> {
    /// Structural nodes opened on this line.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeTag> {
        self.events.iter().filter_map(|e| match e {
            TagEvent::Open(Some(tag)) => Some(tag),
            _ => None,
        })
    }

    /// Rewrite the line: shift every bbox by `(dx, dy)` and, when `ids` is
    /// given, renumber structural nodes from it in order of appearance.
    ///
    /// A bbox that would leave the `i32` range is a
    /// [`Error::MalformedFragment`].
    pub fn rewrite(&self, dx: i32, dy: i32, mut ids: Option<&mut IdCounters>) -> Result<String> {
        let mut edits: Vec<(Range<usize>, String)> = Vec::new();

        for tag in self.nodes() {
            let base = tag.span.start;

            if let (Some(span), Some(bbox)) = (&tag.bbox_span, tag.bbox) {
                let moved = bbox.checked_translate(dx, dy).ok_or_else(|| Error::MalformedFragment {
                    line: self.number,
                    reason: format!("bbox {:?} out of range after shifting by ({}, {})", bbox, dx, dy),
                })?;
                edits.push((
                    base + span.start..base + span.end,
                    format!("bbox {} {} {} {}", moved.left, moved.top, moved.right, moved.bottom),
                ));
            }

            let Some(counters) = ids.as_deref_mut() else {
                continue;
            };
            if let Some(prefix) = tag.renumber_prefix() {
                let new_id = counters.next_id(&prefix);
                match &tag.id_value {
                    Some(range) => edits.push((base + range.start..base + range.end, new_id)),
                    None => {
                        let at = base + tag.class_end;
                        edits.push((at..at, format!(" id='{}'", new_id)));
                    },
                }
            }
        }

        let mut out = self.text.to_string();
        edits.sort_by_key(|(range, _)| std::cmp::Reverse(range.start));
        for (range, replacement) in edits {
            out.replace_range(range, &replacement);
        }
        Ok(out)
    }
}

/// Scan one line of a fragment.
///
/// A structural node other than the page that lacks a four-number bbox is
/// a [`Error::MalformedFragment`].
pub fn scan_line(text: &str, number: usize) -> Result<ScannedLine<'_>> {
    let mut events = Vec::new();
    let mut spans = Vec::new();
    for caps in TAG.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        spans.push(whole.range());
        if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
            events.push(TagEvent::Close);
        } else {
            events.push(TagEvent::Open(parse_tag(whole.as_str(), whole.range(), number)?));
        }
    }
    Ok(ScannedLine {
        text,
        number,
        events,
        spans,
    })
}

fn attr_value<'t>(caps: &regex::Captures<'t>) -> Option<regex::Match<'t>> {
    caps.get(1).or_else(|| caps.get(2))
}

fn parse_tag(tag: &str, span: Range<usize>, line: usize) -> Result<Option<NodeTag>> {
    let Some(class_caps) = CLASS_ATTR.captures(tag) else {
        return Ok(None);
    };
    let (Some(class_attr), Some(class_value)) = (class_caps.get(0), attr_value(&class_caps)) else {
        return Ok(None);
    };
    let Some(kind) = NodeKind::from_class(class_value.as_str()) else {
        return Ok(None);
    };

    let (bbox, bbox_span) = match BBOX.captures(tag) {
        Some(caps) => {
            let mut n = [0i32; 4];
            for (i, slot) in n.iter_mut().enumerate() {
                let digits = caps.get(i + 1).map(|m| m.as_str()).unwrap_or_default();
                *slot = digits.parse().map_err(|_| Error::MalformedFragment {
                    line,
                    reason: format!("bbox coordinate '{}' out of range", digits),
                })?;
            }
            let range = caps.get(0).map(|m| m.range());
            (Some(Rect::new(n[0], n[1], n[2], n[3])), range)
        },
        None if kind.requires_bbox() => {
            let reason = if BBOX_KEYWORD.is_match(tag) {
                format!("{:?} node bbox does not have four numbers", kind)
            } else {
                format!("{:?} node has no bbox", kind)
            };
            return Err(Error::MalformedFragment { line, reason });
        },
        None => (None, None),
    };

    let (id, id_value) = match ID_ATTR.captures(tag).as_ref().and_then(attr_value) {
        Some(m) => (Some(m.as_str().to_string()), Some(m.range())),
        None => (None, None),
    };

    Ok(Some(NodeTag {
        kind,
        bbox,
        id,
        span,
        class_end: class_attr.end(),
        id_value,
        bbox_span,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_word_line() {
        let text = "<span class='ocrx_word' id='word_1_3' title='bbox 36 92 96 116; x_wconf 90'>This</span>\n";
        let line = scan_line(text, 4).unwrap();
        assert_eq!(line.events.len(), 2);
        let tag = line.nodes().next().unwrap();
        assert_eq!(tag.kind, NodeKind::Word);
        assert_eq!(tag.bbox, Some(Rect::new(36, 92, 96, 116)));
        assert_eq!(tag.id.as_deref(), Some("word_1_3"));
        assert_eq!(line.events[1], TagEvent::Close);
    }

    #[test]
    fn test_rewrite_keeps_quote_styles() {
        let semi = "<span class='ocr_line' id='line_1_1' title=\"bbox 1 2 3 4; baseline 0 -3\">\n";
        let quoted = "<p class='ocr_par' id='par_1_1' lang='eng' title=\"bbox 1 2 3 4\">\n";
        let single = "<div class='ocr_carea' id='block_1_1' title='bbox 1 2 3 4'>\n";

        let out = scan_line(semi, 1).unwrap().rewrite(10, 20, None).unwrap();
        assert_eq!(out, "<span class='ocr_line' id='line_1_1' title=\"bbox 11 22 13 24; baseline 0 -3\">\n");
        let out = scan_line(quoted, 1).unwrap().rewrite(10, 20, None).unwrap();
        assert_eq!(out, "<p class='ocr_par' id='par_1_1' lang='eng' title=\"bbox 11 22 13 24\">\n");
        let out = scan_line(single, 1).unwrap().rewrite(10, 20, None).unwrap();
        assert_eq!(out, "<div class='ocr_carea' id='block_1_1' title='bbox 11 22 13 24'>\n");
    }

    #[test]
    fn test_rewrite_renumbers_and_inserts_missing_id() {
        let mut ids = IdCounters::new();
        ids.next_id("word");
        let text = "<span class='ocrx_word' title='bbox 0 0 5 5'>a</span> <span class='ocrx_word' id='word_9_9' title='bbox 5 0 9 5'>b</span>";
        let out = scan_line(text, 1).unwrap().rewrite(0, 0, Some(&mut ids)).unwrap();
        assert_eq!(
            out,
            "<span class='ocrx_word' id='word_1_2' title='bbox 0 0 5 5'>a</span> <span class='ocrx_word' id='word_1_3' title='bbox 5 0 9 5'>b</span>"
        );
    }

    #[test]
    fn test_bbox_in_word_text_is_untouched() {
        let text = "<span class='ocrx_word' id='w' title='bbox 1 1 2 2'>bbox 1 2 3 4</span>";
        let out = scan_line(text, 1).unwrap().rewrite(100, 100, None).unwrap();
        assert!(out.ends_with(">bbox 1 2 3 4</span>"));
        assert!(out.contains("bbox 101 101 102 102"));
    }

    #[test]
    fn test_other_nodes() {
        let mut ids = IdCounters::new();
        let photo = "<div class='ocr_photo' id='block_1_4' title=\"bbox 0 0 10 10\"></div>";
        let out = scan_line(photo, 1).unwrap().rewrite(1, 1, Some(&mut ids)).unwrap();
        assert!(out.contains("id='block_1_1'"));
        assert!(out.contains("bbox 1 1 11 11"));

        let custom = "<span class='ocr_separator' id='sep' title='bbox 0 0 1 1'></span>";
        let out = scan_line(custom, 1).unwrap().rewrite(0, 0, Some(&mut ids)).unwrap();
        assert!(out.contains("id='sep'"));
    }

    #[test]
    fn test_malformed_nodes() {
        let no_bbox = "<span class='ocr_line' id='line_1_1' title='baseline 0 0'>";
        match scan_line(no_bbox, 7) {
            Err(Error::MalformedFragment { line, reason }) => {
                assert_eq!(line, 7);
                assert!(reason.contains("no bbox"));
            },
            other => panic!("expected malformed fragment, got {:?}", other),
        }
        let short = "<span class='ocrx_word' id='word_1_1' title='bbox 1 2 3; x_wconf 5'>";
        assert!(matches!(scan_line(short, 2), Err(Error::MalformedFragment { line: 2, .. })));
    }

    #[test]
    fn test_bbox_overflow_is_malformed() {
        let text = "<span class='ocrx_word' id='word_1_1' title='bbox 2147483000 0 2147483600 5'>w</span>\n";
        let line = scan_line(text, 3).unwrap();
        match line.rewrite(100, 0, None) {
            Err(Error::MalformedFragment { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("out of range"));
            },
            other => panic!("expected malformed fragment, got {:?}", other),
        }
        assert!(line.rewrite(-100, 0, None).is_ok());
    }

    #[test]
    fn test_non_hocr_tags_are_events_only() {
        let line = scan_line("<div class='note'><span>x</span></div>", 1).unwrap();
        assert_eq!(line.events.len(), 4);
        assert_eq!(line.nodes().count(), 0);
        // page nodes without a bbox are tolerated
        assert!(scan_line("<div class='ocr_page' id='page_1'>", 1).is_ok());
    }
}
