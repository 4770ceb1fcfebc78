//! Page-level assembly of per-region hOCR fragments.

use std::ops::Range;

use super::node::{IdCounters, NodeKind};
use super::parser::{scan_line, TagEvent};
use crate::error::Result;
use crate::layout::RegionKey;

/// Header used when no fragment carries its own.
const DEFAULT_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN"
    "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="en" lang="en">
 <head>
  <title></title>
  <meta http-equiv="Content-Type" content="text/html;charset=utf-8"/>
  <meta name='ocr-system' content='pageseg'/>
  <meta name='ocr-capabilities' content='ocr_page ocr_carea ocr_par ocr_line ocrx_word'/>
 </head>
 <body>
"#;

const TRAILER: &str = " </div>\n</body>\n</html>\n";

/// One OCR result awaiting merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Region the fragment was produced from; fragments merge in key order
    pub key: RegionKey,
    /// Page position of the fragment's local origin
    pub offset: (i32, i32),
    /// hOCR markup
    pub markup: String,
}

impl Fragment {
    /// Create a fragment.
    pub fn new(key: RegionKey, offset: (i32, i32), markup: impl Into<String>) -> Self {
        Self {
            key,
            offset,
            markup: markup.into(),
        }
    }

    /// A fragment already in page coordinates, such as one read back from
    /// disk or produced from the whole page.
    pub fn global(key: RegionKey, markup: impl Into<String>) -> Self {
        Self::new(key, (0, 0), markup)
    }
}

/// A page document under construction.
///
/// Fragments are appended in the order they should appear. Identifier
/// counters run across the whole document.
#[derive(Debug, Clone)]
pub struct HocrDocument {
    image_name: String,
    width: u32,
    height: u32,
    header: Option<String>,
    body: String,
    ids: IdCounters,
    fragments: usize,
}

impl HocrDocument {
    /// Start a document for an image of the given size.
    pub fn new(image_name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            image_name: image_name.into(),
            width,
            height,
            header: None,
            body: String::new(),
            ids: IdCounters::new(),
            fragments: 0,
        }
    }

    /// Translate, renumber and append one fragment.
    ///
    /// The fragment's own header, page node and trailer are dropped, also
    /// when they share a line with content. On error the document is left as
    /// it was.
    pub fn append(&mut self, fragment: &Fragment) -> Result<()> {
        let (dx, dy) = fragment.offset;
        let markup = fragment.markup.as_str();
        let has_body = markup.contains("<body");

        let mut ids = self.ids.clone();
        let mut header = String::new();
        let mut body = String::new();
        let mut in_body = !has_body;
        // true for scopes opened by the fragment's page node
        let mut scopes: Vec<bool> = Vec::new();

        for (i, mut text) in markup.split_inclusive('\n').enumerate() {
            if !in_body {
                let Some(start) = text.find("<body") else {
                    header.push_str(text);
                    continue;
                };
                let end = text[start..].find('>').map_or(text.len(), |gt| start + gt + 1);
                header.push_str(&text[..end]);
                in_body = true;
                text = &text[end..];
            }

            let trailer = [text.find("</body"), text.find("</html")].into_iter().flatten().min();
            let content = trailer.map_or(text, |at| &text[..at]);
            append_line(content, i + 1, (dx, dy), &mut ids, &mut scopes, &mut body)?;
            if trailer.is_some() {
                break;
            }
        }

        if self.header.is_none() && has_body {
            if !header.ends_with('\n') {
                header.push('\n');
            }
            self.header = Some(header);
        }
        self.body.push_str(&body);
        self.ids = ids;
        self.fragments += 1;
        log::debug!("merged fragment {} at offset ({}, {})", fragment.key, dx, dy);
        Ok(())
    }

    /// Number of fragments appended so far.
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Identifiers handed out so far for `prefix`.
    pub fn id_count(&self, prefix: &str) -> u32 {
        self.ids.count(prefix)
    }

    /// Close the page and the document.
    pub fn finish(self) -> String {
        let header = self.header.as_deref().unwrap_or(DEFAULT_HEADER);
        let mut out = String::with_capacity(header.len() + self.body.len() + 256);
        out.push_str(header);
        out.push_str(&format!(
            " <div class='ocr_page' id='page_1' title='image \"{}\"; bbox 0 0 {} {}; ppageno 0'>\n",
            escape_attr(&self.image_name),
            self.width,
            self.height
        ));
        out.push_str(&self.body);
        out.push_str(TRAILER);
        out
    }
}

/// Rewrite one body line into `body`, cutting out the fragment's page tags.
fn append_line(
    text: &str,
    number: usize,
    (dx, dy): (i32, i32),
    ids: &mut IdCounters,
    scopes: &mut Vec<bool>,
    body: &mut String,
) -> Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }
    let line = scan_line(text, number)?;
    let mut cut: Vec<Range<usize>> = Vec::new();
    for (event, span) in line.events.iter().zip(&line.spans) {
        match event {
            TagEvent::Open(Some(tag)) if tag.kind == NodeKind::Page => {
                scopes.push(true);
                cut.push(span.clone());
            },
            TagEvent::Open(_) => scopes.push(false),
            TagEvent::Close => {
                if scopes.pop() == Some(true) {
                    cut.push(span.clone());
                }
            },
        }
    }

    let rewritten = if cut.is_empty() {
        line.rewrite(dx, dy, Some(ids))?
    } else {
        let mut rest = String::with_capacity(text.len());
        let mut at = 0;
        for range in &cut {
            rest.push_str(&text[at..range.start]);
            at = range.end;
        }
        rest.push_str(&text[at..]);
        if rest.trim().is_empty() {
            return Ok(());
        }
        scan_line(&rest, number)?.rewrite(dx, dy, Some(ids))?
    };
    body.push_str(&rewritten);
    if !body.ends_with('\n') {
        body.push('\n');
    }
    Ok(())
}

/// Escape text for use inside a quoted attribute value.
fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Merges fragments of one page into a single document.
#[derive(Debug, Clone)]
pub struct HocrMerger {
    image_name: String,
    width: u32,
    height: u32,
}

impl HocrMerger {
    /// Merger for a source image named `image_name` of `width` x `height`.
    pub fn new(image_name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            image_name: image_name.into(),
            width,
            height,
        }
    }

    /// Merge `fragments` in ascending key order. Fragments sharing a key keep
    /// their relative order.
    pub fn merge(&self, fragments: &[Fragment]) -> Result<String> {
        let mut ordered: Vec<&Fragment> = fragments.iter().collect();
        ordered.sort_by_key(|f| f.key);

        let mut doc = HocrDocument::new(self.image_name.clone(), self.width, self.height);
        for fragment in ordered {
            doc.append(fragment)?;
        }
        log::info!(
            "merged {} fragments: {} blocks, {} paragraphs, {} lines, {} words",
            doc.fragment_count(),
            doc.id_count("block"),
            doc.id_count("par"),
            doc.id_count("line"),
            doc.id_count("word")
        );
        Ok(doc.finish())
    }
}
