//! Structural hOCR node kinds and identifier counters.

use std::collections::HashMap;

/// Kind of a structural hOCR element, read from its `class` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `ocr_page`
    Page,
    /// `ocr_carea`
    Area,
    /// `ocr_par`
    Paragraph,
    /// `ocr_line`
    Line,
    /// `ocr_caption`
    Caption,
    /// `ocr_textfloat`
    TextFloat,
    /// `ocr_header`
    Header,
    /// `ocrx_word`
    Word,
    /// Any other `ocr_*`/`ocrx_*` class, e.g. `ocr_photo` or `ocr_separator`
    Other(String),
}

impl NodeKind {
    /// Kind of the first hOCR class in a `class` attribute value, if any.
    ///
    /// ```
    /// use pageseg::hocr::NodeKind;
    ///
    /// assert_eq!(NodeKind::from_class("ocr_line"), Some(NodeKind::Line));
    /// assert_eq!(NodeKind::from_class("ocrx_word bold"), Some(NodeKind::Word));
    /// assert_eq!(NodeKind::from_class("footnote"), None);
    /// ```
    pub fn from_class(class: &str) -> Option<NodeKind> {
        let token = class
            .split_whitespace()
            .find(|t| t.starts_with("ocr_") || t.starts_with("ocrx_"))?;
        Some(match token {
            "ocr_page" => NodeKind::Page,
            "ocr_carea" => NodeKind::Area,
            "ocr_par" => NodeKind::Paragraph,
            "ocr_line" => NodeKind::Line,
            "ocr_caption" => NodeKind::Caption,
            "ocr_textfloat" => NodeKind::TextFloat,
            "ocr_header" => NodeKind::Header,
            "ocrx_word" => NodeKind::Word,
            other => NodeKind::Other(other.to_string()),
        })
    }

    /// Identifier prefix, which also names the counter the kind draws from.
    /// Captions, text floats and headers share the line counter.
    pub fn id_prefix(&self) -> Option<&'static str> {
        match self {
            NodeKind::Area => Some("block"),
            NodeKind::Paragraph => Some("par"),
            NodeKind::Line | NodeKind::Caption | NodeKind::TextFloat | NodeKind::Header => {
                Some("line")
            },
            NodeKind::Word => Some("word"),
            NodeKind::Page | NodeKind::Other(_) => None,
        }
    }

    /// Whether a node of this kind must carry a bounding box.
    pub fn requires_bbox(&self) -> bool {
        self.id_prefix().is_some()
    }
}

/// Per-prefix identifier counters for one merged document.
///
/// Counters start at 1 and are never reset.
#[derive(Debug, Clone, Default)]
pub struct IdCounters {
    counters: HashMap<String, u32>,
}

impl IdCounters {
    /// Fresh counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next identifier for `prefix`, e.g. `line_1_7`.
    pub fn next_id(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("{}_1_{}", prefix, counter)
    }

    /// Number of identifiers handed out for `prefix`.
    pub fn count(&self, prefix: &str) -> u32 {
        self.counters.get(prefix).copied().unwrap_or(0)
    }
}
