//! hOCR fragment translation and merging.
//!
//! OCR engines see only a cropped sub-image, so every fragment they return
//! is addressed in the crop's own coordinates and numbers its nodes from 1.
//! This module shifts fragments back into page coordinates and renumbers
//! their nodes so one page document carries unique identifiers.
//!
//! The parser is line-oriented and understands only the subset engines
//! emit: `div`/`p`/`span` elements with an hOCR `class`, an optional `id`
//! and a `title` holding a `bbox`.

pub mod merge;
pub mod node;
pub mod parser;
pub mod translate;

pub use merge::{Fragment, HocrDocument, HocrMerger};
pub use node::{IdCounters, NodeKind};
pub use translate::translate_fragment;
