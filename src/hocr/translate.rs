//! Region-local to page-global coordinate translation.

use super::parser::scan_line;
use crate::error::Result;

/// Shift every structural bbox in `markup` by `(dx, dy)`.
///
/// Only the four bbox numbers change: identifiers, other attributes, text
/// and the punctuation closing each bbox are kept byte for byte.
///
/// # Examples
///
/// ```
/// use pageseg::hocr::translate_fragment;
///
/// let local = "<span class='ocr_line' id='line_1_1' title=\"bbox 0 0 40 12; baseline 0 -2\">\n";
/// let global = translate_fragment(local, 100, 250).unwrap();
/// assert_eq!(
///     global,
///     "<span class='ocr_line' id='line_1_1' title=\"bbox 100 250 140 262; baseline 0 -2\">\n"
/// );
/// ```
pub fn translate_fragment(markup: &str, dx: i32, dy: i32) -> Result<String> {
    let mut out = String::with_capacity(markup.len() + markup.len() / 8);
    for (i, text) in markup.split_inclusive('\n').enumerate() {
        out.push_str(&scan_line(text, i + 1)?.rewrite(dx, dy, None)?);
    }
    Ok(out)
}
