//! Segmentation collaborator adapters.
//!
//! The segmenter turns a page image into raw candidate boxes. This crate
//! never segments pixels itself: a native helper is run as a command and
//! its JSON box list is decoded, or a precomputed box list is read from disk.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::error::{Error, Result};
pub use crate::layout::RawBox;

/// Flags forwarded to the segmenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentFlags {
    /// Binarize before segmenting
    pub binarize: bool,
    /// Column mode when true, text-line mode otherwise
    pub columns: bool,
    /// Segmenter debug output
    pub debug: bool,
    /// Persist the binarized image as `<input>.png`
    pub save_binarized: bool,
    /// Minimum box width
    pub min_width: i32,
    /// Minimum box height
    pub min_height: i32,
}

impl Default for SegmentFlags {
    fn default() -> Self {
        Self {
            binarize: true,
            columns: true,
            debug: false,
            save_binarized: false,
            min_width: 50,
            min_height: 10,
        }
    }
}

impl SegmentFlags {
    /// Positional arguments of the native helper, after the image path.
    fn to_args(self) -> [String; 6] {
        let bit = |b: bool| String::from(if b { "1" } else { "0" });
        [
            bit(self.binarize),
            bit(self.columns),
            bit(self.debug),
            bit(self.save_binarized),
            self.min_width.to_string(),
            self.min_height.to_string(),
        ]
    }
}

#[derive(Deserialize)]
struct BoxList {
    boxes: Vec<Vec<f64>>,
}

/// Decode the `{"boxes": [[x, y, w, h], ...]}` wire format.
///
/// Fractional coordinates are truncated. An entry without exactly four
/// numbers is an error; everything else, including zero-sized or negative
/// boxes, is passed through unvalidated.
pub fn parse_boxes(json: &str) -> Result<Vec<RawBox>> {
    let list: BoxList = serde_json::from_str(json)?;
    list.boxes
        .iter()
        .enumerate()
        .map(|(i, entry)| match entry.as_slice() {
            [x, y, w, h] => Ok(RawBox::new(*x as i32, *y as i32, *w as i32, *h as i32)),
            _ => Err(Error::Segmenter(format!(
                "box {} has {} numbers, expected 4",
                i,
                entry.len()
            ))),
        })
        .collect()
}

/// Produces raw candidate boxes for a page image.
pub trait Segmenter: Send + Sync {
    /// Segment `image`.
    fn segment(&self, image: &Path, flags: &SegmentFlags) -> Result<Vec<RawBox>>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Runs a native segmentation helper and decodes its standard output.
///
/// The helper is invoked as
/// `<program> <image> <binarize> <columns> <debug> <save> <min_w> <min_h>`
/// with boolean flags written as `0`/`1`.
#[derive(Debug, Clone)]
pub struct CommandSegmenter {
    program: PathBuf,
}

impl CommandSegmenter {
    /// Create a segmenter backed by `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Segmenter for CommandSegmenter {
    fn segment(&self, image: &Path, flags: &SegmentFlags) -> Result<Vec<RawBox>> {
        log::debug!("running {} on {}", self.program.display(), image.display());
        let output = Command::new(&self.program)
            .arg(image)
            .args(flags.to_args())
            .output()
            .map_err(|e| Error::Segmenter(format!("failed to run {}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Segmenter(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let boxes = parse_boxes(&String::from_utf8_lossy(&output.stdout))?;
        log::debug!("{} returned {} boxes", self.program.display(), boxes.len());
        Ok(boxes)
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

/// Reads a precomputed box list. Flags are ignored.
#[derive(Debug, Clone)]
pub struct BoxFileSegmenter {
    path: PathBuf,
}

impl BoxFileSegmenter {
    /// Create a segmenter that always returns the boxes stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Segmenter for BoxFileSegmenter {
    fn segment(&self, _image: &Path, _flags: &SegmentFlags) -> Result<Vec<RawBox>> {
        let text = std::fs::read_to_string(&self.path)?;
        parse_boxes(&text)
    }

    fn name(&self) -> &'static str {
        "box-file"
    }
}
