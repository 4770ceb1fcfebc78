//! Candidate regions and the collection the reconciliation pass owns.

use std::fmt;

use crate::geometry::Rect;

/// A raw candidate box as reported by the segmenter: origin plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBox {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels (may be zero or negative in unvalidated input)
    pub width: i32,
    /// Height in pixels (may be zero or negative in unvalidated input)
    pub height: i32,
}

impl RawBox {
    /// Create a raw box.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Convert to bounds.
    pub fn to_rect(self) -> Rect {
        Rect::from_xywh(self.x, self.y, self.width, self.height)
    }
}

/// Ordering key of a region: `(left, top, right, bottom)`, compared
/// lexicographically.
///
/// This is the order persisted fragments take when named by their
/// zero-padded coordinates, and the order fragments are merged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RegionKey {
    /// Left edge
    pub left: i32,
    /// Top edge
    pub top: i32,
    /// Right edge
    pub right: i32,
    /// Bottom edge
    pub bottom: i32,
}

impl RegionKey {
    /// Key of the whole-page fallback fragment, which sorts first.
    pub const PAGE: RegionKey = RegionKey {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    /// File stem used for persisted artifacts, each coordinate zero-padded to
    /// eight digits so lexicographic file order matches key order.
    pub fn file_stem(&self) -> String {
        format!("{:08}_{:08}_{:08}_{:08}", self.left, self.top, self.right, self.bottom)
    }

    /// Parse a stem produced by [`RegionKey::file_stem`].
    pub fn from_file_stem(stem: &str) -> Option<Self> {
        let mut parts = stem.split('_').map(|p| p.parse::<i32>().ok());
        let key = RegionKey {
            left: parts.next()??,
            top: parts.next()??,
            right: parts.next()??,
            bottom: parts.next()??,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(key)
    }
}

impl From<Rect> for RegionKey {
    fn from(r: Rect) -> Self {
        RegionKey {
            left: r.left,
            top: r.top,
            right: r.right,
            bottom: r.bottom,
        }
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.left, self.top, self.right, self.bottom)
    }
}

/// A candidate content block.
///
/// Regions are never removed from their collection; reconciliation shrinks
/// their bounds or marks them suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Current bounds
    pub rect: Rect,
    /// Excluded from further processing
    pub suppressed: bool,
}

impl Region {
    /// A fresh, un-suppressed region.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            suppressed: false,
        }
    }

    /// Width of the current bounds.
    pub fn width(&self) -> i32 {
        self.rect.width()
    }

    /// Ordering key of the current bounds.
    pub fn key(&self) -> RegionKey {
        RegionKey::from(self.rect)
    }
}

impl From<RawBox> for Region {
    fn from(b: RawBox) -> Self {
        Region::new(b.to_rect())
    }
}

/// The working collection of regions for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionSet {
    regions: Vec<Region>,
}

impl RegionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw segmenter boxes, in input order.
    pub fn from_boxes(boxes: &[RawBox]) -> Self {
        Self {
            regions: boxes.iter().copied().map(Region::from).collect(),
        }
    }

    /// Append a region.
    pub fn push(&mut self, region: Region) {
        self.regions.push(region);
    }

    /// Stable sort by width, narrowest first.
    pub fn sort_by_width(&mut self) {
        self.regions.sort_by_key(Region::width);
    }

    /// Number of regions, suppressed ones included.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the set holds no regions at all.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// All regions in sequence order.
    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    /// Region at `index`.
    pub fn get(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Region> {
        self.regions.get_mut(index)
    }

    /// Bounds of every region that is not suppressed.
    pub fn active_rects(&self) -> Vec<Rect> {
        self.regions
            .iter()
            .filter(|r| !r.suppressed)
            .map(|r| r.rect)
            .collect()
    }

    /// Number of suppressed regions.
    pub fn suppressed_count(&self) -> usize {
        self.regions.iter().filter(|r| r.suppressed).count()
    }

    /// Borrow as a slice.
    pub fn as_slice(&self) -> &[Region] {
        &self.regions
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

impl FromIterator<Region> for RegionSet {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        Self {
            regions: iter.into_iter().collect(),
        }
    }
}
