//! Geometric primitives for region analysis.
//!
//! Rectangles are axis-aligned and expressed in integer page-pixel
//! coordinates with the origin at the top-left of the image.

mod decompose;

pub use decompose::{decompose, PivotSelection};

/// An axis-aligned rectangle in page-pixel space.
///
/// `left`/`top` are inclusive, `right`/`bottom` exclusive, so a rectangle
/// whose `right` equals another's `left` only touches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Rect {
    /// Left edge x-coordinate
    pub left: i32,
    /// Top edge y-coordinate
    pub top: i32,
    /// Right edge x-coordinate
    pub right: i32,
    /// Bottom edge y-coordinate
    pub bottom: i32,
}

impl Rect {
    /// Create a rectangle from its four bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use pageseg::geometry::Rect;
    ///
    /// let rect = Rect::new(10, 20, 110, 70);
    /// assert_eq!(rect.width(), 100);
    /// assert_eq!(rect.height(), 50);
    /// ```
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle from an origin and dimensions, the layout used by
    /// the segmentation collaborator.
    ///
    /// # Examples
    ///
    /// ```
    /// use pageseg::geometry::Rect;
    ///
    /// let rect = Rect::from_xywh(10, 20, 100, 50);
    /// assert_eq!(rect, Rect::new(10, 20, 110, 70));
    /// ```
    pub fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    /// Horizontal extent. Negative for inverted rectangles.
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Vertical extent. Negative for inverted rectangles.
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Area in pixels, zero for degenerate rectangles.
    pub fn area(&self) -> i64 {
        if self.is_degenerate() {
            0
        } else {
            i64::from(self.width()) * i64::from(self.height())
        }
    }

    /// True when the rectangle encloses no area.
    pub fn is_degenerate(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Check whether the interiors of two rectangles overlap.
    ///
    /// All four comparisons are strict: rectangles that share an edge do not
    /// intersect.
    ///
    /// # Examples
    ///
    /// ```
    /// use pageseg::geometry::Rect;
    ///
    /// let a = Rect::new(0, 0, 100, 100);
    /// let b = Rect::new(50, 50, 150, 150);
    /// let c = Rect::new(100, 0, 200, 100);
    ///
    /// assert!(a.intersects(&b));
    /// assert!(!a.intersects(&c)); // touching edges
    /// ```
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }

    /// The overlap of two rectangles.
    ///
    /// Check [`Rect::intersects`] first: clipping disjoint rectangles yields an
    /// inverted rectangle.
    ///
    /// # Examples
    ///
    /// ```
    /// use pageseg::geometry::Rect;
    ///
    /// let a = Rect::new(0, 0, 100, 100);
    /// let b = Rect::new(50, 25, 150, 75);
    /// assert_eq!(a.clip(&b), Rect::new(50, 25, 100, 75));
    /// ```
    pub fn clip(&self, other: &Rect) -> Rect {
        Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        )
    }

    /// Shift the rectangle by an offset.
    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }

    /// Shift the rectangle by an offset, or `None` if any bound leaves the
    /// `i32` range.
    pub fn checked_translate(&self, dx: i32, dy: i32) -> Option<Rect> {
        Some(Rect::new(
            self.left.checked_add(dx)?,
            self.top.checked_add(dy)?,
            self.right.checked_add(dx)?,
            self.bottom.checked_add(dy)?,
        ))
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn expand(&self, margin: i32) -> Rect {
        Rect::new(
            self.left - margin,
            self.top - margin,
            self.right + margin,
            self.bottom + margin,
        )
    }
}

/// Clip every rectangle that intersects `boundary` to it, dropping the rest.
///
/// Degenerate rectangles are dropped too: an inverted rectangle can pass the
/// strict edge comparisons of [`Rect::intersects`] without enclosing any area.
pub fn clip_all(boundary: &Rect, rects: &[Rect]) -> Vec<Rect> {
    rects
        .iter()
        .filter(|r| !r.is_degenerate() && boundary.intersects(r))
        .map(|r| boundary.clip(r))
        .collect()
}
