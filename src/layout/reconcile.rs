//! Overlap resolution between candidate regions.
//!
//! Regions are visited narrowest first. Each visited region `r` is tested
//! against every other live region `s`; when `r` bites into `s`, `s` gives
//! way: its invaded edge moves to `r`'s boundary if enough width remains,
//! otherwise `s` is suppressed. Wide background blocks therefore shrink
//! around the narrow columns that sit on top of them.

use crate::geometry::{decompose, PivotSelection, Rect};
use crate::layout::region::{Region, RegionSet};

/// Tolerances and switches for one reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Minimum width `s` must keep after shrinking, else it is suppressed
    pub min_width: i32,
    /// Carried for the caller; the overlap rules never consult it
    pub min_height: i32,
    /// Synthesize regions covering page area no region claims
    pub fill_gaps: bool,
    /// Pivot rule for gap decomposition
    pub pivot: PivotSelection,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            min_width: 50,
            min_height: 10,
            fill_gaps: false,
            pivot: PivotSelection::Random,
        }
    }
}

/// How a narrower region `r` bites into region `s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapPattern {
    /// `s`'s left edge is inside `r`, and `r` spans `s`'s top edge
    Enclosure,
    /// `s`'s left edge is inside `r`, and `r` starts inside `s` vertically
    LeftSide,
    /// `r`'s left edge is inside `s`, and `r` starts above `s` reaching into it
    RightSide,
    /// `r`'s left edge and top edge are both strictly inside `s`
    Middle,
}

impl OverlapPattern {
    /// Classify how `r` overlaps `s`. At most one pattern applies; the first
    /// match in declaration order wins.
    pub fn classify(r: &Rect, s: &Rect) -> Option<OverlapPattern> {
        let s_left_inside_r = r.left < s.left && r.right > s.left;
        let r_left_inside_s = r.left > s.left && r.left < s.right;
        let r_spans_s_top = r.top <= s.top && r.bottom > s.top;
        let r_above_into_s = r.top < s.top && r.bottom > s.top;
        let r_top_inside_s = r.top > s.top && r.top < s.bottom;

        if s_left_inside_r && r_spans_s_top {
            Some(OverlapPattern::Enclosure)
        } else if s_left_inside_r && r_top_inside_s {
            Some(OverlapPattern::LeftSide)
        } else if r_left_inside_s && r_above_into_s {
            Some(OverlapPattern::RightSide)
        } else if r_left_inside_s && r_top_inside_s {
            Some(OverlapPattern::Middle)
        } else {
            None
        }
    }

    /// Width `s` keeps if the invaded edge moves to `r`'s boundary.
    pub fn residual_width(&self, r: &Rect, s: &Rect) -> i32 {
        match self {
            OverlapPattern::Enclosure | OverlapPattern::LeftSide => s.right - r.right,
            OverlapPattern::RightSide | OverlapPattern::Middle => r.left - s.left,
        }
    }

    /// Move `s`'s invaded edge to `r`'s boundary.
    fn shrink(&self, r: &Rect, s: &mut Rect) {
        match self {
            OverlapPattern::Enclosure | OverlapPattern::LeftSide => s.left = r.right,
            OverlapPattern::RightSide | OverlapPattern::Middle => s.right = r.left,
        }
    }
}

/// Outcome counters of one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Regions whose bounds were shrunk
    pub shrunk: usize,
    /// Regions marked suppressed
    pub suppressed: usize,
    /// Regions synthesized by gap filling
    pub gap_filled: usize,
}

/// Resolve pairwise overlaps in sequence order.
///
/// The set is expected to be sorted narrowest first (see
/// [`RegionSet::sort_by_width`]); this function does not reorder it. Only
/// `min_width` gates the decision: a region may be shrunk to any height.
pub fn resolve_overlaps(regions: &mut RegionSet, min_width: i32) -> ReconcileStats {
    let mut stats = ReconcileStats::default();

    for idx in 0..regions.len() {
        let r = match regions.get(idx) {
            Some(region) if !region.suppressed => region.rect,
            _ => continue,
        };

        for other in 0..regions.len() {
            if other == idx {
                continue;
            }
            let Some(s) = regions.get_mut(other) else {
                continue;
            };
            if s.suppressed {
                continue;
            }
            let Some(pattern) = OverlapPattern::classify(&r, &s.rect) else {
                continue;
            };

            let residual = pattern.residual_width(&r, &s.rect);
            if residual > min_width {
                log::debug!(
                    "{:?}: shrinking {:?} against {:?} (residual {})",
                    pattern,
                    s.rect,
                    r,
                    residual
                );
                pattern.shrink(&r, &mut s.rect);
                stats.shrunk += 1;
            } else {
                log::debug!(
                    "{:?}: suppressing {:?} against {:?} (residual {} <= {})",
                    pattern,
                    s.rect,
                    r,
                    residual,
                    min_width
                );
                s.suppressed = true;
                stats.suppressed += 1;
            }
        }
    }

    stats
}

/// Append one region for every free tile of `page` not covered by a live
/// region. Returns the number of regions added.
pub fn fill_gaps(regions: &mut RegionSet, page: &Rect, pivot: PivotSelection) -> usize {
    let tiles = decompose(page, &regions.active_rects(), pivot);
    let added = tiles.len();
    for tile in tiles {
        regions.push(Region::new(tile));
    }
    added
}

/// Full column-mode reconciliation: width sort, overlap resolution and
/// optional gap filling.
///
/// Returns the statistics and the number of regions that existed before gap
/// filling.
pub fn reconcile(
    regions: &mut RegionSet,
    page: &Rect,
    options: &ReconcileOptions,
) -> (ReconcileStats, usize) {
    regions.sort_by_width();
    let mut stats = resolve_overlaps(regions, options.min_width);
    let primary = regions.len();

    if options.fill_gaps {
        stats.gap_filled = fill_gaps(regions, page, options.pivot);
    }

    log::debug!(
        "reconciled {} regions: {} shrunk, {} suppressed, {} gap-filled",
        primary,
        stats.shrunk,
        stats.suppressed,
        stats.gap_filled
    );
    (stats, primary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::region::RawBox;

    fn set_of(rects: &[Rect]) -> RegionSet {
        rects.iter().copied().map(Region::new).collect()
    }

    #[test]
    fn test_classify_enclosure_with_aligned_tops() {
        let r = Rect::new(0, 0, 100, 100);
        let s = Rect::new(50, 0, 200, 100);
        assert_eq!(OverlapPattern::classify(&r, &s), Some(OverlapPattern::Enclosure));
        assert_eq!(OverlapPattern::Enclosure.residual_width(&r, &s), 100);
    }

    #[test]
    fn test_classify_left_side() {
        let r = Rect::new(0, 50, 100, 150);
        let s = Rect::new(50, 0, 200, 100);
        assert_eq!(OverlapPattern::classify(&r, &s), Some(OverlapPattern::LeftSide));
    }

    #[test]
    fn test_classify_right_side() {
        let r = Rect::new(150, 0, 250, 100);
        let s = Rect::new(0, 50, 200, 150);
        assert_eq!(OverlapPattern::classify(&r, &s), Some(OverlapPattern::RightSide));
        assert_eq!(OverlapPattern::RightSide.residual_width(&r, &s), 150);
    }

    #[test]
    fn test_classify_middle() {
        let r = Rect::new(50, 50, 80, 80);
        let s = Rect::new(0, 0, 200, 200);
        assert_eq!(OverlapPattern::classify(&r, &s), Some(OverlapPattern::Middle));
        assert_eq!(OverlapPattern::Middle.residual_width(&r, &s), 50);
    }

    #[test]
    fn test_classify_disjoint_and_touching() {
        let r = Rect::new(0, 0, 100, 100);
        assert_eq!(OverlapPattern::classify(&r, &Rect::new(100, 0, 200, 100)), None);
        assert_eq!(OverlapPattern::classify(&r, &Rect::new(0, 100, 100, 200)), None);
        assert_eq!(OverlapPattern::classify(&r, &Rect::new(300, 300, 400, 400)), None);
    }

    #[test]
    fn test_right_side_requires_strictly_above() {
        // r's left is inside s but both start on the same row
        let r = Rect::new(90, 0, 105, 100);
        let s = Rect::new(0, 0, 100, 100);
        assert_eq!(OverlapPattern::classify(&r, &s), None);
    }

    #[test]
    fn test_shrink_when_residual_is_sufficient() {
        let mut set = set_of(&[Rect::new(0, 0, 100, 100), Rect::new(50, 0, 200, 100)]);
        set.sort_by_width();
        let stats = resolve_overlaps(&mut set, 10);
        assert_eq!(set.as_slice()[1].rect, Rect::new(100, 0, 200, 100));
        assert!(!set.as_slice()[1].suppressed);
        assert_eq!(stats.shrunk, 1);
        assert_eq!(stats.suppressed, 0);
    }

    #[test]
    fn test_suppress_when_residual_is_too_small() {
        let mut set = set_of(&[Rect::new(0, 0, 100, 100), Rect::new(90, 0, 105, 100)]);
        set.sort_by_width();
        let stats = resolve_overlaps(&mut set, 20);
        let b = set.iter().find(|r| r.rect.left == 90).copied();
        assert_eq!(b.map(|r| r.suppressed), Some(true));
        assert_eq!(stats.suppressed, 1);
        // the wide region is untouched
        assert!(set.iter().any(|r| r.rect == Rect::new(0, 0, 100, 100) && !r.suppressed));
    }

    #[test]
    fn test_residual_equal_to_min_width_suppresses() {
        let mut set = set_of(&[Rect::new(0, 0, 100, 100), Rect::new(50, 0, 120, 100)]);
        set.sort_by_width();
        resolve_overlaps(&mut set, 20);
        assert!(set.iter().any(|r| r.rect.left == 50 && r.suppressed));
    }

    #[test]
    fn test_min_height_is_not_consulted() {
        // s is far shorter than min_height, yet only the width rule decides
        let r = Rect::new(40, 0, 90, 95);
        let s = Rect::new(0, 90, 300, 100);
        let mut set = set_of(&[r, s]);
        set.sort_by_width();
        let (stats, _) = reconcile(
            &mut set,
            &Rect::new(0, 0, 300, 100),
            &ReconcileOptions {
                min_width: 10,
                min_height: 50,
                ..Default::default()
            },
        );
        assert_eq!(stats.suppressed, 0);
        assert_eq!(stats.shrunk, 1);
    }

    #[test]
    fn test_suppressed_regions_are_not_revisited() {
        let mut set = set_of(&[
            Rect::new(0, 0, 100, 100),
            Rect::new(90, 0, 105, 100),
            Rect::new(95, 0, 400, 100),
        ]);
        set.sort_by_width();
        resolve_overlaps(&mut set, 20);
        let live: Vec<Rect> = set.active_rects();
        for (i, a) in live.iter().enumerate() {
            for b in &live[i + 1..] {
                assert!(!a.intersects(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_empty_and_degenerate_input() {
        let mut empty = RegionSet::new();
        let (stats, primary) = reconcile(
            &mut empty,
            &Rect::new(0, 0, 100, 100),
            &ReconcileOptions::default(),
        );
        assert_eq!(primary, 0);
        assert_eq!(stats, ReconcileStats::default());

        let mut set = RegionSet::from_boxes(&[RawBox::new(10, 10, -5, 20), RawBox::new(0, 0, 0, 0)]);
        let (_, primary) = reconcile(
            &mut set,
            &Rect::new(0, 0, 100, 100),
            &ReconcileOptions {
                fill_gaps: true,
                pivot: PivotSelection::SmallestArea,
                ..Default::default()
            },
        );
        assert_eq!(primary, 2);
        // degenerate obstacles are ignored, so the whole page is one gap
        assert_eq!(set.len(), 3);
        assert_eq!(set.as_slice()[2].rect, Rect::new(0, 0, 100, 100));
    }

    #[test]
    fn test_fill_gaps_counts_primary_before_fill() {
        let mut set = set_of(&[Rect::new(0, 0, 100, 200)]);
        let (stats, primary) = reconcile(
            &mut set,
            &Rect::new(0, 0, 300, 200),
            &ReconcileOptions {
                fill_gaps: true,
                pivot: PivotSelection::SmallestArea,
                ..Default::default()
            },
        );
        assert_eq!(primary, 1);
        assert_eq!(stats.gap_filled, 1);
        assert_eq!(set.as_slice()[1].rect, Rect::new(100, 0, 300, 200));
    }
}
