//! Ordering of resolved regions for downstream processing.

use crate::config::SegmentationMode;
use crate::geometry::Rect;
use crate::layout::reconcile::{reconcile, ReconcileOptions, ReconcileStats};
use crate::layout::region::{RawBox, Region, RegionSet};

/// Regions in processing order plus the size of the primary pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequencedRegions {
    /// Every region, suppressed ones included, in processing order
    pub regions: RegionSet,
    /// Regions at an index below this came from the segmenter itself
    pub primary: usize,
    /// Reconciliation counters (all zero in text mode)
    pub stats: ReconcileStats,
}

impl SequencedRegions {
    /// Whether the region at `index` belongs to the primary pass.
    pub fn is_primary(&self, index: usize) -> bool {
        index < self.primary
    }

    /// Number of regions that were not suppressed.
    pub fn active_count(&self) -> usize {
        self.regions.len() - self.regions.suppressed_count()
    }

    /// Live regions ordered by their key `(left, top, right, bottom)`.
    ///
    /// This is the order fragments are merged in; equal keys keep their
    /// processing order.
    pub fn merge_order(&self) -> Vec<Region> {
        let mut live: Vec<Region> = self.regions.iter().filter(|r| !r.suppressed).copied().collect();
        live.sort_by_key(Region::key);
        live
    }
}

/// Column mode: full reconciliation, reporting the pre-gap-fill count.
pub fn sequence_columns(boxes: &[RawBox], page: &Rect, options: &ReconcileOptions) -> SequencedRegions {
    let mut regions = RegionSet::from_boxes(boxes);
    let (stats, primary) = reconcile(&mut regions, page, options);
    SequencedRegions {
        regions,
        primary,
        stats,
    }
}

/// Text mode: width sort only. Line boxes are trusted as they come, and all
/// of them count as primary.
pub fn sequence_text(boxes: &[RawBox]) -> SequencedRegions {
    let mut regions = RegionSet::from_boxes(boxes);
    regions.sort_by_width();
    let primary = regions.len();
    SequencedRegions {
        regions,
        primary,
        stats: ReconcileStats::default(),
    }
}

/// Sequence `boxes` according to `mode`.
pub fn sequence(
    mode: SegmentationMode,
    boxes: &[RawBox],
    page: &Rect,
    options: &ReconcileOptions,
) -> SequencedRegions {
    let sequenced = match mode {
        SegmentationMode::Columns => sequence_columns(boxes, page, options),
        SegmentationMode::Text => sequence_text(boxes),
    };
    log::debug!(
        "{:?} mode: {} regions, {} primary, {} active",
        mode,
        sequenced.regions.len(),
        sequenced.primary,
        sequenced.active_count()
    );
    sequenced
}
