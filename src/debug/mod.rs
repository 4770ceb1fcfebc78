//! Debug visualization of page regions.
//!
//! Regions are outlined on a copy of the page, green for the primary pass
//! and red for gap-fill and fallback passes. The region list can also be
//! exported as JSON or as an SVG overlay.
//!
//! ## Example
//!
//! ```
//! use pageseg::debug::{DebugVisualizer, RegionOutline, RegionRole};
//! use pageseg::geometry::Rect;
//!
//! let visualizer = DebugVisualizer::default();
//! let outlines = [RegionOutline::new(Rect::new(0, 0, 100, 40), RegionRole::Primary)];
//! let svg = visualizer.export_regions_svg(&outlines, 200, 100);
//! assert!(svg.contains("class=\"primary\""));
//! ```

mod visualizer;

pub use visualizer::{DebugOptions, DebugVisualizer, RegionColors, RegionOutline, RegionRole};
