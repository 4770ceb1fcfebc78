//! Decomposition of a rectangle minus a set of obstacles into free tiles.
//!
//! The boundary is split around one pivot obstacle into four strips (above,
//! left, right, below) and each strip is solved recursively against the
//! obstacles that still intersect it. The strips are disjoint, so the tiles
//! produced never overlap each other or any obstacle.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{clip_all, Rect};

/// How the pivot obstacle is chosen at each split.
///
/// A uniformly random pivot keeps the expected recursion shallow on typical
/// pages; always taking the same obstacle degrades to quadratic behaviour on
/// stacked layouts. The deterministic rules exist for reproducible output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotSelection {
    /// Uniform random choice, seeded from OS entropy
    #[default]
    Random,
    /// Uniform random choice from a fixed seed
    Seeded(u64),
    /// Smallest-area obstacle first, ties broken by position in the list
    SmallestArea,
}

enum Picker {
    Rng(StdRng),
    SmallestArea,
}

impl Picker {
    fn new(selection: PivotSelection) -> Self {
        match selection {
            PivotSelection::Random => Picker::Rng(StdRng::from_entropy()),
            PivotSelection::Seeded(seed) => Picker::Rng(StdRng::seed_from_u64(seed)),
            PivotSelection::SmallestArea => Picker::SmallestArea,
        }
    }

    /// Index of the pivot. `obstacles` is never empty here.
    fn pick(&mut self, obstacles: &[Rect]) -> usize {
        match self {
            Picker::Rng(rng) => rng.gen_range(0..obstacles.len()),
            Picker::SmallestArea => obstacles
                .iter()
                .enumerate()
                .min_by_key(|(i, r)| (r.area(), *i))
                .map(|(i, _)| i)
                .unwrap_or(0),
        }
    }
}

/// Tile `boundary` minus the union of `obstacles`.
///
/// Obstacles may overlap each other and may extend past the boundary; they
/// are clipped first. A degenerate boundary yields nothing.
///
/// # Examples
///
/// ```
/// use pageseg::geometry::{decompose, PivotSelection, Rect};
///
/// let page = Rect::new(0, 0, 300, 200);
/// let column = Rect::new(0, 0, 100, 200);
/// let tiles = decompose(&page, &[column], PivotSelection::SmallestArea);
/// assert_eq!(tiles, vec![Rect::new(100, 0, 300, 200)]);
/// ```
pub fn decompose(boundary: &Rect, obstacles: &[Rect], selection: PivotSelection) -> Vec<Rect> {
    let mut picker = Picker::new(selection);
    let mut tiles = Vec::new();
    split(*boundary, clip_all(boundary, obstacles), &mut picker, &mut tiles);
    log::debug!(
        "decomposed {}x{} boundary around {} obstacles into {} tiles",
        boundary.width(),
        boundary.height(),
        obstacles.len(),
        tiles.len()
    );
    tiles
}

fn split(boundary: Rect, obstacles: Vec<Rect>, picker: &mut Picker, tiles: &mut Vec<Rect>) {
    if boundary.is_degenerate() {
        return;
    }
    if obstacles.is_empty() {
        tiles.push(boundary);
        return;
    }

    let pivot = obstacles[picker.pick(&obstacles)];

    let above = Rect::new(boundary.left, boundary.top, boundary.right, pivot.top);
    let left = Rect::new(boundary.left, pivot.top, pivot.left, pivot.bottom);
    let right = Rect::new(pivot.right, pivot.top, boundary.right, pivot.bottom);
    let below = Rect::new(boundary.left, pivot.bottom, boundary.right, boundary.bottom);

    for strip in [above, left, right, below] {
        let remaining = clip_all(&strip, &obstacles);
        split(strip, remaining, picker, tiles);
    }
}
