//! Debug visualizer for region outlines.

use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::error::Result;
use crate::geometry::Rect;

/// Which pass a drawn region belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionRole {
    /// Produced by the segmenter in the primary pass
    Primary,
    /// Gap-fill or fallback pass region
    Fallback,
    /// Suppressed during reconciliation; never drawn on the canvas
    Suppressed,
}

/// A region as the visualizer records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RegionOutline {
    /// Bounds in page coordinates
    pub rect: Rect,
    /// Pass the region belongs to
    pub role: RegionRole,
}

impl RegionOutline {
    /// Create an outline record.
    pub fn new(rect: Rect, role: RegionRole) -> Self {
        Self { rect, role }
    }
}

/// Outline colors per role (RGBA).
#[derive(Debug, Clone)]
pub struct RegionColors {
    /// Primary regions
    pub primary: [f32; 4],
    /// Fallback regions
    pub fallback: [f32; 4],
    /// Suppressed regions (SVG export only)
    pub suppressed: [f32; 4],
}

impl Default for RegionColors {
    fn default() -> Self {
        Self {
            primary: [0.0, 1.0, 0.0, 1.0],     // Green
            fallback: [1.0, 0.0, 0.0, 1.0],    // Red
            suppressed: [0.5, 0.5, 0.5, 0.6], // Gray, translucent
        }
    }
}

impl RegionColors {
    fn for_role(&self, role: RegionRole) -> &[f32; 4] {
        match role {
            RegionRole::Primary => &self.primary,
            RegionRole::Fallback => &self.fallback,
            RegionRole::Suppressed => &self.suppressed,
        }
    }
}

/// Options for debug visualization.
#[derive(Debug, Clone)]
pub struct DebugOptions {
    /// Outline width in pixels
    pub line_width: f32,
    /// Colors per role
    pub colors: RegionColors,
    /// Include suppressed regions in the SVG export
    pub show_suppressed: bool,
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self {
            line_width: 5.0,
            colors: RegionColors::default(),
            show_suppressed: false,
        }
    }
}

/// Draws and exports region outlines.
pub struct DebugVisualizer {
    options: DebugOptions,
}

impl DebugVisualizer {
    /// Create a new debug visualizer with the given options.
    pub fn new(options: DebugOptions) -> Self {
        Self { options }
    }

    /// Stroke the outline of `outline.rect` onto `pixmap`. Suppressed and
    /// degenerate regions are not drawn.
    pub fn draw_region(&self, pixmap: &mut Pixmap, outline: &RegionOutline) {
        let rect = outline.rect;
        if outline.role == RegionRole::Suppressed || rect.is_degenerate() {
            return;
        }
        let Some(bounds) = tiny_skia::Rect::from_ltrb(
            rect.left as f32,
            rect.top as f32,
            rect.right as f32,
            rect.bottom as f32,
        ) else {
            return;
        };

        let color = self.options.colors.for_role(outline.role);
        let mut paint = Paint::default();
        paint.set_color(
            Color::from_rgba(color[0], color[1], color[2], color[3]).unwrap_or(Color::BLACK),
        );
        paint.anti_alias = false;

        let stroke = Stroke {
            width: self.options.line_width,
            ..Stroke::default()
        };

        let mut path = PathBuilder::new();
        path.push_rect(bounds);
        if let Some(path) = path.finish() {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    /// Export the region list to JSON.
    pub fn export_regions_json(
        &self,
        outlines: &[RegionOutline],
        page_width: u32,
        page_height: u32,
    ) -> Result<String> {
        let regions: Vec<serde_json::Value> = outlines
            .iter()
            .enumerate()
            .map(|(index, o)| {
                serde_json::json!({
                    "index": index,
                    "role": o.role,
                    "bbox": self.rect_to_json(&o.rect),
                })
            })
            .collect();
        let doc = serde_json::json!({
            "width": page_width,
            "height": page_height,
            "regions": regions,
        });
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    fn rect_to_json(&self, rect: &Rect) -> serde_json::Value {
        serde_json::json!({
            "left": rect.left,
            "top": rect.top,
            "right": rect.right,
            "bottom": rect.bottom,
        })
    }

    /// Export the region outlines to SVG, in page coordinates.
    pub fn export_regions_svg(
        &self,
        outlines: &[RegionOutline],
        page_width: u32,
        page_height: u32,
    ) -> String {
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            page_width, page_height, page_width, page_height
        );

        for outline in outlines {
            if outline.role == RegionRole::Suppressed && !self.options.show_suppressed {
                continue;
            }
            let class = match outline.role {
                RegionRole::Primary => "primary",
                RegionRole::Fallback => "fallback",
                RegionRole::Suppressed => "suppressed",
            };
            let r = outline.rect;
            svg.push_str(&format!(
                r#"<rect class="{}" x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
                class,
                r.left,
                r.top,
                r.width().max(0),
                r.height().max(0),
                self.color_to_svg(self.options.colors.for_role(outline.role)),
                self.options.line_width
            ));
        }

        svg.push_str("</svg>");
        svg
    }

    /// Convert RGBA color to SVG rgba() format.
    fn color_to_svg(&self, color: &[f32; 4]) -> String {
        format!(
            "rgba({},{},{},{})",
            (color[0] * 255.0) as u8,
            (color[1] * 255.0) as u8,
            (color[2] * 255.0) as u8,
            color[3]
        )
    }
}

impl Default for DebugVisualizer {
    fn default() -> Self {
        Self::new(DebugOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(w: u32, h: u32) -> Pixmap {
        let mut pixmap = Pixmap::new(w, h).unwrap();
        pixmap.fill(Color::WHITE);
        pixmap
    }

    #[test]
    fn test_debug_options_default() {
        let opts = DebugOptions::default();
        assert_eq!(opts.line_width, 5.0);
        assert!(!opts.show_suppressed);
        assert_eq!(opts.colors.primary, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(opts.colors.fallback, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_color_to_svg() {
        let visualizer = DebugVisualizer::default();
        assert_eq!(visualizer.color_to_svg(&[1.0, 0.0, 0.0, 0.5]), "rgba(255,0,0,0.5)");
    }

    #[test]
    fn test_draw_region_colors_edges_only() {
        let visualizer = DebugVisualizer::default();
        let mut pixmap = white(100, 100);
        visualizer.draw_region(
            &mut pixmap,
            &RegionOutline::new(Rect::new(20, 20, 80, 80), RegionRole::Fallback),
        );
        let edge = pixmap.pixel(20, 50).unwrap();
        assert_eq!((edge.red(), edge.green(), edge.blue()), (255, 0, 0));
        let center = pixmap.pixel(50, 50).unwrap();
        assert_eq!((center.red(), center.green(), center.blue()), (255, 255, 255));
    }

    #[test]
    fn test_suppressed_and_degenerate_not_drawn() {
        let visualizer = DebugVisualizer::default();
        let mut pixmap = white(50, 50);
        let before = pixmap.clone();
        visualizer.draw_region(
            &mut pixmap,
            &RegionOutline::new(Rect::new(10, 10, 40, 40), RegionRole::Suppressed),
        );
        visualizer.draw_region(
            &mut pixmap,
            &RegionOutline::new(Rect::new(10, 10, 10, 40), RegionRole::Primary),
        );
        assert_eq!(pixmap.data(), before.data());
    }

    #[test]
    fn test_exports() {
        let visualizer = DebugVisualizer::default();
        let outlines = [
            RegionOutline::new(Rect::new(0, 0, 10, 20), RegionRole::Primary),
            RegionOutline::new(Rect::new(10, 0, 30, 20), RegionRole::Suppressed),
        ];
        let json = visualizer.export_regions_json(&outlines, 30, 20).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["regions"].as_array().unwrap().len(), 2);
        assert_eq!(value["regions"][1]["role"], "suppressed");
        assert_eq!(value["regions"][0]["bbox"]["bottom"], 20);

        let svg = visualizer.export_regions_svg(&outlines, 30, 20);
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<rect").count(), 1);
        assert!(svg.contains(r#"class="primary" x="0" y="0" width="10" height="20""#));
    }
}
