//! Page raster that regions are cropped from and blanked on.

use std::path::Path;

use image::{DynamicImage, RgbImage};
use tiny_skia::{Color, IntRect, IntSize, Paint, Pixmap, Transform};

use crate::error::{Error, Result};
use crate::geometry::Rect;

/// An opaque RGBA raster backed by a tiny-skia pixmap.
#[derive(Debug, Clone)]
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// Decode an image file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let img = image::open(path.as_ref())?;
        Self::from_image(&img)
    }

    /// Build a canvas from a decoded image. Any alpha channel is dropped.
    pub fn from_image(img: &DynamicImage) -> Result<Self> {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        let size = IntSize::from_wh(width, height)
            .ok_or_else(|| Error::Image(format!("invalid page size {}x{}", width, height)))?;

        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for px in rgb.pixels() {
            data.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        let pixmap = Pixmap::from_vec(data, size)
            .ok_or_else(|| Error::Image("failed to create pixmap".to_string()))?;
        Ok(Self { pixmap })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// The whole canvas as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width() as i32, self.height() as i32)
    }

    /// Copy out `rect`, clipped to the canvas. `None` when nothing is left.
    pub fn crop(&self, rect: &Rect) -> Option<Canvas> {
        let bounds = self.bounds();
        if !bounds.intersects(rect) {
            return None;
        }
        let r = bounds.clip(rect);
        let area = IntRect::from_ltrb(r.left, r.top, r.right, r.bottom)?;
        self.pixmap.clone_rect(area).map(|pixmap| Canvas { pixmap })
    }

    /// Paint `rect` white.
    pub fn blank(&mut self, rect: &Rect) {
        let bounds = self.bounds();
        if !bounds.intersects(rect) {
            return;
        }
        let r = bounds.clip(rect);
        let Some(area) =
            tiny_skia::Rect::from_ltrb(r.left as f32, r.top as f32, r.right as f32, r.bottom as f32)
        else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(Color::WHITE);
        paint.anti_alias = false;
        self.pixmap.fill_rect(area, &paint, Transform::identity(), None);
    }

    /// Mutable access for drawing.
    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// RGB copy of the canvas.
    pub fn to_rgb_image(&self) -> Result<RgbImage> {
        let mut data = Vec::with_capacity(self.pixmap.pixels().len() * 3);
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue()]);
        }
        RgbImage::from_raw(self.width(), self.height(), data)
            .ok_or_else(|| Error::Image("pixel buffer does not match canvas size".to_string()))
    }

    /// Write the canvas; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.to_rgb_image()?.save(path.as_ref())?;
        log::debug!("saved {}x{} canvas to {}", self.width(), self.height(), path.as_ref().display());
        Ok(())
    }
}
