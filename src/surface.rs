// The single raster the user paints on.
// Bottom "layer": the source image scaled to the fitted size.
// Top "layer": mask strokes blended straight into the same pixels, so the
// export is already flattened.

use crate::geometry::FitGeometry;
use crate::types::{FrameBuffer, Point, Rgba, Size};
use image::{Rgba as Px, RgbaImage, imageops::FilterType};

pub struct RenderSurface {
    pixels: RgbaImage,
}

impl RenderSurface {
    /// Fresh, fully transparent surface.
    pub fn new(size: Size) -> Self {
        Self { pixels: RgbaImage::new(size.width, size.height) }
    }

    pub fn size(&self) -> Size {
        Size::new(self.pixels.width(), self.pixels.height())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Resize to `fit`, wipe everything and draw `source` scaled to fill it.
    /// Any strokes on the surface are gone afterwards.
    pub fn redraw_base(&mut self, source: &RgbaImage, fit: FitGeometry) {
        // A fresh buffer is the "clear"; the bilinear resize is the draw.
        self.pixels = image::imageops::resize(
            source,
            fit.render_width,
            fit.render_height,
            FilterType::Triangle,
        );
    }

    /// Blend one round-capped line segment of `width` px in `color`.
    /// Returns how many surface pixels it touched (0 if it missed entirely).
    pub fn stroke_segment(&mut self, from: Point, to: Point, width: f32, color: Rgba) -> usize {
        let (w, h) = self.pixels.dimensions();
        if w == 0 || h == 0 || width <= 0.0 || color.a == 0 {
            return 0;
        }
        let r = width * 0.5;

        // Scan just the segment's bounding box, padded by the radius (+1 for AA).
        let min_x = (from.x.min(to.x) - r - 1.0).floor().max(0.0) as u32;
        let min_y = (from.y.min(to.y) - r - 1.0).floor().max(0.0) as u32;
        let max_x = (from.x.max(to.x) + r + 1.0).ceil().min(w as f32) as u32;
        let max_y = (from.y.max(to.y) + r + 1.0).ceil().min(h as f32) as u32;

        let mut touched = 0usize;
        for y in min_y..max_y {
            for x in min_x..max_x {
                // Sample at the pixel centre.
                let d = distance_to_segment(x as f32 + 0.5, y as f32 + 0.5, from, to);
                // 1px linear ramp at the edge: full inside, fading across the rim.
                let coverage = (r + 0.5 - d).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let px = self.pixels.get_pixel_mut(x, y);
                blend_over(px, color, coverage);
                touched += 1;
            }
        }
        touched
    }

    /// Copy the surface into the window buffer at `origin`, flattening any
    /// transparency over `backdrop` (0x00RRGGBB).
    pub fn present_into(&self, fb: &mut FrameBuffer, origin: (u32, u32), backdrop: u32) {
        let (ox, oy) = (origin.0 as usize, origin.1 as usize);
        let br = (backdrop >> 16) & 0xFF;
        let bg = (backdrop >> 8) & 0xFF;
        let bb = backdrop & 0xFF;

        for (x, y, p) in self.pixels.enumerate_pixels() {
            let (fx, fy) = (ox + x as usize, oy + y as usize);
            if fx >= fb.width || fy >= fb.height {
                continue;
            }
            let a = u32::from(p[3]);
            let mix = |c: u8, b: u32| (u32::from(c) * a + b * (255 - a) + 127) / 255;
            let r = mix(p[0], br);
            let g = mix(p[1], bg);
            let b = mix(p[2], bb);
            fb.pixels[fy * fb.width + fx] = (r << 16) | (g << 8) | b;
        }
    }
}

/// Distance from (px,py) to segment AB; a zero-length segment is a point.
fn distance_to_segment(px: f32, py: f32, a: Point, b: Point) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let ab2 = abx * abx + aby * aby;
    let t = if ab2 < 1e-4 {
        0.0
    } else {
        (((px - a.x) * abx + (py - a.y) * aby) / ab2).clamp(0.0, 1.0)
    };
    let qx = a.x + t * abx;
    let qy = a.y + t * aby;
    ((px - qx) * (px - qx) + (py - qy) * (py - qy)).sqrt()
}

/// Source-over with straight alpha, `coverage` scaling the source alpha.
#[inline]
fn blend_over(dst: &mut Px<u8>, src: Rgba, coverage: f32) {
    let sa = f32::from(src.a) / 255.0 * coverage;
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    let ch = |s: u8, d: u8| {
        let v = (f32::from(s) * sa + f32::from(d) * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    *dst = Px([
        ch(src.r, dst[0]),
        ch(src.g, dst[1]),
        ch(src.b, dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]);
}
