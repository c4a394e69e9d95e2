//! Fit-to-container geometry for the editing canvas.
//!
//! The canvas is sized so the source image keeps its aspect ratio and is as
//! large as possible without exceeding either container dimension
//! (letterbox or pillarbox, never crop). The host centres the canvas inside
//! its container; pointer positions arrive in viewport space and are mapped
//! back onto the canvas 1:1.

use crate::types::{Point, Size};

/// Canvas size derived from a container and an image. Never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitGeometry {
    pub render_width: u32,
    pub render_height: u32,
}

impl FitGeometry {
    pub fn size(&self) -> Size {
        Size::new(self.render_width, self.render_height)
    }

    /// Top-left corner of the canvas when centred in `container`.
    pub fn centered_origin(&self, container: Size) -> (u32, u32) {
        (
            container.width.saturating_sub(self.render_width) / 2,
            container.height.saturating_sub(self.render_height) / 2,
        )
    }
}

// Absorbs float noise such as 399.99999 before truncating to whole pixels.
const PIXEL_EPSILON: f64 = 1e-6;

/// Compute the aspect-preserving fit of `image` inside `container`.
///
/// Returns `None` while either size is unmeasured (zero); the caller simply
/// retries on the next resize or load.
pub fn fit_to_container(container: Size, image: Size) -> Option<FitGeometry> {
    if !container.is_measured() || !image.is_measured() {
        return None;
    }

    let container_aspect = container.aspect();
    let image_aspect = image.aspect();

    let (width, height) = if container_aspect > image_aspect {
        // Container is wider than the image: clamp height, pillarbox.
        let h = f64::from(container.height);
        (h * image_aspect, h)
    } else {
        // Container is taller (or equal): clamp width, letterbox.
        let w = f64::from(container.width);
        (w, w / image_aspect)
    };

    Some(FitGeometry {
        render_width: to_pixels(width, container.width),
        render_height: to_pixels(height, container.height),
    })
}

fn to_pixels(v: f64, limit: u32) -> u32 {
    let px = (v + PIXEL_EPSILON).floor();
    // Extreme aspect ratios can floor to zero; keep at least one pixel.
    (px as u32).clamp(1, limit)
}

/// Translate a viewport position into canvas-local coordinates.
///
/// `surface_origin` is the canvas bounding-box origin in the same viewport
/// space. Negative or non-finite results (stale measurements) clamp to 0.
pub fn to_surface_coords(viewport: Point, surface_origin: Point) -> Point {
    Point::new(
        clamp_axis(viewport.x - surface_origin.x),
        clamp_axis(viewport.y - surface_origin.y),
    )
}

#[inline]
fn clamp_axis(v: f32) -> f32 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}
