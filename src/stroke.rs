// Freehand mask strokes.
// Each pointer move blends one segment immediately (no buffering until
// pointer-up), so the user sees the red mask grow under the cursor.

use crate::surface::RenderSurface;
use crate::types::{Point, Rgba};
use tracing::{debug, trace};

/// Brush used for every stroke. Caps and joins are always round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Brush {
    pub width: f32, // diameter in surface pixels
    pub color: Rgba,
}

impl Brush {
    pub const DEFAULT_WIDTH: f32 = 20.0;
    /// Semi-transparent red, alpha ≈ 0.5.
    pub const DEFAULT_COLOR: Rgba = Rgba::new(255, 0, 0, 128);
}

impl Default for Brush {
    fn default() -> Self {
        Self { width: Self::DEFAULT_WIDTH, color: Self::DEFAULT_COLOR }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Idle,
    Drawing { last: Point },
}

/// Tracks the open stroke and the one-way "has strokes" latch.
#[derive(Debug)]
pub struct StrokeEngine {
    brush: Brush,
    phase: Phase,
    has_strokes: bool,
}

impl StrokeEngine {
    pub fn new(brush: Brush) -> Self {
        Self { brush, phase: Phase::Idle, has_strokes: false }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.phase, Phase::Drawing { .. })
    }

    pub fn has_strokes(&self) -> bool {
        self.has_strokes
    }

    /// Open a new path at `at`. Nothing is drawn until the first extend.
    pub fn begin(&mut self, at: Point) {
        debug!(x = at.x, y = at.y, "stroke begin");
        self.phase = Phase::Drawing { last: at };
    }

    /// Append a segment to `to` and render it right away.
    ///
    /// Returns `true` only when this segment flipped the latch, i.e. exactly
    /// once per reset cycle.
    pub fn extend(&mut self, surface: &mut RenderSurface, to: Point) -> bool {
        let Phase::Drawing { last } = self.phase else {
            return false;
        };
        let touched = surface.stroke_segment(last, to, self.brush.width, self.brush.color);
        self.phase = Phase::Drawing { last: to };
        trace!(touched, "stroke segment");

        if touched > 0 && !self.has_strokes {
            self.has_strokes = true;
            return true;
        }
        false
    }

    /// Close the open path. Spurious ends (no open path) are ignored.
    pub fn end(&mut self) -> bool {
        if self.is_drawing() {
            debug!("stroke end");
            self.phase = Phase::Idle;
            true
        } else {
            false
        }
    }

    /// Drop the open path without drawing anything more. The latch and the
    /// pixels already blended stay as they are.
    pub fn abandon(&mut self) {
        if self.is_drawing() {
            debug!("open stroke abandoned");
            self.phase = Phase::Idle;
        }
    }

    /// Drop any open path and clear the latch. The caller wipes the surface.
    pub fn reset(&mut self) {
        self.abandon();
        self.has_strokes = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FitGeometry;
    use crate::types::Size;
    use image::RgbaImage;

    fn surface(w: u32, h: u32) -> RenderSurface {
        let mut s = RenderSurface::new(Size::default());
        let base = RgbaImage::from_pixel(w, h, image::Rgba([255, 255, 255, 255]));
        s.redraw_base(&base, FitGeometry { render_width: w, render_height: h });
        s
    }

    #[test]
    fn default_brush_is_twenty_px_half_red() {
        let b = Brush::default();
        assert_eq!(b.width, 20.0);
        assert_eq!(b.color, Rgba::new(255, 0, 0, 128));
    }

    #[test]
    fn latch_flips_once_per_cycle() {
        let mut s = surface(100, 100);
        let mut e = StrokeEngine::new(Brush::default());
        e.begin(Point::new(10.0, 10.0));
        assert!(!e.has_strokes());
        assert!(e.extend(&mut s, Point::new(50.0, 50.0)));
        assert!(e.has_strokes());
        assert!(!e.extend(&mut s, Point::new(60.0, 50.0)));
        e.end();

        e.begin(Point::new(0.0, 0.0));
        assert!(!e.extend(&mut s, Point::new(5.0, 5.0)));

        e.reset();
        assert!(!e.has_strokes());
        e.begin(Point::new(20.0, 20.0));
        assert!(e.extend(&mut s, Point::new(30.0, 30.0)));
    }

    #[test]
    fn begin_alone_draws_nothing() {
        let mut e = StrokeEngine::new(Brush::default());
        e.begin(Point::new(10.0, 10.0));
        e.end();
        assert!(!e.has_strokes());
    }

    #[test]
    fn extend_without_begin_is_ignored() {
        let mut s = surface(20, 20);
        let mut e = StrokeEngine::new(Brush::default());
        assert!(!e.extend(&mut s, Point::new(5.0, 5.0)));
        assert!(!e.has_strokes());
        assert!(s.pixels().pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn spurious_end_is_tolerated() {
        let mut e = StrokeEngine::new(Brush::default());
        assert!(!e.end());
        e.begin(Point::default());
        assert!(e.end());
        assert!(!e.end());
    }

    #[test]
    fn segment_that_misses_surface_does_not_latch() {
        let mut s = surface(10, 10);
        let mut e = StrokeEngine::new(Brush::default());
        e.begin(Point::new(500.0, 500.0));
        assert!(!e.extend(&mut s, Point::new(600.0, 600.0)));
        assert!(!e.has_strokes());
    }

    #[test]
    fn abandon_keeps_latch_and_pixels() {
        let mut s = surface(50, 50);
        let mut e = StrokeEngine::new(Brush::default());
        e.begin(Point::new(5.0, 5.0));
        assert!(e.extend(&mut s, Point::new(25.0, 25.0)));
        let painted = s.pixels().clone();

        e.abandon();
        assert!(!e.is_drawing());
        assert!(e.has_strokes());
        assert!(!e.extend(&mut s, Point::new(45.0, 45.0)));
        assert_eq!(s.pixels(), &painted);

        // Idempotent on an idle engine.
        e.abandon();
        assert!(e.has_strokes());
    }

    #[test]
    fn reset_mid_stroke_abandons_path() {
        let mut s = surface(50, 50);
        let mut e = StrokeEngine::new(Brush::default());
        e.begin(Point::new(1.0, 1.0));
        e.extend(&mut s, Point::new(20.0, 20.0));
        e.reset();
        assert!(!e.is_drawing());
        assert!(!e.has_strokes());
        assert!(!e.extend(&mut s, Point::new(30.0, 30.0)));
    }
}
