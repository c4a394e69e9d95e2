// Window + software drawing utilities for the desktop host.
// 1) A resizable window that shows the canvas.
// 2) Keyboard commands and mouse state for the editor.
// 3) A brush-sized ring that follows the mouse while erasing.

use crate::error::Error;
use crate::types::{FrameBuffer, Point};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

/// One key press mapped to what the host should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    ViewTool,
    EraseTool,
    ClearMask,
    Style(usize), // 1-based picker slot
    Generate,
    BackToEdit,
    SaveResult,
}

const KEYMAP: &[(Key, Command)] = &[
    (Key::V, Command::ViewTool),
    (Key::E, Command::EraseTool),
    (Key::C, Command::ClearMask),
    (Key::Key1, Command::Style(1)),
    (Key::Key2, Command::Style(2)),
    (Key::Key3, Command::Style(3)),
    (Key::Key4, Command::Style(4)),
    (Key::Key5, Command::Style(5)),
    (Key::G, Command::Generate),
    (Key::B, Command::BackToEdit),
    (Key::S, Command::SaveResult),
];

pub struct Drawer {
    window: Window,
}

impl Drawer {
    /// Create a resizable window of the given size.
    /// Visual: an empty window opens; dragging its edges re-fits the photo.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let options = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, options)
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    /// Visual: the photo, the red mask and the brush ring update together.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Visual: false once the window's close button was clicked.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Visual: ESC closes the editor without saving anything.
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Current client-area size; the host re-fits when this changes.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Visual: state, tool, style and mask status appear in the title bar.
    pub fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    /// Mouse position in window pixels, `None` while outside the window.
    /// Visual: the brush ring disappears once the mouse leaves.
    pub fn mouse_pos(&self) -> Option<Point> {
        self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| Point::new(x, y))
    }

    /// Visual: while held in erase mode, red paint follows the mouse.
    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    /// Keys pressed since the last frame, in keymap order.
    pub fn commands(&self) -> Vec<Command> {
        KEYMAP
            .iter()
            .filter(|(key, _)| self.window.is_key_pressed(*key, KeyRepeat::No))
            .map(|(_, cmd)| *cmd)
            .collect()
    }
}

/* ---------- Software drawing ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
/// Visual: the exact pixel at (x,y) changes color.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    fb.pixels[y * fb.width + x] = color;
}

/// Outline of the brush footprint centred at (cx,cy), with a centre dot.
/// Midpoint circle, 1px wide.
/// Visual: a thin circle as wide as the brush follows the mouse.
pub fn draw_brush_ring(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, color: u32) {
    put_pixel(fb, cx, cy, color);
    if radius <= 0 {
        return;
    }
    let (mut x, mut y) = (radius, 0);
    let mut err = 1 - radius;
    while x >= y {
        for (dx, dy) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
            put_pixel(fb, cx + dx, cy + dy, color);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_touches_radius_on_axes_and_clips() {
        let mut fb = FrameBuffer::new(21, 21);
        draw_brush_ring(&mut fb, 10, 10, 10, 0xFF);
        assert_eq!(fb.pixels[10 * 21 + 10], 0xFF); // centre dot
        assert_eq!(fb.pixels[10 * 21 + 20], 0xFF); // (20,10)
        assert_eq!(fb.pixels[10], 0xFF); // (10,0)
        assert_eq!(fb.pixels[5 * 21 + 10], 0); // inside, not on the ring

        // Partially off-screen must not panic.
        draw_brush_ring(&mut fb, 0, 0, 15, 0xAA);
    }
}
