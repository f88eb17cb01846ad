use std::io;

use crate::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// Renders frames produced by the machine.
pub trait Chip8Display {
    /// Called at most once per 60 Hz frame, and only when the framebuffer
    /// changed since the last call.
    fn present(&mut self, frame: &Framebuffer) -> io::Result<()>;
}

/// 64x32 monochrome pixel grid. Pixels only change through [`clear`] and
/// [`draw_sprite`].
///
/// [`clear`]: Framebuffer::clear
/// [`draw_sprite`]: Framebuffer::draw_sprite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: [bool; DISPLAY_WIDTH * DISPLAY_HEIGHT],
    dirty: bool,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            pixels: [false; DISPLAY_WIDTH * DISPLAY_HEIGHT],
            dirty: false,
        }
    }
}

impl Framebuffer {
    pub fn width(&self) -> usize {
        DISPLAY_WIDTH
    }

    pub fn height(&self) -> usize {
        DISPLAY_HEIGHT
    }

    /// Pixel at column `x`, row `y`. Coordinates wrap.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[Self::index(x, y)]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.pixels.chunks(DISPLAY_WIDTH)
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&pixel| !pixel)
    }

    pub fn clear(&mut self) {
        self.pixels = [false; DISPLAY_WIDTH * DISPLAY_HEIGHT];
        self.dirty = true;
    }

    /// XORs `sprite` onto the grid with its top-left corner at `(x, y)`,
    /// one byte per row, most significant bit leftmost. Both the origin and
    /// every pixel wrap around the edges.
    ///
    /// Returns true if any pixel went from on to off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut erased = false;

        for (row, &bits) in sprite.iter().enumerate() {
            for column in 0..8 {
                if bits & (0x80 >> column) == 0 {
                    continue;
                }
                let index = Self::index(x as usize + column, y as usize + row);
                erased |= self.pixels[index];
                self.pixels[index] ^= true;
            }
        }

        self.dirty = true;
        erased
    }

    /// Whether anything was drawn since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn index(x: usize, y: usize) -> usize {
        (y % DISPLAY_HEIGHT) * DISPLAY_WIDTH + x % DISPLAY_WIDTH
    }
}
