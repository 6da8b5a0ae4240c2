//! Graphics coprocessor: palette, sprite state, and the foreground layer
use crate::Error;
use log::debug;
use static_assertions::{const_assert, const_assert_eq};
use zerocopy::{FromBytes, Immutable, KnownLayout};

/// Screen width, in pixels
pub const SCREEN_WIDTH: usize = 320;

/// Screen height, in pixels
pub const SCREEN_HEIGHT: usize = 240;

/// Size of a palette in memory, in bytes
pub const PALETTE_SIZE: usize = 3 * 16;

const_assert!(SCREEN_WIDTH <= i16::MAX as usize);
const_assert!(SCREEN_HEIGHT <= i16::MAX as usize);

/// An RGBA color
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Color {
    const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Palette entry as stored in memory
#[derive(Copy, Clone, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct Bgr {
    b: u8,
    g: u8,
    r: u8,
}

const_assert_eq!(core::mem::size_of::<[Bgr; 16]>(), PALETTE_SIZE);

/// Palette loaded at reset
///
/// Index 0 is transparent black when drawn in the foreground.
pub const DEFAULT_PALETTE: [Color; 16] = [
    Color::new(0x00, 0x00, 0x00, 0x00), // transparent
    Color::new(0x00, 0x00, 0x00, 0xFF), // black
    Color::new(0x88, 0x88, 0x88, 0xFF), // gray
    Color::new(0xBF, 0x39, 0x32, 0xFF), // red
    Color::new(0xDE, 0x7A, 0xAE, 0xFF), // pink
    Color::new(0x4C, 0x3D, 0x21, 0xFF), // dark brown
    Color::new(0x90, 0x5F, 0x25, 0xFF), // brown
    Color::new(0xE4, 0x94, 0x52, 0xFF), // orange
    Color::new(0xEA, 0xD9, 0x79, 0xFF), // yellow
    Color::new(0x53, 0x7A, 0x3B, 0xFF), // green
    Color::new(0xAB, 0xD5, 0x4A, 0xFF), // light green
    Color::new(0x25, 0x2E, 0x38, 0xFF), // dark blue
    Color::new(0x00, 0x46, 0x7F, 0xFF), // blue
    Color::new(0x68, 0xAB, 0xCC, 0xFF), // light blue
    Color::new(0xBC, 0xDE, 0xE4, 0xFF), // sky blue
    Color::new(0xFF, 0xFF, 0xFF, 0xFF), // white
];

/// State of the graphics coprocessor
pub struct Graphics {
    /// Current color palette
    palette: [Color; 16],

    /// Background palette index
    bg: u8,

    /// Foreground image, as palette indices
    fg: Vec<u8>,

    /// Sprite width, in bytes (i.e. half the width in pixels)
    sprite_w: u8,

    /// Sprite height, in pixels
    sprite_h: u8,

    hflip: bool,
    vflip: bool,

    /// Latched by `VBLNK`, cleared by the host
    vblank: bool,

    /// Local buffer for rendered RGBA values
    buffer: Vec<u8>,

    /// Flag indicating whether `buffer` should be recalculated
    changed: bool,
}

impl Default for Graphics {
    fn default() -> Self {
        Self::new()
    }
}

impl Graphics {
    /// Builds a cleared screen with the default palette
    pub fn new() -> Self {
        let size = SCREEN_WIDTH * SCREEN_HEIGHT;
        Self {
            palette: DEFAULT_PALETTE,
            bg: 0,
            fg: vec![0; size],
            sprite_w: 0,
            sprite_h: 0,
            hflip: false,
            vflip: false,
            vblank: false,
            buffer: vec![0; size * 4],
            changed: true,
        }
    }

    /// Resets the background color and erases the foreground
    pub fn clear(&mut self) {
        debug!("clearing screen");
        self.bg = 0;
        self.fg.fill(0);
        self.changed = true;
    }

    /// Loads 16 BGR triplets from the start of `mem`
    ///
    /// Alpha values are left unchanged.
    pub fn load_palette(&mut self, mem: &[u8]) -> Result<(), Error> {
        let (colors, _) = <[Bgr; 16]>::ref_from_prefix(mem)
            .map_err(|_| Error::PaletteOutOfBounds { len: mem.len() })?;
        for (p, c) in self.palette.iter_mut().zip(colors) {
            p.r = c.r;
            p.g = c.g;
            p.b = c.b;
        }
        debug!("loaded palette");
        self.changed = true;
        Ok(())
    }

    /// Sets the background palette index
    pub fn set_background(&mut self, index: u8) {
        self.bg = index & 0xF;
        self.changed = true;
    }

    /// Sets the sprite size, with the width in bytes (two pixels per byte)
    pub fn set_sprite_size(&mut self, width: u8, height: u8) {
        self.sprite_w = width;
        self.sprite_h = height;
    }

    /// Sets horizontal and vertical flipping for subsequent draws
    pub fn set_flip(&mut self, h: bool, v: bool) {
        self.hflip = h;
        self.vflip = v;
    }

    /// Latches a request to wait for the next vertical blank
    pub fn request_vblank(&mut self) {
        self.vblank = true;
    }

    /// Clears and returns the vertical blank request
    pub fn take_vblank(&mut self) -> bool {
        std::mem::take(&mut self.vblank)
    }

    /// Draws the current sprite with its top-left corner at `(x, y)`
    ///
    /// Sprite data is read from the start of `mem`, one byte per pair of
    /// pixels (high nibble first). Pixels with index 0 are transparent, and
    /// pixels outside the screen are clipped.
    ///
    /// Returns `true` if any drawn pixel overwrote a non-zero pixel.
    pub fn draw_sprite(
        &mut self,
        x: i16,
        y: i16,
        mem: &[u8],
    ) -> Result<bool, Error> {
        let w = usize::from(self.sprite_w);
        let h = usize::from(self.sprite_h);
        let needed = w * h;
        let data = mem.get(..needed).ok_or(Error::SpriteOutOfBounds {
            len: mem.len(),
            needed,
        })?;
        if needed == 0 {
            return Ok(false);
        }
        self.changed = true;

        let mut hit = false;
        for (row, line) in data.chunks_exact(w).enumerate() {
            let dy = if self.vflip { h - 1 - row } else { row };
            let py = i32::from(y) + dy as i32;
            if !(0..SCREEN_HEIGHT as i32).contains(&py) {
                continue;
            }
            let py = py as usize;
            for (col, &byte) in line.iter().enumerate() {
                for (k, color) in [byte >> 4, byte & 0xF].into_iter().enumerate()
                {
                    if color == 0 {
                        continue;
                    }
                    let sx = 2 * col + k;
                    let dx = if self.hflip { 2 * w - 1 - sx } else { sx };
                    let px = i32::from(x) + dx as i32;
                    if !(0..SCREEN_WIDTH as i32).contains(&px) {
                        continue;
                    }
                    let p = &mut self.fg[px as usize + py * SCREEN_WIDTH];
                    hit |= *p != 0;
                    *p = color;
                }
            }
        }
        Ok(hit)
    }

    /// Returns the current palette
    pub fn palette(&self) -> &[Color; 16] {
        &self.palette
    }

    /// Returns the background palette index
    pub fn background(&self) -> u8 {
        self.bg
    }

    /// Returns the foreground image, row-major, as palette indices
    pub fn foreground(&self) -> &[u8] {
        &self.fg
    }

    /// Returns the foreground index at the given position
    ///
    /// # Panics
    /// If the position is off-screen
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        assert!(x < SCREEN_WIDTH && y < SCREEN_HEIGHT);
        self.fg[x + y * SCREEN_WIDTH]
    }

    /// Returns the sprite size as `(width in bytes, height)`
    pub fn sprite_size(&self) -> (u8, u8) {
        (self.sprite_w, self.sprite_h)
    }

    /// Returns the `(horizontal, vertical)` flip state
    pub fn flip(&self) -> (bool, bool) {
        (self.hflip, self.vflip)
    }

    /// Gets the current frame as RGBA bytes
    ///
    /// Foreground pixels take precedence; index 0 shows the background.
    pub fn frame(&mut self) -> &[u8] {
        if std::mem::take(&mut self.changed) {
            for (&p, o) in self.fg.iter().zip(self.buffer.chunks_mut(4)) {
                let i = if p != 0 { p } else { self.bg };
                let c = self.palette[usize::from(i & 0xF)];
                o.copy_from_slice(&[c.r, c.g, c.b, c.a]);
            }
        }
        &self.buffer
    }
}
