//! In-memory bitmap plus palette
//!
//! A `Canvas` owns a dense row-major grid of `ColorSample` and an independent
//! 256-entry palette. The palette is always 256 entries regardless of the bit
//! depth in use; low-depth formats simply read a leading subset. Every canvas
//! produced by cropping or splitting is a fully independent value copy, never
//! a view, so mutating a derived canvas cannot perturb its source.
//!
//! Bounds handling is deliberately asymmetric: out-of-range reads are errors
//! (a caller bug), out-of-range writes during a blit are reported on stderr
//! and ignored (an authoring mistake in the source material).

use crate::color::ColorSample;
use crate::error::{Error, Result};

/// Number of palette entries a canvas always carries.
pub const PALETTE_SIZE: usize = 256;

#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<ColorSample>,
    palette: [ColorSample; PALETTE_SIZE],
}

impl Canvas {
    /// Create a blank canvas filled with transparent black.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Validation(format!(
                "bad canvas dimensions ({},{})",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels: vec![ColorSample::default(); width * height],
            palette: [ColorSample::default(); PALETTE_SIZE],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> usize {
        self.width * self.height
    }

    pub fn in_range(&self, x: i64, y: i64) -> bool {
        x >= 0 && (x as usize) < self.width && y >= 0 && (y as usize) < self.height
    }

    /// Unchecked accessors for hot loops that have already validated bounds.
    pub(crate) fn at(&self, x: usize, y: usize) -> ColorSample {
        self.pixels[x + y * self.width]
    }

    fn at_mut(&mut self, x: usize, y: usize) -> &mut ColorSample {
        &mut self.pixels[x + y * self.width]
    }

    /// Bounds-checked read. Out of range is a caller bug and is an error.
    pub fn dot_get(&self, x: i64, y: i64) -> Result<ColorSample> {
        if !self.in_range(x, y) {
            return Err(Error::Validation(format!(
                "pixel read out of range ({},{}) on {}x{} canvas",
                x, y, self.width, self.height
            )));
        }
        Ok(self.at(x as usize, y as usize))
    }

    /// Bounds-lenient write: out-of-range coordinates are reported and the
    /// write is dropped.
    pub fn dot_set(&mut self, x: i64, y: i64, color: ColorSample) {
        if !self.in_range(x, y) {
            eprintln!(
                "retropak: warning: pixel write out of range ({},{},#{:08X})",
                x,
                y,
                color.rawdata()
            );
            return;
        }
        *self.at_mut(x as usize, y as usize) = color;
    }

    pub fn clear(&mut self, color: ColorSample) {
        self.pixels.fill(color);
    }

    pub fn palette_get(&self, pen: usize) -> Result<ColorSample> {
        if pen >= PALETTE_SIZE {
            return Err(Error::Validation(format!("palette pen {} out of range", pen)));
        }
        Ok(self.palette[pen])
    }

    pub fn palette_set(&mut self, pen: usize, color: ColorSample) -> Result<()> {
        if pen >= PALETTE_SIZE {
            return Err(Error::Validation(format!("palette pen {} out of range", pen)));
        }
        self.palette[pen] = color;
        Ok(())
    }

    pub fn palette_clear(&mut self, color: ColorSample) {
        self.palette = [color; PALETTE_SIZE];
    }

    /// Copy the palette wholesale from another canvas. Crops keep their
    /// source's palette this way.
    pub fn palette_copy_from(&mut self, src: &Canvas) {
        self.palette = src.palette;
    }

    /// Copy a `w`×`h` rectangle from `self` at (sx,sy) into `dst` at (dx,dy).
    /// `w`/`h` of zero mean "rest of the source canvas". Both rectangles must
    /// be fully in bounds.
    pub fn rect_blit(
        &self,
        dst: &mut Canvas,
        sx: usize,
        sy: usize,
        dx: usize,
        dy: usize,
        w: usize,
        h: usize,
    ) -> Result<()> {
        let w = if w == 0 { self.width } else { w };
        let h = if h == 0 { self.height } else { h };

        let src_ok = self.in_range(sx as i64, sy as i64)
            && self.in_range((sx + w - 1) as i64, (sy + h - 1) as i64);
        let dst_ok = dst.in_range(dx as i64, dy as i64)
            && dst.in_range((dx + w - 1) as i64, (dy + h - 1) as i64);
        if !(src_ok && dst_ok) {
            return Err(Error::Validation(format!(
                "blit rect out of range: src ({},{}) dst ({},{}) size ({},{})",
                sx, sy, dx, dy, w, h
            )));
        }

        for iy in 0..h {
            for ix in 0..w {
                let color = self.at(sx + ix, sy + iy);
                *dst.at_mut(dx + ix, dy + iy) = color;
            }
        }
        Ok(())
    }

    /// Return a new independent canvas holding the given rectangle.
    /// `w`/`h` of zero mean "rest of the source canvas". The crop inherits
    /// the source palette.
    pub fn rect_get(&self, x: usize, y: usize, w: usize, h: usize) -> Result<Canvas> {
        let w = if w == 0 { self.width } else { w };
        let h = if h == 0 { self.height } else { h };

        let ok = self.in_range(x as i64, y as i64)
            && self.in_range((x + w - 1) as i64, (y + h - 1) as i64);
        if !ok {
            return Err(Error::Validation(format!(
                "crop rect out of range: ({},{}) size ({},{}) on {}x{} canvas",
                x, y, w, h, self.width, self.height
            )));
        }

        let mut out = Canvas::new(w, h)?;
        out.palette = self.palette;
        for iy in 0..h {
            for ix in 0..w {
                *out.at_mut(ix, iy) = self.at(x + ix, y + iy);
            }
        }
        Ok(out)
    }

    /// Partition the canvas into a row-major sequence of `tw`×`th` crops.
    /// The canvas dimensions must be exact multiples of the tile size.
    /// `count` caps the number of tiles returned (`None` returns all).
    pub fn rect_split(&self, tw: usize, th: usize, count: Option<usize>) -> Result<Vec<Canvas>> {
        if tw == 0 || th == 0 || self.width % tw != 0 || self.height % th != 0 {
            return Err(Error::Validation(format!(
                "invalid split size ({},{}) for {}x{} canvas",
                tw, th, self.width, self.height
            )));
        }

        let cols = self.width / tw;
        let rows = self.height / th;
        let total = cols * rows;
        let wanted = count.unwrap_or(total);
        if wanted > total {
            return Err(Error::Validation(format!(
                "split count {} exceeds {} available tiles",
                wanted, total
            )));
        }

        let mut tiles = Vec::with_capacity(wanted);
        for i in 0..wanted {
            let x = tw * (i % cols);
            let y = th * (i / cols);
            tiles.push(self.rect_get(x, y, tw, th)?);
        }
        Ok(tiles)
    }

    /// True iff every pixel equals `color`. Used to detect and skip
    /// fully-transparent tiles and subframes.
    pub fn all_equals(&self, color: ColorSample) -> bool {
        let key = color.rawdata();
        self.pixels.iter().all(|p| p.rawdata() == key)
    }

    /// 64-bit FNV-1a rolling hash over the pixel grid, scanned in one of
    /// four flip orientations (`flip` bit 0 = horizontal, bit 1 = vertical).
    /// Deterministic bit-for-bit; tile deduplication depends on it.
    pub fn hash(&self, flip: u8) -> u64 {
        self.hash_with(flip, |c| c.rawdata() as u64)
    }

    /// Like `hash`, but folds only the alpha/index channel. Used where the
    /// canvas stores palette indices in the alpha field.
    pub fn hash_indexed(&self, flip: u8) -> u64 {
        self.hash_with(flip, |c| c.a as u64)
    }

    fn hash_with(&self, flip: u8, fold: impl Fn(ColorSample) -> u64) -> u64 {
        let flip_x = flip & 1 != 0;
        let flip_y = flip & 2 != 0;
        let mut hash: u64 = 0x811C9DC5;

        for ly in 0..self.height {
            let y = if flip_y { self.height - 1 - ly } else { ly };
            for lx in 0..self.width {
                let x = if flip_x { self.width - 1 - lx } else { lx };
                hash = (hash ^ fold(self.at(x, y))).wrapping_mul(0x1000193);
            }
        }
        hash
    }
}

/// Smallest power of two that is `>= n` (1 for n <= 1).
pub fn conv_po2(n: usize) -> usize {
    let mut power = 1;
    while power < n {
        power <<= 1;
    }
    power
}
