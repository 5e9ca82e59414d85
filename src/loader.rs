//! Source image decoding
//!
//! Two load paths exist. The truecolor path decodes any format the `image`
//! crate understands and fills the canvas with ARGB samples. The indexed
//! path reads a paletted PNG with the lower-level `png` decoder so the
//! original palette indices survive; each index is stored in the canvas
//! pixel's alpha channel and the file's palette lands in the canvas palette.

use std::fs::File;
use std::path::Path;

use crate::canvas::{Canvas, PALETTE_SIZE};
use crate::color::ColorSample;
use crate::error::{Error, Result};

/// Decode `path` into a canvas. `indexed` selects the paletted path.
pub fn load(path: &Path, indexed: bool) -> Result<Canvas> {
    if indexed {
        load_indexed(path)
    } else {
        load_truecolor(path)
    }
}

fn load_truecolor(path: &Path) -> Result<Canvas> {
    let img = image::open(path)
        .map_err(|e| Error::Validation(format!("unable to read {}: {}", path.display(), e)))?
        .to_rgba8();

    let (w, h) = img.dimensions();
    let mut canvas = Canvas::new(w as usize, h as usize)?;
    for (x, y, pixel) in img.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        canvas.dot_set(x as i64, y as i64, ColorSample::new(a, r, g, b));
    }
    Ok(canvas)
}

fn load_indexed(path: &Path) -> Result<Canvas> {
    let file = File::open(path)
        .map_err(|e| Error::Validation(format!("unable to read {}: {}", path.display(), e)))?;
    let decoder = png::Decoder::new(file);
    let mut reader = decoder
        .read_info()
        .map_err(|e| Error::Validation(format!("{}: {}", path.display(), e)))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| Error::Validation(format!("{}: {}", path.display(), e)))?;

    if info.color_type != png::ColorType::Indexed {
        return Err(Error::Validation(format!(
            "{}: image has no palette (indexed load requested)",
            path.display()
        )));
    }

    let palette = reader
        .info()
        .palette
        .as_ref()
        .ok_or_else(|| {
            Error::Validation(format!("{}: image has no palette", path.display()))
        })?
        .clone();

    let mut canvas = Canvas::new(info.width as usize, info.height as usize)?;

    // palette entries are opaque except pen 0, which is the transparent key
    for (i, rgb) in palette.chunks(3).take(PALETTE_SIZE).enumerate() {
        let a = if i == 0 { 0 } else { 0xFF };
        canvas.palette_set(i, ColorSample::new(a, rgb[0], rgb[1], rgb[2]))?;
    }

    let indices = unpack_indices(&buf, info.bit_depth, info.width as usize, info.height as usize,
        info.line_size);
    for y in 0..info.height as usize {
        for x in 0..info.width as usize {
            let index = indices[x + y * info.width as usize];
            canvas.dot_set(x as i64, y as i64, ColorSample::from_index(index));
        }
    }
    Ok(canvas)
}

/// Expand sub-byte index scanlines to one index per pixel.
fn unpack_indices(
    buf: &[u8],
    depth: png::BitDepth,
    width: usize,
    height: usize,
    line_size: usize,
) -> Vec<u8> {
    let per_byte = match depth {
        png::BitDepth::One => 8,
        png::BitDepth::Two => 4,
        png::BitDepth::Four => 2,
        _ => 1,
    };
    let bits = 8 / per_byte;
    let mask = ((1u16 << bits) - 1) as u8;

    let mut out = Vec::with_capacity(width * height);
    for y in 0..height {
        let line = &buf[y * line_size..];
        for x in 0..width {
            let byte = line[x / per_byte];
            let shift = 8 - bits * (x % per_byte + 1);
            out.push((byte >> shift) & mask);
        }
    }
    out
}
