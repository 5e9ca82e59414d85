//! PGI still-image container
//!
//! Layout: 40-byte header, palette section (paletted formats only), bitmap
//! section. The canvas is grown to a power-of-two bound before emission and
//! the header records both the original and the grown dimensions. The bitmap
//! may be zlib-compressed; the header stores logical and stored sizes so a
//! passthrough is transparent.

use crate::canvas::{conv_po2, Canvas};
use crate::codec;
use crate::color::DEFAULT_ALPHA_CUTOFF;
use crate::error::{Error, Result};
use crate::sink::ByteSink;

use super::PPixel;

pub const MAGIC: &[u8; 4] = b"PGI\0";
const HEADER_SIZE: u32 = 40;

/// Emit the full pixel grid of `canvas` in row-major order through the
/// P-family serializer for `pixel`. Shared with the PGA encoder.
pub(crate) fn write_raw(canvas: &Canvas, pixel: PPixel, out: &mut ByteSink) -> Result<()> {
    match pixel {
        PPixel::I8 => for_each_dot(canvas, |c, s| c.write_alpha(s), out),
        PPixel::Rgb565 => for_each_dot(canvas, |c, s| c.write_rgb565(s), out),
        PPixel::Rgb5a1 => {
            for_each_dot(canvas, |c, s| c.write_rgb5a1(s, DEFAULT_ALPHA_CUTOFF), out)
        }
        PPixel::Argb4 => for_each_dot(canvas, |c, s| c.write_argb4(s), out),
        PPixel::Argb8 => for_each_dot(canvas, |c, s| c.write_argb8(s), out),
        PPixel::I4 => {
            return Err(Error::Validation(
                "pixel format i4 has no raw emission in this family".into(),
            ))
        }
    }
    Ok(())
}

fn for_each_dot(
    canvas: &Canvas,
    write: impl Fn(crate::color::ColorSample, &mut ByteSink),
    out: &mut ByteSink,
) {
    for y in 0..canvas.height() {
        for x in 0..canvas.width() {
            write(canvas.at(x, y), out);
        }
    }
}

/// Build the 256-entry (16 for 4-bit) argb8 palette block.
pub(crate) fn write_palette(canvas: &Canvas, bpp: u32, out: &mut ByteSink) -> Result<()> {
    let pens = if bpp == 4 { 16 } else { 256 };
    for pen in 0..pens {
        canvas.palette_get(pen)?.write_argb8(out);
    }
    Ok(())
}

/// Encode `canvas` as a PGI container.
pub fn encode(canvas: &Canvas, pixel: PPixel, do_compress: bool) -> Result<ByteSink> {
    let width_po2 = conv_po2(canvas.width());
    let height_po2 = conv_po2(canvas.height());
    let bpp = pixel.bpp();

    let mut grown = Canvas::new(width_po2, height_po2)?;
    grown.palette_copy_from(canvas);
    canvas.rect_blit(&mut grown, 0, 0, 0, 0, 0, 0)?;

    // bitmap section
    let mut raw_bmp = ByteSink::new();
    write_raw(&grown, pixel, &mut raw_bmp)?;
    let bmp_logical = raw_bmp.len() as u32;
    let bmp_stored = codec::compress(raw_bmp.as_bytes(), do_compress)?;

    // palette section
    let mut pal = ByteSink::new();
    if bpp <= 8 {
        write_palette(canvas, bpp, &mut pal)?;
    }
    let pal_logical = pal.len() as u32;

    let mut out = ByteSink::new();
    out.write_raw(MAGIC);
    out.write_u16(canvas.width() as u16);
    out.write_u16(canvas.height() as u16);
    out.write_u16(width_po2 as u16);
    out.write_u16(height_po2 as u16);
    out.write_u32(pixel.id());
    out.write_u32(pal.len() as u32);
    out.write_u32(pal_logical);
    out.write_u32(HEADER_SIZE);
    out.write_u32(bmp_stored.len() as u32);
    out.write_u32(bmp_logical);
    out.write_u32(HEADER_SIZE + pal.len() as u32);

    out.append(&pal);
    out.write_raw(&bmp_stored);
    Ok(out)
}
