//! AGI still-image container
//!
//! Little-endian, never compressed, sections padded to 16 bytes with the
//! family's 0xAA fill. Also holds the raw pixel and palette writers the
//! rest of the family (AGA, AGE, AGM) shares.

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::sink::ByteSink;

use super::APixel;

pub const MAGIC: &[u8; 4] = b"AGI\0";
const HEADER_SIZE: usize = 32;

/// Pad fill byte used throughout the family.
pub(crate) const PAD_FILL: u8 = 0xAA;

/// Emit `canvas` as raw pixels in the family's layouts.
///
/// 4-bit data packs the left pixel into the low nibble. Indexed data reads
/// the pen index from the alpha channel.
pub(crate) fn write_raw(canvas: &Canvas, pixel: APixel, out: &mut ByteSink) {
    match pixel {
        APixel::I4 => {
            for y in 0..canvas.height() {
                for x in (0..canvas.width()).step_by(2) {
                    let left = canvas.at(x, y).a & 0xF;
                    let right = canvas.at(x + 1, y).a & 0xF;
                    out.write_u8(left | (right << 4));
                }
            }
        }
        APixel::I8 => {
            for y in 0..canvas.height() {
                for x in 0..canvas.width() {
                    canvas.at(x, y).write_alpha(out);
                }
            }
        }
        APixel::Rgb => {
            for y in 0..canvas.height() {
                for x in 0..canvas.width() {
                    canvas.at(x, y).write_rgb555_gba(out);
                }
            }
        }
    }
}

/// Write the family's palette block: `1 << bpp` pens as 15-bit color, or a
/// single zero word for truecolor formats.
pub(crate) fn write_palette(canvas: &Canvas, pixel: APixel, out: &mut ByteSink) -> Result<()> {
    if pixel.bpp() <= 8 {
        let color_count = 1usize << pixel.bpp();
        for pen in 0..color_count {
            canvas.palette_get(pen)?.write_rgb555_gba(out);
        }
    } else {
        out.write_u32(0);
    }
    Ok(())
}

/// Encode `canvas` as an AGI container.
pub fn encode(canvas: &Canvas, pixel: APixel) -> Result<ByteSink> {
    if pixel == APixel::I4 && canvas.width() % 2 != 0 {
        return Err(Error::Validation(
            "image width must be even for 4-bit data".into(),
        ));
    }

    let mut pal_section = ByteSink::new();
    write_palette(canvas, pixel, &mut pal_section)?;
    pal_section.pad(16, PAD_FILL);

    let mut bmp_section = ByteSink::new();
    write_raw(canvas, pixel, &mut bmp_section);
    bmp_section.pad(16, PAD_FILL);

    let offset_pal = HEADER_SIZE;
    let offset_bmp = offset_pal + pal_section.len();

    let mut out = ByteSink::new();
    out.write_raw(MAGIC);
    out.write_u16(canvas.width() as u16);
    out.write_u16(canvas.height() as u16);
    out.write_u32(pixel.id());
    out.write_u32(pal_section.len() as u32);
    out.write_u32(bmp_section.len() as u32);
    out.write_u32(offset_pal as u32);
    out.write_u32(offset_bmp as u32);
    out.pad(HEADER_SIZE, PAD_FILL);

    out.append(&pal_section);
    out.append(&bmp_section);
    Ok(out)
}
