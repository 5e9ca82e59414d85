//! NGI still-image container
//!
//! Big-endian throughout, sections padded to 0x800 byte boundaries. The
//! image may optionally be cut into fixed-size subimages stored back to
//! back, for hardware that streams cels of a known stride.
//!
//! This module also holds the raw pixel and section writers shared by the
//! whole family (NGA and NGM reuse them).

use crate::canvas::Canvas;
use crate::codec;
use crate::error::{Error, Result};
use crate::sink::ByteSink;

use super::NPixel;

pub const MAGIC: &[u8; 3] = b"NGI";
const PAD_SIZE: usize = 0x800;

/// Emit `canvas` as raw pixels in the family's layouts.
///
/// 4-bit data packs the left pixel into the high nibble. Indexed data reads
/// the pen index from the alpha channel.
pub(crate) fn write_raw(canvas: &Canvas, pixel: NPixel, out: &mut ByteSink) {
    match pixel {
        NPixel::I4 => {
            for y in 0..canvas.height() {
                for x in (0..canvas.width()).step_by(2) {
                    let left = canvas.at(x, y).a & 0xF;
                    let right = canvas.at(x + 1, y).a & 0xF;
                    out.write_u8(right | (left << 4));
                }
            }
        }
        NPixel::I8 => {
            for y in 0..canvas.height() {
                for x in 0..canvas.width() {
                    canvas.at(x, y).write_alpha(out);
                }
            }
        }
        NPixel::Rgb => {
            for y in 0..canvas.height() {
                for x in 0..canvas.width() {
                    canvas.at(x, y).write_rgb5a1_sat(out, true);
                }
            }
        }
    }
}

/// Write a "PAL" section body: uncompressed size, stored size, then the
/// (optionally compressed) pen data. Truecolor formats get a zero count.
/// The tag itself must already be in `out`.
pub(crate) fn write_palette_section(
    canvas: &Canvas,
    pixel: NPixel,
    msb: bool,
    do_compress: bool,
    out: &mut ByteSink,
) -> Result<()> {
    if pixel.bpp() <= 8 {
        let mut pal = ByteSink::new();
        let color_count = 1usize << pixel.bpp();
        for pen in 0..color_count {
            canvas.palette_get(pen)?.write_rgb5a1_sat(&mut pal, msb);
        }
        let stored = codec::compress(pal.as_bytes(), do_compress)?;
        out.write_u32_be(pal.len() as u32);
        out.write_u32_be(stored.len() as u32);
        out.write_raw(&stored);
    } else {
        out.write_u32_be(0);
    }
    Ok(())
}

/// Wrap raw cel data into a "CEL" section: tag, uncompressed size, stored
/// size, data.
pub(crate) fn write_cel_section(
    bmp: &ByteSink,
    do_compress: bool,
    out: &mut ByteSink,
) -> Result<()> {
    out.write_str("CEL");
    let stored = codec::compress(bmp.as_bytes(), do_compress)?;
    out.write_u32_be(bmp.len() as u32);
    out.write_u32_be(stored.len() as u32);
    out.write_raw(&stored);
    Ok(())
}

/// Encode `canvas` as an NGI container. A nonzero `sub_w`/`sub_h` cuts the
/// image into subimages of that size.
pub fn encode(
    canvas: &Canvas,
    pixel: NPixel,
    sub_w: usize,
    sub_h: usize,
    do_compress: bool,
) -> Result<ByteSink> {
    if sub_w % 8 != 0 {
        return Err(Error::Validation(
            "subimage width must be a multiple of 8".into(),
        ));
    }
    let use_subimage = match (sub_w, sub_h) {
        (0, 0) => false,
        (w, h) if w > 0 && h > 0 => true,
        _ => {
            return Err(Error::Validation(format!(
                "bad subimage size ({},{})",
                sub_w, sub_h
            )))
        }
    };

    let width_real = canvas.width().div_ceil(8) * 8;
    let mut subimage_count = 0usize;
    let mut subimage_datasize = 0usize;

    let mut bmp_section = ByteSink::new();
    if use_subimage {
        let table = canvas.rect_split(sub_w, sub_h, None)?;
        subimage_count = table.len();
        for pic in &table {
            let mut bmp = ByteSink::new();
            write_raw(pic, pixel, &mut bmp);
            subimage_datasize = bmp.len();
            bmp_section.append(&bmp);
        }
    } else {
        let mut rounded = Canvas::new(width_real, canvas.height())?;
        rounded.palette_copy_from(canvas);
        canvas.rect_blit(&mut rounded, 0, 0, 0, 0, 0, 0)?;
        write_raw(&rounded, pixel, &mut bmp_section);
    }

    let mut pal_section = ByteSink::new();
    pal_section.write_str("PAL");
    write_palette_section(canvas, pixel, true, do_compress, &mut pal_section)?;

    let mut cel_section = ByteSink::new();
    write_cel_section(&bmp_section, do_compress, &mut cel_section)?;

    pal_section.pad(PAD_SIZE, 0x00);
    cel_section.pad(PAD_SIZE, 0x00);

    let offset_pal = PAD_SIZE;
    let offset_bmp = offset_pal + pal_section.len();

    let mut out = ByteSink::new();
    out.write_raw(MAGIC);
    out.write_u32_be(pixel.id());
    out.write_u16_be(width_real as u16);
    out.write_u16_be(canvas.width() as u16);
    out.write_u16_be(canvas.height() as u16);
    out.write_u16_be(subimage_count as u16);
    out.write_u16_be(sub_w as u16);
    out.write_u16_be(sub_h as u16);
    out.write_u32_be(subimage_datasize as u32);
    out.write_u32_be(offset_pal as u32);
    out.write_u32_be(offset_bmp as u32);
    out.pad(PAD_SIZE, 0x00);

    out.append(&pal_section);
    out.append(&cel_section);
    Ok(out)
}
