//! MGI twiddled-texture container
//!
//! Same container scheme as PGI (40-byte header, palette, bitmap with
//! logical/stored sizes) but for the M family: the bitmap is normally
//! emitted in Morton ("twiddled") order for the swizzled texture sampler.
//! The header's format word carries the pixel id plus a non-twiddled flag
//! bit when linear emission was requested.

use crate::canvas::{conv_po2, Canvas};
use crate::codec;
use crate::color::{ColorSample, DEFAULT_ALPHA_CUTOFF};
use crate::error::{Error, Result};
use crate::sink::ByteSink;
use crate::twiddle::twiddled_index;

use super::MPixel;

pub const MAGIC: &[u8; 4] = b"MGI\0";
const HEADER_SIZE: u32 = 40;

/// Format-word flag recording that the bitmap is stored linearly.
pub const FLAG_NONTWIDDLED: u32 = 1 << 8;

fn write_linear(canvas: &Canvas, pixel: MPixel, out: &mut ByteSink) -> Result<()> {
    let write: fn(ColorSample, &mut ByteSink) = match pixel {
        MPixel::I8 => |c, s| c.write_alpha(s),
        MPixel::Rgb565 => |c, s| c.write_rgb565(s),
        MPixel::Rgb5a1 => |c, s| c.write_rgb5a1(s, DEFAULT_ALPHA_CUTOFF),
        MPixel::Argb4444 => |c, s| c.write_argb4(s),
        MPixel::I4 => {
            return Err(Error::Validation(
                "pixel format i4 requires twiddled emission".into(),
            ))
        }
    };
    for y in 0..canvas.height() {
        for x in 0..canvas.width() {
            write(canvas.at(x, y), out);
        }
    }
    Ok(())
}

/// Twiddled emission: compute the Morton index per pixel and scatter the
/// serialized samples into a linear buffer. The 4-bit format packs nibbles
/// linearly; its storage is too irregular to twiddle per pixel.
fn write_twiddled(canvas: &Canvas, pixel: MPixel, out: &mut ByteSink) -> Result<()> {
    let (w, h) = (canvas.width(), canvas.height());

    if pixel == MPixel::I4 {
        for y in 0..h {
            for x in (0..w).step_by(2) {
                let left = canvas.at(x, y).a & 0xF;
                let right = canvas.at(x + 1, y).a & 0xF;
                out.write_u8(left | right << 4);
            }
        }
        return Ok(());
    }

    let bytes_per = (pixel.bpp() / 8) as usize;
    let mut buf = vec![0u8; w * h * bytes_per];
    for y in 0..h {
        for x in 0..w {
            let z = twiddled_index(x, y, w, h);
            if z >= w * h {
                return Err(Error::Internal(format!(
                    "twiddled index {} out of range for {}x{}",
                    z, w, h
                )));
            }
            let mut dot = ByteSink::new();
            match pixel {
                MPixel::I8 => canvas.at(x, y).write_alpha(&mut dot),
                MPixel::Rgb565 => canvas.at(x, y).write_rgb565(&mut dot),
                MPixel::Rgb5a1 => canvas.at(x, y).write_rgb5a1(&mut dot, DEFAULT_ALPHA_CUTOFF),
                MPixel::Argb4444 => canvas.at(x, y).write_argb4(&mut dot),
                MPixel::I4 => unreachable!(),
            }
            buf[z * bytes_per..(z + 1) * bytes_per].copy_from_slice(dot.as_bytes());
        }
    }
    out.write_raw(&buf);
    Ok(())
}

/// Encode `canvas` as an MGI container.
pub fn encode(canvas: &Canvas, pixel: MPixel, twiddled: bool, do_compress: bool) -> Result<ByteSink> {
    let width_po2 = conv_po2(canvas.width());
    let height_po2 = conv_po2(canvas.height());
    let bpp = pixel.bpp();

    if bpp <= 8 && !twiddled {
        eprintln!("retropak: warning: converting to paletted format with non-twiddled data");
    }

    let mut grown = Canvas::new(width_po2, height_po2)?;
    grown.palette_copy_from(canvas);
    canvas.rect_blit(&mut grown, 0, 0, 0, 0, 0, 0)?;

    let mut raw_bmp = ByteSink::new();
    if twiddled {
        write_twiddled(&grown, pixel, &mut raw_bmp)?;
    } else {
        write_linear(&grown, pixel, &mut raw_bmp)?;
    }
    let bmp_logical = raw_bmp.len() as u32;
    let bmp_stored = codec::compress(raw_bmp.as_bytes(), do_compress)?;

    let mut pal = ByteSink::new();
    if bpp <= 8 {
        super::pgi::write_palette(canvas, bpp, &mut pal)?;
    }
    let pal_logical = pal.len() as u32;

    let format_word = pixel.id() | if twiddled { 0 } else { FLAG_NONTWIDDLED };

    let mut out = ByteSink::new();
    out.write_raw(MAGIC);
    out.write_u16(canvas.width() as u16);
    out.write_u16(canvas.height() as u16);
    out.write_u16(width_po2 as u16);
    out.write_u16(height_po2 as u16);
    out.write_u32(format_word);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twiddle::twiddled_index;

    #[test]
    fn test_twiddled_i8_scatters_by_morton_index() {
        let mut c = Canvas::new(4, 4).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                c.dot_set(x, y, ColorSample::from_index((x + y * 4) as u8));
            }
        }
        let mut sink = ByteSink::new();
        write_twiddled(&c, MPixel::I8, &mut sink).unwrap();
        let bytes = sink.as_bytes();
        for y in 0..4usize {
            for x in 0..4usize {
                assert_eq!(bytes[twiddled_index(x, y, 4, 4)], (x + y * 4) as u8);
            }
        }
    }

    #[test]
    fn test_linear_i4_is_rejected() {
        let c = Canvas::new(8, 8).unwrap();
        let mut sink = ByteSink::new();
        assert!(write_linear(&c, MPixel::I4, &mut sink).is_err());
    }

    #[test]
    fn test_format_word_flags_linear_storage() {
        let mut c = Canvas::new(8, 8).unwrap();
        c.clear(ColorSample::new(255, 0, 0, 0));
        let twiddled = encode(&c, MPixel::Rgb565, true, false).unwrap();
        let linear = encode(&c, MPixel::Rgb565, false, false).unwrap();
        let word = |s: &ByteSink| u32::from_le_bytes(s.as_bytes()[12..16].try_into().unwrap());
        assert_eq!(word(&twiddled), MPixel::Rgb565.id());
        assert_eq!(word(&linear), MPixel::Rgb565.id() | FLAG_NONTWIDDLED);
    }

    #[test]
    fn test_twiddled_i4_packs_two_pixels_per_byte() {
        let mut c = Canvas::new(8, 8).unwrap();
        c.clear(ColorSample::from_index(0x3));
        let mut sink = ByteSink::new();
        write_twiddled(&c, MPixel::I4, &mut sink).unwrap();
        assert_eq!(sink.len(), 32);
        assert!(sink.as_bytes().iter().all(|&b| b == 0x33));
    }
}
