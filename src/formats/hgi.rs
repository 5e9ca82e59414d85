//! HGI monochrome-handheld tile container
//!
//! 2bpp planar characters: the canvas is cut into 8x8 tiles row-major and
//! each tile stores 16 bytes, two per pixel row. The first byte of a row
//! is the low bitplane, the second the high bitplane, bit 7 being the
//! leftmost pixel. Pixel values are the palette index masked to 2 bits.
//!
//! A four-entry shade table maps the 2-bit values back to display colors.
//!
//! Section order: header, characters ("CHR"), shades ("SHD"). Little
//! endian, sections padded to 16.

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::sink::ByteSink;

use super::HPixel;

pub const MAGIC: &[u8; 4] = b"HGI\0";
const HEADER_SIZE: usize = 32;
const TILE: usize = 8;

/// Serialize one 8x8 tile as 16 planar bytes.
pub(crate) fn write_tile(tile: &Canvas, out: &mut ByteSink) {
    for y in 0..TILE {
        let mut low = 0u8;
        let mut high = 0u8;
        for x in 0..TILE {
            let value = tile.at(x, y).a & 0b11;
            low |= (value & 1) << (7 - x);
            high |= (value >> 1) << (7 - x);
        }
        out.write_u8(low);
        out.write_u8(high);
    }
}

/// Write the four-entry shade table from the canvas palette.
pub(crate) fn write_shades(canvas: &Canvas, out: &mut ByteSink) -> Result<()> {
    for pen in 0..4 {
        canvas.palette_get(pen)?.write_argb8(out);
    }
    Ok(())
}

/// Encode `canvas` as an HGI container.
pub fn encode(canvas: &Canvas, pixel: HPixel) -> Result<ByteSink> {
    if canvas.width() % TILE != 0 || canvas.height() % TILE != 0 {
        return Err(Error::Validation(format!(
            "image size {}x{} is not a multiple of 8",
            canvas.width(),
            canvas.height()
        )));
    }

    let tiles = canvas.rect_split(TILE, TILE, None)?;
    let mut chr_section = ByteSink::new();
    chr_section.write_str("CHR");
    chr_section.write_u32((tiles.len() * 16) as u32);
    for tile in &tiles {
        write_tile(tile, &mut chr_section);
    }

    let mut shd_section = ByteSink::new();
    shd_section.write_str("SHD");
    write_shades(canvas, &mut shd_section)?;

    chr_section.pad(16, 0x00);
    shd_section.pad(16, 0x00);

    let offset_chr = HEADER_SIZE;
    let offset_shd = offset_chr + chr_section.len();

    let mut out = ByteSink::new();
    out.write_raw(MAGIC);
    out.write_u16(canvas.width() as u16);
    out.write_u16(canvas.height() as u16);
    out.write_u32(pixel.id());
    out.write_u32(tiles.len() as u32);
    out.write_u32(offset_chr as u32);
    out.write_u32(offset_shd as u32);
    out.pad(HEADER_SIZE, 0x00);

    out.append(&chr_section);
    out.append(&shd_section);
    Ok(out)
}
