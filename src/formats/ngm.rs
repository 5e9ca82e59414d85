//! NGM tile-map container
//!
//! The image is cut into 8x8 cels which are deduplicated, including under
//! horizontal and vertical mirroring. The map stores one big-endian u16
//! per cel: a character number with flip bits at 10 and 11.
//!
//! Character numbers advance by a per-bpp stride so they address fixed
//! 0x20-byte character slots regardless of depth. The standard map caps
//! out at 1024 characters; wide-map mode raises the cap to 4096 but gives
//! up the flip bits.
//!
//! Section order: header, palette ("PAL"), map ("CHP"), cel data ("CEL").

use std::collections::HashMap;

use crate::canvas::Canvas;
use crate::codec;
use crate::error::{Error, Result};
use crate::sink::ByteSink;

use super::ngi;
use super::NPixel;

pub const MAGIC: &[u8; 3] = b"NGM";
const PAD_SIZE: usize = 0x800;
const TILE: usize = 8;
const BASE_MAX_CHARS: usize = 1024;

/// Encode `canvas` as an NGM container.
pub fn encode(
    canvas: &Canvas,
    pixel: NPixel,
    wide_map: bool,
    do_compress: bool,
) -> Result<ByteSink> {
    // character slots are 0x20 bytes regardless of depth
    let char_stride = match pixel.bpp() {
        4 => 1,
        8 => 2,
        _ => {
            return Err(Error::Validation(
                "map format requires a 4 or 8 bit pixel format".into(),
            ))
        }
    };
    if canvas.width() % TILE != 0 {
        return Err(Error::Validation(
            "image width must be a multiple of 8".into(),
        ));
    }

    let mut max_chars = BASE_MAX_CHARS;
    if wide_map {
        max_chars <<= 2;
    }
    // flip bits collide with wide character numbers
    let num_flips = if wide_map { 1 } else { 4 };

    let map_width = canvas.width() / TILE;
    let map_height = canvas.height() / TILE;

    let mut map_section = ByteSink::new();
    let mut bmp_section = ByteSink::new();
    let mut char_map: HashMap<u64, u16> = HashMap::new();
    let mut cel_count = 0usize;
    let mut cel_datasize = 0usize;

    for cel in canvas.rect_split(TILE, TILE, None)? {
        let hashes = [
            cel.hash_indexed(0b00),
            cel.hash_indexed(0b01),
            cel.hash_indexed(0b10),
            cel.hash_indexed(0b11),
        ];

        let hit = (0..num_flips).find_map(|fi| {
            char_map.get(&hashes[fi]).map(|&index| (index, fi as u16))
        });

        match hit {
            Some((index, flip)) => {
                map_section.write_u16_be(index | (flip << 10));
            }
            None => {
                let index = cel_count * char_stride;
                if index > max_chars {
                    return Err(Error::FormatLimit(format!(
                        "cel count over ({} characters used); consider the \
                         wide-map mode for more tiles",
                        index
                    )));
                }
                char_map.insert(hashes[0], index as u16);
                let mut bmp = ByteSink::new();
                ngi::write_raw(&cel, pixel, &mut bmp);
                cel_datasize = bmp.len();
                bmp_section.append(&bmp);
                map_section.write_u16_be(index as u16);
                cel_count += 1;
            }
        }
    }

    let mut pal_section = ByteSink::new();
    pal_section.write_str("PAL");
    ngi::write_palette_section(canvas, pixel, false, do_compress, &mut pal_section)?;

    let mut map_real = ByteSink::new();
    map_real.write_str("CHP");
    map_real.write_u16_be(map_width as u16);
    map_real.write_u16_be(map_height as u16);
    let map_stored = codec::compress(map_section.as_bytes(), do_compress)?;
    map_real.write_u32_be(map_section.len() as u32);
    map_real.write_u32_be(map_stored.len() as u32);
    map_real.write_raw(&map_stored);

    let mut cel_section = ByteSink::new();
    ngi::write_cel_section(&bmp_section, do_compress, &mut cel_section)?;

    pal_section.pad(PAD_SIZE, 0x00);
    map_real.pad(PAD_SIZE, 0x00);
    cel_section.pad(PAD_SIZE, 0x00);

    let offset_pal = PAD_SIZE;
    let offset_map = offset_pal + pal_section.len();
    let offset_bmp = offset_map + map_real.len();

    let mut out = ByteSink::new();
    out.write_raw(MAGIC);
    out.write_u32_be(pixel.id());
    out.write_u16_be(canvas.width() as u16);
    out.write_u16_be(canvas.height() as u16);
    out.write_u16_be(cel_count as u16);
    out.write_u16_be(cel_datasize as u16);
    out.write_u32_be(offset_pal as u32);
    out.write_u32_be(offset_map as u32);
    out.write_u32_be(offset_bmp as u32);
    out.pad(PAD_SIZE, 0x00);

    out.append(&pal_section);
    out.append(&map_real);
    out.append(&cel_section);
    Ok(out)
}
