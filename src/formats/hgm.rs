//! HGM monochrome-handheld map container
//!
//! 8x8 cels deduplicated by exact match only; the hardware has no flip
//! attribute, so each map entry is a bare u8 character index. More than
//! 256 distinct cels cannot be addressed.
//!
//! Section order: header, map ("MAP"), characters ("CHR"), shades ("SHD").

use std::collections::HashMap;

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::sink::ByteSink;

use super::hgi;
use super::HPixel;

pub const MAGIC: &[u8; 4] = b"HGM\0";
const HEADER_SIZE: usize = 32;
const TILE: usize = 8;
const MAX_CHARS: usize = 256;

/// Encode `canvas` as an HGM container.
pub fn encode(canvas: &Canvas, pixel: HPixel) -> Result<ByteSink> {
    if canvas.width() % TILE != 0 || canvas.height() % TILE != 0 {
        return Err(Error::Validation(format!(
            "image size {}x{} is not a multiple of 8",
            canvas.width(),
            canvas.height()
        )));
    }

    let map_width = canvas.width() / TILE;
    let map_height = canvas.height() / TILE;

    let mut map_section = ByteSink::new();
    map_section.write_str("MAP");
    map_section.write_u16(map_width as u16);
    map_section.write_u16(map_height as u16);

    let mut chr_data = ByteSink::new();
    let mut char_map: HashMap<u64, u8> = HashMap::new();
    let mut cel_count = 0usize;

    for cel in canvas.rect_split(TILE, TILE, None)? {
        let hash = cel.hash_indexed(0);
        match char_map.get(&hash) {
            Some(&index) => map_section.write_u8(index),
            None => {
                if cel_count >= MAX_CHARS {
                    return Err(Error::FormatLimit(format!(
                        "cel count over ({} distinct tiles)",
                        cel_count + 1
                    )));
                }
                let index = cel_count as u8;
                char_map.insert(hash, index);
                hgi::write_tile(&cel, &mut chr_data);
                map_section.write_u8(index);
                cel_count += 1;
            }
        }
    }

    let mut chr_section = ByteSink::new();
    chr_section.write_str("CHR");
    chr_section.write_u32(chr_data.len() as u32);
    chr_section.append(&chr_data);

    let mut shd_section = ByteSink::new();
    shd_section.write_str("SHD");
    hgi::write_shades(canvas, &mut shd_section)?;

    map_section.pad(16, 0x00);
    chr_section.pad(16, 0x00);
    shd_section.pad(16, 0x00);

    let offset_map = HEADER_SIZE;
    let offset_chr = offset_map + map_section.len();
    let offset_shd = offset_chr + chr_section.len();

    let mut out = ByteSink::new();
    out.write_raw(MAGIC);
    out.write_u16(canvas.width() as u16);
    out.write_u16(canvas.height() as u16);
    out.write_u32(pixel.id());
    out.write_u32(cel_count as u32);
    out.write_u32(offset_map as u32);
    out.write_u32(offset_chr as u32);
    out.write_u32(offset_shd as u32);
    out.pad(HEADER_SIZE, 0x00);

    out.append(&map_section);
    out.append(&chr_section);
    out.append(&shd_section);
    Ok(out)
}
