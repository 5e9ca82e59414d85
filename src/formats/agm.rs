//! AGM tile-map container
//!
//! Little-endian cousin of the NGM map: 8x8 cels deduplicated across the
//! four flip orientations, with the horizontal and vertical flip bits at
//! 10 and 11 of each map entry. Character numbers stride by bpp so they
//! address 32-byte character slots. The map caps at 1024 characters and
//! has no wide mode.
//!
//! Section order: header, map ("MAP"), characters ("CHR"), palette ("PAL").
//! Never compressed, padded 16 with fill 0xAA.

use std::collections::HashMap;

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::sink::ByteSink;

use super::agi::{self, PAD_FILL};
use super::APixel;

pub const MAGIC: &[u8; 4] = b"AGM\0";
const HEADER_SIZE: usize = 32;
const TILE: usize = 8;
const MAX_CHARS: usize = 1024;

/// Encode `canvas` as an AGM container.
pub fn encode(canvas: &Canvas, pixel: APixel) -> Result<ByteSink> {
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

    let map_width = canvas.width() / TILE;
    let map_height = canvas.height() / TILE;

    let mut map_section = ByteSink::new();
    map_section.write_str("MAP");
    map_section.write_u16(map_width as u16);
    map_section.write_u16(map_height as u16);

    let mut chr_data = ByteSink::new();
    let mut char_map: HashMap<u64, u16> = HashMap::new();
    let mut cel_count = 0usize;

    for cel in canvas.rect_split(TILE, TILE, None)? {
        let hashes = [
            cel.hash_indexed(0b00),
            cel.hash_indexed(0b01),
            cel.hash_indexed(0b10),
            cel.hash_indexed(0b11),
        ];

        let hit = (0..4).find_map(|fi| {
            char_map.get(&hashes[fi]).map(|&index| (index, fi as u16))
        });

        match hit {
            Some((index, flip)) => {
                map_section.write_u16(index | (flip << 10));
            }
            None => {
                let index = cel_count * char_stride;
                if index > MAX_CHARS {
                    return Err(Error::FormatLimit(format!(
                        "cel count over ({} characters used)",
                        index
                    )));
                }
                char_map.insert(hashes[0], index as u16);
                agi::write_raw(&cel, pixel, &mut chr_data);
                map_section.write_u16(index as u16);
                cel_count += 1;
            }
        }
    }

    let mut chr_section = ByteSink::new();
    chr_section.write_str("CHR");
    chr_section.write_u32(chr_data.len() as u32);
    chr_section.append(&chr_data);

    let mut pal_section = ByteSink::new();
    pal_section.write_str("PAL");
    agi::write_palette(canvas, pixel, &mut pal_section)?;

    map_section.pad(16, PAD_FILL);
    chr_section.pad(16, PAD_FILL);
    pal_section.pad(16, PAD_FILL);

    let offset_map = HEADER_SIZE;
    let offset_chr = offset_map + map_section.len();
    let offset_pal = offset_chr + chr_section.len();

    let mut out = ByteSink::new();
    out.write_raw(MAGIC);
    out.write_u16(canvas.width() as u16);
    out.write_u16(canvas.height() as u16);
    out.write_u32(pixel.id());
    out.write_u32(cel_count as u32);
    out.write_u32(offset_map as u32);
    out.write_u32(offset_chr as u32);
    out.write_u32(offset_pal as u32);
    out.pad(HEADER_SIZE, PAD_FILL);

    out.append(&map_section);
    out.append(&chr_section);
    out.append(&pal_section);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorSample;

    fn paint(c: &mut Canvas, x0: i64, y0: i64, pens: &[[u8; 8]; 8]) {
        for (dy, row) in pens.iter().enumerate() {
            for (dx, &pen) in row.iter().enumerate() {
                c.dot_set(x0 + dx as i64, y0 + dy as i64, ColorSample::from_index(pen));
            }
        }
    }

    fn map_entries(bytes: &[u8]) -> Vec<u16> {
        let offset_map = u32::from_le_bytes(bytes[16..20].try_into().unwrap()) as usize;
        assert_eq!(&bytes[offset_map..offset_map + 3], b"MAP");
        let w = u16::from_le_bytes(bytes[offset_map + 3..offset_map + 5].try_into().unwrap())
            as usize;
        let h = u16::from_le_bytes(bytes[offset_map + 5..offset_map + 7].try_into().unwrap())
            as usize;
        let data = &bytes[offset_map + 7..offset_map + 7 + w * h * 2];
        data.chunks(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect()
    }

    #[test]
    fn test_both_flip_bits_are_distinct() {
        // four tiles: a reference and its h, v and hv mirrors
        let mut base = [[0u8; 8]; 8];
        base[0] = [1, 2, 3, 4, 5, 6, 7, 8];
        base[1][0] = 9;

        let mut h = [[0u8; 8]; 8];
        let mut v = [[0u8; 8]; 8];
        let mut hv = [[0u8; 8]; 8];
        for y in 0..8 {
            for x in 0..8 {
                h[y][x] = base[y][7 - x];
                v[y][x] = base[7 - y][x];
                hv[y][x] = base[7 - y][7 - x];
            }
        }

        let mut c = Canvas::new(32, 8).unwrap();
        paint(&mut c, 0, 0, &base);
        paint(&mut c, 8, 0, &h);
        paint(&mut c, 16, 0, &v);
        paint(&mut c, 24, 0, &hv);

        let bytes = encode(&c, APixel::I8).unwrap().into_bytes();
        let cel_count = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
        assert_eq!(cel_count, 1);
        assert_eq!(
            map_entries(&bytes),
            vec![0, 1 << 10, 2 << 10, 3 << 10]
        );
    }

    #[test]
    fn test_char_numbers_stride_by_bpp() {
        let mut c = Canvas::new(16, 8).unwrap();
        let mut a = [[0u8; 8]; 8];
        a[0][0] = 1;
        let mut b = [[0u8; 8]; 8];
        b[0][0] = 2;
        paint(&mut c, 0, 0, &a);
        paint(&mut c, 8, 0, &b);

        let bytes = encode(&c, APixel::I8).unwrap().into_bytes();
        assert_eq!(map_entries(&bytes), vec![0, 2]);

        let bytes = encode(&c, APixel::I4).unwrap().into_bytes();
        assert_eq!(map_entries(&bytes), vec![0, 1]);
    }

    #[test]
    fn test_truecolor_is_rejected() {
        let c = Canvas::new(8, 8).unwrap();
        assert!(matches!(
            encode(&c, APixel::Rgb),
            Err(Error::Validation(_))
        ));
    }
}
