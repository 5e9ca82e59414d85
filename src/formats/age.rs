//! AGE hierarchical cel-animation container
//!
//! Built from a pattern document rather than a sheet: patterns own frames,
//! frames own parts, and every part references a deduplicated cel in the
//! shared bank. Load lists (the cel ids a pattern or frame first touches)
//! are stored flat in their own section so a player can stream characters
//! ahead of playback.
//!
//! Section order: header, patterns ("PTN"), frames ("FRM"), parts ("PRT"),
//! load lists ("LOD"), palette ("PAL"), cel data ("CEL"). Little endian,
//! never compressed, padded 16 with fill 0xAA.
//!
//! Record layouts (all fields u32 unless noted):
//!   pattern: first_frame, frame_count, load_offset, load_count
//!   frame:   duration_ticks u16, part_count u16, first_part, load_offset,
//!            load_count
//!   part:    cel_id u16, dest_x i16, dest_y i16, width u16, height u16
//!   cel:     bmp_offset, width u16, height u16

use crate::canvas::Canvas;
use crate::error::Result;
use crate::sink::ByteSink;
use crate::timeline::PatternSet;

use super::agi::{self, PAD_FILL};
use super::APixel;

pub const MAGIC: &[u8; 4] = b"AGE\0";
const HEADER_SIZE: usize = 48;

/// Encode a resolved pattern set as an AGE container. The palette comes
/// from `canvas`, the conversion's source image.
pub fn encode(
    canvas: &Canvas,
    pixel: APixel,
    set: &PatternSet,
    useroffset: (i32, i32),
) -> Result<ByteSink> {
    let mut pattern_section = ByteSink::new();
    let mut frame_section = ByteSink::new();
    let mut part_section = ByteSink::new();
    let mut load_section = ByteSink::new();
    pattern_section.write_str("PTN");
    frame_section.write_str("FRM");
    part_section.write_str("PRT");
    load_section.write_str("LOD");

    let mut write_load_list = |section: &mut ByteSink, ids: &[u16]| {
        let offset = section.len() as u32;
        for &id in ids {
            section.write_u16(id);
        }
        offset
    };

    let mut frame_index = 0u32;
    let mut part_index = 0u32;

    for pattern in &set.patterns {
        let load_offset = write_load_list(&mut load_section, &pattern.load_list);
        pattern_section.write_u32(frame_index);
        pattern_section.write_u32(pattern.frames.len() as u32);
        pattern_section.write_u32(load_offset);
        pattern_section.write_u32(pattern.load_list.len() as u32);

        for frame in &pattern.frames {
            let load_offset = write_load_list(&mut load_section, &frame.load_list);
            frame_section.write_u16(frame.duration_ticks as u16);
            frame_section.write_u16(frame.parts.len() as u16);
            frame_section.write_u32(part_index);
            frame_section.write_u32(load_offset);
            frame_section.write_u32(frame.load_list.len() as u32);

            for part in &frame.parts {
                let cel = &set.bank.cels()[part.cel_id as usize].canvas;
                part_section.write_u16(part.cel_id);
                part_section.write_u16((part.dest_x - useroffset.0) as u16);
                part_section.write_u16((part.dest_y - useroffset.1) as u16);
                part_section.write_u16(cel.width() as u16);
                part_section.write_u16(cel.height() as u16);
                part_index += 1;
            }
            frame_index += 1;
        }
    }

    // cel table first, then the character bitmaps it addresses
    let mut cel_section = ByteSink::new();
    cel_section.write_str("CEL");
    cel_section.write_u32(set.bank.len() as u32);
    let mut cel_bmp = ByteSink::new();
    for cel in set.bank.cels() {
        cel_section.write_u32(cel_bmp.len() as u32);
        cel_section.write_u16(cel.canvas.width() as u16);
        cel_section.write_u16(cel.canvas.height() as u16);
        agi::write_raw(&cel.canvas, pixel, &mut cel_bmp);
    }
    cel_section.append(&cel_bmp);

    let mut pal_section = ByteSink::new();
    pal_section.write_str("PAL");
    agi::write_palette(canvas, pixel, &mut pal_section)?;

    pattern_section.pad(16, PAD_FILL);
    frame_section.pad(16, PAD_FILL);
    part_section.pad(16, PAD_FILL);
    load_section.pad(16, PAD_FILL);
    pal_section.pad(16, PAD_FILL);
    cel_section.pad(16, PAD_FILL);

    let offset_pattern = HEADER_SIZE;
    let offset_frame = offset_pattern + pattern_section.len();
    let offset_part = offset_frame + frame_section.len();
    let offset_load = offset_part + part_section.len();
    let offset_pal = offset_load + load_section.len();
    let offset_cel = offset_pal + pal_section.len();

    let mut out = ByteSink::new();
    out.write_raw(MAGIC);
    out.write_u16(set.patterns.len() as u16);
    out.write_u16(frame_index as u16);
    out.write_u32(pixel.id());
    out.write_u32(set.bank.len() as u32);
    out.write_u32(offset_pattern as u32);
    out.write_u32(offset_frame as u32);
    out.write_u32(offset_part as u32);
    out.write_u32(offset_load as u32);
    out.write_u32(offset_pal as u32);
    out.write_u32(offset_cel as u32);
    out.pad(HEADER_SIZE, PAD_FILL);

    out.append(&pattern_section);
    out.append(&frame_section);
    out.append(&part_section);
    out.append(&load_section);
    out.append(&pal_section);
    out.append(&cel_section);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{CelBank, Pattern, PatternFrame, PatternPart};

    fn tiny_set() -> PatternSet {
        let mut bank = CelBank::new();
        let mut a = Canvas::new(8, 8).unwrap();
        a.dot_set(0, 0, crate::color::ColorSample::from_index(1));
        let b = Canvas::new(8, 8).unwrap();
        let id_a = bank.intern(a).unwrap();
        let id_b = bank.intern(b).unwrap();

        PatternSet {
            bank,
            patterns: vec![Pattern {
                name: "walk".into(),
                frames: vec![
                    PatternFrame {
                        duration_ticks: 4,
                        parts: vec![PatternPart { cel_id: id_a, dest_x: 3, dest_y: 5 }],
                        load_list: vec![id_a],
                    },
                    PatternFrame {
                        duration_ticks: 4,
                        parts: vec![
                            PatternPart { cel_id: id_a, dest_x: 0, dest_y: 0 },
                            PatternPart { cel_id: id_b, dest_x: 8, dest_y: 0 },
                        ],
                        load_list: vec![id_b],
                    },
                ],
                load_list: vec![id_a, id_b],
            }],
        }
    }

    #[test]
    fn test_header_counts() {
        let base = Canvas::new(8, 8).unwrap();
        let sink = encode(&base, APixel::I8, &tiny_set(), (0, 0)).unwrap();
        let bytes = sink.as_bytes();
        assert_eq!(&bytes[0..4], MAGIC);
        let patterns = u16::from_le_bytes(bytes[4..6].try_into().unwrap());
        let frames = u16::from_le_bytes(bytes[6..8].try_into().unwrap());
        let cels = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
        assert_eq!((patterns, frames, cels), (1, 2, 2));
    }

    #[test]
    fn test_part_records_fold_user_offset() {
        let base = Canvas::new(8, 8).unwrap();
        let sink = encode(&base, APixel::I8, &tiny_set(), (2, 1)).unwrap();
        let bytes = sink.as_bytes();
        let offset_part = u32::from_le_bytes(bytes[24..28].try_into().unwrap()) as usize;
        assert_eq!(&bytes[offset_part..offset_part + 3], b"PRT");
        let rec = offset_part + 3;
        let dest_x = u16::from_le_bytes(bytes[rec + 2..rec + 4].try_into().unwrap());
        let dest_y = u16::from_le_bytes(bytes[rec + 4..rec + 6].try_into().unwrap());
        assert_eq!((dest_x, dest_y), (1, 4));
    }

    #[test]
    fn test_cel_table_offsets_advance_by_bitmap_size() {
        let base = Canvas::new(8, 8).unwrap();
        let sink = encode(&base, APixel::I8, &tiny_set(), (0, 0)).unwrap();
        let bytes = sink.as_bytes();
        let offset_cel = u32::from_le_bytes(bytes[36..40].try_into().unwrap()) as usize;
        assert_eq!(&bytes[offset_cel..offset_cel + 3], b"CEL");
        let entry = |i: usize| {
            let at = offset_cel + 7 + i * 8;
            u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
        };
        assert_eq!(entry(0), 0);
        assert_eq!(entry(1), 64);
    }
}
