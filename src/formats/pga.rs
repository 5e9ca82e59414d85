//! PGA animated sprite-sheet container
//!
//! Each timeline frame is rounded up to a 32x32 tile grid, its non-empty
//! tiles are repacked into a dense 16-tiles-per-row atlas, and horizontal
//! runs of adjacent tiles are merged into single tile records. Per-frame
//! atlas bitmaps are compressed individually.
//!
//! Section order: header, frame table, tile table ("TIL"), bitmap data
//! ("BMP"), palette ("PAL").

use crate::canvas::Canvas;
use crate::codec;
use crate::color::ColorSample;
use crate::error::Result;
use crate::meta::SheetDoc;
use crate::sink::ByteSink;
use crate::timeline::{Timeline, Warning};

use super::PPixel;

pub const MAGIC: &[u8; 4] = b"PGA\0";
const HEADER_SIZE: u32 = 40;

/// Atlas tile edge in pixels.
const TILE_SIZE: usize = 32;
/// Tiles per atlas row.
const LINE_SIZE: usize = 16;

struct WorkTile {
    tile: Canvas,
    sheet_x: usize,
    sheet_y: usize,
    disp_x: usize,
    disp_y: usize,
}

/// Encode `canvas` plus a sheet document as a PGA container.
pub fn encode(
    canvas: &Canvas,
    pixel: PPixel,
    doc: &SheetDoc,
    do_compress: bool,
) -> Result<(ByteSink, Vec<Warning>)> {
    let (timeline, warnings) = Timeline::from_sheet(canvas, doc)?;

    let mut frame_section = ByteSink::new();
    let mut tile_section = ByteSink::new();
    let mut bmp_section = ByteSink::new();
    let mut pal_section = ByteSink::new();
    tile_section.write_str("TIL");
    bmp_section.write_str("BMP");
    pal_section.write_str("PAL");

    for frame in &timeline.frames {
        let sub = &frame.subframes[0];
        let (w, h) = (sub.canvas.width(), sub.canvas.height());

        // round the frame up to whole atlas tiles
        let grid_w = w.div_ceil(TILE_SIZE) * TILE_SIZE;
        let grid_h = h.div_ceil(TILE_SIZE) * TILE_SIZE;
        let mut sheet = Canvas::new(grid_w, grid_h)?;
        sheet.palette_copy_from(canvas);
        sub.canvas.rect_blit(&mut sheet, 0, 0, 0, 0, w, h)?;

        let offset_tile = tile_section.len() as u32;
        let offset_bmp = bmp_section.len() as u32;

        // collect non-empty tiles, assigning dense atlas slots
        let mut work: Vec<WorkTile> = Vec::new();
        for iy in (0..grid_h).step_by(TILE_SIZE) {
            for ix in (0..grid_w).step_by(TILE_SIZE) {
                let tile = sheet.rect_get(ix, iy, TILE_SIZE, TILE_SIZE)?;
                if tile.all_equals(ColorSample::default()) {
                    continue;
                }
                let slot = work.len();
                work.push(WorkTile {
                    tile,
                    sheet_x: (slot % LINE_SIZE) * TILE_SIZE,
                    sheet_y: (slot / LINE_SIZE) * TILE_SIZE,
                    disp_x: ix,
                    disp_y: iy,
                });
            }
        }

        let atlas_w = TILE_SIZE * LINE_SIZE;
        let atlas_h = (TILE_SIZE * work.len().div_ceil(LINE_SIZE)).max(TILE_SIZE);
        let mut atlas = Canvas::new(atlas_w, atlas_h)?;
        atlas.palette_copy_from(canvas);

        // merge horizontal runs that are contiguous both in the atlas and on
        // screen into single tile records
        let mut num_records = 0u32;
        let mut i = 0;
        while i < work.len() {
            let start = &work[i];
            let (run_sheet_y, run_disp_y) = (start.sheet_y, start.disp_y);
            let (rec_disp_x, rec_disp_y) = (start.disp_x, start.disp_y);
            let (rec_sheet_x, rec_sheet_y) = (start.sheet_x, start.sheet_y);

            let mut run_len = 0;
            while i < work.len() {
                let wt = &work[i];
                if wt.sheet_y != run_sheet_y || wt.disp_y != run_disp_y {
                    break;
                }
                wt.tile
                    .rect_blit(&mut atlas, 0, 0, wt.sheet_x, wt.sheet_y, 0, 0)?;
                run_len += 1;
                i += 1;
            }

            tile_section.write_u16(rec_disp_x as u16);
            tile_section.write_u16(rec_disp_y as u16);
            tile_section.write_u16(rec_sheet_x as u16);
            tile_section.write_u16(rec_sheet_y as u16);
            tile_section.write_u16((TILE_SIZE * run_len) as u16);
            num_records += 1;
        }

        let mut raw = ByteSink::new();
        super::pgi::write_raw(&atlas, pixel, &mut raw)?;
        let stored = codec::compress(raw.as_bytes(), do_compress)?;

        frame_section.write_u16(atlas.width() as u16);
        frame_section.write_u16(atlas.height() as u16);
        frame_section.write_u32(num_records);
        frame_section.write_u32(stored.len() as u32);
        frame_section.write_u32(offset_tile);
        frame_section.write_u32(offset_bmp);
        frame_section.write_u32(frame.duration_ticks);
        frame_section.write_u32(frame.duration_ms);

        bmp_section.write_raw(&stored);
    }

    // palette: always compressed when present
    if pixel.bpp() <= 8 {
        let mut pal = ByteSink::new();
        super::pgi::write_palette(canvas, 8, &mut pal)?;
        let stored = codec::compress(pal.as_bytes(), true)?;
        pal_section.write_u32(1);
        pal_section.write_u32(stored.len() as u32);
        pal_section.write_raw(&stored);
    } else {
        pal_section.write_u32(0);
    }

    let offset_frame = HEADER_SIZE;
    let offset_tile = offset_frame + frame_section.len() as u32;
    let offset_bmp = offset_tile + tile_section.len() as u32;
    let offset_pal = offset_bmp + bmp_section.len() as u32;

    let mut out = ByteSink::new();
    out.write_raw(MAGIC);
    out.write_u16(canvas.width() as u16);
    out.write_u16(canvas.height() as u16);
    out.write_u32(pixel.id());
    out.write_u32(pal_section.len() as u32);
    out.write_u32(timeline.frames.len() as u32);
    out.write_u32(TILE_SIZE as u32);
    out.write_u32(offset_frame);
    out.write_u32(offset_tile);
    out.write_u32(offset_bmp);
    out.write_u32(offset_pal);

    out.append(&frame_section);
    out.append(&tile_section);
    out.append(&bmp_section);
    out.append(&pal_section);
    Ok((out, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{SheetFrame, SheetRect};

    fn doc_one_frame(x: u32, y: u32, w: u32, h: u32, ms: u32) -> SheetDoc {
        SheetDoc {
            frames: vec![SheetFrame {
                filename: None,
                frame: SheetRect { x, y, w, h },
                duration: ms,
            }],
        }
    }

    #[test]
    fn test_single_frame_header_counts() {
        let mut c = Canvas::new(64, 64).unwrap();
        c.clear(ColorSample::new(255, 8, 8, 8));
        let doc = doc_one_frame(0, 0, 64, 64, 100);
        let (sink, warnings) = encode(&c, PPixel::Rgb565, &doc, false).unwrap();
        assert!(warnings.is_empty());

        let bytes = sink.as_bytes();
        assert_eq!(&bytes[0..4], MAGIC);
        let num_frames = u32::from_le_bytes(bytes[16..20].try_into().unwrap());
        assert_eq!(num_frames, 1);
        let tile_size = u32::from_le_bytes(bytes[20..24].try_into().unwrap());
        assert_eq!(tile_size, 32);
    }

    #[test]
    fn test_empty_tiles_are_skipped() {
        // only the top-left 32x32 region carries pixels
        let mut c = Canvas::new(64, 64).unwrap();
        for y in 0..32 {
            for x in 0..32 {
                c.dot_set(x, y, ColorSample::new(255, 1, 2, 3));
            }
        }
        let doc = doc_one_frame(0, 0, 64, 64, 100);
        let (sink, _) = encode(&c, PPixel::Rgb565, &doc, false).unwrap();

        let bytes = sink.as_bytes();
        let offset_frame = u32::from_le_bytes(bytes[24..28].try_into().unwrap()) as usize;
        let num_records = u32::from_le_bytes(
            bytes[offset_frame + 4..offset_frame + 8].try_into().unwrap(),
        );
        assert_eq!(num_records, 1);
    }

    #[test]
    fn test_truecolor_palette_section_is_flagged_empty() {
        let c = Canvas::new(32, 32).unwrap();
        let doc = doc_one_frame(0, 0, 32, 32, 100);
        let (sink, _) = encode(&c, PPixel::Argb8, &doc, false).unwrap();
        let bytes = sink.as_bytes();
        let offset_pal = u32::from_le_bytes(bytes[36..40].try_into().unwrap()) as usize;
        assert_eq!(&bytes[offset_pal..offset_pal + 3], b"PAL");
        let flag = u32::from_le_bytes(bytes[offset_pal + 3..offset_pal + 7].try_into().unwrap());
        assert_eq!(flag, 0);
    }
}
