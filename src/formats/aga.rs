//! AGA object-animation container
//!
//! Frames come from a rectangle-list sheet document. Each frame's pixels
//! are covered by hardware objects from the packer catalogue; object tiles
//! are appended to a shared character bitmap and addressed by 32-byte
//! character number.
//!
//! The object table is written four times per frame, once per flip
//! orientation, with mirrored positions and the orientation folded into
//! the attribute word. A player picks the copy matching its draw state
//! instead of flipping at runtime.
//!
//! Little endian, never compressed, sections padded to 16 with fill 0xAA,
//! header padded to 48.

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::meta::SheetDoc;
use crate::packer;
use crate::sink::ByteSink;
use crate::timeline::{Timeline, Warning};

use super::agi::{self, PAD_FILL};
use super::APixel;

pub const MAGIC: &[u8; 4] = b"AGA\0";
const HEADER_SIZE: usize = 48;

/// Object record as stored per orientation copy.
#[derive(Clone, Copy)]
struct ObjectRecord {
    pos_x: i16,
    pos_y: i16,
    attr: u16,
    charnum: u16,
    size_xy: u16,
}

impl ObjectRecord {
    fn write(self, out: &mut ByteSink) {
        out.write_u16(self.pos_x as u16);
        out.write_u16(self.pos_y as u16);
        out.write_u16(self.attr);
        out.write_u16(self.charnum);
        out.write_u16(self.size_xy);
    }
}

/// Encode `canvas` plus a sheet document as an AGA container.
pub fn encode(
    canvas: &Canvas,
    pixel: APixel,
    doc: &SheetDoc,
    useroffset: (i32, i32),
    leniency: usize,
) -> Result<(ByteSink, Vec<Warning>)> {
    let (timeline, warnings) = Timeline::from_sheet(canvas, doc)?;

    let mut frame_section = ByteSink::new();
    let mut object_section = ByteSink::new();
    let mut bmp_section = ByteSink::new();

    let attr_bpp: u16 = if pixel.bpp() == 8 { 1 } else { 0 };
    let mut object_index = 0u32;

    for frame in &timeline.frames {
        let frame_bmp_offset = bmp_section.len() as u32;
        let mut frame_bmp_size = 0u32;
        let mut records: Vec<ObjectRecord> = Vec::new();

        for sub in &frame.subframes {
            let pic = &sub.canvas;
            if pic.width() % packer::TILE != 0 || pic.height() % packer::TILE != 0 {
                return Err(Error::Validation(format!(
                    "frame size {}x{} is not a multiple of 8",
                    pic.width(),
                    pic.height()
                )));
            }
            if pic.all_equals(Default::default()) {
                continue;
            }

            for obj in packer::pack(pic, leniency)? {
                let charnum = (bmp_section.len() / 32) as u16;

                for ty in 0..obj.tiles_h {
                    for tx in 0..obj.tiles_w {
                        let tile = pic.rect_get(
                            (obj.tile_x + tx) * packer::TILE,
                            (obj.tile_y + ty) * packer::TILE,
                            packer::TILE,
                            packer::TILE,
                        )?;
                        let mut bmp = ByteSink::new();
                        agi::write_raw(&tile, pixel, &mut bmp);
                        frame_bmp_size += bmp.len() as u32;
                        bmp_section.append(&bmp);
                    }
                }

                let attr = (obj.shape.id() << 6) | (attr_bpp << 5) | (obj.size_class << 14);
                records.push(ObjectRecord {
                    pos_x: ((obj.tile_x * packer::TILE) as i32 - useroffset.0) as i16,
                    pos_y: ((obj.tile_y * packer::TILE) as i32 - useroffset.1) as i16,
                    attr,
                    charnum,
                    size_xy: ((obj.tiles_w * packer::TILE) as u16)
                        | (((obj.tiles_h * packer::TILE) as u16) << 8),
                });
            }
        }

        // one object-table copy per flip orientation
        let mut object_offsets = [0u32; 4];
        for (orientation, slot) in object_offsets.iter_mut().enumerate() {
            *slot = object_index;
            let flip_h = orientation & 1 != 0;
            let flip_v = orientation & 2 != 0;
            for rec in &records {
                let mut entry = *rec;
                let size_x = (entry.size_xy & 0xFF) as i16;
                let size_y = (entry.size_xy >> 8) as i16;
                if flip_h {
                    entry.pos_x = canvas.width() as i16 - 1 - entry.pos_x - size_x;
                }
                if flip_v {
                    entry.pos_y = canvas.height() as i16 - 1 - entry.pos_y - size_y;
                }
                entry.attr |= (orientation as u16) << 12;
                entry.write(&mut object_section);
                object_index += 1;
            }
        }

        frame_section.write_u32(frame_bmp_size);
        frame_section.write_u32(frame_bmp_offset);
        frame_section.write_u32(frame.duration_ticks);
        frame_section.write_u32(records.len() as u32);
        for offset in object_offsets {
            frame_section.write_u32(offset);
        }
    }

    let mut pal_section = ByteSink::new();
    agi::write_palette(canvas, pixel, &mut pal_section)?;

    frame_section.pad(16, PAD_FILL);
    object_section.pad(16, PAD_FILL);
    pal_section.pad(16, PAD_FILL);
    bmp_section.pad(16, PAD_FILL);

    let offset_frame = HEADER_SIZE;
    let offset_object = offset_frame + frame_section.len();
    let offset_pal = offset_object + object_section.len();
    let offset_bmp = offset_pal + pal_section.len();

    let mut out = ByteSink::new();
    out.write_raw(MAGIC);
    out.write_u16(canvas.width() as u16);
    out.write_u16(canvas.height() as u16);
    out.write_u32(pixel.id());
    out.write_u32(pal_section.len() as u32);
    out.write_u32(timeline.frames.len() as u32);
    out.write_u32(bmp_section.len() as u32);
    out.write_u32(offset_frame as u32);
    out.write_u32(offset_object as u32);
    out.write_u32(offset_pal as u32);
    out.write_u32(offset_bmp as u32);
    out.pad(HEADER_SIZE, PAD_FILL);

    out.append(&frame_section);
    out.append(&object_section);
    out.append(&pal_section);
    out.append(&bmp_section);
    Ok((out, warnings))
}
