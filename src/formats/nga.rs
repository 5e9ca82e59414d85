//! NGA animated sprite container
//!
//! Big-endian, sections padded to 0x20. Frames come from a rectangle-list
//! sheet document. Each subframe's cel data is padded to 8 bytes so the
//! FR2 records can address it in 8-byte units.
//!
//! Section order: header, frame table ("FR1"), subframe table ("FR2"),
//! palette ("PAL"), cel data ("CEL").

use crate::canvas::Canvas;
use crate::error::Result;
use crate::meta::SheetDoc;
use crate::sink::ByteSink;
use crate::timeline::{Timeline, Warning};

use super::ngi;
use super::NPixel;

pub const MAGIC: &[u8; 3] = b"NGA";
const PAD_SIZE: usize = 0x20;

/// Encode `canvas` plus a sheet document as an NGA container. `useroffset`
/// is subtracted from every subframe's display position.
pub fn encode(
    canvas: &Canvas,
    pixel: NPixel,
    doc: &SheetDoc,
    useroffset: (i32, i32),
    do_compress: bool,
) -> Result<(ByteSink, Vec<Warning>)> {
    let (timeline, warnings) = Timeline::from_sheet(canvas, doc)?;

    let mut frame_section = ByteSink::new();
    let mut subframe_section = ByteSink::new();
    let mut pal_section = ByteSink::new();
    let mut bmp_section = ByteSink::new();
    frame_section.write_str("FR1");
    subframe_section.write_str("FR2");
    pal_section.write_str("PAL");

    let mut subframe_index = 0u32;

    for frame in &timeline.frames {
        frame_section.write_u16_be(frame.subframes.len() as u16);
        frame_section.write_u16_be(frame.duration_ticks as u16);
        frame_section.write_u32_be(subframe_index);

        for sub in &frame.subframes {
            let rounded_width = sub.canvas.width().div_ceil(8) * 8;
            let mut rounded = Canvas::new(rounded_width, sub.canvas.height())?;
            rounded.palette_copy_from(canvas);
            sub.canvas.rect_blit(&mut rounded, 0, 0, 0, 0, 0, 0)?;

            // cel offsets and sizes are stored in 8-byte units
            subframe_section.write_u32_be((bmp_section.len() / 8) as u32);

            let mut bmp = ByteSink::new();
            ngi::write_raw(&rounded, pixel, &mut bmp);
            bmp.pad(8, 0x00);
            bmp_section.append(&bmp);

            let palette_num = 0u32;
            subframe_section.write_u32_be((bmp.len() / 8) as u32);
            subframe_section.write_u32_be(palette_num);
            subframe_section.write_u16_be(pixel.id() as u16);
            subframe_section.write_u16_be(rounded_width as u16);
            subframe_section.write_u16_be(sub.canvas.width() as u16);
            subframe_section.write_u16_be(rounded.height() as u16);
            subframe_section.write_u16_be((sub.pos_x - useroffset.0) as u16);
            subframe_section.write_u16_be((sub.pos_y - useroffset.1) as u16);

            subframe_index += 1;
        }
    }

    ngi::write_palette_section(canvas, pixel, true, do_compress, &mut pal_section)?;

    let mut cel_section = ByteSink::new();
    ngi::write_cel_section(&bmp_section, do_compress, &mut cel_section)?;

    frame_section.pad(PAD_SIZE, 0x00);
    subframe_section.pad(PAD_SIZE, 0x00);
    cel_section.pad(PAD_SIZE, 0x00);
    pal_section.pad(PAD_SIZE, 0x00);

    let offset_frame = PAD_SIZE;
    let offset_subframe = offset_frame + frame_section.len();
    let offset_pal = offset_subframe + subframe_section.len();
    let offset_bmp = offset_pal + pal_section.len();

    let mut out = ByteSink::new();
    out.write_raw(MAGIC);
    out.write_u32_be(pixel.id());
    out.write_u16_be(timeline.frames.len() as u16);
    out.write_u16_be(subframe_index as u16);
    out.write_u32_be(offset_frame as u32);
    out.write_u32_be(offset_subframe as u32);
    out.write_u32_be(offset_pal as u32);
    out.write_u32_be(offset_bmp as u32);
    out.pad(PAD_SIZE, 0x00);

    out.append(&frame_section);
    out.append(&subframe_section);
    out.append(&pal_section);
    out.append(&cel_section);
    Ok((out, warnings))
}
