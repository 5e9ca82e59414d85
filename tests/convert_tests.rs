//! End-to-end conversion tests
//!
//! Each test drives the full pipeline through the CLI entry point: fixture
//! image on disk, optional metadata document, one encoder, then assertions
//! against the produced container bytes.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use retropak::cli::{convert, Cli};

fn parse_cli(dir: &Path, input: &str, extra: &[&str]) -> Cli {
    let mut args: Vec<String> = vec![
        "retropak".into(),
        "-i".into(),
        dir.join(input).display().to_string(),
        "-o".into(),
        dir.join("out.bin").display().to_string(),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    Cli::parse_from(args)
}

fn output_of(dir: &Path) -> Vec<u8> {
    fs::read(dir.join("out.bin")).unwrap()
}

/// Truecolor fixture: a w*h image with a horizontal gradient.
fn write_gradient_png(path: &Path, w: u32, h: u32) {
    let img = image::RgbaImage::from_fn(w, h, |x, _| {
        image::Rgba([(x * 8) as u8, 64, 128, 255])
    });
    img.save(path).unwrap();
}

/// Indexed fixture: pens taken from a callback, palette pen0 transparent.
fn write_indexed_png(path: &PathBuf, w: u32, h: u32, pen_at: impl Fn(u32, u32) -> u8) {
    let file = fs::File::create(path).unwrap();
    let mut encoder = png::Encoder::new(file, w, h);
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    let palette: Vec<u8> = (0..=255u16)
        .flat_map(|i| [i as u8, (i * 2) as u8, (i * 3) as u8])
        .collect();
    encoder.set_palette(palette);
    let mut writer = encoder.write_header().unwrap();
    let mut data = Vec::with_capacity((w * h) as usize);
    for y in 0..h {
        for x in 0..w {
            data.push(pen_at(x, y));
        }
    }
    writer.write_image_data(&data).unwrap();
}

#[test]
fn test_pgi_uncompressed_i8_bitmap_is_width_times_height() {
    let dir = tempfile::tempdir().unwrap();
    write_indexed_png(&dir.path().join("in.png"), 16, 16, |x, y| (x + y) as u8);

    let cli = parse_cli(
        dir.path(),
        "in.png",
        &["-f", "pgi", "-p", "i8", "--indexed", "--no-compress"],
    );
    convert(&cli).unwrap();

    let bytes = output_of(dir.path());
    assert_eq!(&bytes[0..4], b"PGI\0");
    // logical bitmap size sits after the stored size in the header
    let bmp_logical = u32::from_le_bytes(bytes[32..36].try_into().unwrap());
    assert_eq!(bmp_logical, 256);
}

#[test]
fn test_mgi_twiddled_header_flag_and_reordering() {
    let dir = tempfile::tempdir().unwrap();
    write_gradient_png(&dir.path().join("in.png"), 8, 8);

    let cli = parse_cli(
        dir.path(),
        "in.png",
        &["-f", "mgi", "-p", "rgb565", "--twiddled", "--no-compress"],
    );
    convert(&cli).unwrap();
    let twiddled = output_of(dir.path());

    let cli = parse_cli(
        dir.path(),
        "in.png",
        &["-f", "mgi", "-p", "rgb565", "--no-compress"],
    );
    convert(&cli).unwrap();
    let linear = output_of(dir.path());

    let format_word = |b: &[u8]| u32::from_le_bytes(b[12..16].try_into().unwrap());
    assert_eq!(format_word(&twiddled) & (1 << 8), 0);
    assert_ne!(format_word(&linear) & (1 << 8), 0);

    // same pixels, different storage order
    assert_eq!(twiddled.len(), linear.len());
    assert_ne!(twiddled, linear);
}

#[test]
fn test_pga_sheet_conversion_counts_frames() {
    let dir = tempfile::tempdir().unwrap();
    write_gradient_png(&dir.path().join("in.png"), 64, 32);
    fs::write(
        dir.path().join("sheet.json"),
        r#"{"frames":[
            {"frame":{"x":0,"y":0,"w":32,"h":32},"duration":100},
            {"frame":{"x":32,"y":0,"w":32,"h":32},"duration":50}
        ],"meta":{}}"#,
    )
    .unwrap();

    let cli = parse_cli(
        dir.path(),
        "in.png",
        &[
            "-f",
            "pga",
            "-p",
            "rgb565",
            "--meta",
            dir.path().join("sheet.json").to_str().unwrap(),
        ],
    );
    convert(&cli).unwrap();

    let bytes = output_of(dir.path());
    assert_eq!(&bytes[0..4], b"PGA\0");
    let num_frames = u32::from_le_bytes(bytes[16..20].try_into().unwrap());
    assert_eq!(num_frames, 2);
}

#[test]
fn test_sub_tick_duration_warns_and_clamps() {
    let dir = tempfile::tempdir().unwrap();
    write_indexed_png(&dir.path().join("in.png"), 16, 16, |_, _| 1);
    fs::write(
        dir.path().join("sheet.json"),
        r#"{"frames":[{"frame":{"x":0,"y":0,"w":16,"h":16},"duration":16}],"meta":{}}"#,
    )
    .unwrap();

    let cli = parse_cli(
        dir.path(),
        "in.png",
        &[
            "-f",
            "nga",
            "-p",
            "i8",
            "--indexed",
            "--meta",
            dir.path().join("sheet.json").to_str().unwrap(),
        ],
    );
    let warnings = convert(&cli).unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("1 tick"));

    // FR1 record: count, then the clamped tick duration
    let bytes = output_of(dir.path());
    let offset_frame = u32::from_be_bytes(bytes[11..15].try_into().unwrap()) as usize;
    let ticks =
        u16::from_be_bytes(bytes[offset_frame + 5..offset_frame + 7].try_into().unwrap());
    assert_eq!(ticks, 1);
}

#[test]
fn test_ngm_mirrored_tiles_reuse_cel_data() {
    let dir = tempfile::tempdir().unwrap();
    // left 8x8 tile with an asymmetric top row, right tile its mirror
    write_indexed_png(&dir.path().join("in.png"), 16, 8, |x, y| {
        if y != 0 {
            0
        } else if x < 8 {
            (x + 1) as u8
        } else {
            (16 - x) as u8
        }
    });

    let cli = parse_cli(
        dir.path(),
        "in.png",
        &["-f", "ngm", "-p", "i8", "--indexed", "--no-compress"],
    );
    convert(&cli).unwrap();

    let bytes = output_of(dir.path());
    assert_eq!(&bytes[0..3], b"NGM");
    let cel_count = u16::from_be_bytes(bytes[11..13].try_into().unwrap());
    assert_eq!(cel_count, 1);
}

#[test]
fn test_aga_object_animation_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_indexed_png(&dir.path().join("in.png"), 32, 16, |_, _| 3);
    fs::write(
        dir.path().join("sheet.json"),
        r#"{"frames":[{"frame":{"x":0,"y":0,"w":16,"h":16},"duration":100},
                     {"frame":{"x":16,"y":0,"w":16,"h":16},"duration":100}],
            "meta":{}}"#,
    )
    .unwrap();

    let cli = parse_cli(
        dir.path(),
        "in.png",
        &[
            "-f",
            "aga",
            "-p",
            "i8",
            "--indexed",
            "--meta",
            dir.path().join("sheet.json").to_str().unwrap(),
        ],
    );
    convert(&cli).unwrap();

    let bytes = output_of(dir.path());
    assert_eq!(&bytes[0..4], b"AGA\0");
    let frame_count = u32::from_le_bytes(bytes[16..20].try_into().unwrap());
    assert_eq!(frame_count, 2);
    // each solid 16x16 frame is one object, copied per orientation
    let offset_object = u32::from_le_bytes(bytes[28..32].try_into().unwrap()) as usize;
    let offset_pal = u32::from_le_bytes(bytes[32..36].try_into().unwrap()) as usize;
    assert_eq!((offset_pal - offset_object) % 16, 0);
    assert!(offset_pal - offset_object >= 2 * 4 * 10);
}

#[test]
fn test_age_pattern_document_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_indexed_png(&dir.path().join("in.png"), 8, 8, |_, _| 0);
    write_indexed_png(&dir.path().join("body.png"), 16, 8, |x, _| (x / 8 + 1) as u8);
    fs::write(
        dir.path().join("patterns.json"),
        r#"{"patterns":[{"name":"idle","frames":[
            {"delay":8,"parts":[
                {"image":"body.png","rect":[0,0,8,8],"dest":[0,0]},
                {"image":"body.png","rect":[8,0,8,8],"dest":[8,0]}
            ]},
            {"delay":8,"parts":[
                {"image":"body.png","rect":[0,0,8,8],"dest":[4,0]}
            ]}
        ]}]}"#,
    )
    .unwrap();

    let cli = parse_cli(
        dir.path(),
        "in.png",
        &[
            "-f",
            "age",
            "-p",
            "i8",
            "--indexed",
            "--meta",
            dir.path().join("patterns.json").to_str().unwrap(),
        ],
    );
    convert(&cli).unwrap();

    let bytes = output_of(dir.path());
    assert_eq!(&bytes[0..4], b"AGE\0");
    let patterns = u16::from_le_bytes(bytes[4..6].try_into().unwrap());
    let frames = u16::from_le_bytes(bytes[6..8].try_into().unwrap());
    // two distinct 8x8 crops across three part references
    let cels = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
    assert_eq!((patterns, frames, cels), (1, 2, 2));
}

#[test]
fn test_hgm_shares_repeated_characters() {
    let dir = tempfile::tempdir().unwrap();
    // 4 tiles: checkerboard, solid, checkerboard, solid
    write_indexed_png(&dir.path().join("in.png"), 32, 8, |x, y| {
        if (x / 8) % 2 == 0 {
            ((x + y) % 2) as u8
        } else {
            3
        }
    });

    let cli = parse_cli(
        dir.path(),
        "in.png",
        &["-f", "hgm", "-p", "i2", "--indexed"],
    );
    convert(&cli).unwrap();

    let bytes = output_of(dir.path());
    assert_eq!(&bytes[0..4], b"HGM\0");
    let cel_count = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
    assert_eq!(cel_count, 2);
}

#[test]
fn test_missing_sheet_key_is_reported_by_name() {
    let dir = tempfile::tempdir().unwrap();
    write_gradient_png(&dir.path().join("in.png"), 16, 16);
    fs::write(dir.path().join("sheet.json"), r#"{"frames":[]}"#).unwrap();

    let cli = parse_cli(
        dir.path(),
        "in.png",
        &[
            "-f",
            "pga",
            "-p",
            "rgb565",
            "--meta",
            dir.path().join("sheet.json").to_str().unwrap(),
        ],
    );
    let err = convert(&cli).unwrap_err();
    assert!(err.to_string().contains("'meta'"));
}
