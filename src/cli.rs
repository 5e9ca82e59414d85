//! Command-line interface implementation

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::formats::{aga, age, agi, agm, hgi, hgm, mgi, nga, ngi, ngm, pga, pgi};
use crate::loader;
use crate::meta;
use crate::sink::ByteSink;
use crate::timeline::{PatternSet, Warning};

const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;

/// retropak - convert raster images into retro-console binary assets
#[derive(Parser)]
#[command(name = "retropak")]
#[command(about = "Convert raster images into retro-console binary assets")]
#[command(version)]
pub struct Cli {
    /// Source image (PNG or anything the image loader accepts)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output asset file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Container format: mgi, pgi, pga, nga, ngi, ngm, aga, age, agi,
    /// agm, hgi or hgm
    #[arg(short, long)]
    pub format: String,

    /// Pixel format within the container family
    #[arg(short, long, default_value = "i8")]
    pub pixel: String,

    /// Animation metadata document (pga/nga/aga: rectangle-list JSON;
    /// age: pattern JSON)
    #[arg(long)]
    pub meta: Option<PathBuf>,

    /// Offset subtracted from every stored placement (nga/aga/age)
    #[arg(long, num_args = 2, value_names = ["X", "Y"], default_values_t = [0, 0], allow_negative_numbers = true)]
    pub user_offset: Vec<i32>,

    /// Empty tiles a packed object may swallow (aga)
    #[arg(long, default_value_t = 0)]
    pub leniency: usize,

    /// 12-bit map indices: four times the character cap, no flip bits (ngm)
    #[arg(long)]
    pub wide_map: bool,

    /// Store the bitmap in twiddled (Morton) order (mgi)
    #[arg(long)]
    pub twiddled: bool,

    /// Cut the image into subimages of this size (ngi)
    #[arg(long, num_args = 2, value_names = ["W", "H"], default_values_t = [0, 0])]
    pub subimage: Vec<usize>,

    /// Skip zlib compression where the format would apply it
    #[arg(long)]
    pub no_compress: bool,

    /// Read the source as an indexed PNG, keeping its palette and pen
    /// numbers
    #[arg(long)]
    pub indexed: bool,

    /// Also dump the source palette as raw 256x3 RGB bytes
    #[arg(long)]
    pub export_palette: Option<PathBuf>,

    /// Print per-frame conversion details
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    match convert(&cli) {
        Ok(warnings) => {
            for w in &warnings {
                eprintln!("retropak: warning: {}", w.message);
            }
            EXIT_SUCCESS.into()
        }
        Err(e) => {
            eprintln!("retropak: error: {}", e);
            EXIT_ERROR.into()
        }
    }
}

/// Load, dispatch to the requested encoder, and write the result.
pub fn convert(cli: &Cli) -> Result<Vec<Warning>> {
    let canvas = loader::load(&cli.input, cli.indexed)?;

    if let Some(path) = &cli.export_palette {
        export_palette(&canvas, path)?;
    }

    let do_compress = !cli.no_compress;
    let user_offset = (cli.user_offset[0], cli.user_offset[1]);
    let mut warnings = Vec::new();

    let sink: ByteSink = match cli.format.as_str() {
        "mgi" => mgi::encode(&canvas, cli.pixel.parse()?, cli.twiddled, do_compress)?,
        "pgi" => pgi::encode(&canvas, cli.pixel.parse()?, do_compress)?,
        "pga" => {
            let doc = meta::load_sheet(&require_meta(cli)?)?;
            let (sink, w) = pga::encode(&canvas, cli.pixel.parse()?, &doc, do_compress)?;
            warnings = w;
            sink
        }
        "nga" => {
            let doc = meta::load_sheet(&require_meta(cli)?)?;
            let (sink, w) =
                nga::encode(&canvas, cli.pixel.parse()?, &doc, user_offset, do_compress)?;
            warnings = w;
            sink
        }
        "ngi" => ngi::encode(
            &canvas,
            cli.pixel.parse()?,
            cli.subimage[0],
            cli.subimage[1],
            do_compress,
        )?,
        "ngm" => ngm::encode(&canvas, cli.pixel.parse()?, cli.wide_map, do_compress)?,
        "aga" => {
            let doc = meta::load_sheet(&require_meta(cli)?)?;
            let (sink, w) = aga::encode(
                &canvas,
                cli.pixel.parse()?,
                &doc,
                user_offset,
                cli.leniency,
            )?;
            warnings = w;
            sink
        }
        "age" => {
            let meta_path = require_meta(cli)?;
            let doc = meta::load_patterns(&meta_path)?;
            let base_dir = meta_path.parent().unwrap_or(Path::new(".")).to_path_buf();
            let set = PatternSet::build(&doc, &base_dir, cli.indexed)?;
            age::encode(&canvas, cli.pixel.parse()?, &set, user_offset)?
        }
        "agi" => agi::encode(&canvas, cli.pixel.parse()?)?,
        "agm" => agm::encode(&canvas, cli.pixel.parse()?)?,
        "hgi" => hgi::encode(&canvas, cli.pixel.parse()?)?,
        "hgm" => hgm::encode(&canvas, cli.pixel.parse()?)?,
        other => {
            return Err(Error::Validation(format!(
                "unknown container format \"{}\" (expected one of mgi, pgi, \
                 pga, nga, ngi, ngm, aga, age, agi, agm, hgi, hgm)",
                other
            )))
        }
    };

    if cli.verbose {
        eprintln!(
            "retropak: {} -> {} ({} bytes)",
            cli.input.display(),
            cli.output.display(),
            sink.len()
        );
    }
    fs::write(&cli.output, sink.as_bytes())?;
    Ok(warnings)
}

fn require_meta(cli: &Cli) -> Result<PathBuf> {
    cli.meta.clone().ok_or_else(|| {
        Error::Validation(format!(
            "format \"{}\" requires an animation document (--meta)",
            cli.format
        ))
    })
}

/// Raw 256x3 RGB palette dump.
fn export_palette(canvas: &Canvas, path: &Path) -> Result<()> {
    let mut dump = Vec::with_capacity(256 * 3);
    for pen in 0..256 {
        let color = canvas.palette_get(pen)?;
        dump.extend_from_slice(&[color.r, color.g, color.b]);
    }
    fs::write(path, dump)?;
    Ok(())
}
