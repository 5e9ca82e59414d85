//! retropak - raster images to retro-console binary assets
//!
//! The pipeline is the same for every container: load the source image
//! into a [`canvas::Canvas`] (truecolor, or indexed with pen numbers in
//! the alpha channel), optionally build an animation timeline from a
//! metadata document, then hand everything to one of the twelve encoders
//! in [`formats`]. Encoders serialize through [`sink::ByteSink`] and
//! compress sections with [`codec`] where their format allows it.

pub mod canvas;
pub mod cli;
pub mod codec;
pub mod color;
pub mod error;
pub mod formats;
pub mod loader;
pub mod meta;
pub mod packer;
pub mod sink;
pub mod timeline;
pub mod twiddle;
