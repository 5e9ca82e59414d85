//! Pixel value type and per-format serializers
//!
//! A `ColorSample` is one ARGB pixel. Each serializer packs it into the wire
//! representation of one hardware pixel format and appends the result to a
//! `ByteSink`. Channel truncation (8-bit to 5-bit, etc.) is a plain right
//! shift with no rounding or dithering, so repeated conversions are stable.
//!
//! For indexed canvases the palette index is stored in the alpha channel and
//! the serializers that matter are `write_alpha` and the nibble packers in
//! the format modules.

use crate::sink::ByteSink;

/// Alpha cutoff used by `write_rgb5a1` when the caller does not supply one.
pub const DEFAULT_ALPHA_CUTOFF: u8 = 254;

/// One ARGB pixel, copied by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorSample {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorSample {
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// An index-carrying sample: the palette index lives in the alpha channel.
    pub const fn from_index(index: u8) -> Self {
        Self { a: index, r: 0, g: 0, b: 0 }
    }

    /// Pack to a 32-bit key. Used for equality and hashing.
    pub const fn rawdata(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// 1 byte: the alpha (or index) channel.
    pub fn write_alpha(self, out: &mut ByteSink) {
        out.write_u8(self.a);
    }

    /// LE u16, 5/6/5 bits: `b | g<<5 | r<<11`.
    pub fn write_rgb565(self, out: &mut ByteSink) {
        let r = (self.r as u16) >> 3;
        let g = (self.g as u16) >> 2;
        let b = (self.b as u16) >> 3;
        out.write_u16(b | g << 5 | r << 11);
    }

    /// LE u16 with a threshold-derived alpha bit:
    /// `b | g<<5 | r<<10 | a1<<15` where `a1 = alpha > cutoff`.
    pub fn write_rgb5a1(self, out: &mut ByteSink, cutoff: u8) {
        let r = (self.r as u16) >> 3;
        let g = (self.g as u16) >> 3;
        let b = (self.b as u16) >> 3;
        let a1 = if self.a > cutoff { 1u16 } else { 0 };
        out.write_u16(b | g << 5 | r << 10 | a1 << 15);
    }

    /// BE u16 with the top bit forced by the caller: `r | g<<5 | b<<10`.
    /// Used when the source has no real alpha channel.
    pub fn write_rgb5a1_sat(self, out: &mut ByteSink, msb: bool) {
        let r = (self.r as u16) >> 3;
        let g = (self.g as u16) >> 3;
        let b = (self.b as u16) >> 3;
        let mut n = r | g << 5 | b << 10;
        if msb {
            n |= 0x8000;
        }
        out.write_u16_be(n);
    }

    /// LE u16, no alpha bit: `r | g<<5 | b<<10`.
    pub fn write_rgb555_gba(self, out: &mut ByteSink) {
        let r = (self.r as u16) >> 3;
        let g = (self.g as u16) >> 3;
        let b = (self.b as u16) >> 3;
        out.write_u16(r | g << 5 | b << 10);
    }

    /// LE u16, one nibble per channel: `b | g<<4 | r<<8 | a<<12`.
    pub fn write_argb4(self, out: &mut ByteSink) {
        let r = (self.r as u16) >> 4;
        let g = (self.g as u16) >> 4;
        let b = (self.b as u16) >> 4;
        let a = (self.a as u16) >> 4;
        out.write_u16(b | g << 4 | r << 8 | a << 12);
    }

    /// 4 bytes in b,g,r,a order.
    pub fn write_argb8(self, out: &mut ByteSink) {
        out.write_u8(self.b);
        out.write_u8(self.g);
        out.write_u8(self.r);
        out.write_u8(self.a);
    }
}
