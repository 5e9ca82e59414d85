//! Container format encoders
//!
//! Twelve containers across five format families. Every encoder follows the
//! same skeleton: build each named section in its own `ByteSink`, compress
//! where the format allows it, pad to the family boundary, resolve section
//! offsets into the fixed header, and concatenate.
//!
//! Family conventions:
//!
//! | family | magics | integers | section padding |
//! |--------|--------|----------|-----------------|
//! | M | MGI | little endian | none |
//! | P | PGI PGA | little endian | none |
//! | N | NGA NGI NGM | big endian | 0x20 / 0x800 |
//! | A | AGA AGE AGI AGM | little endian | 16 / 48, fill 0xAA |
//! | H | HGI HGM | little endian | 16 |

pub mod aga;
pub mod age;
pub mod agi;
pub mod agm;
pub mod hgi;
pub mod hgm;
pub mod mgi;
pub mod nga;
pub mod ngi;
pub mod ngm;
pub mod pga;
pub mod pgi;

use crate::error::{Error, Result};

/// Pixel formats of the M family (twiddled texture hardware).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MPixel {
    I4,
    I8,
    Rgb565,
    Rgb5a1,
    Argb4444,
}

impl MPixel {
    pub fn bpp(self) -> u32 {
        match self {
            MPixel::I4 => 4,
            MPixel::I8 => 8,
            MPixel::Rgb565 | MPixel::Rgb5a1 | MPixel::Argb4444 => 16,
        }
    }

    pub fn id(self) -> u32 {
        match self {
            MPixel::I4 => 0,
            MPixel::I8 => 1,
            MPixel::Rgb565 => 2,
            MPixel::Rgb5a1 => 3,
            MPixel::Argb4444 => 4,
        }
    }
}

impl std::str::FromStr for MPixel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "i4" => Ok(MPixel::I4),
            "i8" => Ok(MPixel::I8),
            "rgb565" => Ok(MPixel::Rgb565),
            "rgb5a1" => Ok(MPixel::Rgb5a1),
            "argb4444" => Ok(MPixel::Argb4444),
            _ => Err(unknown_pixel(s, "i4, i8, rgb565, rgb5a1, argb4444")),
        }
    }
}

/// Pixel formats of the P family (portable texture hardware).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PPixel {
    I4,
    I8,
    Rgb565,
    Rgb5a1,
    Argb4,
    Argb8,
}

impl PPixel {
    pub fn bpp(self) -> u32 {
        match self {
            PPixel::I4 => 4,
            PPixel::I8 => 8,
            PPixel::Rgb565 | PPixel::Rgb5a1 | PPixel::Argb4 => 16,
            PPixel::Argb8 => 32,
        }
    }

    pub fn id(self) -> u32 {
        match self {
            PPixel::I4 => 0,
            PPixel::I8 => 1,
            PPixel::Rgb565 => 2,
            PPixel::Rgb5a1 => 3,
            PPixel::Argb4 => 4,
            PPixel::Argb8 => 5,
        }
    }
}

impl std::str::FromStr for PPixel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "i4" => Ok(PPixel::I4),
            "i8" => Ok(PPixel::I8),
            "rgb565" => Ok(PPixel::Rgb565),
            "rgb5a1" => Ok(PPixel::Rgb5a1),
            "argb4" => Ok(PPixel::Argb4),
            "argb8" => Ok(PPixel::Argb8),
            _ => Err(unknown_pixel(s, "i4, i8, rgb565, rgb5a1, argb4, argb8")),
        }
    }
}

/// Pixel formats of the N family (planar console hardware).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NPixel {
    I4,
    I8,
    Rgb,
}

impl NPixel {
    pub fn bpp(self) -> u32 {
        match self {
            NPixel::I4 => 4,
            NPixel::I8 => 8,
            NPixel::Rgb => 16,
        }
    }

    pub fn id(self) -> u32 {
        match self {
            NPixel::I4 => 0,
            NPixel::I8 => 1,
            NPixel::Rgb => 2,
        }
    }
}

impl std::str::FromStr for NPixel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "i4" => Ok(NPixel::I4),
            "i8" => Ok(NPixel::I8),
            "rgb" => Ok(NPixel::Rgb),
            _ => Err(unknown_pixel(s, "i4, i8, rgb")),
        }
    }
}

/// Pixel formats of the A family (object console hardware).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum APixel {
    I4,
    I8,
    Rgb,
}

impl APixel {
    pub fn bpp(self) -> u32 {
        match self {
            APixel::I4 => 4,
            APixel::I8 => 8,
            APixel::Rgb => 16,
        }
    }

    pub fn id(self) -> u32 {
        match self {
            APixel::I4 => 0,
            APixel::I8 => 1,
            APixel::Rgb => 2,
        }
    }
}

impl std::str::FromStr for APixel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "i4" => Ok(APixel::I4),
            "i8" => Ok(APixel::I8),
            "rgb" => Ok(APixel::Rgb),
            _ => Err(unknown_pixel(s, "i4, i8, rgb")),
        }
    }
}

/// Pixel formats of the H family (monochrome handheld hardware).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HPixel {
    I2,
}

impl HPixel {
    pub fn bpp(self) -> u32 {
        2
    }

    pub fn id(self) -> u32 {
        0
    }
}

impl std::str::FromStr for HPixel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "i2" => Ok(HPixel::I2),
            _ => Err(unknown_pixel(s, "i2")),
        }
    }
}

fn unknown_pixel(s: &str, valid: &str) -> Error {
    Error::Validation(format!(
        "unknown pixel format '{}' (valid: {})",
        s, valid
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_format_parsing() {
        assert_eq!("rgb565".parse::<MPixel>().unwrap(), MPixel::Rgb565);
        assert_eq!("argb8".parse::<PPixel>().unwrap(), PPixel::Argb8);
        assert_eq!("rgb".parse::<NPixel>().unwrap(), NPixel::Rgb);
        assert_eq!("i2".parse::<HPixel>().unwrap(), HPixel::I2);
        assert!("argb8".parse::<MPixel>().is_err());
    }

    #[test]
    fn test_bpp_values() {
        assert_eq!(MPixel::I4.bpp(), 4);
        assert_eq!(PPixel::Argb8.bpp(), 32);
        assert_eq!(NPixel::Rgb.bpp(), 16);
        assert_eq!(APixel::I8.bpp(), 8);
        assert_eq!(HPixel::I2.bpp(), 2);
    }
}
