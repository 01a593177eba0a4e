use super::*;

/// The color types a PNG image can use.
///
/// The numeric value of each variant is a bit field: bit 0 means the samples
/// are palette indices, bit 1 means color is used, bit 2 means an alpha
/// channel is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ColorType {
  /// One grayscale sample per pixel.
  Grayscale = 0,
  /// Red, green, blue samples per pixel.
  Truecolor = 2,
  /// One palette index per pixel, resolved through the `PLTE` chunk.
  Indexed = 3,
  /// Grayscale plus alpha.
  GrayscaleAlpha = 4,
  /// Red, green, blue plus alpha.
  TruecolorAlpha = 6,
}
impl ColorType {
  /// Parses the `IHDR` color type field.
  #[inline]
  pub const fn from_u8(value: u8) -> Result<Self, DataError> {
    Ok(match value {
      0 => Self::Grayscale,
      2 => Self::Truecolor,
      3 => Self::Indexed,
      4 => Self::GrayscaleAlpha,
      6 => Self::TruecolorAlpha,
      _ => return Err(DataError::InvalidColorType(value)),
    })
  }

  /// The number of samples that make up one pixel in the datastream.
  #[inline]
  #[must_use]
  pub const fn component_count(self) -> usize {
    match self {
      Self::Grayscale | Self::Indexed => 1,
      Self::GrayscaleAlpha => 2,
      Self::Truecolor => 3,
      Self::TruecolorAlpha => 4,
    }
  }

  /// Pixels carry an alpha sample.
  #[inline]
  #[must_use]
  pub const fn uses_alpha(self) -> bool {
    (self as u8 & 4) != 0
  }

  /// Pixels are palette indices.
  #[inline]
  #[must_use]
  pub const fn uses_palette(self) -> bool {
    (self as u8 & 1) != 0
  }

  /// The image is a color image, and so a `PLTE` chunk is permitted.
  #[inline]
  #[must_use]
  pub const fn uses_truecolor(self) -> bool {
    (self as u8 & 2) != 0
  }

  /// Checks the bit depth against what this color type allows.
  ///
  /// Grayscale allows every depth, the sampled color types require 8 or 16
  /// bits, and indexed color caps out at 8 (a palette can't have more than
  /// 256 entries).
  #[inline]
  pub const fn check_bit_depth(self, bit_depth: u8) -> Result<(), DataError> {
    let ok = match self {
      Self::Grayscale => true,
      Self::Indexed => bit_depth != 16,
      Self::Truecolor | Self::GrayscaleAlpha | Self::TruecolorAlpha => {
        matches!(bit_depth, 8 | 16)
      }
    };
    if ok {
      Ok(())
    } else {
      Err(DataError::IllegalBitDepthForColorType(bit_depth))
    }
  }
}

/// Parses the `IHDR` bit depth field, which is legal or not independently of
/// the color type.
#[inline]
pub(crate) const fn check_raw_bit_depth(value: u8) -> Result<u8, DataError> {
  match value {
    1 | 2 | 4 | 8 | 16 => Ok(value),
    _ => Err(DataError::InvalidBitDepth(value)),
  }
}
