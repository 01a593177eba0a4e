//! Expansion of the stored pixel layout into the full raster.
//!
//! A non-interlaced image stores its scanlines top to bottom and expands in
//! a single pass. An Adam7 interlaced image stores up to seven reduced
//! images back to back, each a subsampling of the full image on a fixed 8x8
//! grid, and each filtered independently as if it were a small image of its
//! own. Expansion reconstructs each reduced image and scatters its pixels to
//! their full-image positions.

use super::*;

use alloc::{vec, vec::Vec};

/// The interlace methods named by the `IHDR` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Interlace {
  /// Scanlines are stored in image order, no interlacing.
  Null,
  /// Seven-pass Adam7 interlacing.
  Adam7,
}
impl Interlace {
  /// Parses the `IHDR` interlace method field.
  #[inline]
  pub const fn from_u8(value: u8) -> Result<Self, DataError> {
    match value {
      0 => Ok(Self::Null),
      1 => Ok(Self::Adam7),
      _ => Err(DataError::InvalidInterlaceMethod(value)),
    }
  }
}

/// Bytes per scanline for `width` pixels, rounding the last byte up when
/// sub-byte pixels don't fill it.
#[inline]
#[must_use]
pub(crate) const fn scanline_bytes(width: u32, color_type: ColorType, bit_depth: u8) -> usize {
  (width as usize * color_type.component_count() * bit_depth as usize + 7) / 8
}

/// One Adam7 pass: the starting offset and step of the pass's pixels within
/// the full image, horizontally and vertically.
struct Adam7Pass {
  x_first: u32,
  x_step: u32,
  y_first: u32,
  y_step: u32,
}
impl Adam7Pass {
  /// The dimensions of this pass's reduced image for a full image of
  /// `width` by `height`. Either dimension can be zero, in which case the
  /// pass stores no scanlines at all.
  const fn reduced_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
    (
      (width + self.x_step - 1 - self.x_first) / self.x_step,
      (height + self.y_step - 1 - self.y_first) / self.y_step,
    )
  }
}

/// The seven passes in stored order. Pass 1 covers every 8th pixel of every
/// 8th scanline, and each later pass fills in half of the remaining gap.
const ADAM7_PASSES: [Adam7Pass; 7] = [
  Adam7Pass { x_first: 0, x_step: 8, y_first: 0, y_step: 8 },
  Adam7Pass { x_first: 4, x_step: 8, y_first: 0, y_step: 8 },
  Adam7Pass { x_first: 0, x_step: 4, y_first: 4, y_step: 8 },
  Adam7Pass { x_first: 2, x_step: 4, y_first: 0, y_step: 4 },
  Adam7Pass { x_first: 0, x_step: 2, y_first: 2, y_step: 4 },
  Adam7Pass { x_first: 1, x_step: 2, y_first: 0, y_step: 2 },
  Adam7Pass { x_first: 0, x_step: 1, y_first: 1, y_step: 2 },
];

impl Interlace {
  /// The filtered byte count the declared geometry requires, or `None` when
  /// it doesn't fit in memory at all.
  fn filtered_len(self, config: &RasterConfig<'_>, width: u32, height: u32) -> Option<usize> {
    match self {
      Self::Null => {
        let bytes_per_line = scanline_bytes(width, config.color_type, config.bit_depth);
        (height as usize).checked_mul(bytes_per_line.checked_add(1)?)
      }
      Self::Adam7 => {
        let mut total: usize = 0;
        for pass in ADAM7_PASSES.iter() {
          let (reduced_w, reduced_h) = pass.reduced_dimensions(width, height);
          if reduced_w == 0 || reduced_h == 0 {
            continue;
          }
          let bytes_per_line = scanline_bytes(reduced_w, config.color_type, config.bit_depth);
          let pass_len = (reduced_h as usize).checked_mul(bytes_per_line.checked_add(1)?)?;
          total = total.checked_add(pass_len)?;
        }
        Some(total)
      }
    }
  }

  /// Reconstructs the filtered bytes in `filt` and decodes them into a full
  /// raster of `width * height * channels` output samples.
  ///
  /// The inflated data is checked against the declared geometry up front, so
  /// a stream claiming giant dimensions fails as truncated data instead of
  /// reaching the raster allocation.
  pub(crate) fn expand(
    self, config: &RasterConfig<'_>, width: u32, height: u32, filt: &[u8],
  ) -> Result<Vec<u8>, PngError> {
    let needed = match self.filtered_len(config, width, height) {
      Some(needed) => needed,
      None => return Err(DataError::TruncatedImageData.into()),
    };
    if filt.len() < needed {
      return Err(DataError::TruncatedImageData.into());
    }
    let per_pixel = config.channels.count();
    let mut dest: Vec<u8> = vec![0; width as usize * height as usize * per_pixel];
    match self {
      Self::Null => {
        let bytes_per_line = scanline_bytes(width, config.color_type, config.bit_depth);
        let recon =
          reconstruct(config.bit_depth, config.color_type, filt, 0, height as usize, bytes_per_line)?;
        let mut decoder = PixelDecoder::new(config, &recon, width);
        for p in 0..(width as usize * height as usize) {
          decoder.write_next(&mut dest, p * per_pixel);
        }
      }
      Self::Adam7 => {
        let mut offset = 0;
        for pass in ADAM7_PASSES.iter() {
          let (reduced_w, reduced_h) = pass.reduced_dimensions(width, height);
          if reduced_w == 0 || reduced_h == 0 {
            continue;
          }
          let bytes_per_line = scanline_bytes(reduced_w, config.color_type, config.bit_depth);
          let recon = reconstruct(
            config.bit_depth,
            config.color_type,
            filt,
            offset,
            reduced_h as usize,
            bytes_per_line,
          )?;
          offset += reduced_h as usize * (bytes_per_line + 1);
          let mut decoder = PixelDecoder::new(config, &recon, reduced_w);
          for y in 0..reduced_h {
            let full_y = pass.y_first + y * pass.y_step;
            for x in 0..reduced_w {
              let full_x = pass.x_first + x * pass.x_step;
              let index = (full_y as usize * width as usize + full_x as usize) * per_pixel;
              decoder.write_next(&mut dest, index);
            }
          }
        }
      }
    }
    Ok(dest)
  }
}
