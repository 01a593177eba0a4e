//! Reversal of the per-scanline prediction filters (filter method 0).
//!
//! Each stored scanline is one filter type byte followed by the filtered
//! bytes of the line. Reconstruction walks the lines in order, undoing the
//! filter with wrapping byte arithmetic, because every filter is defined
//! relative to *reconstructed* bytes of the current and previous line.

use super::*;

use alloc::vec;
use alloc::vec::Vec;

const TYPE_NONE: u8 = 0;
const TYPE_SUB: u8 = 1;
const TYPE_UP: u8 = 2;
const TYPE_AVERAGE: u8 = 3;
const TYPE_PAETH: u8 = 4;

/// The byte distance between a byte and the corresponding byte of the pixel
/// to its left.
///
/// Filters predict from whole pixels when pixels are at least one byte each,
/// and from the previous byte when several pixels share a byte.
#[inline]
#[must_use]
pub(crate) const fn filter_offset(bit_depth: u8, color_type: ColorType) -> usize {
  if bit_depth < 8 {
    1
  } else {
    (bit_depth as usize / 8) * color_type.component_count()
  }
}

const fn paeth_predict(a: u8, b: u8, c: u8) -> u8 {
  let a_ = a as i32;
  let b_ = b as i32;
  let c_ = c as i32;
  let p: i32 = a_ + b_ - c_;
  let pa = (p - a_).abs();
  let pb = (p - b_).abs();
  let pc = (p - c_).abs();
  // The PNG spec is emphatic that the order of these comparisons must not
  // change; it is what breaks ties as a, then b, then c.
  if pa <= pb && pa <= pc {
    a
  } else if pb <= pc {
    b
  } else {
    c
  }
}

/// Reverses the scanline filters over `lines` scanlines of `bytes_per_line`
/// bytes each, reading filtered data from `filt` starting at `offset`.
///
/// Returns the reconstructed bytes with the filter type bytes stripped, so
/// the output is exactly `lines * bytes_per_line` long. Interlaced images
/// call this once per reduced image, advancing `offset` past each pass.
///
/// ## Failure
/// * [`DataError::InvalidFilterType`] on an unknown filter type byte.
/// * [`DataError::TruncatedImageData`] when `filt` runs out before the
///   declared geometry is satisfied.
pub(crate) fn reconstruct(
  bit_depth: u8, color_type: ColorType, filt: &[u8], offset: usize, lines: usize,
  bytes_per_line: usize,
) -> Result<Vec<u8>, PngError> {
  let needed = lines * (bytes_per_line + 1);
  let filt = match filt.get(offset..offset + needed) {
    Some(f) => f,
    None => return Err(DataError::TruncatedImageData.into()),
  };
  let fo = filter_offset(bit_depth, color_type);
  let mut recon: Vec<u8> = vec![0; lines * bytes_per_line];

  for line in 0..lines {
    let filt_line = &filt[line * (bytes_per_line + 1)..][..bytes_per_line + 1];
    let (filter_type, filt_line) = (filt_line[0], &filt_line[1..]);
    let k = line * bytes_per_line;
    match filter_type {
      TYPE_NONE => {
        recon[k..k + bytes_per_line].copy_from_slice(filt_line);
      }
      TYPE_SUB => {
        for x in 0..bytes_per_line {
          let a = if x >= fo { recon[k + x - fo] } else { 0 };
          recon[k + x] = filt_line[x].wrapping_add(a);
        }
      }
      TYPE_UP => {
        if line == 0 {
          recon[k..k + bytes_per_line].copy_from_slice(filt_line);
        } else {
          for x in 0..bytes_per_line {
            let b = recon[k + x - bytes_per_line];
            recon[k + x] = filt_line[x].wrapping_add(b);
          }
        }
      }
      TYPE_AVERAGE => {
        for x in 0..bytes_per_line {
          let a = if x >= fo { recon[k + x - fo] as u32 } else { 0 };
          let b = if line > 0 { recon[k + x - bytes_per_line] as u32 } else { 0 };
          recon[k + x] = filt_line[x].wrapping_add(((a + b) / 2) as u8);
        }
      }
      TYPE_PAETH => {
        for x in 0..bytes_per_line {
          let (a, c) = if x >= fo {
            let a = recon[k + x - fo];
            let c = if line > 0 { recon[k + x - bytes_per_line - fo] } else { 0 };
            (a, c)
          } else {
            (0, 0)
          };
          let b = if line > 0 { recon[k + x - bytes_per_line] } else { 0 };
          recon[k + x] = filt_line[x].wrapping_add(paeth_predict(a, b, c));
        }
      }
      other => return Err(DataError::InvalidFilterType(other).into()),
    }
  }
  Ok(recon)
}
