//! Turning reconstructed scanline bytes into output samples.
//!
//! [`PixelDecoder`] walks the samples of one image (the full image, or one
//! Adam7 reduced image) in scanline order and writes one output pixel per
//! call, at whatever destination index the caller computed. The decoder owns
//! the read cursor because sub-byte bit depths pack several pixels into a
//! byte, and a scanline that doesn't fill its last byte has to skip the
//! leftover bits before the next line starts.
//!
//! Transparency is resolved here as well. Color types with an alpha channel
//! are composited against the background color, and color types with a
//! `tRNS` chroma key have matching pixels replaced by it. Indexed pixels
//! just look up the palette, which [`PngInfo::create_image`] has already
//! composited.

use super::*;

use bitfrob::u8_replicate_bits;

/// Everything the pixel stage needs besides the samples themselves.
///
/// `background` holds raw `bKGD`-layout bytes (big-endian sample pairs) and
/// `transparency` raw `tRNS`-layout bytes, both already length-checked and
/// depth-masked by the chunk handling.
pub(crate) struct RasterConfig<'a> {
  pub(crate) bit_depth: u8,
  pub(crate) color_type: ColorType,
  pub(crate) channels: Channels,
  pub(crate) palette: &'a [RGB8],
  pub(crate) transparency: Option<&'a [u8]>,
  pub(crate) background: &'a [u8],
}

/// Composites a foreground sample over a background sample.
///
/// The blend weighs each side by its alpha fraction and truncates each term
/// to a byte before adding, so an alpha of 128 gives `fg / 2 + bg / 2`
/// rounded down per term. Fully opaque and fully transparent pixels skip the
/// float math entirely.
fn composite(fg: u8, bg: u8, alpha: u8) -> u8 {
  match alpha {
    u8::MAX => fg,
    0 => bg,
    _ => {
      let alpha_fg = f32::from(alpha) / 255.0;
      let alpha_bg = 1.0 - alpha_fg;
      (alpha_fg * f32::from(fg)) as u8 + (alpha_bg * f32::from(bg)) as u8
    }
  }
}

/// A sequential pixel reader over one image's reconstructed samples.
pub(crate) struct PixelDecoder<'a> {
  config: &'a RasterConfig<'a>,
  samples: &'a [u8],
  /// Pixels per scanline of the image being read.
  width: u32,
  /// Byte position of the read cursor in `samples`.
  i: usize,
  /// Bit position within the current byte, for sub-byte depths.
  bit_position: u8,
  /// Pixels read on the current scanline so far.
  line_pixels: u32,
}
impl<'a> PixelDecoder<'a> {
  pub(crate) fn new(config: &'a RasterConfig<'a>, samples: &'a [u8], width: u32) -> Self {
    Self { config, samples, width, i: 0, bit_position: 0, line_pixels: 0 }
  }

  /// Reads the next `depth` bits, high bits first. Only for depths 1, 2, 4.
  fn read_bits(&mut self, depth: u8) -> u8 {
    let shift = 8 - self.bit_position - depth;
    let value = (self.samples[self.i] >> shift) & ((1 << depth) - 1);
    self.bit_position += depth;
    if self.bit_position == 8 {
      self.bit_position = 0;
      self.i += 1;
    }
    value
  }

  /// Decodes the next pixel and writes its output samples to
  /// `dest[index..]`.
  ///
  /// The caller decides where each pixel lands (sequential for a
  /// non-interlaced image, scattered for Adam7) but must call in scanline
  /// order, since the read side is strictly sequential.
  pub(crate) fn write_next(&mut self, dest: &mut [u8], index: usize) {
    let c = self.config;
    match (c.color_type, c.bit_depth) {
      (ColorType::Grayscale, 16) => {
        let mut s = self.samples[self.i];
        if let Some(trns) = c.transparency {
          if self.samples[self.i..self.i + 2] == trns[..2] {
            s = c.background[0];
          }
        }
        dest[index] = s;
        self.i += 2;
      }
      (ColorType::Grayscale, 8) => {
        let mut s = self.samples[self.i];
        if let Some(trns) = c.transparency {
          if s == trns[1] {
            s = c.background[1];
          }
        }
        dest[index] = s;
        self.i += 1;
      }
      (ColorType::Grayscale, depth) => {
        let mask = (1 << depth) - 1;
        let mut b = self.read_bits(depth);
        if let Some(trns) = c.transparency {
          if b == trns[1] & mask {
            b = c.background[1] & mask;
          }
        }
        dest[index] = u8_replicate_bits(u32::from(depth), b);
      }
      (ColorType::Truecolor, 8) => {
        let [mut r, mut g, mut b] = [
          self.samples[self.i],
          self.samples[self.i + 1],
          self.samples[self.i + 2],
        ];
        if let Some(trns) = c.transparency {
          if r == trns[1] && g == trns[3] && b == trns[5] {
            [r, g, b] = [c.background[1], c.background[3], c.background[5]];
          }
        }
        dest[index] = r;
        dest[index + 1] = g;
        dest[index + 2] = b;
        self.i += 3;
      }
      (ColorType::Truecolor, _) => {
        let [mut r, mut g, mut b] = [
          self.samples[self.i],
          self.samples[self.i + 2],
          self.samples[self.i + 4],
        ];
        if let Some(trns) = c.transparency {
          if self.samples[self.i..self.i + 6] == trns[..6] {
            [r, g, b] = [c.background[0], c.background[2], c.background[4]];
          }
        }
        dest[index] = r;
        dest[index + 1] = g;
        dest[index + 2] = b;
        self.i += 6;
      }
      (ColorType::Indexed, 8) => {
        let entry_index = self.samples[self.i];
        self.i += 1;
        self.write_palette_entry(dest, index, entry_index);
      }
      (ColorType::Indexed, depth) => {
        let entry_index = self.read_bits(depth);
        self.write_palette_entry(dest, index, entry_index);
      }
      (ColorType::GrayscaleAlpha, 8) => {
        let s = self.samples[self.i];
        let alpha = self.samples[self.i + 1];
        dest[index] = composite(s, c.background[1], alpha);
        self.i += 2;
      }
      (ColorType::GrayscaleAlpha, _) => {
        let s = self.samples[self.i];
        let alpha = self.samples[self.i + 2];
        dest[index] = composite(s, c.background[0], alpha);
        self.i += 4;
      }
      (ColorType::TruecolorAlpha, 8) => {
        let alpha = self.samples[self.i + 3];
        dest[index] = composite(self.samples[self.i], c.background[1], alpha);
        dest[index + 1] = composite(self.samples[self.i + 1], c.background[3], alpha);
        dest[index + 2] = composite(self.samples[self.i + 2], c.background[5], alpha);
        self.i += 4;
      }
      (ColorType::TruecolorAlpha, _) => {
        let alpha = self.samples[self.i + 6];
        dest[index] = composite(self.samples[self.i], c.background[0], alpha);
        dest[index + 1] = composite(self.samples[self.i + 2], c.background[2], alpha);
        dest[index + 2] = composite(self.samples[self.i + 4], c.background[4], alpha);
        self.i += 8;
      }
    }
    self.line_pixels += 1;
    if self.line_pixels == self.width {
      // scanlines start on byte boundaries, skip any leftover bits
      self.line_pixels = 0;
      if self.bit_position != 0 {
        self.bit_position = 0;
        self.i += 1;
      }
    }
  }

  fn write_palette_entry(&self, dest: &mut [u8], index: usize, entry_index: u8) {
    let RGB8 { r, g, b } =
      self.config.palette.get(usize::from(entry_index)).copied().unwrap_or_default();
    dest[index] = r;
    dest[index + 1] = g;
    dest[index + 2] = b;
  }
}
