//! The decoded image buffer handed to callers.

use alloc::vec::Vec;

/// The channel layout of a [`DecodedImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channels {
  /// One sample per pixel.
  Grayscale,
  /// Three interleaved samples per pixel, in red, green, blue order.
  Rgb,
}
impl Channels {
  /// The number of samples per pixel.
  #[inline]
  #[must_use]
  pub const fn count(self) -> usize {
    match self {
      Self::Grayscale => 1,
      Self::Rgb => 3,
    }
  }
}

/// A fully decoded image.
///
/// Samples are stored one byte each, scanline by scanline from the top left,
/// with [`Channels::count`] samples per pixel and no padding between
/// scanlines. Transparency has already been composited against
/// [`background`](Self::background), so the buffer is fully opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
  /// Width in pixels.
  pub width: u32,
  /// Height in pixels.
  pub height: u32,
  /// Channel layout of `data`.
  pub channels: Channels,
  /// Effective bit depth of the samples in `data`. Always 8; sub-byte
  /// source samples are expanded by bit replication, 16-bit sources keep
  /// their high byte.
  pub bit_depth: u8,
  /// The background color every transparent sample was composited against.
  ///
  /// For RGB output this is a red, green, blue triple; for grayscale output
  /// a single sample. Stored at the effective bit depth.
  pub background: Vec<u8>,
  /// The sample buffer, `width * height * channels.count()` bytes.
  pub data: Vec<u8>,
}
impl DecodedImage {
  /// The samples of the scanline at `y`, top to bottom.
  #[inline]
  #[must_use]
  pub fn scanline(&self, y: u32) -> &[u8] {
    let line = (self.width as usize) * self.channels.count();
    &self.data[(y as usize) * line..][..line]
  }
}
