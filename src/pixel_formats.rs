//! The pixel formats used by the decoder.
//!
//! PNG palettes always store their entries as 8-bit RGB triples, so that is
//! the one structured pixel type the decoder needs. Output sample buffers
//! are plain byte slices (one byte per sample) and don't get their own
//! types.

use bytemuck::{Pod, Zeroable};

/// An 8-bit-per-channel RGB pixel, as stored in a PNG palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct RGB8 {
  /// Red channel.
  pub r: u8,
  /// Green channel.
  pub g: u8,
  /// Blue channel.
  pub b: u8,
}
