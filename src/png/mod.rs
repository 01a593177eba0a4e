//! Decoding for the PNG image format.
//!
//! A PNG datastream is an 8-byte signature followed by a sequence of chunks.
//! Each chunk carries a length, a four-letter type code, a data field, and a
//! CRC-32 over the type and data. The critical chunks are `IHDR` (the image
//! header), `PLTE` (the palette, when one is used), `IDAT` (the zlib
//! compressed pixel data, possibly split across several chunks), and `IEND`
//! (end of stream). Ancillary chunks are optional, but those this decoder
//! recognizes still have ordering rules relative to the critical chunks.
//!
//! Decoding happens in three stages:
//!
//! * [`ChunkReader`] frames the byte stream into [`Chunk`] values and
//!   verifies each CRC.
//! * [`PngInfo`] consumes the chunks one at a time, enforcing the ordering
//!   rules and accumulating the header fields, palette, transparency,
//!   background, and compressed image data.
//! * [`PngInfo::create_image`] inflates the image data, reverses the
//!   scanline filters, expands interlacing, and decodes the pixels into a
//!   [`DecodedImage`].
//!
//! [`decode_png`] runs all three stages over a complete datastream.

use core::fmt::{Debug, Write};

use crate::{
  error::{DataError, FormatError, PngError},
  image::{Channels, DecodedImage},
  pixel_formats::RGB8,
};

mod chunk;
pub use chunk::*;

mod color_type;
pub use color_type::*;

mod crc32;
pub use crc32::*;

mod filter;
pub(crate) use filter::*;

mod interlace;
pub use interlace::*;

mod pixels;
pub(crate) use pixels::*;

mod info;
pub use info::*;

/// The signature bytes that open every PNG datastream.
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Decodes a complete PNG datastream into an image.
///
/// The stream must open with the PNG signature and an `IHDR` chunk, and end
/// with an empty `IEND` chunk. Chunks after `IEND` are not read.
///
/// ## Failure
/// Any framing, ordering, or data error from the stages described in the
/// [module docs](self) is passed along.
pub fn decode_png(bytes: &[u8]) -> Result<DecodedImage, PngError> {
  let mut reader = ChunkReader::new(bytes)?;
  let mut info = PngInfo::new(&reader.read_chunk()?)?;
  loop {
    let chunk = reader.read_chunk()?;
    if chunk.ty() == ChunkType::IEND {
      if !chunk.data().is_empty() {
        return Err(FormatError::InvalidIend.into());
      }
      break;
    }
    info.update(&chunk)?;
  }
  info.create_image()
}
