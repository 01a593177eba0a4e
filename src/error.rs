//! Error types for the decoder.
//!
//! Errors come in three non-overlapping kinds:
//!
//! * [`FormatError`]: the chunk stream is structurally wrong (missing or
//!   misplaced chunks). The data may be a perfectly fine sequence of bytes,
//!   but it isn't a PNG.
//! * [`DataError`]: a chunk is present where it should be, but its content
//!   is invalid (bad field values, failed CRC, unknown critical type).
//! * Truncation and decompression failures, reported directly on
//!   [`PngError`], which propagate unchanged from the input slice and the
//!   zlib collaborator.
//!
//! No error is recovered locally; a decode either completes or fails as a
//! whole and the caller discards the partial state.

use crate::png::ChunkType;

/// Any error from decoding PNG data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngError {
  /// The chunk stream violates the PNG ordering or presence rules.
  Format(FormatError),

  /// A chunk carries invalid content.
  Data(DataError),

  /// The input ended before a full chunk could be read.
  UnexpectedEnd,

  /// The concatenated image data is not a valid zlib stream.
  Decompression,
}
impl From<FormatError> for PngError {
  #[inline]
  fn from(e: FormatError) -> Self {
    Self::Format(e)
  }
}
impl From<DataError> for PngError {
  #[inline]
  fn from(e: DataError) -> Self {
    Self::Data(e)
  }
}

/// A structural violation of the PNG chunk grammar.
///
/// These are always fatal to the decode and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
  /// The first eight bytes are not the PNG signature.
  MissingSignature,
  /// The first chunk is not `IHDR`.
  MissingIhdr,
  /// The color type requires a palette but no `PLTE` chunk was seen.
  MissingPlte,
  /// No `IDAT` chunk was seen before the image ended.
  MissingIdat,
  /// More than one `PLTE` chunk.
  DuplicatePlte,
  /// An `IDAT` chunk appeared after the image data sequence was already
  /// interrupted by another chunk.
  IdatNotConsecutive,
  /// The named chunk must precede the first `IDAT` chunk.
  ChunkAfterIdat(ChunkType),
  /// The named chunk must precede the `PLTE` chunk.
  ChunkAfterPlte(ChunkType),
  /// The `PLTE` chunk must precede the named chunk, which was already seen.
  PlteAfterChunk(ChunkType),
  /// The named chunk requires a preceding `PLTE` chunk.
  ChunkBeforePlte(ChunkType),
  /// The `IEND` chunk must have an empty data field.
  InvalidIend,
}

/// A chunk whose content is invalid.
///
/// Always fatal, like [`FormatError`]; the distinction is that the stream
/// structure was fine and the bytes inside a chunk were not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataError {
  /// A chunk type code with a byte outside `A-Z`/`a-z`.
  InvalidChunkType([u8; 4]),
  /// The stored CRC-32 of the named chunk does not match the computed one.
  CrcMismatch(ChunkType),
  /// The `IHDR` chunk is not exactly 13 bytes.
  InvalidIhdrLength(usize),
  /// Width field is zero or exceeds the signed 32-bit range.
  InvalidWidth(u32),
  /// Height field is zero or exceeds the signed 32-bit range.
  InvalidHeight(u32),
  /// Bit depth is not one of 1, 2, 4, 8, 16.
  InvalidBitDepth(u8),
  /// Color type is not one of 0, 2, 3, 4, 6.
  InvalidColorType(u8),
  /// The bit depth is not legal for the color type.
  IllegalBitDepthForColorType(u8),
  /// Compression method other than 0 (deflate).
  InvalidCompressionMethod(u8),
  /// Filter method other than 0.
  InvalidFilterMethod(u8),
  /// Interlace method other than 0 (null) or 1 (Adam7).
  InvalidInterlaceMethod(u8),
  /// A critical chunk type this decoder does not know.
  UnknownCriticalChunk(ChunkType),
  /// The color type does not permit a `PLTE` chunk.
  PaletteNotAllowed,
  /// `PLTE` data length is not a multiple of 3.
  InvalidPaletteLength(usize),
  /// More palette entries than the bit depth can index.
  PaletteTooLarge(usize),
  /// The color type already carries alpha and cannot have a `tRNS` chunk.
  TransparencyNotAllowed,
  /// `tRNS` data has the wrong length for the color type, or more entries
  /// than the palette.
  InvalidTransparencyLength(usize),
  /// `bKGD` data has the wrong length for the color type.
  InvalidBackgroundLength(usize),
  /// `bKGD` palette index beyond the palette.
  InvalidBackgroundIndex(u8),
  /// A scanline starts with an unknown filter type byte.
  InvalidFilterType(u8),
  /// The decompressed image data is shorter than the image geometry
  /// requires.
  TruncatedImageData,
}
