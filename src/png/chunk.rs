use super::*;

/// The four-byte type code of a PNG chunk.
///
/// All four bytes must be ASCII letters. Bit 5 of each byte is a property
/// flag rather than part of the name:
///
/// * byte 0: set for ancillary chunks, clear for critical ones.
/// * byte 1: set for private (non-registered) chunks.
/// * byte 3: reserved, must be clear.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl ChunkType {
  pub const IHDR: Self = Self(*b"IHDR");
  pub const PLTE: Self = Self(*b"PLTE");
  pub const IDAT: Self = Self(*b"IDAT");
  pub const IEND: Self = Self(*b"IEND");
  pub const tRNS: Self = Self(*b"tRNS");
  pub const bKGD: Self = Self(*b"bKGD");
  pub const hIST: Self = Self(*b"hIST");
  pub const sPLT: Self = Self(*b"sPLT");
  pub const eXIf: Self = Self(*b"eXIf");
  pub const cHRM: Self = Self(*b"cHRM");
  pub const gAMA: Self = Self(*b"gAMA");
  pub const iCCP: Self = Self(*b"iCCP");
  pub const sBIT: Self = Self(*b"sBIT");
  pub const sRGB: Self = Self(*b"sRGB");
  pub const cICP: Self = Self(*b"cICP");
  pub const mDCv: Self = Self(*b"mDCv");
  pub const cLLi: Self = Self(*b"cLLi");
  pub const tEXt: Self = Self(*b"tEXt");
  pub const zTXt: Self = Self(*b"zTXt");
  pub const iTXt: Self = Self(*b"iTXt");
  pub const pHYs: Self = Self(*b"pHYs");
  pub const tIME: Self = Self(*b"tIME");

  /// All four bytes are ASCII letters.
  #[inline]
  #[must_use]
  pub const fn is_valid(self) -> bool {
    let mut i = 0;
    while i < 4 {
      if !self.0[i].is_ascii_alphabetic() {
        return false;
      }
      i += 1;
    }
    true
  }

  /// Critical chunks must be understood for the image to decode at all.
  #[inline]
  #[must_use]
  pub const fn is_critical(self) -> bool {
    (self.0[0] & 0b10_0000) == 0
  }

  /// Private chunks carry application-specific data.
  #[inline]
  #[must_use]
  pub const fn is_private(self) -> bool {
    (self.0[1] & 0b10_0000) != 0
  }

  /// The reserved property bit, clear in all conforming chunks.
  #[inline]
  #[must_use]
  pub const fn is_reserved(self) -> bool {
    (self.0[3] & 0b10_0000) != 0
  }
}
impl Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char(self.0[0] as char)?;
    f.write_char(self.0[1] as char)?;
    f.write_char(self.0[2] as char)?;
    f.write_char(self.0[3] as char)?;
    Ok(())
  }
}

/// One framed chunk from a PNG datastream.
///
/// Created by [`ChunkReader::read_chunk`] with the CRC already verified, and
/// consumed once by [`PngInfo::update`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Chunk<'b> {
  pub(crate) ty: ChunkType,
  pub(crate) data: &'b [u8],
  pub(crate) crc: u32,
}
impl<'b> Chunk<'b> {
  /// The chunk's type code.
  #[inline]
  #[must_use]
  pub const fn ty(self) -> ChunkType {
    self.ty
  }

  /// The chunk's data field, without length, type, or CRC.
  #[inline]
  #[must_use]
  pub const fn data(self) -> &'b [u8] {
    self.data
  }
}
impl Debug for Chunk<'_> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Chunk")
      .field("ty", &self.ty)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("crc", &self.crc)
      .finish()
  }
}

/// Frames a raw PNG byte stream into successive [`Chunk`] values.
///
/// The reader validates as it goes: the stream must open with the PNG
/// signature, each type code must be four ASCII letters, and each chunk's
/// stored CRC-32 must match the checksum computed over its type and data.
/// The only side effect of a read is advancing the stream position.
#[derive(Debug, Clone)]
pub struct ChunkReader<'b> {
  spare: &'b [u8],
}
impl<'b> ChunkReader<'b> {
  /// Makes a reader over the full PNG bytes, validating the signature.
  pub const fn new(png: &'b [u8]) -> Result<Self, PngError> {
    match png {
      [137, 80, 78, 71, 13, 10, 26, 10, spare @ ..] => Ok(Self { spare }),
      _ => Err(PngError::Format(FormatError::MissingSignature)),
    }
  }

  fn take(&mut self, count: usize) -> Result<&'b [u8], PngError> {
    if self.spare.len() < count {
      Err(PngError::UnexpectedEnd)
    } else {
      let (taken, rest) = self.spare.split_at(count);
      self.spare = rest;
      Ok(taken)
    }
  }

  /// Reads the next chunk off the stream.
  ///
  /// ## Failure
  /// * [`PngError::UnexpectedEnd`] when the stream ends mid-chunk.
  /// * [`DataError::InvalidChunkType`] when the type code isn't four ASCII
  ///   letters.
  /// * [`DataError::CrcMismatch`] when the stored CRC disagrees with the
  ///   one computed over the type and data bytes.
  pub fn read_chunk(&mut self) -> Result<Chunk<'b>, PngError> {
    let len = u32::from_be_bytes(self.take(4)?.try_into().unwrap()) as usize;
    let ty_bytes: [u8; 4] = self.take(4)?.try_into().unwrap();
    let ty = ChunkType(ty_bytes);
    if !ty.is_valid() {
      return Err(DataError::InvalidChunkType(ty_bytes).into());
    }
    let data = self.take(len)?;
    let crc = u32::from_be_bytes(self.take(4)?.try_into().unwrap());
    let computed = png_crc(ty_bytes.iter().copied().chain(data.iter().copied()));
    if crc != computed {
      return Err(DataError::CrcMismatch(ty).into());
    }
    Ok(Chunk { ty, data, crc })
  }
}
