//! The chunk ordering state machine and image assembly.

use super::*;

use alloc::{vec, vec::Vec};
use bitfrob::u8_replicate_bits;
use miniz_oxide::inflate::decompress_to_vec_zlib;

/// Accumulated decoder state, fed one [`Chunk`] at a time.
///
/// Construction consumes the `IHDR` chunk. [`update`](Self::update) consumes
/// every following chunk except `IEND`, enforcing the PNG ordering rules as
/// it goes, and [`create_image`](Self::create_image) runs the pixel pipeline
/// over whatever was accumulated. Ancillary chunks the decoder doesn't
/// interpret still have their position in the stream checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngInfo {
  width: u32,
  height: u32,
  bit_depth: u8,
  color_type: ColorType,
  interlace: Interlace,
  palette: Option<Vec<RGB8>>,
  transparency: Option<Vec<u8>>,
  background: Option<Vec<u8>>,
  /// Concatenated data of every `IDAT` chunk seen so far.
  idat: Vec<u8>,
  /// Set once a chunk that may follow the image data has been seen after
  /// the first `IDAT`. Any further `IDAT` is then an ordering error.
  idat_sealed: bool,
}
impl PngInfo {
  /// Builds the initial state from the stream's `IHDR` chunk.
  ///
  /// ## Failure
  /// * [`FormatError::MissingIhdr`] when handed any other chunk.
  /// * A [`DataError`] when any `IHDR` field is out of range, including a
  ///   bit depth the color type doesn't allow.
  pub fn new(chunk: &Chunk<'_>) -> Result<Self, PngError> {
    if chunk.ty() != ChunkType::IHDR {
      return Err(FormatError::MissingIhdr.into());
    }
    let data: [u8; 13] = match chunk.data().try_into() {
      Ok(data) => data,
      Err(_) => return Err(DataError::InvalidIhdrLength(chunk.data().len()).into()),
    };
    let [w0, w1, w2, w3, h0, h1, h2, h3, depth, color, compression, filter, interlace] = data;

    let width = u32::from_be_bytes([w0, w1, w2, w3]);
    if width == 0 || width > i32::MAX as u32 {
      return Err(DataError::InvalidWidth(width).into());
    }
    let height = u32::from_be_bytes([h0, h1, h2, h3]);
    if height == 0 || height > i32::MAX as u32 {
      return Err(DataError::InvalidHeight(height).into());
    }
    let bit_depth = check_raw_bit_depth(depth)?;
    let color_type = ColorType::from_u8(color)?;
    color_type.check_bit_depth(bit_depth)?;
    if compression != 0 {
      return Err(DataError::InvalidCompressionMethod(compression).into());
    }
    if filter != 0 {
      return Err(DataError::InvalidFilterMethod(filter).into());
    }
    let interlace = Interlace::from_u8(interlace)?;

    Ok(Self {
      width,
      height,
      bit_depth,
      color_type,
      interlace,
      palette: None,
      transparency: None,
      background: None,
      idat: Vec::new(),
      idat_sealed: false,
    })
  }

  /// Width in pixels, from `IHDR`.
  #[inline]
  #[must_use]
  pub const fn width(&self) -> u32 {
    self.width
  }

  /// Height in pixels, from `IHDR`.
  #[inline]
  #[must_use]
  pub const fn height(&self) -> u32 {
    self.height
  }

  /// Bits per sample in the datastream, from `IHDR`.
  #[inline]
  #[must_use]
  pub const fn bit_depth(&self) -> u8 {
    self.bit_depth
  }

  /// The color type, from `IHDR`.
  #[inline]
  #[must_use]
  pub const fn color_type(&self) -> ColorType {
    self.color_type
  }

  /// The interlace method, from `IHDR`.
  #[inline]
  #[must_use]
  pub const fn interlace(&self) -> Interlace {
    self.interlace
  }

  /// Folds one chunk into the state.
  ///
  /// Critical chunks other than `PLTE` and `IDAT` fail the decode. Private
  /// and reserved ancillary chunks are skipped entirely. Known ancillary
  /// chunks have their ordering enforced even when their content is
  /// otherwise ignored, and unknown ancillary chunks only seal the image
  /// data sequence.
  pub fn update(&mut self, chunk: &Chunk<'_>) -> Result<(), PngError> {
    let ty = chunk.ty();
    if ty.is_critical() {
      return match ty {
        ChunkType::PLTE => self.update_plte(chunk),
        ChunkType::IDAT => self.update_idat(chunk),
        _ => Err(DataError::UnknownCriticalChunk(ty).into()),
      };
    }
    if ty.is_private() || ty.is_reserved() {
      return Ok(());
    }
    match ty {
      ChunkType::tRNS => self.update_trns(chunk),
      ChunkType::bKGD => self.update_bkgd(chunk),
      ChunkType::tEXt | ChunkType::zTXt | ChunkType::iTXt | ChunkType::pHYs | ChunkType::tIME => {
        self.seal_idat();
        Ok(())
      }
      ChunkType::hIST => {
        if self.palette.is_none() {
          Err(FormatError::ChunkBeforePlte(ty).into())
        } else if !self.idat.is_empty() {
          Err(FormatError::ChunkAfterIdat(ty).into())
        } else {
          Ok(())
        }
      }
      ChunkType::sPLT | ChunkType::eXIf => {
        if !self.idat.is_empty() {
          Err(FormatError::ChunkAfterIdat(ty).into())
        } else {
          Ok(())
        }
      }
      ChunkType::cHRM
      | ChunkType::gAMA
      | ChunkType::iCCP
      | ChunkType::sBIT
      | ChunkType::sRGB
      | ChunkType::cICP
      | ChunkType::mDCv
      | ChunkType::cLLi => {
        if self.palette.is_some() {
          Err(FormatError::ChunkAfterPlte(ty).into())
        } else if !self.idat.is_empty() {
          Err(FormatError::ChunkAfterIdat(ty).into())
        } else {
          Ok(())
        }
      }
      _ => {
        self.seal_idat();
        Ok(())
      }
    }
  }

  fn seal_idat(&mut self) {
    if !self.idat.is_empty() {
      self.idat_sealed = true;
    }
  }

  fn update_idat(&mut self, chunk: &Chunk<'_>) -> Result<(), PngError> {
    if self.idat_sealed {
      return Err(FormatError::IdatNotConsecutive.into());
    }
    self.idat.extend_from_slice(chunk.data());
    Ok(())
  }

  fn update_plte(&mut self, chunk: &Chunk<'_>) -> Result<(), PngError> {
    if self.palette.is_some() {
      return Err(FormatError::DuplicatePlte.into());
    }
    if self.transparency.is_some() {
      return Err(FormatError::PlteAfterChunk(ChunkType::tRNS).into());
    }
    if self.background.is_some() {
      return Err(FormatError::PlteAfterChunk(ChunkType::bKGD).into());
    }
    if !self.idat.is_empty() {
      return Err(FormatError::ChunkAfterIdat(ChunkType::PLTE).into());
    }
    if !self.color_type.uses_truecolor() {
      return Err(DataError::PaletteNotAllowed.into());
    }
    let data = chunk.data();
    if data.len() % 3 != 0 {
      return Err(DataError::InvalidPaletteLength(data.len()).into());
    }
    let entries = data.len() / 3;
    if entries > (1 << self.bit_depth) {
      return Err(DataError::PaletteTooLarge(entries).into());
    }
    self.palette = Some(bytemuck::cast_slice::<u8, RGB8>(data).to_vec());
    Ok(())
  }

  fn update_trns(&mut self, chunk: &Chunk<'_>) -> Result<(), PngError> {
    if self.color_type.uses_palette() && self.palette.is_none() {
      return Err(FormatError::ChunkBeforePlte(ChunkType::tRNS).into());
    }
    if !self.idat.is_empty() {
      return Err(FormatError::ChunkAfterIdat(ChunkType::tRNS).into());
    }
    if self.color_type.uses_alpha() {
      return Err(DataError::TransparencyNotAllowed.into());
    }
    let data = chunk.data();
    let len = data.len();
    if self.color_type.uses_palette() {
      // one alpha byte per palette entry, trailing entries default opaque
      if self.palette.as_ref().map(Vec::len).unwrap_or(0) < len {
        return Err(DataError::InvalidTransparencyLength(len).into());
      }
    } else if self.color_type.uses_truecolor() {
      if len != 6 {
        return Err(DataError::InvalidTransparencyLength(len).into());
      }
    } else if len != 2 {
      return Err(DataError::InvalidTransparencyLength(len).into());
    }
    self.transparency = Some(data.to_vec());
    Ok(())
  }

  fn update_bkgd(&mut self, chunk: &Chunk<'_>) -> Result<(), PngError> {
    if self.color_type.uses_palette() && self.palette.is_none() {
      return Err(FormatError::ChunkBeforePlte(ChunkType::bKGD).into());
    }
    if !self.idat.is_empty() {
      return Err(FormatError::ChunkAfterIdat(ChunkType::bKGD).into());
    }
    let data = chunk.data();
    let len = data.len();
    let required = if self.color_type.uses_palette() {
      1
    } else if self.color_type.uses_alpha() {
      2 * (self.color_type.component_count() - 1)
    } else {
      2 * self.color_type.component_count()
    };
    if len != required {
      return Err(DataError::InvalidBackgroundLength(len).into());
    }
    let mut bkgd = data.to_vec();
    if self.color_type.uses_palette() {
      let entries = self.palette.as_ref().map(Vec::len).unwrap_or(0);
      if usize::from(bkgd[0]) >= entries {
        return Err(DataError::InvalidBackgroundIndex(bkgd[0]).into());
      }
    } else if self.bit_depth < 16 {
      // samples are stored as big-endian pairs regardless of depth, so the
      // high byte is dead weight and the low byte can carry stray bits
      let mask = (1_u16 << self.bit_depth) - 1;
      for pair in bkgd.chunks_exact_mut(2) {
        pair[0] = 0;
        pair[1] &= mask as u8;
      }
    }
    self.background = Some(bkgd);
    Ok(())
  }

  /// The raw background samples every transparent pixel composites against.
  ///
  /// A `bKGD` palette index is resolved to its RGB triple here. Without a
  /// `bKGD` chunk the background is white.
  fn compositing_background(&self) -> Vec<u8> {
    let bkgd = match &self.background {
      None => {
        return if self.color_type.uses_palette() {
          vec![0xFF; 3]
        } else if self.color_type.uses_truecolor() {
          vec![0xFF; 6]
        } else {
          vec![0xFF; 2]
        };
      }
      Some(bkgd) => bkgd,
    };
    if self.color_type.uses_palette() {
      // the index was bounds checked when the chunk was read
      let RGB8 { r, g, b } = self.palette.as_ref().map_or(RGB8::default(), |palette| {
        palette.get(usize::from(bkgd[0])).copied().unwrap_or_default()
      });
      vec![r, g, b]
    } else {
      bkgd.clone()
    }
  }

  /// The palette with every `tRNS` alpha entry already composited against
  /// the background, so indexed pixels decode with a plain lookup.
  fn premultiplied_palette(&self, bkgd: &[u8]) -> Vec<RGB8> {
    let palette = match &self.palette {
      Some(palette) => palette,
      None => return Vec::new(),
    };
    let transparency = match &self.transparency {
      Some(transparency) if self.color_type.uses_palette() => transparency,
      _ => return palette.clone(),
    };
    let background = RGB8 { r: bkgd[0], g: bkgd[1], b: bkgd[2] };
    let mut plte = palette.clone();
    for (entry, &alpha) in plte.iter_mut().zip(transparency.iter()) {
      if alpha == 0 {
        *entry = background;
      } else if alpha != u8::MAX {
        let alpha_fg = f32::from(alpha) / 255.0;
        let alpha_bg = 1.0 - alpha_fg;
        entry.r = (alpha_fg * f32::from(entry.r)) as u8 + (alpha_bg * f32::from(background.r)) as u8;
        entry.g = (alpha_fg * f32::from(entry.g)) as u8 + (alpha_bg * f32::from(background.g)) as u8;
        entry.b = (alpha_fg * f32::from(entry.b)) as u8 + (alpha_bg * f32::from(background.b)) as u8;
      }
    }
    plte
  }

  /// The background at output depth, for [`DecodedImage::background`].
  fn output_background(&self, bkgd: &[u8]) -> Vec<u8> {
    if self.color_type.uses_palette() {
      return bkgd.to_vec();
    }
    // big-endian sample pairs; depth 16 keeps the high byte, lower depths
    // replicate the masked low byte up to 8 bits
    let sample = |pair: &[u8]| -> u8 {
      if self.bit_depth == 16 {
        pair[0]
      } else if self.bit_depth == 8 {
        pair[1]
      } else {
        let mask = (1 << self.bit_depth) - 1;
        u8_replicate_bits(u32::from(self.bit_depth), pair[1] & mask)
      }
    };
    if self.color_type.uses_truecolor() {
      vec![sample(&bkgd[0..2]), sample(&bkgd[2..4]), sample(&bkgd[4..6])]
    } else {
      vec![sample(&bkgd[0..2])]
    }
  }

  /// Runs the pixel pipeline over the accumulated state and produces the
  /// final image.
  ///
  /// ## Failure
  /// * [`FormatError::MissingPlte`] for an indexed image without a palette.
  /// * [`FormatError::MissingIdat`] when no image data was seen.
  /// * [`PngError::Decompression`] when the concatenated `IDAT` data is not
  ///   a valid zlib stream.
  /// * Filter stage errors from [`DataError`].
  pub fn create_image(&self) -> Result<DecodedImage, PngError> {
    if self.color_type.uses_palette() && self.palette.is_none() {
      return Err(FormatError::MissingPlte.into());
    }
    if self.idat.is_empty() {
      return Err(FormatError::MissingIdat.into());
    }
    let bkgd = self.compositing_background();
    let palette = self.premultiplied_palette(&bkgd);
    let filt = decompress_to_vec_zlib(&self.idat).map_err(|_| PngError::Decompression)?;
    let channels =
      if self.color_type.uses_truecolor() { Channels::Rgb } else { Channels::Grayscale };
    let config = RasterConfig {
      bit_depth: self.bit_depth,
      color_type: self.color_type,
      channels,
      palette: &palette,
      transparency: self.transparency.as_deref(),
      background: &bkgd,
    };
    let data = self.interlace.expand(&config, self.width, self.height, &filt)?;
    Ok(DecodedImage {
      width: self.width,
      height: self.height,
      channels,
      bit_depth: 8,
      background: self.output_background(&bkgd),
      data,
    })
  }
}
