use imago::{
  error::{DataError, FormatError, PngError},
  image::Channels,
  png::{decode_png, png_crc, ChunkType, PNG_SIGNATURE},
};
use walkdir::WalkDir;

fn chunk(ty: &[u8; 4], data: &[u8]) -> Vec<u8> {
  let mut out = Vec::new();
  out.extend_from_slice(&(data.len() as u32).to_be_bytes());
  out.extend_from_slice(ty);
  out.extend_from_slice(data);
  let crc = png_crc(ty.iter().copied().chain(data.iter().copied()));
  out.extend_from_slice(&crc.to_be_bytes());
  out
}

fn ihdr(width: u32, height: u32, bit_depth: u8, color_type: u8, interlace: u8) -> Vec<u8> {
  let mut data = Vec::new();
  data.extend_from_slice(&width.to_be_bytes());
  data.extend_from_slice(&height.to_be_bytes());
  data.extend_from_slice(&[bit_depth, color_type, 0, 0, interlace]);
  chunk(b"IHDR", &data)
}

/// Compresses filtered scanline bytes into an `IDAT` chunk.
fn idat(filt: &[u8]) -> Vec<u8> {
  chunk(b"IDAT", &miniz_oxide::deflate::compress_to_vec_zlib(filt, 6))
}

/// Joins chunks into a full datastream: signature first, `IEND` last.
fn png(chunks: &[Vec<u8>]) -> Vec<u8> {
  let mut out = PNG_SIGNATURE.to_vec();
  for c in chunks {
    out.extend_from_slice(c);
  }
  out.extend_from_slice(&chunk(b"IEND", &[]));
  out
}

#[test]
fn test_decode_1x1_rgb8() {
  let bytes = png(&[ihdr(1, 1, 8, 2, 0), idat(&[0, 10, 20, 30])]);
  let image = decode_png(&bytes).unwrap();
  assert_eq!(image.width, 1);
  assert_eq!(image.height, 1);
  assert_eq!(image.channels, Channels::Rgb);
  assert_eq!(image.bit_depth, 8);
  assert_eq!(image.background, [0xFF, 0xFF, 0xFF]);
  assert_eq!(image.data, [10, 20, 30]);
}

#[test]
fn test_decode_filtered_scanlines() {
  // line 0 Sub-filtered, line 1 Up-filtered
  let raw = [10, 20, 30, 13, 24, 35, 11, 22, 33, 14, 26, 38];
  let filt = [1, 10, 20, 30, 3, 4, 5, 2, 1, 2, 3, 1, 2, 3];
  let bytes = png(&[ihdr(2, 2, 8, 2, 0), idat(&filt)]);
  let image = decode_png(&bytes).unwrap();
  assert_eq!(image.data, raw);
}

#[test]
fn test_decode_idat_split_across_chunks() {
  let zlib = miniz_oxide::deflate::compress_to_vec_zlib(&[0, 10, 20, 30], 6);
  let (first, second) = zlib.split_at(zlib.len() / 2);
  let bytes = png(&[ihdr(1, 1, 8, 2, 0), chunk(b"IDAT", first), chunk(b"IDAT", second)]);
  assert_eq!(decode_png(&bytes).unwrap().data, [10, 20, 30]);
}

#[test]
fn test_decode_16_bit_keeps_high_bytes() {
  let bytes = png(&[ihdr(1, 1, 16, 0, 0), idat(&[0, 0xAB, 0xCD])]);
  let image = decode_png(&bytes).unwrap();
  assert_eq!(image.channels, Channels::Grayscale);
  assert_eq!(image.data, [0xAB]);
}

#[test]
fn test_decode_interlaced_8x8_grayscale() {
  // every pixel of each reduced image holds its pass number, so the decoded
  // raster must come out as the Adam7 pixel layout grid
  let mut filt = Vec::new();
  for (pass, (w, h)) in [(1, 1), (1, 1), (2, 1), (2, 2), (4, 2), (4, 4), (8, 4)].iter().enumerate()
  {
    for _ in 0..*h {
      filt.push(0);
      filt.extend(std::iter::repeat(pass as u8 + 1).take(*w));
    }
  }
  let bytes = png(&[ihdr(8, 8, 8, 0, 1), idat(&filt)]);
  let image = decode_png(&bytes).unwrap();
  #[rustfmt::skip]
  let expected = [
    1, 6, 4, 6, 2, 6, 4, 6,
    7, 7, 7, 7, 7, 7, 7, 7,
    5, 6, 5, 6, 5, 6, 5, 6,
    7, 7, 7, 7, 7, 7, 7, 7,
    3, 6, 4, 6, 3, 6, 4, 6,
    7, 7, 7, 7, 7, 7, 7, 7,
    5, 6, 5, 6, 5, 6, 5, 6,
    7, 7, 7, 7, 7, 7, 7, 7,
  ];
  assert_eq!(image.data, expected);
}

#[test]
fn test_decode_interlaced_1x1() {
  // a 1x1 interlaced image stores only pass 1
  let bytes = png(&[ihdr(1, 1, 8, 0, 1), idat(&[0, 42])]);
  assert_eq!(decode_png(&bytes).unwrap().data, [42]);
}

#[test]
fn test_decode_interlaced_truncated_pass_fails() {
  // the 8x8 layout needs 7 passes, provide only the first line
  let bytes = png(&[ihdr(8, 8, 8, 0, 1), idat(&[0, 1])]);
  assert_eq!(decode_png(&bytes), Err(DataError::TruncatedImageData.into()));
}

#[test]
fn test_grayscale_chroma_key_uses_background() {
  let bytes = png(&[
    ihdr(2, 1, 8, 0, 0),
    chunk(b"tRNS", &[0, 7]),
    chunk(b"bKGD", &[0, 3]),
    idat(&[0, 7, 8]),
  ]);
  let image = decode_png(&bytes).unwrap();
  assert_eq!(image.data, [3, 8]);
  assert_eq!(image.background, [3]);
}

#[test]
fn test_truecolor_alpha_composites_over_background() {
  let filt = [0, 100, 110, 120, 0, 100, 110, 120, 255, 100, 110, 120, 128];
  let bytes =
    png(&[ihdr(3, 1, 8, 6, 0), chunk(b"bKGD", &[0, 10, 0, 20, 0, 30]), idat(&filt)]);
  let image = decode_png(&bytes).unwrap();
  assert_eq!(image.background, [10, 20, 30]);
  // alpha 0 is the background, alpha 255 the foreground, alpha 128 blends
  // with per-term truncation
  assert_eq!(image.data, [10, 20, 30, 100, 110, 120, 54, 64, 74]);
}

#[test]
fn test_grayscale_alpha_composites_over_background() {
  // one sample and one alpha byte per pixel, alphas 0, 255, 128
  let filt = [0, 100, 0, 100, 255, 100, 128];
  let bytes = png(&[ihdr(3, 1, 8, 4, 0), chunk(b"bKGD", &[0, 10]), idat(&filt)]);
  let image = decode_png(&bytes).unwrap();
  assert_eq!(image.channels, Channels::Grayscale);
  assert_eq!(image.background, [10]);
  assert_eq!(image.data, [10, 100, 54]);
}

#[test]
fn test_grayscale_alpha_16_uses_high_bytes() {
  // sample and alpha are big-endian pairs, low bytes are noise
  let filt = [0, 100, 0xEE, 255, 0xEE, 100, 0xEE, 128, 0xEE, 100, 0xEE, 0, 0xEE];
  let bytes = png(&[ihdr(3, 1, 16, 4, 0), chunk(b"bKGD", &[30, 10]), idat(&filt)]);
  let image = decode_png(&bytes).unwrap();
  assert_eq!(image.background, [30]);
  // alpha 128 blends the high bytes: trunc(100 * 128/255) + trunc(30 * 127/255)
  assert_eq!(image.data, [100, 64, 30]);
}

#[test]
fn test_truecolor_alpha_16_composites_high_bytes() {
  #[rustfmt::skip]
  let filt = [
    0,
    100, 0xEE, 110, 0xEE, 120, 0xEE, 255, 0xEE,
    100, 0xEE, 110, 0xEE, 120, 0xEE, 128, 0xEE,
    100, 0xEE, 110, 0xEE, 120, 0xEE, 0, 0xEE,
  ];
  let bytes =
    png(&[ihdr(3, 1, 16, 6, 0), chunk(b"bKGD", &[5, 0, 15, 0, 25, 0]), idat(&filt)]);
  let image = decode_png(&bytes).unwrap();
  assert_eq!(image.background, [5, 15, 25]);
  assert_eq!(image.data, [100, 110, 120, 52, 62, 72, 5, 15, 25]);
}

#[test]
fn test_indexed_transparency_folds_into_palette() {
  let palette = [50, 60, 70, 100, 110, 120, 10, 20, 30];
  let bytes = png(&[
    ihdr(3, 1, 8, 3, 0),
    chunk(b"PLTE", &palette),
    chunk(b"tRNS", &[0, 128]),
    chunk(b"bKGD", &[2]),
    idat(&[0, 0, 1, 2]),
  ]);
  let image = decode_png(&bytes).unwrap();
  assert_eq!(image.channels, Channels::Rgb);
  assert_eq!(image.background, [10, 20, 30]);
  // entry 0 is fully transparent, entry 1 half blended, entry 2 untouched
  assert_eq!(image.data, [10, 20, 30, 54, 64, 74, 10, 20, 30]);
}

#[test]
fn test_indexed_packed_depths() {
  // depth 2, width 3: one byte per scanline with 2 bits of padding
  let palette = [1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4];
  let bytes = png(&[
    ihdr(3, 2, 2, 3, 0),
    chunk(b"PLTE", &palette),
    idat(&[0, 0b00_01_10_00, 0, 0b11_10_01_00]),
  ]);
  let image = decode_png(&bytes).unwrap();
  assert_eq!(image.data, [1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4, 3, 3, 3, 2, 2, 2]);
}

#[test]
fn test_plte_after_idat_is_rejected() {
  let bytes = png(&[
    ihdr(1, 1, 8, 2, 0),
    idat(&[0, 10, 20, 30]),
    chunk(b"PLTE", &[0, 0, 0]),
  ]);
  assert_eq!(decode_png(&bytes), Err(FormatError::ChunkAfterIdat(ChunkType::PLTE).into()));
}

#[test]
fn test_text_between_idat_chunks_is_rejected() {
  let zlib = miniz_oxide::deflate::compress_to_vec_zlib(&[0, 10, 20, 30], 6);
  let (first, second) = zlib.split_at(zlib.len() / 2);
  let bytes = png(&[
    ihdr(1, 1, 8, 2, 0),
    chunk(b"IDAT", first),
    chunk(b"tEXt", b"comment\0hello"),
    chunk(b"IDAT", second),
  ]);
  assert_eq!(decode_png(&bytes), Err(FormatError::IdatNotConsecutive.into()));
}

#[test]
fn test_corrupted_chunk_fails_the_crc() {
  let mut bytes = png(&[ihdr(1, 1, 8, 2, 0), idat(&[0, 10, 20, 30])]);
  // flip a bit in the IHDR width field
  bytes[8 + 8] ^= 1;
  assert_eq!(decode_png(&bytes), Err(DataError::CrcMismatch(ChunkType::IHDR).into()));
}

#[test]
fn test_iend_data_must_be_empty() {
  let mut bytes = PNG_SIGNATURE.to_vec();
  bytes.extend_from_slice(&ihdr(1, 1, 8, 2, 0));
  bytes.extend_from_slice(&idat(&[0, 10, 20, 30]));
  bytes.extend_from_slice(&chunk(b"IEND", &[1]));
  assert_eq!(decode_png(&bytes), Err(FormatError::InvalidIend.into()));
}

#[test]
fn test_truncated_stream() {
  let good = png(&[ihdr(1, 1, 8, 2, 0), idat(&[0, 10, 20, 30])]);
  assert_eq!(decode_png(&good[..good.len() - 4]), Err(PngError::UnexpectedEnd));
}

#[test]
fn test_huge_declared_dimensions_fail_as_truncated() {
  // a tiny stream claiming a giant raster must error out, not try to
  // allocate the raster
  for (width, height) in [(0x7FFF_FFFF, 0x7FFF_FFFF), (1_000_000, 1_000_000)] {
    for interlace in [0, 1] {
      let bytes = png(&[ihdr(width, height, 8, 2, interlace), idat(&[0])]);
      assert_eq!(decode_png(&bytes), Err(DataError::TruncatedImageData.into()));
    }
  }
}

#[test]
fn test_decode_png_no_panics() {
  // decoding arbitrary files must fail cleanly, never panic
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(_) => continue,
    };
    let _ = decode_png(&v);
  }
  for _ in 0..10 {
    let v = super::rand_bytes(1024);
    let _ = decode_png(&v);
  }
  // random bytes behind a valid signature and IHDR
  for _ in 0..10 {
    let mut v = png(&[ihdr(4, 4, 8, 2, 0)]);
    v.extend_from_slice(&super::rand_bytes(256));
    let _ = decode_png(&v);
  }
}
