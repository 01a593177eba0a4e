#![no_std]
#![forbid(unsafe_code)]

//! A crate for decoding PNG image data.
//!
//! The decoder turns an in-memory PNG datastream into a [`DecodedImage`]: a
//! buffer of 8-bit samples with either one channel (grayscale) or three
//! channels (RGB), with any transparency already composited against a
//! background color.
//!
//! The usual entry point is [`png::decode_png`], which takes the full PNG
//! bytes and runs the whole pipeline:
//!
//! 1. Validate the PNG signature and frame the stream into chunks
//!    ([`png::ChunkReader`]), checking each chunk's CRC-32.
//! 2. Feed the chunks in stream order to the [`png::PngInfo`] state machine,
//!    which enforces the PNG chunk ordering rules.
//! 3. Inflate the concatenated image data, reverse the per-scanline
//!    prediction filters, expand interlacing, and decode pixels per the
//!    image's color type.
//!
//! The crate is `no_std`, but the output buffers require `alloc`.

extern crate alloc;

pub mod error;
pub use error::*;

pub mod image;
pub use image::*;

pub mod pixel_formats;
pub use pixel_formats::*;

pub mod png;
