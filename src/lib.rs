#![forbid(unsafe_code)]
//! # qrgen
//!
//! A Rust library and command line tool for generating QR codes as PNG images.
//!
//! `qrgen` encodes text, URLs, WiFi credentials, vCard records and base64 image data URIs into
//! QR Code Model 2 symbols. It supports versions 1 to 40 and four error correction levels, and
//! renders the result as a PNG of any square size or as a block-character terminal preview.
//!
//! ## Features
//!
//! - Automatic numeric, alphanumeric or byte mode, whichever is most compact.
//! - Smallest symbol version for the requested error correction level.
//! - Reed-Solomon error correction and penalty-based mask selection, implemented in-crate.
//! - PNG output at arbitrary pixel sizes with a configurable quiet zone.
//! - Parallel batch generation.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Example
//!
//! ```rust
//! use qrgen::{encode, render, ErrorCorrectionLevel};
//!
//! let qr = encode("HELLO", ErrorCorrectionLevel::Medium).unwrap();
//! assert_eq!(qr.size(), 21);
//!
//! let png: Vec<u8> = render::rasterize(&qr, 256).unwrap();
//! assert!(png.starts_with(b"\x89PNG"));
//!
//! print!("{}", render::preview_text(&qr, 15));
//! ```
//!
//! Normalizing a WiFi join string first:
//!
//! ```rust
//! use qrgen::{encode_payload, ErrorCorrectionLevel, NormalizeOptions, Payload};
//!
//! let wifi = Payload::Wifi("MyWiFi:pass123:WPA".into());
//! let options = NormalizeOptions::default();
//! let qr = encode_payload(&wifi, ErrorCorrectionLevel::High, &options).unwrap();
//! assert!(qr.version().value() >= 2);
//! ```
//!
//! ## Modules
//!
//! - [`payload`]: input normalization (WiFi, URL, vCard, data URI, batch files).
//! - [`segment`]: mode classification, capacity planning and codeword packing.
//! - [`reed_solomon`]: GF(256) error correction and block interleaving.
//! - [`qrcode`]: module placement, masking and the finished symbol.
//! - [`render`]: PNG rasterization and terminal preview.
//! - [`output`] and [`batch`]: writing files, one or many.

pub mod batch;
pub mod error;
pub mod output;
pub mod payload;
pub mod qrcode;
pub mod reed_solomon;
pub mod render;
pub mod segment;
pub mod version;

pub use error::{EncodeError, GenerateError, RasterError};
pub use payload::{NormalizeOptions, Payload};
pub use qrcode::{Mask, QrCode};
pub use render::{preview_text, rasterize, RenderOptions};
pub use segment::Mode;
pub use version::{ErrorCorrectionLevel, Version};

/// Encodes a payload string into a finished symbol.
///
/// Fails with [`EncodeError::InvalidInput`] for an empty payload and
/// [`EncodeError::PayloadTooLarge`] when not even version 40 can hold it.
pub fn encode(payload: &str, level: ErrorCorrectionLevel) -> Result<QrCode, EncodeError> {
    QrCode::encode_text(payload, level)
}

/// Normalizes `payload` and encodes the resulting string.
pub fn encode_payload(
    payload: &Payload,
    level: ErrorCorrectionLevel,
    options: &NormalizeOptions,
) -> Result<QrCode, EncodeError> {
    let text = payload.normalize(options)?;
    encode(&text, level)
}
