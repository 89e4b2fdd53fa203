//! Error types returned by the encoding and rendering stages.

use thiserror::Error;

/// Failure while turning a payload into a QR symbol.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The payload is empty or structurally malformed (WiFi tuple, URL, data URI).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The payload does not fit in a version 40 symbol at the requested level.
    #[error("payload too large: needs {needed} bits, version 40 holds {capacity} bits")]
    PayloadTooLarge {
        /// Bits required by the segment, or `usize::MAX` when the character count
        /// cannot even be represented.
        needed: usize,
        /// Data capacity of the largest symbol at the requested level.
        capacity: usize,
    },
}

/// Failure while rasterizing a finished symbol.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The requested pixel size leaves less than one pixel per module.
    #[error("size {size}px is too small for {modules} modules (quiet zone included)")]
    SizeTooSmall {
        /// Requested image side in pixels.
        size: u32,
        /// Symbol side plus both quiet-zone borders, in modules.
        modules: u32,
    },

    /// The image buffer could not be built or encoded.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Failure while producing a PNG file for one payload.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Raster(#[from] RasterError),

    /// The output file exists and overwriting was not allowed.
    #[error("file {} already exists", .0.display())]
    AlreadyExists(std::path::PathBuf),

    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
