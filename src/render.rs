//! Rasterization of finished symbols.
//!
//! [`rasterize_image`] and [`rasterize`] scale the module grid to an exact pixel size for PNG
//! output; [`preview_text`] draws a coarse block-character picture for terminals.

use crate::error::RasterError;
use crate::qrcode::QrCode;

use image::{GrayImage, ImageFormat, Luma};
use std::io::Cursor;
use tracing::debug;

/// Standard quiet zone width, in modules.
pub const DEFAULT_QUIET_ZONE: u32 = 4;

/// Preview grid bound used by the command line tool.
pub const DEFAULT_PREVIEW_CELLS: usize = 15;

const DARK: Luma<u8> = Luma([0u8]);
const LIGHT: Luma<u8> = Luma([255u8]);

/// Options for [`rasterize_image_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Light border around the symbol, in modules.
    pub quiet_zone: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            quiet_zone: DEFAULT_QUIET_ZONE,
        }
    }
}

/// Renders the symbol into a `size`×`size` grayscale image with the standard quiet zone.
///
/// # Example
///
/// ```rust
/// use qrgen::{encode, render::rasterize_image, ErrorCorrectionLevel};
///
/// let qr = encode("Hello, World!", ErrorCorrectionLevel::Low).unwrap();
/// let img = rasterize_image(&qr, 256).unwrap();
/// assert_eq!(img.dimensions(), (256, 256));
/// ```
pub fn rasterize_image(qr: &QrCode, size: u32) -> Result<GrayImage, RasterError> {
    rasterize_image_with(qr, size, &RenderOptions::default())
}

/// Renders the symbol into a `size`×`size` grayscale image.
///
/// Every module becomes a square of `size / (modules + 2 * quiet_zone)` pixels. The symbol
/// is centered; leftover pixels stay light.
pub fn rasterize_image_with(
    qr: &QrCode,
    size: u32,
    options: &RenderOptions,
) -> Result<GrayImage, RasterError> {
    // Quiet zones too wide to count can never fit either.
    let modules = options
        .quiet_zone
        .checked_mul(2)
        .and_then(|border| border.checked_add(qr.size() as u32));
    let (modules, module_px) = match modules {
        Some(modules) if size / modules > 0 => (modules, size / modules),
        _ => {
            return Err(RasterError::SizeTooSmall {
                size,
                modules: modules.unwrap_or(u32::MAX),
            })
        }
    };
    let offset = (size - modules * module_px) / 2;
    debug!(size, modules, module_px, offset, "rasterizing symbol");

    let quiet_zone = options.quiet_zone;
    let module_at = |px: u32| {
        px.checked_sub(offset)
            .map(|p| p / module_px)
            .and_then(|m| m.checked_sub(quiet_zone))
            .and_then(|m| i32::try_from(m).ok())
    };
    let mut img = GrayImage::from_pixel(size, size, LIGHT);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        if let (Some(qr_x), Some(qr_y)) = (module_at(x), module_at(y)) {
            if qr.get_module(qr_x, qr_y) {
                *pixel = DARK;
            }
        }
    }
    Ok(img)
}

/// Renders the symbol as PNG bytes of `size`×`size` pixels.
pub fn rasterize(qr: &QrCode, size: u32) -> Result<Vec<u8>, RasterError> {
    let img = rasterize_image(qr, size)?;
    let mut bytes: Vec<u8> = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Renders a reduced block-character picture of the symbol for a terminal.
///
/// The bordered bitmap (symbol plus standard quiet zone) is sampled every
/// `side / max_cells` modules in both directions, so roughly `max_cells` cells per row
/// come out. Each sample prints as `██` or two spaces; rows end with `\n`.
pub fn preview_text(qr: &QrCode, max_cells: usize) -> String {
    let border = DEFAULT_QUIET_ZONE as i32;
    let side = qr.size() + 2 * DEFAULT_QUIET_ZONE as usize;
    let step = (side / max_cells.max(1)).max(1);
    let mut out = String::new();
    for y in (0..side).step_by(step) {
        for x in (0..side).step_by(step) {
            let dark = qr.get_module(x as i32 - border, y as i32 - border);
            out.push_str(if dark { "██" } else { "  " });
        }
        out.push('\n');
    }
    out
}
