//! Writing finished symbols to PNG files.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::GenerateError;
use crate::qrcode::QrCode;
use crate::render::rasterize;
use crate::version::ErrorCorrectionLevel;

/// Rasterizes `qr` and writes it to `path`, creating missing parent directories.
///
/// When `overwrite` is false an existing file is left untouched and
/// [`GenerateError::AlreadyExists`] is returned. Returns the number of bytes written.
pub fn save_png(
    qr: &QrCode,
    path: &Path,
    size: u32,
    overwrite: bool,
) -> Result<u64, GenerateError> {
    let bytes = rasterize(qr, size)?;
    let io_err = |source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err)?;
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(overwrite)
        .create_new(!overwrite)
        .open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => GenerateError::AlreadyExists(path.to_path_buf()),
            _ => io_err(e),
        })?;
    file.write_all(&bytes).map_err(io_err)?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote png");
    Ok(bytes.len() as u64)
}

/// Encodes `content` and writes the PNG in one step.
pub fn generate_file(
    content: &str,
    ecl: ErrorCorrectionLevel,
    path: &Path,
    size: u32,
    overwrite: bool,
) -> Result<u64, GenerateError> {
    let qr = crate::encode(content, ecl)?;
    save_png(&qr, path, size, overwrite)
}

/// Formats a byte count as `N bytes`, `N.N KB` or `N.N MB`.
pub fn format_file_size(size: u64) -> String {
    if size < 1024 {
        format!("{size} bytes")
    } else if size < 1024 * 1024 {
        format!("{:.1} KB", size as f64 / 1024.0)
    } else {
        format!("{:.1} MB", size as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("qrgen-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_generate_file_creates_directories() {
        let dir = scratch_dir("nested");
        let path = dir.join("a/b/qr.png");
        let written =
            generate_file("Hello", ErrorCorrectionLevel::Medium, &path, 128, false).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), written);
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (128, 128));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_existing_file_needs_overwrite() {
        let dir = scratch_dir("overwrite");
        let path = dir.join("qr.png");
        generate_file("first", ErrorCorrectionLevel::Low, &path, 64, false).unwrap();
        assert!(matches!(
            generate_file("second", ErrorCorrectionLevel::Low, &path, 64, false),
            Err(GenerateError::AlreadyExists(_))
        ));
        generate_file("second", ErrorCorrectionLevel::Low, &path, 64, true).unwrap();
        fs::remove_dir_all(&dir).unwrap();
    }
}
