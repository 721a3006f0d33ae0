//! Writing drawings and recordings to disk

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use atelier_core::PixelBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::{RgbImage, RgbaImage};
use thiserror::Error;
use tracing::info;

const JPEG_QUALITY: u8 = 95;
const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Pixel buffer does not match its dimensions")]
    InvalidBuffer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 2] = [Self::Png, Self::Jpeg];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
        }
    }
}

/// Make a title safe to use as a file stem
pub fn sanitize_file_name(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .map(|c| if RESERVED.contains(&c) || c.is_control() { '_' } else { c })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        return "untitled".to_string();
    }
    cleaned
}

/// Save the drawing as `<dir>/<title>.<ext>`. JPEG has no alpha, so the
/// image is flattened onto white first.
pub fn export_image(buffer: &PixelBuffer, dir: &Path, title: &str, format: ImageFormat) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.{}", sanitize_file_name(title), format.extension()));

    match format {
        ImageFormat::Png => {
            let image = RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.as_rgba().to_vec())
                .ok_or(ExportError::InvalidBuffer)?;
            image.save_with_format(&path, image::ImageFormat::Png)?;
        }
        ImageFormat::Jpeg => {
            let image = RgbImage::from_raw(buffer.width(), buffer.height(), flatten_on_white(buffer.as_rgba()))
                .ok_or(ExportError::InvalidBuffer)?;
            let writer = BufWriter::new(File::create(&path)?);
            JpegEncoder::new_with_quality(writer, JPEG_QUALITY).encode_image(&image)?;
        }
    }

    info!(path = %path.display(), format = format.label(), "Image exported");
    Ok(path)
}

/// Save a WAV payload as `<dir>/<name>.wav`
pub fn export_audio(payload: &[u8], dir: &Path, name: &str) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.wav", sanitize_file_name(name)));
    fs::write(&path, payload)?;
    info!(path = %path.display(), bytes = payload.len(), "Audio exported");
    Ok(path)
}

fn flatten_on_white(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| {
            let a = f32::from(px[3]) / 255.0;
            let blend = move |c: u8| (f32::from(c) * a + 255.0 * (1.0 - a)).round() as u8;
            [blend(px[0]), blend(px[1]), blend(px[2])]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::Rgb;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("atelier-export-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("My Art"), "My Art");
        assert_eq!(sanitize_file_name("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_file_name("   "), "untitled");
        assert_eq!(sanitize_file_name(".."), "untitled");
        assert_eq!(sanitize_file_name("what?"), "what_");
    }

    #[test]
    fn test_flatten_on_white() {
        let flat = flatten_on_white(&[0, 0, 0, 0, 10, 20, 30, 255, 0, 0, 0, 128]);
        assert_eq!(&flat[..3], &[255, 255, 255]);
        assert_eq!(&flat[3..6], &[10, 20, 30]);
        assert!(flat[6].abs_diff(127) <= 1);
    }

    #[test]
    fn test_export_png_keeps_pixels() {
        let dir = scratch_dir("png");
        let buffer = PixelBuffer::new(4, 3, Rgb::new(200, 10, 10));
        let path = export_image(&buffer, &dir, "sketch", ImageFormat::Png).unwrap();
        assert_eq!(path, dir.join("sketch.png"));

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(1, 1).0, [200, 10, 10, 255]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_export_jpeg() {
        let dir = scratch_dir("jpeg");
        let buffer = PixelBuffer::new(16, 16, Rgb::WHITE);
        let path = export_image(&buffer, &dir, "a/b", ImageFormat::Jpeg).unwrap();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("a_b.jpg"));
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_export_audio_writes_payload() {
        let dir = scratch_dir("wav");
        let path = export_audio(b"RIFFdata", &dir, "My Recording 1").unwrap();
        assert_eq!(path, dir.join("My Recording 1.wav"));
        assert_eq!(fs::read(&path).unwrap(), b"RIFFdata");
        let _ = fs::remove_dir_all(&dir);
    }
}
