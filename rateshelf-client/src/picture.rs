//! Image ingestion for rating pictures
//!
//! A picked file is checked (image MIME type, at most 5 MiB), decoded,
//! scaled down so neither side exceeds 800 px and re-encoded as JPEG at
//! quality 80. The result travels inline as a `data:image/jpeg;base64,` URI.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use std::path::Path;
use thiserror::Error;

/// Largest accepted source file
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
/// Longest side after downsampling
pub const MAX_DIMENSION: u32 = 800;
pub const JPEG_QUALITY: u8 = 80;

const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// A file chosen by the user
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    /// MIME type as reported by the picker or sniffed from the bytes
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Read a file from disk, sniffing its MIME type from the content
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let mime = infer::get(&bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or("application/octet-stream")
            .to_string();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, mime, bytes })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("Please select a valid image file")]
    NotAnImage,

    #[error("Image size must be less than 5MB")]
    TooLarge,

    #[error("Failed to process image")]
    Processing(String),
}

/// Pre-decode checks; nothing is decoded when these fail
pub fn check(file: &ImageFile) -> Result<(), ImageError> {
    if !file.mime.starts_with("image/") {
        return Err(ImageError::NotAnImage);
    }
    if file.bytes.len() > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge);
    }
    Ok(())
}

/// Output size for a `width` x `height` source
///
/// The longer side is capped at [`MAX_DIMENSION`], the other scaled to keep
/// the aspect ratio. Smaller images keep their size.
pub fn target_dimensions(width: u32, height: u32) -> (u32, u32) {
    let scale = |short: u32, long: u32| -> u32 {
        ((u64::from(short) * u64::from(MAX_DIMENSION)) / u64::from(long)).max(1) as u32
    };

    if width > height {
        if width > MAX_DIMENSION {
            return (MAX_DIMENSION, scale(height, width));
        }
    } else if height > MAX_DIMENSION {
        return (scale(width, height), MAX_DIMENSION);
    }
    (width, height)
}

/// Check, decode, downsample and re-encode `file` into a JPEG data URI
pub fn ingest(file: &ImageFile) -> Result<String, ImageError> {
    check(file)?;

    let decoded = image::load_from_memory(&file.bytes)
        .map_err(|e| ImageError::Processing(e.to_string()))?;

    let (width, height) = target_dimensions(decoded.width(), decoded.height());
    let scaled = if (width, height) == (decoded.width(), decoded.height()) {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Triangle)
    };

    // JPEG has no alpha channel
    let rgb = scaled.to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| ImageError::Processing(e.to_string()))?;

    Ok(format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(&jpeg)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png_file(width: u32, height: u32) -> ImageFile {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, 128]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        ImageFile {
            name: "cover.png".to_string(),
            mime: "image/png".to_string(),
            bytes,
        }
    }

    fn decode_data_uri(uri: &str) -> image::DynamicImage {
        let payload = uri.strip_prefix(DATA_URI_PREFIX).expect("jpeg data uri");
        let bytes = STANDARD.decode(payload).unwrap();
        image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap()
    }

    #[test]
    fn test_target_dimensions() {
        assert_eq!(target_dimensions(1600, 1200), (800, 600));
        assert_eq!(target_dimensions(1200, 1600), (600, 800));
        assert_eq!(target_dimensions(2000, 2000), (800, 800));
        assert_eq!(target_dimensions(640, 480), (640, 480));
        assert_eq!(target_dimensions(5000, 3), (800, 1));
    }

    #[test]
    fn test_non_image_rejected() {
        let file = ImageFile {
            name: "notes.txt".to_string(),
            mime: "text/plain".to_string(),
            bytes: b"hello".to_vec(),
        };
        assert_eq!(ingest(&file), Err(ImageError::NotAnImage));
    }

    #[test]
    fn test_oversized_rejected_before_decoding() {
        let file = ImageFile {
            name: "huge.jpg".to_string(),
            mime: "image/jpeg".to_string(),
            bytes: vec![0; MAX_IMAGE_BYTES + 1],
        };
        assert_eq!(ingest(&file), Err(ImageError::TooLarge));
        assert_eq!(ImageError::TooLarge.to_string(), "Image size must be less than 5MB");
    }

    #[test]
    fn test_undecodable_bytes() {
        let file = ImageFile {
            name: "broken.png".to_string(),
            mime: "image/png".to_string(),
            bytes: vec![1, 2, 3, 4],
        };
        let err = ingest(&file).unwrap_err();
        assert!(matches!(err, ImageError::Processing(_)));
        assert_eq!(err.to_string(), "Failed to process image");
    }

    #[test]
    fn test_large_image_scaled_to_jpeg() {
        let uri = ingest(&png_file(1600, 400)).unwrap();
        let decoded = decode_data_uri(&uri);
        assert_eq!((decoded.width(), decoded.height()), (800, 200));
    }

    #[test]
    fn test_small_image_not_upscaled() {
        let uri = ingest(&png_file(120, 90)).unwrap();
        let decoded = decode_data_uri(&uri);
        assert_eq!((decoded.width(), decoded.height()), (120, 90));
    }

    #[test]
    fn test_from_path_sniffs_mime() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("upload.bin");
        std::fs::write(&path, png_file(10, 10).bytes).unwrap();

        let file = ImageFile::from_path(&path).unwrap();
        assert_eq!(file.mime, "image/png");
        assert_eq!(file.name, "upload.bin");
    }
}
