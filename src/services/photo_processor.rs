// src/services/photo_processor.rs
use image::{GenericImageView, ImageFormat as ImgFormat};
use log::warn;

use crate::errors::HuematchError;

pub const MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;
const MAX_EDGE_PX: u32 = 2048;

const KNOWN_CONTENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heic",
    "image/heif",
];

pub struct PhotoProcessor;

impl PhotoProcessor {
    pub fn new() -> Self {
        Self
    }

    /// File preconditions, checked before anything touches the network.
    ///
    /// Size and filename are hard requirements; the content type is
    /// not. An unrecognized type only logs a warning and the upload
    /// proceeds.
    pub fn validate_upload(
        &self,
        filename: &str,
        content_type: &str,
        size: usize,
    ) -> Result<(), HuematchError> {
        if filename.trim().is_empty() {
            return Err(HuematchError::Validation(
                "No filename provided".to_string(),
            ));
        }

        if size == 0 {
            return Err(HuematchError::Validation(
                "Uploaded file is empty".to_string(),
            ));
        }

        if size > MAX_UPLOAD_BYTES {
            return Err(HuematchError::Validation(format!(
                "File exceeds the 15 MiB limit ({} bytes)",
                size
            )));
        }

        if !KNOWN_CONTENT_TYPES.contains(&content_type) {
            warn!(
                "Unrecognized content type '{}' for '{}', proceeding anyway",
                content_type, filename
            );
        }

        Ok(())
    }

    /// Downscale anything over 2048 px on the long edge to bound store
    /// and provider payloads. Lenient: bytes the image crate cannot
    /// decode (or re-encode) pass through untouched.
    pub fn prepare(&self, data: &[u8]) -> Vec<u8> {
        let img = match image::load_from_memory(data) {
            Ok(img) => img,
            Err(e) => {
                warn!("Could not decode upload ({}), passing bytes through", e);
                return data.to_vec();
            }
        };

        let (width, height) = img.dimensions();
        if width <= MAX_EDGE_PX && height <= MAX_EDGE_PX {
            return data.to_vec();
        }

        let ratio = (MAX_EDGE_PX as f32 / width.max(height) as f32).min(1.0);
        let new_width = (width as f32 * ratio) as u32;
        let new_height = (height as f32 * ratio) as u32;

        let resized = img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3);

        let mut output = Vec::new();
        match resized.write_to(&mut std::io::Cursor::new(&mut output), ImgFormat::Jpeg) {
            Ok(()) => output,
            Err(e) => {
                warn!("Could not re-encode resized upload ({}), keeping original", e);
                data.to_vec()
            }
        }
    }
}

impl Default for PhotoProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), ImgFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn empty_file_is_rejected() {
        let processor = PhotoProcessor::new();
        let err = processor
            .validate_upload("face.jpg", "image/jpeg", 0)
            .unwrap_err();
        assert_matches!(err, HuematchError::Validation(_));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let processor = PhotoProcessor::new();
        let err = processor
            .validate_upload("face.jpg", "image/jpeg", 16 * 1024 * 1024)
            .unwrap_err();
        assert_matches!(err, HuematchError::Validation(_));
    }

    #[test]
    fn fourteen_mib_file_passes() {
        let processor = PhotoProcessor::new();
        assert!(processor
            .validate_upload("face.jpg", "image/jpeg", 14 * 1024 * 1024)
            .is_ok());
    }

    #[test]
    fn missing_filename_is_rejected() {
        let processor = PhotoProcessor::new();
        let err = processor
            .validate_upload("  ", "image/jpeg", 1024)
            .unwrap_err();
        assert_matches!(err, HuematchError::Validation(_));
    }

    #[test]
    fn unknown_content_type_is_tolerated() {
        let processor = PhotoProcessor::new();
        assert!(processor
            .validate_upload("face.xyz", "application/octet-stream", 1024)
            .is_ok());
    }

    #[test]
    fn small_image_passes_through_unchanged() {
        let processor = PhotoProcessor::new();
        let bytes = png_bytes(4, 4);
        assert_eq!(processor.prepare(&bytes), bytes);
    }

    #[test]
    fn oversized_image_is_downscaled() {
        let processor = PhotoProcessor::new();
        let bytes = png_bytes(2100, 8);
        let prepared = processor.prepare(&bytes);
        let img = image::load_from_memory(&prepared).unwrap();
        assert!(img.dimensions().0 <= MAX_EDGE_PX);
    }

    #[test]
    fn undecodable_bytes_pass_through() {
        let processor = PhotoProcessor::new();
        let bytes = vec![0xDE, 0xAD, 0xBE, 0xEF];
        assert_eq!(processor.prepare(&bytes), bytes);
    }
}
