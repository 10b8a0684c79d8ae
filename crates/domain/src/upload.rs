//! Image preparation for inline upload
//!
//! Every image is re-encoded as JPEG before being base64-encoded, so the remote
//! endpoint always sees the same format regardless of what the camera produced.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

use crate::model::RasterImage;
use crate::ports::VisionError;

/// Largest base64 payload the NIM API accepts inline; bigger images need the assets API
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 180_000;

/// An image ready to be embedded in a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: &'static str,
    pub base64: String,
}

impl EncodedImage {
    /// `data:<mime>;base64,<payload>`
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }

    /// Decode, re-encode as JPEG and base64 a raster image
    pub fn prepare(image: &RasterImage, max_payload_bytes: usize) -> Result<Self, VisionError> {
        if image.is_empty() {
            return Err(VisionError::InvalidImage("image is empty".to_string()));
        }

        let decoded = image::load_from_memory(&image.bytes)
            .map_err(|e| VisionError::InvalidImage(format!("failed to decode image: {}", e)))?;

        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

        let mut jpeg = Vec::new();
        rgb.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .map_err(|e| VisionError::InvalidImage(format!("failed to encode JPEG: {}", e)))?;

        let base64 = STANDARD.encode(&jpeg);
        if base64.len() >= max_payload_bytes {
            return Err(VisionError::InvalidImage(format!(
                "encoded image is {} bytes, limit is {}; upload larger images through the assets API",
                base64.len(),
                max_payload_bytes
            )));
        }

        tracing::debug!(
            source_bytes = image.bytes.len(),
            payload_bytes = base64.len(),
            width = rgb.width(),
            height = rgb.height(),
            "Prepared image for upload"
        );

        Ok(Self {
            mime_type: "image/jpeg",
            base64,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 30, 30]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_prepare_reencodes_png_as_jpeg() {
        let image = RasterImage::with_mime_type(png_bytes(16, 16), "image/png");
        let encoded = EncodedImage::prepare(&image, DEFAULT_MAX_PAYLOAD_BYTES).unwrap();

        assert_eq!(encoded.mime_type, "image/jpeg");
        let jpeg = STANDARD.decode(&encoded.base64).unwrap();
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
        assert!(
            encoded
                .data_uri()
                .starts_with("data:image/jpeg;base64,")
        );
    }

    #[test]
    fn test_prepare_drops_alpha_channel() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 128]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();

        let encoded = EncodedImage::prepare(&RasterImage::new(buf), DEFAULT_MAX_PAYLOAD_BYTES);
        assert!(encoded.is_ok());
    }

    #[test]
    fn test_prepare_rejects_empty_image() {
        let result = EncodedImage::prepare(&RasterImage::new(vec![]), DEFAULT_MAX_PAYLOAD_BYTES);
        assert!(matches!(result, Err(VisionError::InvalidImage(_))));
    }

    #[test]
    fn test_prepare_rejects_undecodable_bytes() {
        let image = RasterImage::new(b"definitely not an image".to_vec());
        let result = EncodedImage::prepare(&image, DEFAULT_MAX_PAYLOAD_BYTES);
        assert!(matches!(result, Err(VisionError::InvalidImage(_))));
    }

    #[test]
    fn test_prepare_rejects_oversized_payload() {
        let image = RasterImage::new(png_bytes(16, 16));
        let result = EncodedImage::prepare(&image, 64);
        match result {
            Err(VisionError::InvalidImage(msg)) => assert!(msg.contains("assets API")),
            other => panic!("expected InvalidImage, got {:?}", other),
        }
    }
}
