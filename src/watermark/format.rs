//! Output format selection and encoding.
//!
//! The output format is a closed set selected from the decoded format of the
//! base image: PNG stays PNG, everything else re-encodes as JPEG at quality
//! 90. Watermarking a JPEG therefore always yields a JPEG, regardless of the
//! watermark's own format.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, DynamicImage, ImageEncoder as _, ImageFormat, ImageResult};
use std::io::Cursor;

const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    /// Select the output format from the decoded format of the base image.
    pub fn from_source(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => OutputFormat::Png,
            _ => OutputFormat::Jpeg,
        }
    }

    /// Content type uploaded with the encoded derivative.
    ///
    /// Derived from the output format, not the source format, so a WEBP
    /// source re-encoded as JPEG uploads as `image/jpeg`.
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }

    /// Encode the composited image in this format.
    pub fn encode(&self, image: &DynamicImage) -> ImageResult<Vec<u8>> {
        let mut output = Cursor::new(Vec::new());
        match self {
            OutputFormat::Png => {
                let rgba = image.to_rgba8();
                PngEncoder::new(&mut output).write_image(
                    rgba.as_raw(),
                    rgba.width(),
                    rgba.height(),
                    ColorType::Rgba8,
                )?;
            }
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = image.to_rgb8();
                JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY).write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ColorType::Rgb8,
                )?;
            }
        }
        Ok(output.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn test_image() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            8,
            8,
            image::Rgba([120, 40, 200, 255]),
        ))
    }

    #[test]
    fn test_png_source_stays_png() {
        assert_eq!(OutputFormat::from_source(ImageFormat::Png), OutputFormat::Png);
    }

    #[test]
    fn test_non_png_sources_become_jpeg() {
        assert_eq!(
            OutputFormat::from_source(ImageFormat::Jpeg),
            OutputFormat::Jpeg
        );
        assert_eq!(
            OutputFormat::from_source(ImageFormat::WebP),
            OutputFormat::Jpeg
        );
        assert_eq!(
            OutputFormat::from_source(ImageFormat::Gif),
            OutputFormat::Jpeg
        );
    }

    #[test]
    fn test_content_types() {
        assert_eq!(OutputFormat::Png.content_type(), "image/png");
        assert_eq!(OutputFormat::Jpeg.content_type(), "image/jpeg");
    }

    #[test]
    fn test_png_encode_emits_png_magic() {
        let data = OutputFormat::Png.encode(&test_image()).unwrap();
        assert_eq!(&data[0..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn test_jpeg_encode_emits_soi_marker() {
        let data = OutputFormat::Jpeg.encode(&test_image()).unwrap();
        assert_eq!(&data[0..3], &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_encoded_output_round_trips() {
        let data = OutputFormat::Png.encode(&test_image()).unwrap();
        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }
}
