//! Screenshot cleanup ahead of text recognition.
//!
//! Screenshots arrive in whatever size and palette the game client produced.
//! The OCR engine does best on a moderately sized, high-contrast grayscale
//! image, so every input goes through the same three steps: grayscale,
//! contrast stretch, shrink-to-fit.

use crate::error::{ExtractError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat};
use std::io::Cursor;
use tally_protocol::defaults::{DEFAULT_MAX_IMAGE_HEIGHT, DEFAULT_MAX_IMAGE_WIDTH};
use tally_protocol::OcrSection;

/// Luminance percentiles used as the black and white points.
const LOW_PERCENTILE: usize = 1;
const HIGH_PERCENTILE: usize = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageNormalizer {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_IMAGE_WIDTH,
            max_height: DEFAULT_MAX_IMAGE_HEIGHT,
        }
    }
}

impl ImageNormalizer {
    pub fn from_config(ocr: &OcrSection) -> Self {
        Self {
            max_width: ocr.max_width.max(1),
            max_height: ocr.max_height.max(1),
        }
    }

    /// Decode `bytes`, normalize, and re-encode as PNG.
    pub fn normalize(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let decoded = image::load_from_memory(bytes)?;
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(ExtractError::EmptyImage);
        }

        let mut gray = decoded.to_luma8();
        stretch_contrast(&mut gray);
        let gray = self.shrink_to_fit(gray);

        let mut out = Vec::new();
        DynamicImage::ImageLuma8(gray).write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
        Ok(out)
    }

    /// Downscale preserving aspect ratio. Never upscales.
    fn shrink_to_fit(&self, gray: GrayImage) -> GrayImage {
        if gray.width() <= self.max_width && gray.height() <= self.max_height {
            return gray;
        }
        DynamicImage::ImageLuma8(gray)
            .resize(self.max_width, self.max_height, FilterType::Triangle)
            .to_luma8()
    }
}

/// Map the low/high luminance percentiles onto 0..=255 in place.
/// Flat images are left untouched.
pub(crate) fn stretch_contrast(gray: &mut GrayImage) {
    let mut histogram = [0usize; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }
    let total: usize = histogram.iter().sum();
    if total == 0 {
        return;
    }

    let low = percentile(&histogram, (total - 1) * LOW_PERCENTILE / 100);
    let high = percentile(&histogram, (total - 1) * HIGH_PERCENTILE / 100);
    if high <= low {
        return;
    }

    let span = (high - low) as u32;
    for pixel in gray.pixels_mut() {
        let v = pixel.0[0].clamp(low, high);
        pixel.0[0] = (((v - low) as u32 * 255 + span / 2) / span) as u8;
    }
}

/// Luminance of the pixel at `rank` in sorted order.
fn percentile(histogram: &[usize; 256], rank: usize) -> u8 {
    let mut seen = 0;
    for (level, count) in histogram.iter().enumerate() {
        seen += count;
        if seen > rank {
            return level as u8;
        }
    }
    u8::MAX
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn encode(img: DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_stretch_two_tone() {
        let mut gray = GrayImage::from_fn(10, 10, |x, _| if x < 5 { Luma([100]) } else { Luma([150]) });
        stretch_contrast(&mut gray);
        assert_eq!(gray.get_pixel(0, 0).0[0], 0);
        assert_eq!(gray.get_pixel(9, 9).0[0], 255);
    }

    #[test]
    fn test_stretch_ignores_outliers() {
        // One stray white pixel should not set the white point.
        let mut gray = GrayImage::from_pixel(20, 20, Luma([80]));
        for x in 0..10 {
            for y in 0..20 {
                gray.put_pixel(x, y, Luma([120]));
            }
        }
        gray.put_pixel(19, 19, Luma([255]));
        stretch_contrast(&mut gray);
        assert_eq!(gray.get_pixel(0, 0).0[0], 255);
        assert_eq!(gray.get_pixel(15, 0).0[0], 0);
    }

    #[test]
    fn test_stretch_flat_image_unchanged() {
        let mut gray = GrayImage::from_pixel(8, 8, Luma([42]));
        stretch_contrast(&mut gray);
        assert!(gray.pixels().all(|p| p.0[0] == 42));
    }

    #[test]
    fn test_large_image_shrinks_with_aspect_ratio() {
        let img = RgbImage::from_pixel(3200, 800, Rgb([10, 200, 30]));
        let normalizer = ImageNormalizer::default();
        let out = normalizer
            .normalize(&encode(DynamicImage::ImageRgb8(img)))
            .unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1600, 400));
        assert!(matches!(decoded, DynamicImage::ImageLuma8(_)));
    }

    #[test]
    fn test_small_image_not_upscaled() {
        let img = GrayImage::from_pixel(120, 40, Luma([0]));
        let out = ImageNormalizer::default()
            .normalize(&encode(DynamicImage::ImageLuma8(img)))
            .unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 40));
    }

    #[test]
    fn test_garbage_bytes_fail_decode() {
        let err = ImageNormalizer::default()
            .normalize(b"definitely not an image")
            .unwrap_err();
        assert!(matches!(err, ExtractError::Decode(_)));
    }

    #[test]
    fn test_from_config_bounds() {
        let ocr = OcrSection {
            max_width: 800,
            max_height: 0,
            ..OcrSection::default()
        };
        let normalizer = ImageNormalizer::from_config(&ocr);
        assert_eq!(normalizer.max_width, 800);
        assert_eq!(normalizer.max_height, 1);
    }
}
