//! Screenshot → reading extraction.
//!
//! [`ValueExtractor`] chains image normalization, a [`TextRecognizer`] and the
//! growth-rate pattern. "No reading in this image" is `Ok(None)`; `Err` is
//! reserved for images that cannot be processed at all.

mod error;
pub mod normalize;
pub mod reading;
pub mod recognizer;

pub use error::{ExtractError, Result};
pub use normalize::ImageNormalizer;
pub use reading::ReadingParser;
pub use recognizer::{TesseractCli, TextRecognizer};

use std::sync::Arc;
use tally_protocol::{ExtractedReading, OcrSection};
use tracing::{debug, info};

#[derive(Clone)]
pub struct ValueExtractor {
    normalizer: ImageNormalizer,
    recognizer: Arc<dyn TextRecognizer>,
    parser: ReadingParser,
}

impl std::fmt::Debug for ValueExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueExtractor")
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}

impl ValueExtractor {
    pub fn new(normalizer: ImageNormalizer, recognizer: Arc<dyn TextRecognizer>) -> Result<Self> {
        Ok(Self {
            normalizer,
            recognizer,
            parser: ReadingParser::new()?,
        })
    }

    /// Tesseract-backed extractor using the `[ocr]` config section.
    pub fn from_config(ocr: &OcrSection) -> Result<Self> {
        Self::new(
            ImageNormalizer::from_config(ocr),
            Arc::new(TesseractCli::from_config(ocr)),
        )
    }

    /// Normalize and recognize, returning the raw text.
    pub async fn recognize_text(&self, image: &[u8]) -> Result<String> {
        let normalizer = self.normalizer;
        let bytes = image.to_vec();
        let png = tokio::task::spawn_blocking(move || normalizer.normalize(&bytes)).await??;
        debug!(bytes = png.len(), "normalized image");
        self.recognizer.recognize(&png).await
    }

    pub async fn extract(&self, image: &[u8]) -> Result<Option<ExtractedReading>> {
        let text = self.recognize_text(image).await?;
        let reading = self.parser.parse(&text);
        match &reading {
            Some(r) => info!(value = r.value, "growth rate recognized"),
            None => debug!("no growth rate in recognized text"),
        }
        Ok(reading)
    }

    pub fn parse_text(&self, text: &str) -> Option<ExtractedReading> {
        self.parser.parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{DynamicImage, GrayImage, ImageFormat, Luma};
    use std::io::Cursor;
    use std::sync::Mutex;

    struct CannedText {
        text: String,
        seen: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl TextRecognizer for CannedText {
        async fn recognize(&self, png: &[u8]) -> Result<String> {
            self.seen.lock().unwrap().push(png.len());
            Ok(self.text.clone())
        }
    }

    fn extractor(text: &str) -> (ValueExtractor, Arc<CannedText>) {
        let recognizer = Arc::new(CannedText {
            text: text.to_string(),
            seen: Mutex::new(Vec::new()),
        });
        let extractor =
            ValueExtractor::new(ImageNormalizer::default(), recognizer.clone()).unwrap();
        (extractor, recognizer)
    }

    fn png() -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(GrayImage::from_pixel(16, 16, Luma([200])))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn test_extract_reading() {
        let (extractor, recognizer) = extractor("Commander\nGrowth Rate: 50,000\n");
        let reading = extractor.extract(&png()).await.unwrap().unwrap();
        assert_eq!(reading.value, 50_000);
        assert_eq!(reading.formatted, "50,000");
        assert_eq!(recognizer.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_label_is_none() {
        let (extractor, _) = extractor("Power 1,000\nKills 3");
        assert!(extractor.extract(&png()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_undecodable_image_is_error_and_skips_ocr() {
        let (extractor, recognizer) = extractor("Growth Rate: 1");
        let err = extractor.extract(b"\x00\x01garbage").await.unwrap_err();
        assert!(matches!(err, ExtractError::Decode(_)));
        assert!(recognizer.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_parse_text() {
        let (extractor, _) = extractor("");
        assert_eq!(extractor.parse_text("growth rate 12").unwrap().value, 12);
    }
}
