use async_trait::async_trait;
use tally_extract::{ExtractError, TextRecognizer};

/// Recognizer that returns the same outcome for every image.
#[derive(Debug, Clone)]
pub struct ScriptedRecognizer {
    outcome: Result<String, String>,
}

impl ScriptedRecognizer {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            outcome: Ok(text.into()),
        }
    }

    /// Every call fails as if the OCR engine crashed.
    pub fn failing(stderr: impl Into<String>) -> Self {
        Self {
            outcome: Err(stderr.into()),
        }
    }
}

#[async_trait]
impl TextRecognizer for ScriptedRecognizer {
    async fn recognize(&self, _png: &[u8]) -> tally_extract::Result<String> {
        match &self.outcome {
            Ok(text) => Ok(text.clone()),
            Err(stderr) => Err(ExtractError::OcrFailed {
                status: "exit status: 1".to_string(),
                stderr: stderr.clone(),
            }),
        }
    }
}
