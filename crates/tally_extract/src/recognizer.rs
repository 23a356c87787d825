//! Text recognition backends.

use crate::error::{ExtractError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tally_protocol::defaults::{DEFAULT_OCR_LANGUAGE, DEFAULT_TESSERACT_PATH, OCR_CHAR_ALLOWLIST};
use tally_protocol::OcrSection;
use tokio::process::Command;
use tracing::debug;

/// Turns a normalized PNG into recognized text.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, png: &[u8]) -> Result<String>;
}

/// Runs the `tesseract` command-line engine against a temporary file.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
    language: String,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_TESSERACT_PATH),
            language: DEFAULT_OCR_LANGUAGE.to_string(),
        }
    }
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    pub fn from_config(ocr: &OcrSection) -> Self {
        Self::new(ocr.tesseract_path.clone(), ocr.language.clone())
    }

    fn command(&self, input: &std::path::Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(input)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .arg("-c")
            .arg(format!("tessedit_char_whitelist={}", OCR_CHAR_ALLOWLIST))
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl TextRecognizer for TesseractCli {
    async fn recognize(&self, png: &[u8]) -> Result<String> {
        let input = tempfile::Builder::new()
            .prefix("tally-ocr-")
            .suffix(".png")
            .tempfile()?;
        tokio::fs::write(input.path(), png).await?;

        let output = self
            .command(input.path())
            .output()
            .await
            .map_err(|source| ExtractError::OcrUnavailable {
                binary: self.binary.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExtractError::OcrFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), "tesseract finished");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_arguments() {
        let cli = TesseractCli::new("/opt/ocr/tesseract", "deu");
        let cmd = cli.command(std::path::Path::new("/tmp/in.png"));
        let std_cmd = cmd.as_std();
        assert_eq!(std_cmd.get_program(), "/opt/ocr/tesseract");
        let args: Vec<_> = std_cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args[0], "/tmp/in.png");
        assert_eq!(args[1], "stdout");
        assert_eq!(&args[2..4], ["-l", "deu"]);
        assert_eq!(args[4], "-c");
        assert!(args[5].starts_with("tessedit_char_whitelist=0123456789,"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let cli = TesseractCli::new("/nonexistent/tally-test/tesseract", "eng");
        let err = cli.recognize(&[0u8; 4]).await.unwrap_err();
        match err {
            ExtractError::OcrUnavailable { binary, .. } => {
                assert_eq!(binary, "/nonexistent/tally-test/tesseract");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
