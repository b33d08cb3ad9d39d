//! OCR text extraction over uploaded screenshots.
//!
//! Decoding and post-processing live here; recognition itself is delegated to
//! an [`OcrEngine`], normally the Tesseract command line tool.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::ImageFormat;
use lens_core::{round_dp, LensError, LensResult, OcrResult};

pub mod tesseract;
pub use tesseract::TesseractCli;

/// Reported when the server started without a usable OCR engine.
pub const ENGINE_NOT_INSTALLED: &str =
    "OCR engine is not installed. Install Tesseract and make sure the `tesseract` binary is on PATH (or set TESSERACT_CMD).";

/// Confidence the engine assigns to layout rows that are not words.
const NO_CONFIDENCE: f64 = -1.0;

/// Word-level output of an engine, as two lists indexed in parallel.
///
/// Confidences stay strings so that each engine's "no confidence" spelling
/// is handled in one place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecognition {
    pub text: Vec<String>,
    pub conf: Vec<String>,
}

/// Backend-agnostic OCR interface.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize words in a PNG-encoded image.
    async fn recognize(&self, png: Vec<u8>) -> LensResult<RawRecognition>;

    fn engine_name(&self) -> &'static str;
}

/// Runs uploads through an optional engine.
///
/// The engine is `None` when the capability check at startup failed; every
/// extraction then reports [`LensError::Unavailable`].
#[derive(Clone)]
pub struct OcrExtractor {
    engine: Option<Arc<dyn OcrEngine>>,
}

impl OcrExtractor {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    pub fn unavailable() -> Self {
        Self { engine: None }
    }

    pub fn engine_name(&self) -> Option<&'static str> {
        self.engine.as_ref().map(|e| e.engine_name())
    }

    pub async fn extract_text(&self, image_bytes: Vec<u8>) -> LensResult<OcrResult> {
        let engine = self
            .engine
            .as_ref()
            .ok_or_else(|| LensError::Unavailable(ENGINE_NOT_INSTALLED.to_string()))?
            .clone();

        let png = tokio::task::spawn_blocking(move || decode_to_png(&image_bytes))
            .await
            .map_err(|e| LensError::Internal(e.to_string()))??;

        let raw = engine.recognize(png).await?;
        let result = summarize(raw)?;
        tracing::debug!(
            "{} recognized {} lines (confidence {:?})",
            engine.engine_name(),
            result.text.lines().count(),
            result.confidence
        );
        Ok(result)
    }
}

/// Decode any supported image format and re-encode it as PNG for the engine.
pub fn decode_to_png(bytes: &[u8]) -> LensResult<Vec<u8>> {
    let image = image::load_from_memory(bytes).map_err(|e| LensError::InvalidImage(e.to_string()))?;

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| LensError::Internal(format!("PNG re-encode failed: {}", e)))?;
    Ok(png)
}

/// Join the non-blank words and average the real confidences.
pub fn summarize(raw: RawRecognition) -> LensResult<OcrResult> {
    let text = raw
        .text
        .iter()
        .filter(|token| !token.trim().is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n");

    let mut confidences = Vec::with_capacity(raw.conf.len());
    for conf in raw.conf.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        let value: f64 = conf
            .parse()
            .map_err(|_| LensError::Extraction(format!("unreadable confidence value {:?}", conf)))?;
        if value != NO_CONFIDENCE {
            confidences.push(value);
        }
    }

    let confidence = if confidences.is_empty() {
        None
    } else {
        let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;
        Some(round_dp(mean, 2))
    };

    Ok(OcrResult {
        text: text.trim().to_string(),
        confidence,
    })
}
