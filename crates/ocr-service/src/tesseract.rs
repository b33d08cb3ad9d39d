//! Tesseract engine driven through its command line interface.
//!
//! The image is piped to `tesseract stdin stdout -l <lang> tsv` and the
//! word-level TSV report is split into the text and confidence columns.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use lens_core::{LensError, LensResult};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::{OcrEngine, RawRecognition};

const NOT_FOUND: &str = "Tesseract is not installed. Follow the backend README to install it.";

#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: PathBuf,
    language: String,
}

impl TesseractCli {
    pub fn new(program: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            language: language.into(),
        }
    }

    /// Capability check: build an engine only if `program --version` runs.
    pub async fn detect(program: impl Into<PathBuf>, language: impl Into<String>) -> LensResult<Self> {
        let engine = Self::new(program, language);
        let version = engine.version().await?;
        tracing::info!("OCR engine ready: {} ({})", version, engine.program.display());
        Ok(engine)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// First line of `tesseract --version`.
    pub async fn version(&self) -> LensResult<String> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| launch_error(&self.program, e))?;

        if !output.status.success() {
            return Err(LensError::Unavailable(format!(
                "{} --version exited with {}",
                self.program.display(),
                output.status
            )));
        }

        // older releases print the banner on stderr
        let banner = if output.stdout.is_empty() {
            &output.stderr
        } else {
            &output.stdout
        };
        Ok(String::from_utf8_lossy(banner)
            .lines()
            .next()
            .unwrap_or("tesseract")
            .trim()
            .to_string())
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(&self, png: Vec<u8>) -> LensResult<RawRecognition> {
        let mut child = Command::new(&self.program)
            .args(["stdin", "stdout", "-l", self.language.as_str(), "tsv"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| launch_error(&self.program, e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| LensError::Extraction("tesseract stdin was not captured".to_string()))?;
        let feed = async move {
            let written = stdin.write_all(&png).await;
            drop(stdin);
            written
        };

        let (written, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|e| LensError::Extraction(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LensError::Extraction(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        written.map_err(|e| LensError::Extraction(format!("could not send image to tesseract: {}", e)))?;

        parse_tsv(&String::from_utf8_lossy(&output.stdout))
    }

    fn engine_name(&self) -> &'static str {
        "tesseract"
    }
}

fn launch_error(program: &Path, err: std::io::Error) -> LensError {
    if err.kind() == ErrorKind::NotFound {
        LensError::Unavailable(NOT_FOUND.to_string())
    } else {
        tracing::warn!("failed to launch {}: {}", program.display(), err);
        LensError::Unavailable(format!("Could not launch {}: {}", program.display(), err))
    }
}

/// Split a Tesseract TSV report into parallel text/confidence lists.
///
/// Columns are located by header name; trailing empty text cells are often
/// omitted entirely, so a short row reads as an empty token.
pub fn parse_tsv(report: &str) -> LensResult<RawRecognition> {
    let mut lines = report.lines();
    let header: Vec<&str> = lines
        .next()
        .map(|h| h.split('\t').collect())
        .unwrap_or_default();

    let column = |name: &str| {
        header
            .iter()
            .position(|c| c.trim() == name)
            .ok_or_else(|| LensError::Extraction(format!("tesseract TSV report has no {:?} column", name)))
    };
    let conf_idx = column("conf")?;
    let text_idx = column("text")?;

    let mut raw = RawRecognition::default();
    for line in lines.filter(|l| !l.is_empty()) {
        let cells: Vec<&str> = line.split('\t').collect();
        raw.conf.push(cells.get(conf_idx).copied().unwrap_or("").to_string());
        raw.text.push(cells.get(text_idx).copied().unwrap_or("").to_string());
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t
2\t1\t1\t0\t0\t0\t12\t10\t300\t40\t-1\t
5\t1\t1\t1\t1\t1\t12\t10\t80\t40\t95.781342\tAAPL
5\t1\t1\t1\t1\t2\t100\t10\t120\t40\t89.218658\t175.42
4\t1\t1\t1\t2\t0\t12\t60\t300\t40\t-1
";

    #[test]
    fn test_parse_tsv_keeps_parallel_columns() {
        let raw = parse_tsv(REPORT).unwrap();
        assert_eq!(raw.text, vec!["", "", "AAPL", "175.42", ""]);
        assert_eq!(raw.conf, vec!["-1", "-1", "95.781342", "89.218658", "-1"]);

        let result = crate::summarize(raw).unwrap();
        assert_eq!(result.text, "AAPL\n175.42");
        assert_eq!(result.confidence, Some(92.5));
    }

    #[test]
    fn test_parse_tsv_requires_header() {
        let err = parse_tsv("").unwrap_err();
        assert!(matches!(err, LensError::Extraction(_)));

        let err = parse_tsv("level\tleft\ttop\n1\t0\t0\n").unwrap_err();
        assert!(err.to_string().contains("\"conf\""));
    }

    #[tokio::test]
    async fn test_detect_missing_binary_is_unavailable() {
        let err = TesseractCli::detect("/nonexistent/investlens/tesseract", "eng")
            .await
            .unwrap_err();
        assert_eq!(err, LensError::Unavailable(NOT_FOUND.to_string()));
        assert!(err.to_string().contains("install"));
    }

    #[tokio::test]
    async fn test_recognize_missing_binary_is_unavailable() {
        let engine = TesseractCli::new("/nonexistent/investlens/tesseract", "eng");
        let err = engine.recognize(vec![0x89, b'P', b'N', b'G']).await.unwrap_err();
        assert!(matches!(err, LensError::Unavailable(_)));
    }
}
