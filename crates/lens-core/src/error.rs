use thiserror::Error;

/// Failure taxonomy shared by every InvestLens component.
///
/// The HTTP layer maps each variant to exactly one status code, so adding a
/// variant here forces a decision there.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LensError {
    /// The market-data provider answered but had no usable series.
    #[error("{0}")]
    NoData(String),

    /// The market-data provider could not be reached or answered garbage.
    #[error("Market data request failed: {0}")]
    Upstream(String),

    /// The OCR engine is not installed or cannot be launched.
    #[error("{0}")]
    Unavailable(String),

    #[error("Could not open image: {0}")]
    InvalidImage(String),

    /// The OCR engine ran but did not produce a usable result.
    #[error("OCR failed: {0}")]
    Extraction(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Unexpected error: {0}")]
    Internal(String),
}

impl LensError {
    pub fn is_market_data(&self) -> bool {
        matches!(self, LensError::NoData(_) | LensError::Upstream(_))
    }
}

pub type LensResult<T> = Result<T, LensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_upstream_message() {
        let err = LensError::NoData("No intraday quotes available for the requested symbol.".into());
        assert_eq!(
            err.to_string(),
            "No intraday quotes available for the requested symbol."
        );

        let err = LensError::Extraction("tesseract exited with status 1".into());
        assert_eq!(err.to_string(), "OCR failed: tesseract exited with status 1");
    }

    #[test]
    fn test_market_data_classification() {
        assert!(LensError::NoData("x".into()).is_market_data());
        assert!(LensError::Upstream("x".into()).is_market_data());
        assert!(!LensError::Unavailable("x".into()).is_market_data());
        assert!(!LensError::Internal("x".into()).is_market_data());
    }
}
