use thiserror::Error;

#[derive(Error, Debug)]
pub enum BurnsubError {
    #[error("Video decoding failed: {0}")]
    Decode(String),

    #[error("Text recognition failed: {0}")]
    Recognition(String),

    #[error("Translation returned {actual} entries for {expected} texts")]
    TranslationMismatch { expected: usize, actual: usize },

    #[error("API error: {0}")]
    Api(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BurnsubError {
    /// Errors that terminate a run instead of degrading its output.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BurnsubError::Decode(_)
                | BurnsubError::Config(_)
                | BurnsubError::FileNotFound(_)
                | BurnsubError::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BurnsubError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(BurnsubError::Decode("bad seek".into()).is_fatal());
        assert!(BurnsubError::Config("no key".into()).is_fatal());
        assert!(!BurnsubError::Recognition("bad json".into()).is_fatal());
        assert!(!BurnsubError::Api("500".into()).is_fatal());
        assert!(!BurnsubError::TranslationMismatch {
            expected: 2,
            actual: 1
        }
        .is_fatal());
    }

    #[test]
    fn test_mismatch_message() {
        let err = BurnsubError::TranslationMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "Translation returned 2 entries for 3 texts");
    }
}
