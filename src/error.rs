use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for captcha pipeline operations.
pub type CaptchaResult<T> = Result<T, CaptchaError>;

/// The error type for all captcha pipeline operations.
#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("Asset not found at {path:?}")]
    AssetNotFound { path: PathBuf },

    #[error("Failed to decode asset {path:?}: {source}")]
    AssetDecode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Template '{name}' is unusable: {reason}")]
    InvalidTemplate { name: String, reason: String },

    #[error("No catalog name close enough to '{text}'")]
    NoConfidentName { text: String },

    #[error("Text recognizer failed: {description}")]
    RecognizerFailure { description: String },

    #[error("Text recognizer timed out after {duration:?}")]
    RecognizerTimeout { duration: std::time::Duration },

    #[error("Frame source error: {description}")]
    FrameSource { description: String },

    #[error("Invalid configuration in {path:?}: {description}")]
    Config { path: PathBuf, description: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Task failed to complete: {source}")]
    Join {
        #[from]
        source: tokio::task::JoinError,
    },
}

impl CaptchaError {
    /// Errors that end the current challenge and send the session back to `Idle`.
    pub fn is_session_abort(&self) -> bool {
        matches!(
            self,
            CaptchaError::AssetNotFound { .. }
                | CaptchaError::AssetDecode { .. }
                | CaptchaError::InvalidTemplate { .. }
                | CaptchaError::NoConfidentName { .. }
                | CaptchaError::RecognizerFailure { .. }
                | CaptchaError::RecognizerTimeout { .. }
                | CaptchaError::Join { .. }
        )
    }

    /// Recognizer failures degrade to "no confident name".
    pub fn is_name_failure(&self) -> bool {
        matches!(
            self,
            CaptchaError::NoConfidentName { .. }
                | CaptchaError::RecognizerFailure { .. }
                | CaptchaError::RecognizerTimeout { .. }
                | CaptchaError::Join { .. }
        )
    }

    pub(crate) fn asset_not_found(path: impl Into<PathBuf>) -> Self {
        CaptchaError::AssetNotFound { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_abort_classification() {
        assert!(CaptchaError::asset_not_found("creatures/arcanine.png").is_session_abort());
        assert!(
            CaptchaError::RecognizerTimeout {
                duration: Duration::from_millis(10)
            }
            .is_name_failure()
        );
        let cfg = CaptchaError::Config {
            path: "cfg.json".into(),
            description: "bad".to_string(),
        };
        assert!(!cfg.is_session_abort());
        assert!(!CaptchaError::asset_not_found("x.png").is_name_failure());
    }
}
