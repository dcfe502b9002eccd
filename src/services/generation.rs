use async_trait::async_trait;

use crate::models::settings::GenerationSettings;

/// Message recorded on a job whose failure carried no text.
pub const GENERIC_FAILURE_MESSAGE: &str = "Generation failed";

/// Remote text-to-image service boundary.
///
/// On success returns an image reference that can be embedded directly,
/// normally a `data:<mime>;base64,<payload>` URI.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        settings: &GenerationSettings,
    ) -> Result<String, GenerationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("No image data found in the response.")]
    NoImageData,

    #[error("{0}")]
    Rejected(String),
}

impl GenerationError {
    /// Human-readable message stored on a failed job.
    pub fn job_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_message_passthrough() {
        let err = GenerationError::Rejected("rate limited".to_string());
        assert_eq!(err.job_message(), "rate limited");
    }

    #[test]
    fn test_job_message_falls_back_when_empty() {
        assert_eq!(
            GenerationError::Rejected(String::new()).job_message(),
            GENERIC_FAILURE_MESSAGE
        );
        let api = GenerationError::Api {
            status: 500,
            message: "  ".to_string(),
        };
        assert_eq!(api.job_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_missing_image_message() {
        assert_eq!(
            GenerationError::NoImageData.job_message(),
            "No image data found in the response."
        );
    }
}
