//! Stub inference client for testing and offline mode

use async_trait::async_trait;
use nim_vision_domain::{InferenceClient, VisionError, VisionPrompt};
use std::sync::Mutex;

/// Stub client that returns a configured reply or error
pub struct StubInferenceClient {
    reply: String,
    error: Option<VisionError>,
    questions: Mutex<Vec<String>>,
}

impl StubInferenceClient {
    /// Create a stub that always replies with `reply`
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            error: None,
            questions: Mutex::new(vec![]),
        }
    }

    /// Create a stub that always fails with `error`
    pub fn with_error(error: VisionError) -> Self {
        Self {
            reply: String::new(),
            error: Some(error),
            questions: Mutex::new(vec![]),
        }
    }

    /// Questions received so far, in call order
    pub fn questions(&self) -> Vec<String> {
        self.questions
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

impl Default for StubInferenceClient {
    fn default() -> Self {
        Self::with_reply("stub reply")
    }
}

#[async_trait]
impl InferenceClient for StubInferenceClient {
    async fn ask(&self, prompt: &VisionPrompt) -> Result<String, VisionError> {
        if let Ok(mut questions) = self.questions.lock() {
            questions.push(prompt.question.clone());
        }

        if let Some(ref error) = self.error {
            return Err(match error {
                VisionError::Config(msg) => VisionError::Config(msg.clone()),
                VisionError::InvalidImage(msg) => VisionError::InvalidImage(msg.clone()),
                VisionError::RemoteCall(msg) => VisionError::RemoteCall(msg.clone()),
                VisionError::ResponseParse(msg) => VisionError::ResponseParse(msg.clone()),
                VisionError::Timeout => VisionError::Timeout,
                VisionError::Camera(msg) => VisionError::Camera(msg.clone()),
            });
        }

        Ok(self.reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nim_vision_domain::EncodedImage;

    fn prompt(question: &str) -> VisionPrompt {
        VisionPrompt {
            question: question.to_string(),
            image: EncodedImage {
                mime_type: "image/jpeg",
                base64: String::new(),
            },
        }
    }

    #[tokio::test]
    async fn test_reply_stub_records_questions() {
        let client = StubInferenceClient::with_reply("a cat");

        assert_eq!(client.ask(&prompt("first")).await.unwrap(), "a cat");
        assert_eq!(client.ask(&prompt("second")).await.unwrap(), "a cat");

        assert_eq!(client.questions(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_error_stub() {
        let client = StubInferenceClient::with_error(VisionError::Timeout);
        let result = client.ask(&prompt("q")).await;

        assert!(matches!(result, Err(VisionError::Timeout)));
        assert_eq!(client.questions().len(), 1);
    }
}
