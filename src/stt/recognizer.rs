use crate::error::{NavError, Result};
use std::sync::Arc;

/// Trait for speech-to-text recognition.
///
/// Allows swapping the remote service for a mock in tests.
#[async_trait::async_trait]
pub trait Recognizer: Send + Sync {
    /// Recognize a WAV-encoded utterance.
    ///
    /// `Ok(None)` means the service answered but heard nothing usable.
    async fn recognize(&self, wav: Vec<u8>) -> Result<Option<String>>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

#[async_trait::async_trait]
impl<T: Recognizer + ?Sized> Recognizer for Arc<T> {
    async fn recognize(&self, wav: Vec<u8>) -> Result<Option<String>> {
        (**self).recognize(wav).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Mock recognizer for testing
#[derive(Debug, Clone)]
pub struct MockRecognizer {
    response: Option<String>,
    should_fail: bool,
}

impl MockRecognizer {
    /// Create a mock that hears nothing
    pub fn new() -> Self {
        Self {
            response: None,
            should_fail: false,
        }
    }

    /// Configure the mock to return a specific transcript
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = Some(response.to_string());
        self
    }

    /// Configure the mock to fail on recognize
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Recognizer for MockRecognizer {
    async fn recognize(&self, _wav: Vec<u8>) -> Result<Option<String>> {
        if self.should_fail {
            return Err(NavError::Recognition {
                message: "mock recognition failure".to_string(),
            });
        }
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
