//! Voice capture stage: one utterance in, recognized text or nothing out.

use crate::audio::recorder::AudioSource;
use crate::audio::wav::encode_wav;
use crate::defaults;
use crate::error::Result;
use crate::recording::{ListenConfig, RecordingSession};
use crate::stt::recognizer::Recognizer;
use std::sync::Arc;

/// Blocking capture of a single utterance.
pub trait UtteranceCapture: Send + Sync {
    /// `Ok(None)` when nobody spoke before the listen timeout.
    fn capture(&self) -> Result<Option<Vec<i16>>>;
}

/// Captures through a [`RecordingSession`] over a freshly opened source.
///
/// The source is opened per utterance so the device is only held while
/// listening.
pub struct SessionCapture<F> {
    open_source: F,
    config: ListenConfig,
}

impl<F, A> SessionCapture<F>
where
    F: Fn() -> Result<A> + Send + Sync,
    A: AudioSource,
{
    pub fn new(config: ListenConfig, open_source: F) -> Self {
        Self {
            open_source,
            config,
        }
    }
}

impl<F, A> UtteranceCapture for SessionCapture<F>
where
    F: Fn() -> Result<A> + Send + Sync,
    A: AudioSource,
{
    fn capture(&self) -> Result<Option<Vec<i16>>> {
        let source = (self.open_source)()?;
        RecordingSession::new(source, self.config).record_utterance()
    }
}

/// Capture from the microphone named `device` (or the preferred default).
#[cfg(feature = "cpal-audio")]
pub fn microphone(device: Option<String>, config: ListenConfig) -> impl UtteranceCapture {
    SessionCapture::new(config, move || {
        crate::audio::capture::CpalAudioSource::new(device.as_deref())
    })
}

/// The listening stage as the navigator sees it.
#[async_trait::async_trait]
pub trait Listener: Send + Sync {
    /// Recognized text, or `None` for silence, noise or an unavailable
    /// service. Never fails.
    async fn listen(&self) -> Option<String>;
}

/// Records on a blocking thread, then asks a [`Recognizer`] for the text.
pub struct VoiceListener {
    capture: Arc<dyn UtteranceCapture>,
    recognizer: Arc<dyn Recognizer>,
}

impl VoiceListener {
    pub fn new(capture: Arc<dyn UtteranceCapture>, recognizer: Arc<dyn Recognizer>) -> Self {
        Self {
            capture,
            recognizer,
        }
    }
}

#[async_trait::async_trait]
impl Listener for VoiceListener {
    async fn listen(&self) -> Option<String> {
        let capture = Arc::clone(&self.capture);
        let samples = match tokio::task::spawn_blocking(move || capture.capture()).await {
            Ok(Ok(Some(samples))) => samples,
            Ok(Ok(None)) => return None,
            Ok(Err(e)) => {
                tracing::warn!("voice capture failed: {e}");
                return None;
            }
            Err(e) => {
                tracing::warn!("voice capture task failed: {e}");
                return None;
            }
        };

        let wav = match encode_wav(&samples, defaults::SAMPLE_RATE) {
            Ok(wav) => wav,
            Err(e) => {
                tracing::warn!("{e}");
                return None;
            }
        };

        match self.recognizer.recognize(wav).await {
            Ok(Some(text)) => {
                tracing::info!(recognizer = self.recognizer.name(), %text, "recognized");
                Some(text)
            }
            Ok(None) => {
                tracing::info!("speech not understood");
                None
            }
            Err(e) => {
                tracing::warn!("{e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::recorder::MockAudioSource;
    use crate::audio::vad::VadConfig;
    use crate::config::AudioConfig;
    use crate::error::NavError;
    use crate::stt::recognizer::MockRecognizer;
    use std::time::Duration;

    struct CannedCapture(fn() -> Result<Option<Vec<i16>>>);

    impl UtteranceCapture for CannedCapture {
        fn capture(&self) -> Result<Option<Vec<i16>>> {
            (self.0)()
        }
    }

    fn heard() -> Result<Option<Vec<i16>>> {
        Ok(Some(vec![3000i16; 1600]))
    }

    fn listener(capture: CannedCapture, recognizer: MockRecognizer) -> VoiceListener {
        VoiceListener::new(Arc::new(capture), Arc::new(recognizer))
    }

    #[tokio::test]
    async fn test_listen_returns_transcript() {
        let listener = listener(
            CannedCapture(heard),
            MockRecognizer::new().with_response("静安寺"),
        );
        assert_eq!(listener.listen().await.as_deref(), Some("静安寺"));
    }

    #[tokio::test]
    async fn test_listen_silence_is_none() {
        let listener = listener(
            CannedCapture(|| Ok(None)),
            MockRecognizer::new().with_response("never used"),
        );
        assert_eq!(listener.listen().await, None);
    }

    #[tokio::test]
    async fn test_listen_capture_error_is_none() {
        let listener = listener(
            CannedCapture(|| {
                Err(NavError::AudioDeviceNotFound {
                    device: "usb".to_string(),
                })
            }),
            MockRecognizer::new().with_response("never used"),
        );
        assert_eq!(listener.listen().await, None);
    }

    #[tokio::test]
    async fn test_listen_recognizer_failure_is_none() {
        let listener = listener(CannedCapture(heard), MockRecognizer::new().with_failure());
        assert_eq!(listener.listen().await, None);
    }

    #[tokio::test]
    async fn test_listen_unrecognized_is_none() {
        let listener = listener(CannedCapture(heard), MockRecognizer::new());
        assert_eq!(listener.listen().await, None);
    }

    #[test]
    fn test_session_capture_records_from_opened_source() {
        let config = ListenConfig {
            vad: VadConfig {
                speech_threshold: 0.02,
                silence_duration_ms: 0,
            },
            listen_timeout: Duration::from_secs(1),
            phrase_limit: Duration::from_secs(5),
            poll_interval: Duration::ZERO,
        };
        let capture = SessionCapture::new(config, || {
            Ok(MockAudioSource::new().with_blocks(vec![vec![3000i16; 1600]]))
        });

        let audio = capture.capture().unwrap().expect("speech captured");

        assert!(audio.len() >= 1600);
    }

    #[test]
    fn test_session_capture_open_failure() {
        let capture = SessionCapture::new(ListenConfig::from(&AudioConfig::default()), || {
            Err::<MockAudioSource, _>(NavError::AudioDeviceNotFound {
                device: "missing".to_string(),
            })
        });
        assert!(capture.capture().is_err());
    }
}
