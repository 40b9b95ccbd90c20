//! Text-to-speech backends.

use crate::config::SpeechConfig;
use crate::defaults;
use crate::error::{NavError, Result};
use crate::exec::{CommandExecutor, expand_args};
use crate::http;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Renders text to an audio file.
#[async_trait::async_trait]
pub trait Synthesizer: Send + Sync {
    /// Write audio for `text` to `path`, replacing its contents.
    async fn synthesize(&self, text: &str, path: &Path) -> Result<()>;

    /// File extension of the audio written, without the dot.
    fn extension(&self) -> &str;
}

/// `translate_tts`-style HTTP synthesizer returning MP3.
pub struct HttpSynthesizer {
    client: reqwest::Client,
    url: String,
    language: String,
}

impl HttpSynthesizer {
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        Ok(Self {
            client: http::client(defaults::USER_AGENT, REQUEST_TIMEOUT)?,
            url: config.url.clone(),
            language: config.language.clone(),
        })
    }
}

#[async_trait::async_trait]
impl Synthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str, path: &Path) -> Result<()> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", self.language.as_str()),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| NavError::Synthesis {
                message: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(NavError::Synthesis {
                message: format!("service returned status {}", response.status()),
            });
        }

        let audio = response.bytes().await.map_err(|e| NavError::Synthesis {
            message: format!("failed to read audio: {e}"),
        })?;
        if audio.is_empty() {
            return Err(NavError::Synthesis {
                message: "service returned no audio".to_string(),
            });
        }

        tokio::fs::write(path, &audio).await?;
        Ok(())
    }

    fn extension(&self) -> &str {
        "mp3"
    }
}

/// Local synthesizer command such as `espeak-ng -w {file} {text}`.
pub struct CommandSynthesizer {
    executor: Arc<dyn CommandExecutor>,
    command: String,
    args: Vec<String>,
    language: String,
}

impl CommandSynthesizer {
    pub fn new(executor: Arc<dyn CommandExecutor>, config: &SpeechConfig) -> Self {
        Self {
            executor,
            command: config.command.clone(),
            args: config.args.clone(),
            language: config.language.clone(),
        }
    }
}

#[async_trait::async_trait]
impl Synthesizer for CommandSynthesizer {
    async fn synthesize(&self, text: &str, path: &Path) -> Result<()> {
        let file = path.to_string_lossy();
        let args = expand_args(
            &self.args,
            &[
                ("file", file.as_ref()),
                ("text", text),
                ("language", self.language.as_str()),
            ],
        );
        let executor = Arc::clone(&self.executor);
        let command = self.command.clone();

        tokio::task::spawn_blocking(move || {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            executor.execute(&command, &args)
        })
        .await
        .map_err(|e| NavError::Synthesis {
            message: format!("synthesizer task failed: {e}"),
        })?
        .map_err(|e| NavError::Synthesis {
            message: e.to_string(),
        })?;
        Ok(())
    }

    fn extension(&self) -> &str {
        "wav"
    }
}

/// Synthesizer for tests: writes fixed bytes or fails, remembering each path.
#[derive(Debug, Default)]
pub struct MockSynthesizer {
    should_fail: bool,
    paths: std::sync::Mutex<Vec<PathBuf>>,
    texts: std::sync::Mutex<Vec<String>>,
}

impl MockSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Paths handed to `synthesize`, in call order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths
            .lock()
            .map(|paths| paths.clone())
            .unwrap_or_default()
    }

    /// Texts handed to `synthesize`, in call order.
    pub fn texts(&self) -> Vec<String> {
        self.texts
            .lock()
            .map(|texts| texts.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, path: &Path) -> Result<()> {
        if let Ok(mut paths) = self.paths.lock() {
            paths.push(path.to_path_buf());
        }
        if let Ok(mut texts) = self.texts.lock() {
            texts.push(text.to_string());
        }
        if self.should_fail {
            return Err(NavError::Synthesis {
                message: "mock synthesis failure".to_string(),
            });
        }
        tokio::fs::write(path, b"ID3mock").await?;
        Ok(())
    }

    fn extension(&self) -> &str {
        "mp3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::tests::MockCommandExecutor;
    use crate::http::tests::serve_once;

    fn http_config(url: &str) -> SpeechConfig {
        SpeechConfig {
            url: url.to_string(),
            ..SpeechConfig::default()
        }
    }

    #[tokio::test]
    async fn test_http_synthesizer_writes_body() {
        let (base, request) = serve_once("200 OK", "audio/mpeg", b"ID3\x03audio".to_vec()).await;
        let synth = HttpSynthesizer::new(&http_config(&format!("{base}/translate_tts"))).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp3");

        synth.synthesize("左转", &path).await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"ID3\x03audio");
        let request = request.await.unwrap();
        assert!(request.starts_with("GET /translate_tts?"));
        assert!(request.contains("tl=zh-CN"));
        assert!(request.contains("q=%E5%B7%A6%E8%BD%AC"));
    }

    #[tokio::test]
    async fn test_http_synthesizer_error_status() {
        let (base, _request) = serve_once("429 Too Many Requests", "text/plain", "slow down").await;
        let synth = HttpSynthesizer::new(&http_config(&base)).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let result = synth.synthesize("左转", &dir.path().join("out.mp3")).await;

        assert!(matches!(result, Err(NavError::Synthesis { .. })));
    }

    #[tokio::test]
    async fn test_http_synthesizer_empty_body() {
        let (base, _request) = serve_once("200 OK", "audio/mpeg", Vec::new()).await;
        let synth = HttpSynthesizer::new(&http_config(&base)).unwrap();
        let dir = tempfile::tempdir().unwrap();

        assert!(synth.synthesize("左转", &dir.path().join("out.mp3")).await.is_err());
    }

    #[tokio::test]
    async fn test_command_synthesizer_expands_placeholders() {
        let mock = Arc::new(MockCommandExecutor::new());
        let synth = CommandSynthesizer::new(mock.clone(), &SpeechConfig::default());

        synth
            .synthesize("到达目的地", Path::new("/tmp/voicenav-x.wav"))
            .await
            .unwrap();

        let calls = mock.calls();
        assert_eq!(calls[0].0, "espeak-ng");
        assert_eq!(
            calls[0].1,
            vec!["-v", "zh-CN", "-w", "/tmp/voicenav-x.wav", "到达目的地"]
        );
        assert_eq!(synth.extension(), "wav");
    }

    #[tokio::test]
    async fn test_command_synthesizer_failure_is_synthesis_error() {
        let mock = Arc::new(MockCommandExecutor::new().with_error(NavError::ToolNotFound {
            tool: "espeak-ng".to_string(),
        }));
        let synth = CommandSynthesizer::new(mock, &SpeechConfig::default());

        match synth.synthesize("x", Path::new("/tmp/x.wav")).await {
            Err(NavError::Synthesis { message }) => assert!(message.contains("espeak-ng")),
            other => panic!("Expected Synthesis error, got {:?}", other),
        }
    }
}
