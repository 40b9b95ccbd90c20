//! Speech output stage.
//!
//! Every call renders into its own `NamedTempFile`. The file is removed when
//! the handle drops at the end of the call, whether synthesis or playback
//! failed or not.

use crate::error::{NavError, Result};
use crate::speech::player::Player;
use crate::speech::synth::Synthesizer;
use std::sync::Arc;

/// Says things to the driver. Never fails.
#[async_trait::async_trait]
pub trait Announcer: Send + Sync {
    async fn announce(&self, text: &str);
}

pub struct Speaker {
    synthesizer: Arc<dyn Synthesizer>,
    player: Arc<dyn Player>,
}

impl Speaker {
    pub fn new(synthesizer: Arc<dyn Synthesizer>, player: Arc<dyn Player>) -> Self {
        Self {
            synthesizer,
            player,
        }
    }

    /// Synthesize and play `text`, reporting failures.
    pub async fn speak(&self, text: &str) -> Result<()> {
        let audio = tempfile::Builder::new()
            .prefix("voicenav-")
            .suffix(&format!(".{}", self.synthesizer.extension()))
            .tempfile()?;
        let path = audio.path().to_path_buf();

        self.synthesizer.synthesize(text, &path).await?;

        let player = Arc::clone(&self.player);
        tokio::task::spawn_blocking(move || player.play(&path))
            .await
            .map_err(|e| NavError::Playback {
                message: format!("player task failed: {e}"),
            })??;

        drop(audio);
        Ok(())
    }
}

#[async_trait::async_trait]
impl Announcer for Speaker {
    async fn announce(&self, text: &str) {
        tracing::info!(%text, "speaking");
        if let Err(e) = self.speak(text).await {
            tracing::warn!("speech output failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::synth::MockSynthesizer;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// Player that checks the file exists while playing.
    #[derive(Default)]
    struct CheckingPlayer {
        should_fail: bool,
        played: Mutex<Vec<(PathBuf, bool)>>,
    }

    impl Player for CheckingPlayer {
        fn play(&self, path: &Path) -> Result<()> {
            self.played
                .lock()
                .unwrap()
                .push((path.to_path_buf(), path.exists()));
            if self.should_fail {
                return Err(NavError::Playback {
                    message: "no such device".to_string(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_file_exists_during_playback_and_is_removed_after() {
        let synth = Arc::new(MockSynthesizer::new());
        let player = Arc::new(CheckingPlayer::default());
        let speaker = Speaker::new(synth.clone(), player.clone());

        speaker.speak("请说出目的地").await.unwrap();

        let played = player.played.lock().unwrap().clone();
        assert_eq!(played.len(), 1);
        let (path, existed) = &played[0];
        assert!(existed, "audio must exist while playing");
        assert!(!path.exists(), "audio must be removed after playback");
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("mp3"));
        assert_eq!(synth.texts(), vec!["请说出目的地"]);
    }

    #[tokio::test]
    async fn test_file_removed_after_synthesis_failure() {
        let synth = Arc::new(MockSynthesizer::new().with_failure());
        let player = Arc::new(CheckingPlayer::default());
        let speaker = Speaker::new(synth.clone(), player.clone());

        assert!(speaker.speak("左转").await.is_err());

        let paths = synth.paths();
        assert_eq!(paths.len(), 1);
        assert!(!paths[0].exists());
        assert!(player.played.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_removed_after_playback_failure() {
        let synth = Arc::new(MockSynthesizer::new());
        let player = Arc::new(CheckingPlayer {
            should_fail: true,
            ..CheckingPlayer::default()
        });
        let speaker = Speaker::new(synth.clone(), player);

        assert!(speaker.speak("左转").await.is_err());
        assert!(!synth.paths()[0].exists());
    }

    #[tokio::test]
    async fn test_announce_swallows_errors() {
        let synth = Arc::new(MockSynthesizer::new().with_failure());
        let speaker = Speaker::new(synth.clone(), Arc::new(CheckingPlayer::default()));

        speaker.announce("到达目的地").await;

        assert!(!synth.paths()[0].exists());
    }
}
