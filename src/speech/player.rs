//! Audio playback through an external player.

use crate::config::SpeechConfig;
use crate::error::{NavError, Result};
use crate::exec::{CommandExecutor, expand_args};
use std::path::Path;
use std::sync::Arc;

/// Plays an audio file to completion. Blocking.
pub trait Player: Send + Sync {
    fn play(&self, path: &Path) -> Result<()>;
}

/// Runs a player command such as `mpg123 -q -a {device} {file}`.
pub struct CommandPlayer {
    executor: Arc<dyn CommandExecutor>,
    player: String,
    args: Vec<String>,
    device: String,
}

impl CommandPlayer {
    pub fn new(executor: Arc<dyn CommandExecutor>, config: &SpeechConfig) -> Self {
        Self {
            executor,
            player: config.player.clone(),
            args: config.player_args.clone(),
            device: config.output_device.clone(),
        }
    }
}

impl Player for CommandPlayer {
    fn play(&self, path: &Path) -> Result<()> {
        let file = path.to_string_lossy();
        let args = expand_args(
            &self.args,
            &[("device", self.device.as_str()), ("file", file.as_ref())],
        );
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        tracing::debug!(player = %self.player, ?args, "playing");
        self.executor
            .execute(&self.player, &args)
            .map(|_| ())
            .map_err(|e| NavError::Playback {
                message: e.to_string(),
            })
    }
}
