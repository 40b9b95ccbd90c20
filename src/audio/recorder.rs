use crate::error::{NavError, Result};
use std::collections::VecDeque;

/// Trait for audio source devices.
///
/// Allows swapping the microphone for a scripted source in tests.
pub trait AudioSource: Send {
    /// Start capturing audio.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio.
    fn stop(&mut self) -> Result<()>;

    /// Drain the samples captured since the last call (16 kHz mono i16).
    ///
    /// An empty vector means nothing new has arrived yet.
    fn read_samples(&mut self) -> Result<Vec<i16>>;
}

/// Mock audio source for testing.
///
/// Replays scripted blocks in order, then returns `tail` forever.
#[derive(Debug, Clone)]
pub struct MockAudioSource {
    is_started: bool,
    blocks: VecDeque<Vec<i16>>,
    tail: Vec<i16>,
    should_fail_start: bool,
    should_fail_read: bool,
}

impl MockAudioSource {
    pub fn new() -> Self {
        Self {
            is_started: false,
            blocks: VecDeque::new(),
            tail: vec![0i16; 1600],
            should_fail_start: false,
            should_fail_read: false,
        }
    }

    /// Blocks returned by successive reads before falling back to the tail.
    pub fn with_blocks(mut self, blocks: Vec<Vec<i16>>) -> Self {
        self.blocks = blocks.into();
        self
    }

    /// Block returned once the scripted blocks are exhausted.
    pub fn with_tail(mut self, tail: Vec<i16>) -> Self {
        self.tail = tail;
        self
    }

    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockAudioSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            return Err(NavError::AudioCapture {
                message: "mock audio error".to_string(),
            });
        }
        self.is_started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.should_fail_read {
            return Err(NavError::AudioCapture {
                message: "mock audio error".to_string(),
            });
        }
        Ok(self
            .blocks
            .pop_front()
            .unwrap_or_else(|| self.tail.clone()))
    }
}
