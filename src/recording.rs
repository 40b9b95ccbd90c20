//! Single-utterance capture.
//!
//! Waits a bounded time for speech to start, then records until the speaker
//! pauses or the phrase limit is reached.

use crate::audio::recorder::AudioSource;
use crate::audio::vad::{Clock, SystemClock, Vad, VadConfig, VadEvent};
use crate::config::AudioConfig;
use crate::error::Result;
use std::thread;
use std::time::{Duration, Instant};

/// Timing for one listening attempt.
#[derive(Debug, Clone, Copy)]
pub struct ListenConfig {
    pub vad: VadConfig,
    /// How long to wait for speech to begin.
    pub listen_timeout: Duration,
    /// Hard cap on a single utterance once speech has begun.
    pub phrase_limit: Duration,
    /// Sleep between polls when the source has nothing new.
    pub poll_interval: Duration,
}

impl From<&AudioConfig> for ListenConfig {
    fn from(config: &AudioConfig) -> Self {
        Self {
            vad: VadConfig {
                speech_threshold: config.vad_threshold,
                silence_duration_ms: config.silence_duration_ms,
            },
            listen_timeout: Duration::from_secs(config.listen_timeout_secs),
            phrase_limit: Duration::from_secs(config.phrase_limit_secs),
            poll_interval: Duration::from_millis(10),
        }
    }
}

/// Records one utterance from an [`AudioSource`].
pub struct RecordingSession<A: AudioSource, C: Clock + Clone = SystemClock> {
    audio_source: A,
    vad: Vad<C>,
    clock: C,
    config: ListenConfig,
}

impl<A: AudioSource> RecordingSession<A> {
    pub fn new(audio_source: A, config: ListenConfig) -> Self {
        Self::with_clock(audio_source, config, SystemClock)
    }
}

impl<A: AudioSource, C: Clock + Clone> RecordingSession<A, C> {
    pub fn with_clock(audio_source: A, config: ListenConfig, clock: C) -> Self {
        Self {
            audio_source,
            vad: Vad::with_clock(config.vad, clock.clone()),
            clock,
            config,
        }
    }

    /// Record until speech ends.
    ///
    /// Returns `Ok(None)` when nobody speaks before the listen timeout. The
    /// source is stopped and the detector reset on every exit path.
    pub fn record_utterance(&mut self) -> Result<Option<Vec<i16>>> {
        self.audio_source.start()?;
        let captured = self.capture();
        let stopped = self.audio_source.stop();
        self.vad.reset();

        let captured = captured?;
        stopped?;
        Ok(captured)
    }

    fn capture(&mut self) -> Result<Option<Vec<i16>>> {
        let listening_since = self.clock.now();
        let mut speech_since: Option<Instant> = None;
        let mut audio = Vec::new();

        loop {
            let now = self.clock.now();
            match speech_since {
                None if now.duration_since(listening_since) >= self.config.listen_timeout => {
                    tracing::info!(
                        timeout_secs = self.config.listen_timeout.as_secs(),
                        "no speech before listen timeout"
                    );
                    return Ok(None);
                }
                Some(start) if now.duration_since(start) >= self.config.phrase_limit => {
                    tracing::debug!(samples = audio.len(), "phrase limit reached");
                    return Ok(Some(audio));
                }
                _ => {}
            }

            let samples = self.audio_source.read_samples()?;
            if samples.is_empty() {
                if !self.config.poll_interval.is_zero() {
                    thread::sleep(self.config.poll_interval);
                }
                continue;
            }

            match self.vad.process(&samples) {
                VadEvent::SpeechStart => {
                    tracing::debug!("speech started");
                    speech_since = Some(now);
                    audio.extend_from_slice(&samples);
                }
                VadEvent::Speech | VadEvent::Silence => {
                    // Pauses inside an utterance are kept
                    if speech_since.is_some() {
                        audio.extend_from_slice(&samples);
                    }
                }
                VadEvent::SpeechEnd => {
                    tracing::debug!(samples = audio.len(), "speech ended");
                    return Ok(Some(audio));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::recorder::MockAudioSource;
    use crate::audio::vad::tests::MockClock;

    const BLOCK: usize = 1600;

    fn speech() -> Vec<i16> {
        vec![3000i16; BLOCK]
    }

    fn config() -> ListenConfig {
        ListenConfig {
            vad: VadConfig {
                speech_threshold: 0.02,
                silence_duration_ms: 300,
            },
            listen_timeout: Duration::from_secs(10),
            phrase_limit: Duration::from_secs(15),
            poll_interval: Duration::ZERO,
        }
    }

    fn session(
        source: MockAudioSource,
        config: ListenConfig,
    ) -> RecordingSession<MockAudioSource, MockClock> {
        let clock = MockClock::stepping(Duration::from_millis(100));
        RecordingSession::with_clock(source, config, clock)
    }

    #[test]
    fn test_silence_times_out_without_audio() {
        let mut session = session(MockAudioSource::new(), config());

        let result = session.record_utterance().unwrap();

        assert_eq!(result, None);
        assert!(!session.audio_source.is_started());
    }

    #[test]
    fn test_records_until_pause() {
        let source = MockAudioSource::new().with_blocks(vec![speech(), speech(), speech()]);
        let mut session = session(source, config());

        let audio = session.record_utterance().unwrap().expect("speech captured");

        assert!(audio.len() >= 3 * BLOCK);
        assert_eq!(&audio[..BLOCK], speech().as_slice());
        assert!(!session.audio_source.is_started());
    }

    #[test]
    fn test_empty_reads_are_polled() {
        let source = MockAudioSource::new().with_blocks(vec![vec![], vec![], speech()]);
        let mut session = session(source, config());

        let audio = session.record_utterance().unwrap();

        assert!(audio.is_some());
    }

    #[test]
    fn test_phrase_limit_caps_continuous_speech() {
        let source = MockAudioSource::new().with_tail(speech());
        let limited = ListenConfig {
            phrase_limit: Duration::from_secs(2),
            ..config()
        };
        let mut session = session(source, limited);

        let audio = session.record_utterance().unwrap().expect("speech captured");

        assert!(!audio.is_empty());
        // Two clock reads per block at 100 ms each
        assert!(audio.len() <= 11 * BLOCK, "captured {} samples", audio.len());
    }

    #[test]
    fn test_start_failure_is_error() {
        let mut session = session(MockAudioSource::new().with_start_failure(), config());
        assert!(session.record_utterance().is_err());
    }

    #[test]
    fn test_read_failure_stops_source() {
        let mut session = session(MockAudioSource::new().with_read_failure(), config());

        assert!(session.record_utterance().is_err());
        assert!(!session.audio_source.is_started());
    }

    #[test]
    fn test_listen_config_from_audio_settings() {
        let config = ListenConfig::from(&AudioConfig::default());
        assert_eq!(config.listen_timeout, Duration::from_secs(10));
        assert_eq!(config.phrase_limit, Duration::from_secs(15));
        assert_eq!(config.vad.silence_duration_ms, 1200);
    }
}
