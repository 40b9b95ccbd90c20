//! Microphone capture, voice activity detection and WAV encoding.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod recorder;
pub mod vad;
pub mod wav;
