//! Bounded fix acquisition loop.
//!
//! Reads frames until one parses, the deadline passes, or the run is
//! cancelled. The frame source is owned by the loop, so the serial handle is
//! released on every exit path.

use crate::audio::vad::{Clock, SystemClock};
use crate::config::SerialConfig;
use crate::gnss::frame::{Fix, parse_frame};
use crate::gnss::serial::FrameSource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Timing for one acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquireConfig {
    /// Overall deadline for the whole loop.
    pub deadline: Duration,
    /// Pause after an empty read or a read error.
    pub retry_delay: Duration,
}

impl From<&SerialConfig> for AcquireConfig {
    fn from(config: &SerialConfig) -> Self {
        Self {
            deadline: config.acquire_timeout(),
            retry_delay: config.retry_delay(),
        }
    }
}

/// How an acquisition attempt ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AcquireOutcome {
    Fix(Fix),
    /// No valid frame before the deadline.
    TimedOut,
    /// The cancel flag was raised.
    Interrupted,
}

impl AcquireOutcome {
    pub fn fix(&self) -> Option<Fix> {
        match self {
            AcquireOutcome::Fix(fix) => Some(*fix),
            _ => None,
        }
    }
}

/// Acquire a fix using the system clock.
pub fn acquire_fix<S: FrameSource>(
    source: S,
    config: AcquireConfig,
    cancel: &AtomicBool,
) -> AcquireOutcome {
    acquire_fix_with_clock(source, config, &SystemClock, cancel)
}

/// Acquire a fix, measuring the deadline against `clock`.
pub fn acquire_fix_with_clock<S: FrameSource, C: Clock>(
    mut source: S,
    config: AcquireConfig,
    clock: &C,
    cancel: &AtomicBool,
) -> AcquireOutcome {
    let started = clock.now();
    let mut frames = 0u32;

    loop {
        if cancel.load(Ordering::Relaxed) {
            tracing::info!("fix acquisition interrupted");
            return AcquireOutcome::Interrupted;
        }
        if clock.now().duration_since(started) >= config.deadline {
            tracing::warn!(
                frames,
                deadline_secs = config.deadline.as_secs(),
                "no valid fix before deadline"
            );
            return AcquireOutcome::TimedOut;
        }

        match source.read_frame() {
            Ok(frame) if frame.is_empty() => pause(config.retry_delay),
            Ok(frame) => {
                frames += 1;
                tracing::trace!(raw = ?frame, "serial frame");
                match parse_frame(&frame) {
                    Some(fix) => {
                        tracing::info!(%fix, frames, "fix acquired");
                        return AcquireOutcome::Fix(fix);
                    }
                    None => {
                        tracing::debug!(
                            frame = %String::from_utf8_lossy(&frame).trim(),
                            "frame carries no fix"
                        );
                    }
                }
            }
            Err(e) => {
                tracing::warn!("serial read error: {e}");
                pause(config.retry_delay);
            }
        }
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
