//! voicenav - Spoken turn-by-turn navigation
//!
//! Reads a position fix from a serial GPS receiver, asks for a destination by
//! voice, routes through a self-hosted GraphHopper and speaks the directions.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
#[cfg(feature = "cli")]
pub mod diagnostics;
pub mod error;
pub mod exec;
pub mod geo;
pub mod geocode;
pub mod gnss;
pub mod http;
pub mod navigator;
#[cfg(feature = "cli")]
pub mod output;
pub mod recording;
pub mod routing;
pub mod speech;
pub mod stt;
pub mod sys;

// Composition root
pub mod app;

// Stage traits (position → voice in → geocode → route → voice out)
pub use audio::recorder::AudioSource;
pub use exec::{CommandExecutor, SystemCommandExecutor};
pub use geocode::Geocoder;
pub use gnss::FrameSource;
pub use routing::{BackendProbe, RouteService};
pub use speech::{Announcer, Player, Synthesizer};
pub use stt::{Listener, Recognizer, UtteranceCapture};

// Values
pub use geo::Coordinate;
pub use gnss::{Fix, parse_frame};
pub use routing::{RouteResponse, RouteSummary, translate};

// Orchestration
pub use app::RunOutcome;
pub use navigator::{NavOutcome, Navigator};

// Error handling
pub use error::{NavError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.0.1+abc1234"` when git hash is available, `"0.0.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
