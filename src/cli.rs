//! Command-line interface for voicenav
//!
//! Provides argument parsing using clap derive macros.

use crate::config::Config;
use crate::geo::Coordinate;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Spoken turn-by-turn navigation from a serial GPS fix
#[derive(Parser, Debug)]
#[command(
    name = "voicenav",
    version = crate::version_string(),
    about = "Spoken turn-by-turn navigation from a serial GPS fix"
)]
pub struct Cli {
    /// Subcommand to execute (default: navigate once)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Serial device of the GPS receiver (e.g., /dev/ttyUSB0)
    #[arg(long, global = true, value_name = "PATH")]
    pub port: Option<String>,

    /// Audio input device
    #[arg(long, global = true, value_name = "DEVICE")]
    pub device: Option<String>,

    /// Audio output device passed to the player (e.g., hw:1,0)
    #[arg(long, global = true, value_name = "DEVICE")]
    pub output_device: Option<String>,

    /// Fix acquisition deadline. Examples: 30s, 2m, 45
    #[arg(long, global = true, value_name = "DURATION", value_parser = parse_secs)]
    pub acquire_timeout: Option<u64>,
}

/// Parse a duration string into whole seconds.
///
/// Bare numbers are seconds; anything else goes through `humantime`.
fn parse_secs(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_secs())
        .map_err(|e| e.to_string())
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Acquire one fix from the serial line and print it
    Fix,

    /// Capture one utterance and print the transcript
    Listen,

    /// Resolve an address to coordinates
    Geocode {
        /// Free-text address (the country qualifier is appended)
        address: String,
    },

    /// Request a route between two points and print it
    Route {
        /// Start as lat,lng
        #[arg(allow_hyphen_values = true)]
        from: Coordinate,
        /// Destination as lat,lng
        #[arg(allow_hyphen_values = true)]
        to: Coordinate,
        /// Also speak the route
        #[arg(long)]
        speak: bool,
    },

    /// Speak text through the configured synthesizer and player
    Say {
        /// Text to speak
        text: String,
    },

    /// List available audio input devices
    Devices,

    /// List available serial ports
    Ports,

    /// Check external dependencies
    Check,

    /// Inspect configuration
    Config {
        /// Action to perform
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration inspection actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value by key (e.g., routing.url)
    Get {
        /// Dotted key path (e.g., serial.port, routing.profile)
        key: String,
    },
    /// Print the effective configuration (optionally one section)
    List {
        /// Config section to show (e.g., serial, routing)
        section: Option<String>,
    },
    /// Print the default configuration
    Dump,
}

impl Cli {
    /// Log level from `-q` / `-v` flags.
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::ERROR;
        }
        match self.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Apply per-run overrides on top of file and environment settings.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(port) = &self.port {
            config.serial.port = port.clone();
        }
        if let Some(device) = &self.device {
            config.audio.device = Some(device.clone());
        }
        if let Some(device) = &self.output_device {
            config.speech.output_device = device.clone();
        }
        if let Some(secs) = self.acquire_timeout {
            config.serial.acquire_timeout_secs = secs;
        }
    }
}
