//! Error types for voicenav.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Serial line errors
    #[error("Failed to open serial port {port}: {message}")]
    SerialOpen { port: String, message: String },

    #[error("Serial read failed: {message}")]
    SerialRead { message: String },

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Remote service errors
    #[error("Speech recognition failed: {message}")]
    Recognition { message: String },

    #[error("Geocoding failed: {message}")]
    Geocoding { message: String },

    #[error("Routing request failed: {message}")]
    Routing { message: String },

    #[error("Speech synthesis failed: {message}")]
    Synthesis { message: String },

    #[error("Audio playback failed: {message}")]
    Playback { message: String },

    // External command errors
    #[error("Tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("Command failed: {message}")]
    CommandFailed { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, NavError>;
