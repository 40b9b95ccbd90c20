use crate::defaults;
use crate::error::{NavError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub audio: AudioConfig,
    pub stt: SttConfig,
    pub geocoder: GeocoderConfig,
    pub routing: RoutingConfig,
    pub speech: SpeechConfig,
    pub prompts: PromptsConfig,
}

/// Serial line to the GPS microcontroller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    pub acquire_timeout_secs: u64,
    pub retry_delay_ms: u64,
}

/// Microphone capture and voice activity detection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub device: Option<String>,
    pub vad_threshold: f32,
    pub silence_duration_ms: u32,
    pub listen_timeout_secs: u64,
    pub phrase_limit_secs: u64,
}

/// Speech-to-text service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub url: String,
    pub language: String,
    pub api_key: Option<String>,
}

/// Address resolution service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeocoderConfig {
    pub url: String,
    pub country_suffix: String,
    pub user_agent: String,
}

/// Routing server and instruction localization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoutingConfig {
    pub url: String,
    pub profile: String,
    pub locale: String,
    /// Empty for self-hosted servers.
    pub api_key: String,
    pub timeout_secs: u64,
    /// Container that must be running before routing. Empty disables the check.
    pub container: String,
    pub summary_template: String,
    pub step_template: String,
    pub phrases: Vec<PhraseRule>,
}

/// One literal instruction phrase and its localized replacement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhraseRule {
    pub from: String,
    pub to: String,
}

/// Speech synthesis backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SynthBackend {
    Http,
    Command,
}

/// Text-to-speech and playback
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeechConfig {
    pub backend: SynthBackend,
    pub url: String,
    pub language: String,
    pub command: String,
    pub args: Vec<String>,
    pub player: String,
    pub player_args: Vec<String>,
    pub output_device: String,
}

/// Sentences spoken to the driver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PromptsConfig {
    pub no_fix: String,
    pub ask_destination: String,
    pub not_heard: String,
    pub unresolved: String,
    pub backend_missing: String,
    pub no_route: String,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: defaults::SERIAL_PORT.to_string(),
            baud_rate: defaults::BAUD_RATE,
            read_timeout_ms: defaults::SERIAL_READ_TIMEOUT_MS,
            acquire_timeout_secs: defaults::ACQUIRE_TIMEOUT_SECS,
            retry_delay_ms: defaults::SERIAL_RETRY_DELAY_MS,
        }
    }
}

impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            vad_threshold: defaults::VAD_THRESHOLD,
            silence_duration_ms: defaults::SILENCE_DURATION_MS,
            listen_timeout_secs: defaults::LISTEN_TIMEOUT_SECS,
            phrase_limit_secs: defaults::PHRASE_LIMIT_SECS,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            url: defaults::STT_URL.to_string(),
            language: defaults::STT_LANGUAGE.to_string(),
            api_key: None,
        }
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: defaults::GEOCODER_URL.to_string(),
            country_suffix: defaults::COUNTRY_SUFFIX.to_string(),
            user_agent: defaults::USER_AGENT.to_string(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            url: defaults::ROUTING_URL.to_string(),
            profile: defaults::ROUTING_PROFILE.to_string(),
            locale: defaults::ROUTING_LOCALE.to_string(),
            api_key: String::new(),
            timeout_secs: defaults::ROUTING_TIMEOUT_SECS,
            container: defaults::ROUTING_CONTAINER.to_string(),
            summary_template: defaults::SUMMARY_TEMPLATE.to_string(),
            step_template: defaults::STEP_TEMPLATE.to_string(),
            phrases: defaults::PHRASES
                .iter()
                .map(|(from, to)| PhraseRule {
                    from: from.to_string(),
                    to: to.to_string(),
                })
                .collect(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            backend: SynthBackend::Http,
            url: defaults::TTS_URL.to_string(),
            language: defaults::TTS_LANGUAGE.to_string(),
            command: defaults::SYNTH_COMMAND.to_string(),
            args: defaults::SYNTH_ARGS.iter().map(|s| s.to_string()).collect(),
            player: defaults::PLAYER.to_string(),
            player_args: defaults::PLAYER_ARGS.iter().map(|s| s.to_string()).collect(),
            output_device: defaults::OUTPUT_DEVICE.to_string(),
        }
    }
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            no_fix: "未能获取当前位置".to_string(),
            ask_destination: "请说出目的地".to_string(),
            not_heard: "没有听清目的地".to_string(),
            unresolved: "无法找到该地址".to_string(),
            backend_missing: "路线服务未运行".to_string(),
            no_route: "未找到路线".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                NavError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                NavError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist.
    ///
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(NavError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Reject values the stages cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.serial.baud_rate == 0 {
            return Err(NavError::ConfigInvalidValue {
                key: "serial.baud_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.serial.read_timeout_ms == 0 {
            return Err(NavError::ConfigInvalidValue {
                key: "serial.read_timeout_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.routing.timeout_secs == 0 {
            return Err(NavError::ConfigInvalidValue {
                key: "routing.timeout_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.serial.acquire_timeout_secs == 0 {
            return Err(NavError::ConfigInvalidValue {
                key: "serial.acquire_timeout_secs".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.audio.vad_threshold) {
            return Err(NavError::ConfigInvalidValue {
                key: "audio.vad_threshold".to_string(),
                message: format!("{} is outside 0.0..=1.0", self.audio.vad_threshold),
            });
        }
        if let Some(rule) = self.routing.phrases.iter().find(|r| r.from.is_empty()) {
            return Err(NavError::ConfigInvalidValue {
                key: "routing.phrases".to_string(),
                message: format!("empty phrase mapped to '{}'", rule.to),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - VOICENAV_SERIAL_PORT → serial.port
    /// - VOICENAV_AUDIO_DEVICE → audio.device
    /// - VOICENAV_OUTPUT_DEVICE → speech.output_device
    /// - VOICENAV_ROUTING_URL → routing.url
    /// - VOICENAV_ROUTING_KEY → routing.api_key
    /// - VOICENAV_STT_KEY → stt.api_key
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(port) = non_empty_env("VOICENAV_SERIAL_PORT") {
            self.serial.port = port;
        }
        if let Some(device) = non_empty_env("VOICENAV_AUDIO_DEVICE") {
            self.audio.device = Some(device);
        }
        if let Some(device) = non_empty_env("VOICENAV_OUTPUT_DEVICE") {
            self.speech.output_device = device;
        }
        if let Some(url) = non_empty_env("VOICENAV_ROUTING_URL") {
            self.routing.url = url;
        }
        if let Some(key) = non_empty_env("VOICENAV_ROUTING_KEY") {
            self.routing.api_key = key;
        }
        if let Some(key) = non_empty_env("VOICENAV_STT_KEY") {
            self.stt.api_key = Some(key);
        }
        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/voicenav/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("voicenav")
            .join("config.toml")
    }

    /// Render the configuration (or one section of it) as TOML.
    pub fn to_toml(&self, section: Option<&str>) -> Result<String> {
        let value = toml::Value::try_from(self)
            .map_err(|e| NavError::Other(format!("Failed to serialize configuration: {e}")))?;
        let value = match section {
            Some(key) => lookup(&value, key)?.clone(),
            None => value,
        };
        match value {
            toml::Value::Table(table) => toml::to_string_pretty(&table)
                .map_err(|e| NavError::Other(format!("Failed to serialize configuration: {e}"))),
            other => Ok(other.to_string()),
        }
    }

    /// Look up a single value by dotted key (e.g. `serial.port`).
    pub fn get_value_by_path(&self, key: &str) -> Result<String> {
        let value = toml::Value::try_from(self)
            .map_err(|e| NavError::Other(format!("Failed to serialize configuration: {e}")))?;
        match lookup(&value, key)? {
            toml::Value::String(s) => Ok(s.clone()),
            other => Ok(other.to_string()),
        }
    }
}

fn lookup<'a>(value: &'a toml::Value, key: &str) -> Result<&'a toml::Value> {
    key.split('.').try_fold(value, |current, part| {
        current.get(part).ok_or_else(|| NavError::ConfigInvalidValue {
            key: key.to_string(),
            message: "no such key".to_string(),
        })
    })
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Serializes tests that touch the process environment
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: only called with ENV_LOCK held.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_voicenav_env() {
        for key in [
            "VOICENAV_SERIAL_PORT",
            "VOICENAV_AUDIO_DEVICE",
            "VOICENAV_OUTPUT_DEVICE",
            "VOICENAV_ROUTING_URL",
            "VOICENAV_ROUTING_KEY",
            "VOICENAV_STT_KEY",
        ] {
            remove_env(key);
        }
    }

    fn write_config(contents: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.serial.read_timeout(), Duration::from_secs(1));
        assert_eq!(config.serial.acquire_timeout(), Duration::from_secs(30));
        assert_eq!(config.serial.retry_delay(), Duration::from_millis(100));

        assert_eq!(config.audio.device, None);
        assert_eq!(config.audio.listen_timeout_secs, 10);

        assert_eq!(config.routing.timeout_secs, 15);
        assert_eq!(config.routing.api_key, "");
        assert_eq!(config.routing.phrases.len(), 4);
        assert_eq!(config.speech.backend, SynthBackend::Http);
    }

    #[test]
    fn test_load_from_toml_file() {
        let file = write_config(
            r#"
            [serial]
            port = "/dev/ttyACM0"
            acquire_timeout_secs = 45

            [routing]
            url = "http://gh.local:8989"
            container = ""

            [[routing.phrases]]
            from = "Keep left"
            to = "靠左"

            [speech]
            backend = "command"
            output_device = "hw:1,0"
        "#,
        );

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.serial.port, "/dev/ttyACM0");
        assert_eq!(config.serial.acquire_timeout_secs, 45);
        assert_eq!(config.serial.read_timeout_ms, 1000);
        assert_eq!(config.routing.url, "http://gh.local:8989");
        assert_eq!(config.routing.container, "");
        assert_eq!(
            config.routing.phrases,
            vec![PhraseRule {
                from: "Keep left".to_string(),
                to: "靠左".to_string(),
            }]
        );
        assert_eq!(config.speech.backend, SynthBackend::Command);
        assert_eq!(config.speech.output_device, "hw:1,0");
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let file = write_config("[stt]\nlanguage = \"en-US\"\n");

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.stt.language, "en-US");
        assert_eq!(config.serial, SerialConfig::default());
        assert_eq!(config.routing, RoutingConfig::default());
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let file = write_config("[serial\nport = \"broken\n");
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_invalid_value_rejected() {
        let file = write_config("[serial]\nbaud_rate = 0\n");
        match Config::load(file.path()) {
            Err(NavError::ConfigInvalidValue { key, .. }) => assert_eq!(key, "serial.baud_rate"),
            other => panic!("Expected ConfigInvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        for (contents, expected) in [
            ("[serial]\nread_timeout_ms = 0\n", "serial.read_timeout_ms"),
            ("[routing]\ntimeout_secs = 0\n", "routing.timeout_secs"),
            ("[serial]\nacquire_timeout_secs = 0\n", "serial.acquire_timeout_secs"),
        ] {
            let file = write_config(contents);
            match Config::load(file.path()) {
                Err(NavError::ConfigInvalidValue { key, .. }) => assert_eq!(key, expected),
                other => panic!("Expected ConfigInvalidValue for {expected}, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_empty_phrase_rejected() {
        let file = write_config("[[routing.phrases]]\nfrom = \"\"\nto = \"x\"\n");
        assert!(matches!(
            Config::load(file.path()),
            Err(NavError::ConfigInvalidValue { .. })
        ));
    }

    #[test]
    fn test_load_or_default_returns_default_for_missing_file() {
        let path = Path::new("/nonexistent/voicenav/config.toml");
        let config = Config::load_or_default(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_propagates_invalid_toml() {
        let file = write_config("not = valid = toml");
        assert!(Config::load_or_default(file.path()).is_err());
    }

    #[test]
    fn test_default_path_ends_with_app_dir() {
        let path = Config::default_path();
        assert!(path.ends_with("voicenav/config.toml"));
    }

    #[test]
    fn test_env_overrides() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_voicenav_env();

        set_env("VOICENAV_SERIAL_PORT", "/dev/ttyS1");
        set_env("VOICENAV_ROUTING_KEY", "secret");
        set_env("VOICENAV_OUTPUT_DEVICE", "");
        let config = Config::default().with_env_overrides();

        assert_eq!(config.serial.port, "/dev/ttyS1");
        assert_eq!(config.routing.api_key, "secret");
        // Empty string does not override
        assert_eq!(config.speech.output_device, "default");

        clear_voicenav_env();
    }

    #[test]
    fn test_get_value_by_path() {
        let config = Config::default();
        assert_eq!(config.get_value_by_path("serial.port").unwrap(), "/dev/ttyUSB0");
        assert_eq!(config.get_value_by_path("serial.baud_rate").unwrap(), "9600");
        assert!(config.get_value_by_path("serial.nope").is_err());
    }

    #[test]
    fn test_to_toml_round_trips_section() {
        let config = Config::default();
        let rendered = config.to_toml(Some("serial")).unwrap();
        assert!(rendered.contains("port = \"/dev/ttyUSB0\""));
        assert!(!rendered.contains("[routing]"));

        let full = config.to_toml(None).unwrap();
        let parsed: Config = toml::from_str(&full).unwrap();
        assert_eq!(parsed, config);
    }
}
