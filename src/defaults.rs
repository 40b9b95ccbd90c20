//! Default configuration constants for voicenav.
//!
//! Shared between the config structs and the stages that fall back to them.

/// Serial device the GPS microcontroller enumerates as.
pub const SERIAL_PORT: &str = "/dev/ttyUSB0";

/// Serial line speed. The microcontroller firmware is fixed at 9600-8-N-1.
pub const BAUD_RATE: u32 = 9600;

/// Per-read timeout on the serial line in milliseconds.
pub const SERIAL_READ_TIMEOUT_MS: u64 = 1000;

/// Overall deadline for acquiring a fix, in seconds.
///
/// Independent of the per-read timeout: one bounds a single `read`, the
/// other bounds the whole acquisition loop.
pub const ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Pause after an empty serial read before trying again.
pub const SERIAL_RETRY_DELAY_MS: u64 = 100;

/// Audio sample rate in Hz used for capture and upload.
pub const SAMPLE_RATE: u32 = 16000;

/// RMS threshold (0.0 to 1.0) above which a block counts as speech.
pub const VAD_THRESHOLD: f32 = 0.02;

/// Silence in milliseconds that ends an utterance.
pub const SILENCE_DURATION_MS: u32 = 1200;

/// How long to wait for speech to start before giving up, in seconds.
pub const LISTEN_TIMEOUT_SECS: u64 = 10;

/// Upper bound on a single utterance once speech has started, in seconds.
pub const PHRASE_LIMIT_SECS: u64 = 15;

/// Recognition language sent to the speech-to-text service.
pub const STT_LANGUAGE: &str = "zh-CN";

/// Speech-to-text endpoint.
pub const STT_URL: &str = "http://localhost:9000/recognize";

/// Nominatim-compatible geocoder base URL.
pub const GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

/// Country qualifier appended to every spoken address before geocoding.
pub const COUNTRY_SUFFIX: &str = ", 中国";

/// User-Agent sent to the geocoder (Nominatim rejects anonymous clients).
pub const USER_AGENT: &str = concat!("voicenav/", env!("CARGO_PKG_VERSION"));

/// Local routing server base URL.
pub const ROUTING_URL: &str = "http://localhost:8989";

/// Vehicle profile requested from the routing server.
pub const ROUTING_PROFILE: &str = "car";

/// Locale the routing server writes instruction text in.
pub const ROUTING_LOCALE: &str = "en";

/// Routing request timeout in seconds.
pub const ROUTING_TIMEOUT_SECS: u64 = 15;

/// Name of the routing container checked before routing.
pub const ROUTING_CONTAINER: &str = "graphhopper";

/// Route summary line. Placeholders: `{distance_km}`, `{minutes}`.
pub const SUMMARY_TEMPLATE: &str = "总距离：{distance_km} 公里，预计时间：{minutes} 分钟";

/// One spoken step. Placeholders: `{text}`, `{distance}` (meters).
pub const STEP_TEMPLATE: &str = "{text}，{distance} 米";

/// Default instruction phrase substitutions, applied in order.
pub const PHRASES: &[(&str, &str)] = &[
    ("Continue onto", "继续沿"),
    ("Turn left onto", "左转进入"),
    ("Turn right onto", "右转进入"),
    ("Arrive at destination", "到达目的地"),
];

/// Text-to-speech endpoint (translate_tts-compatible).
pub const TTS_URL: &str = "https://translate.google.com/translate_tts";

/// Language requested from the synthesizer.
pub const TTS_LANGUAGE: &str = "zh-CN";

/// Player used for synthesized audio.
pub const PLAYER: &str = "mpg123";

/// Player arguments. Placeholders: `{device}`, `{file}`.
pub const PLAYER_ARGS: &[&str] = &["-q", "-a", "{device}", "{file}"];

/// ALSA output device passed to the player.
pub const OUTPUT_DEVICE: &str = "default";

/// Local synthesizer command used by the `command` backend.
pub const SYNTH_COMMAND: &str = "espeak-ng";

/// Local synthesizer arguments. Placeholders: `{file}`, `{text}`, `{language}`.
pub const SYNTH_ARGS: &[&str] = &["-v", "{language}", "-w", "{file}", "{text}"];
