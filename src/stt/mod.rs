//! Speech-to-text: utterance capture plus a remote recognizer.

pub mod listener;
pub mod recognizer;
pub mod remote;

pub use listener::{Listener, UtteranceCapture, VoiceListener};
pub use recognizer::{MockRecognizer, Recognizer};
pub use remote::{HttpRecognizer, parse_transcript};
