//! Spoken output: synthesize to a scoped temp file, then play it.

pub mod player;
pub mod speaker;
pub mod synth;

pub use player::{CommandPlayer, Player};
pub use speaker::{Announcer, Speaker};
pub use synth::{CommandSynthesizer, HttpSynthesizer, Synthesizer};
