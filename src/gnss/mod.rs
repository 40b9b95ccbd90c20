//! Position fixes from the GPS microcontroller's serial line.

pub mod acquire;
pub mod frame;
pub mod serial;

pub use acquire::{AcquireConfig, AcquireOutcome, acquire_fix};
pub use frame::{Fix, parse_frame};
pub use serial::{FrameSource, LineReader, open_serial};
