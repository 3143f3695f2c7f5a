//! Stewie generates transform streams for a Stewart platform.
//!
//! Every program writes one whitespace-separated line per tick to a [`TransformSink`]; a
//! downstream solver turns those lines into actuator lengths. The building blocks are:
//!
//! - timed linear interpolation between two transforms ([`ease`])
//! - parametric motions sampled once per tick ([`motion`], [`pacing`])
//! - a [`Sequencer`] that chains steps and optionally loops, loaded from JSON as a [`Program`]
//! - a debounced controller mapper that turns stick positions into transforms ([`input`])
//! - timestamped recording and paced replay of any line stream ([`replay`])
#![forbid(unsafe_code)]

mod foundation;

pub mod ease;
pub mod input;
pub mod motion;
pub mod pacing;
pub mod presets;
pub mod program;
pub mod replay;
pub mod runtime;
pub mod sequence;
pub mod sink;

pub use crate::foundation::clock::{Clock, ManualClock, SystemClock};
pub use crate::foundation::core::{Component, Transform};
pub use crate::foundation::error::{StewieError, StewieResult};

pub use crate::ease::{Lerp, Segment};
pub use crate::motion::{Motion, MotionRun};
pub use crate::pacing::{PacedRun, PacedShape};
pub use crate::program::Program;
pub use crate::replay::{PlaybackStats, Recorder};
pub use crate::runtime::{CancelToken, DEFAULT_TICK, Runtime};
pub use crate::sequence::{Advance, Sequencer, Step};
pub use crate::sink::{InMemorySink, LineSink, TeeSink, TransformSink, round2};
