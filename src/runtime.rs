use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::foundation::clock::Clock;
use crate::foundation::core::Transform;
use crate::foundation::error::{StewieError, StewieResult};
use crate::sink::TransformSink;

/// 50 Hz, the cadence most programs tick at.
pub const DEFAULT_TICK: Duration = Duration::from_millis(20);

/// Cooperative stop flag, checked once per tick by every loop.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Single-threaded execution context: one clock, one sink, one stop flag.
///
/// Interpolations, motion runs and the sequencer all borrow the runtime mutably for their
/// whole duration, so exactly one driver owns the output at a time.
#[derive(Debug)]
pub struct Runtime<C, S> {
    clock: C,
    sink: S,
    cancel: CancelToken,
}

impl<C: Clock, S: TransformSink> Runtime<C, S> {
    pub fn new(clock: C, sink: S) -> Self {
        Self {
            clock,
            sink,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn sleep(&mut self, d: Duration) {
        self.clock.sleep(d);
    }

    pub fn emit(&mut self, transform: &Transform) -> StewieResult<()> {
        self.sink.emit(transform)
    }

    pub fn emit_line(&mut self, line: &str) -> StewieResult<()> {
        self.sink.emit_line(line)
    }

    pub(crate) fn check_cancelled(&self) -> StewieResult<()> {
        if self.cancel.is_cancelled() {
            return Err(StewieError::Cancelled);
        }
        Ok(())
    }

    /// Emit `transform` once and settle with it.
    pub fn set(&mut self, transform: Transform) -> StewieResult<Transform> {
        crate::ease::set(self, transform)
    }

    /// Interpolate `start -> stop` over `duration` at the default 50 Hz.
    pub fn ease(
        &mut self,
        start: Transform,
        stop: Transform,
        duration: Duration,
    ) -> StewieResult<Transform> {
        let segment = crate::ease::Segment::new(start, stop, duration)?;
        crate::ease::interpolate(self, &segment, DEFAULT_TICK)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_parts(self) -> (C, S) {
        (self.clock, self.sink)
    }
}
