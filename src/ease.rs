use std::time::Duration;

use crate::foundation::clock::Clock;
use crate::foundation::core::{Component, Transform};
use crate::foundation::error::StewieResult;
use crate::runtime::Runtime;
use crate::sink::TransformSink;

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Component {
    // Labels have no in-between; the destination slot wins.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        match (a, b) {
            (Component::Num(a), Component::Num(b)) => Component::Num(f64::lerp(a, b, t)),
            _ => b.clone(),
        }
    }
}

impl Lerp for Transform {
    // Callers guarantee equal arity; see `Segment::new`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a.iter()
            .zip(b.iter())
            .map(|(a, b)| Component::lerp(a, b, t))
            .collect()
    }
}

/// One `start -> stop` interpolation over `duration`.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    start: Transform,
    stop: Transform,
    duration: Duration,
}

impl Segment {
    /// Build a segment; `start` and `stop` must have the same arity.
    pub fn new(start: Transform, stop: Transform, duration: Duration) -> StewieResult<Self> {
        start.ensure_same_arity(&stop)?;
        Ok(Self {
            start,
            stop,
            duration,
        })
    }

    pub fn start(&self) -> &Transform {
        &self.start
    }

    pub fn stop(&self) -> &Transform {
        &self.stop
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Progress fraction. A zero duration is complete immediately.
    pub fn alpha(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        elapsed.as_secs_f64() / self.duration.as_secs_f64()
    }

    /// Value at `elapsed`: exactly `stop` once the segment is complete.
    pub fn sample(&self, elapsed: Duration) -> Transform {
        let alpha = self.alpha(elapsed);
        if alpha >= 1.0 {
            return self.stop.clone();
        }
        Transform::lerp(&self.start, &self.stop, alpha)
    }
}

/// Emit `transform` once and settle with it.
pub fn set<C: Clock, S: TransformSink>(
    rt: &mut Runtime<C, S>,
    transform: Transform,
) -> StewieResult<Transform> {
    rt.check_cancelled()?;
    rt.emit(&transform)?;
    Ok(transform)
}

/// Drive `segment` to completion, one emission per `tick`.
///
/// The final emission is always `segment.stop()` verbatim.
#[tracing::instrument(level = "trace", skip_all, fields(duration_ms = segment.duration.as_millis() as u64))]
pub fn interpolate<C: Clock, S: TransformSink>(
    rt: &mut Runtime<C, S>,
    segment: &Segment,
    tick: Duration,
) -> StewieResult<Transform> {
    let started = rt.now();
    loop {
        rt.check_cancelled()?;
        let elapsed = rt.now().saturating_sub(started);
        let value = segment.sample(elapsed);
        rt.emit(&value)?;
        if segment.alpha(elapsed) >= 1.0 {
            return Ok(value);
        }
        rt.sleep(tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::clock::ManualClock;
    use crate::foundation::error::StewieError;
    use crate::runtime::CancelToken;
    use crate::sink::InMemorySink;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn sample_is_linear_then_exact() {
        let seg = Segment::new(
            Transform::from([0.0, 10.0]),
            Transform::from([1.0, -10.0]),
            ms(1000),
        )
        .unwrap();
        assert_eq!(seg.sample(ms(0)), Transform::from([0.0, 10.0]));
        assert_eq!(seg.sample(ms(250)), Transform::from([0.25, 5.0]));
        assert_eq!(seg.sample(ms(1000)), Transform::from([1.0, -10.0]));
        assert_eq!(seg.sample(ms(5000)), Transform::from([1.0, -10.0]));
    }

    #[test]
    fn label_slots_take_the_destination() {
        let seg = Segment::new(
            Transform::from(vec!["a".into(), 0.0.into()]),
            Transform::from(vec!["b".into(), 2.0.into()]),
            ms(100),
        )
        .unwrap();
        assert_eq!(
            seg.sample(ms(50)),
            Transform::from(vec!["b".into(), 1.0.into()])
        );
    }

    #[test]
    fn rejects_mismatched_arity() {
        let err = Segment::new(Transform::zeros(4), Transform::zeros(6), ms(10)).unwrap_err();
        assert!(matches!(err, StewieError::Arity { .. }));
    }

    #[test]
    fn interpolate_ticks_at_fifty_hz_and_settles_on_stop() {
        let mut rt = Runtime::new(ManualClock::new(), InMemorySink::new());
        let seg = Segment::new(Transform::from([0.0]), Transform::from([1.0]), ms(100)).unwrap();
        let out = interpolate(&mut rt, &seg, ms(20)).unwrap();

        assert_eq!(out, Transform::from([1.0]));
        assert_eq!(rt.sink().lines(), ["0", "0.2", "0.4", "0.6", "0.8", "1"]);
        assert_eq!(rt.clock().now(), ms(100));
    }

    #[test]
    fn zero_duration_emits_stop_immediately() {
        let mut rt = Runtime::new(ManualClock::new(), InMemorySink::new());
        let seg = Segment::new(Transform::from([3.0]), Transform::from([7.0]), ms(0)).unwrap();
        interpolate(&mut rt, &seg, ms(20)).unwrap();
        assert_eq!(rt.sink().lines(), ["7"]);
        assert_eq!(rt.clock().sleeps(), 0);
    }

    #[test]
    fn cancelled_runtime_stops_before_emitting() {
        let token = CancelToken::new();
        let mut rt =
            Runtime::new(ManualClock::new(), InMemorySink::new()).with_cancel(token.clone());
        token.cancel();
        let seg = Segment::new(Transform::from([0.0]), Transform::from([1.0]), ms(100)).unwrap();
        assert!(matches!(
            interpolate(&mut rt, &seg, ms(20)),
            Err(StewieError::Cancelled)
        ));
        assert!(rt.sink().lines().is_empty());
    }
}
