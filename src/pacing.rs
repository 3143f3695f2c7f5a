//! Decaying-interval runs.
//!
//! Instead of a loop count, these runs shorten their tick interval by one millisecond after
//! every completed cycle and stop after the cycle that ran at interval zero, finishing on the
//! neutral pose.

use std::f64::consts::TAU;
use std::time::Duration;

use crate::foundation::clock::Clock;
use crate::foundation::core::Transform;
use crate::foundation::error::StewieResult;
use crate::runtime::Runtime;
use crate::sink::TransformSink;

/// Shortest real sleep; a zero interval still yields for a millisecond.
const MIN_SLEEP: Duration = Duration::from_millis(1);

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacedShape {
    /// Rock back and forth about Z: `[0, 0, 1, tilt·sin θ]`.
    Rock { tilt: f64 },
    /// Axis sweeps around Y while the angle ramps up quadratically over the whole run.
    TiltSpin { tilt: f64 },
}

impl PacedShape {
    /// `alpha` is the position in the current cycle, `ramp` the fraction of the ramp span.
    pub fn at(&self, alpha: f64, ramp: f64) -> Transform {
        let theta = TAU * alpha;
        match *self {
            Self::Rock { tilt } => Transform::from([0.0, 0.0, 1.0, tilt * theta.sin()]),
            Self::TiltSpin { tilt } => {
                Transform::from([theta.sin(), 0.0, theta.cos(), tilt * ramp * ramp])
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PacedRun {
    pub shape: PacedShape,
    #[serde(default = "default_cycle_ms")]
    pub cycle_ms: u64,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_cycle_ms() -> u64 {
    1000
}

fn default_interval_ms() -> u64 {
    5
}

impl PacedRun {
    pub fn new(shape: PacedShape) -> Self {
        Self {
            shape,
            cycle_ms: default_cycle_ms(),
            interval_ms: default_interval_ms(),
        }
    }

    /// Pose emitted after the last cycle.
    pub fn neutral() -> Transform {
        Transform::from([0.0, 0.0, 1.0, 0.0])
    }

    /// Span the tilt-spin ramp is measured against: `cycle_ms × interval_ms`.
    ///
    /// The run itself lasts one cycle longer, so the ramp overshoots 1 in the last cycle.
    pub fn ramp_span(&self) -> Duration {
        Duration::from_millis(self.cycle_ms.saturating_mul(self.interval_ms))
    }

    fn cycle_alpha(&self, elapsed: Duration) -> f64 {
        if self.cycle_ms == 0 {
            return 1.0;
        }
        (elapsed.as_secs_f64() / Duration::from_millis(self.cycle_ms).as_secs_f64()).min(1.0)
    }
}

#[tracing::instrument(level = "trace", skip_all)]
pub fn play<C: Clock, S: TransformSink>(
    rt: &mut Runtime<C, S>,
    run: &PacedRun,
) -> StewieResult<Transform> {
    let begin = rt.now();
    let span = run.ramp_span().as_secs_f64();
    let mut cycle_start = begin;
    let mut interval = run.interval_ms;
    loop {
        rt.check_cancelled()?;
        let now = rt.now();
        let alpha = run.cycle_alpha(now.saturating_sub(cycle_start));
        let ramp = if span > 0.0 {
            now.saturating_sub(begin).as_secs_f64() / span
        } else {
            1.0
        };
        rt.emit(&run.shape.at(alpha, ramp))?;

        if alpha >= 1.0 {
            if interval == 0 {
                let neutral = PacedRun::neutral();
                rt.emit(&neutral)?;
                return Ok(neutral);
            }
            interval -= 1;
            cycle_start = now;
            tracing::debug!(interval_ms = interval, "cycle complete");
        }
        rt.sleep(Duration::from_millis(interval).max(MIN_SLEEP));
    }
}
