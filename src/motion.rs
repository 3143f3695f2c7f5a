//! Closed-form periodic motions.
//!
//! A motion maps a phase angle in `[0, 2π)` straight to a transform; nothing is interpolated
//! and nothing carries over between ticks except the run's start time.

use std::f64::consts::TAU;
use std::time::Duration;

use crate::foundation::clock::Clock;
use crate::foundation::core::Transform;
use crate::foundation::error::{StewieError, StewieResult};
use crate::runtime::Runtime;
use crate::sink::TransformSink;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    /// Rock about Y while the platform sways along X and bobs along Z.
    ///
    /// Axis-angle + translation, arity 7.
    Wave {
        #[serde(default = "default_angle")]
        angle_deg: f64,
        #[serde(default = "default_sway")]
        sway: f64,
        #[serde(default = "default_lift")]
        lift: f64,
    },
    /// Fixed tilt whose axis turns around Z. Axis-angle, arity 4.
    Spin {
        #[serde(default = "default_angle")]
        angle_deg: f64,
    },
    /// Translate around a circle while tilting into it. Euclidean, arity 6.
    Circle {
        #[serde(default = "default_radius")]
        radius: f64,
        #[serde(default = "default_angle")]
        tilt_gain: f64,
    },
    /// Oscillate a single angle about a fixed axis. Axis-angle, arity 4.
    Sweep {
        axis: [f64; 3],
        #[serde(default = "default_angle")]
        amplitude_deg: f64,
    },
}

fn default_angle() -> f64 {
    10.0
}

fn default_sway() -> f64 {
    0.25
}

fn default_lift() -> f64 {
    0.5
}

fn default_radius() -> f64 {
    0.5
}

impl Motion {
    pub fn wave() -> Self {
        Self::Wave {
            angle_deg: default_angle(),
            sway: default_sway(),
            lift: default_lift(),
        }
    }

    pub fn spin() -> Self {
        Self::Spin {
            angle_deg: default_angle(),
        }
    }

    pub fn circle() -> Self {
        Self::Circle {
            radius: default_radius(),
            tilt_gain: default_angle(),
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Self::Wave { .. } => 7,
            Self::Spin { .. } | Self::Sweep { .. } => 4,
            Self::Circle { .. } => 6,
        }
    }

    /// Evaluate at `phase` radians.
    pub fn at(&self, phase: f64) -> Transform {
        let (s, c) = phase.sin_cos();
        match *self {
            Self::Wave {
                angle_deg,
                sway,
                lift,
            } => Transform::from([0.0, 1.0, 0.0, s * angle_deg, -s * sway, 0.0, sway + c * lift]),
            Self::Spin { angle_deg } => Transform::from([c, s, 0.0, angle_deg]),
            Self::Circle { radius, tilt_gain } => {
                let x = radius * c;
                let y = radius * s;
                Transform::from([-y * tilt_gain, -x * tilt_gain, 0.0, x, y, 0.0])
            }
            Self::Sweep {
                axis: [ax, ay, az],
                amplitude_deg,
            } => Transform::from([ax, ay, az, s * amplitude_deg]),
        }
    }
}

/// A motion played for `loops` periods of `duration_ms` (forever when `loops` is `None`).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MotionRun {
    pub motion: Motion,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loops: Option<u32>,
    /// Overrides the caller's tick period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_ms: Option<u64>,
}

impl MotionRun {
    pub fn new(motion: Motion, duration_ms: u64, loops: u32) -> Self {
        Self {
            motion,
            duration_ms,
            loops: Some(loops),
            tick_ms: None,
        }
    }

    pub fn forever(motion: Motion, duration_ms: u64) -> Self {
        Self {
            motion,
            duration_ms,
            loops: None,
            tick_ms: None,
        }
    }

    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = Some(tick_ms);
        self
    }

    pub fn validate(&self) -> StewieResult<()> {
        if self.duration_ms == 0 && self.loops.is_none() {
            return Err(StewieError::validation(
                "an endless motion needs a non-zero period",
            ));
        }
        if self.tick_ms == Some(0) {
            return Err(StewieError::validation("motion tick_ms must be > 0"));
        }
        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Total running time, or `None` for an endless run.
    pub fn total(&self) -> Option<Duration> {
        self.loops
            .map(|n| Duration::from_millis(self.duration_ms.saturating_mul(u64::from(n))))
    }

    /// Position within the current period, in `[0, 1)`.
    pub fn alpha(&self, elapsed: Duration) -> f64 {
        let period = self.period();
        if period.is_zero() {
            return 0.0;
        }
        let within = elapsed.as_nanos() % period.as_nanos();
        within as f64 / period.as_nanos() as f64
    }
}

/// Play `run`, settling with the last computed transform (or `initial` if the run was empty).
#[tracing::instrument(level = "trace", skip_all, fields(loops = ?run.loops))]
pub fn play<C: Clock, S: TransformSink>(
    rt: &mut Runtime<C, S>,
    run: &MotionRun,
    initial: &Transform,
    tick: Duration,
) -> StewieResult<Transform> {
    run.validate()?;
    let tick = run.tick_ms.map(Duration::from_millis).unwrap_or(tick);
    let total = run.total();
    let started = rt.now();
    let mut last = initial.clone();
    loop {
        rt.check_cancelled()?;
        let elapsed = rt.now().saturating_sub(started);
        if total.is_some_and(|total| elapsed >= total) {
            return Ok(last);
        }
        last = run.motion.at(TAU * run.alpha(elapsed));
        rt.emit(&last)?;
        rt.sleep(tick);
    }
}
