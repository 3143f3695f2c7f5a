use std::time::Duration;

use crate::ease::{self, Segment};
use crate::foundation::clock::Clock;
use crate::foundation::core::Transform;
use crate::foundation::error::{StewieError, StewieResult};
use crate::motion::{self, MotionRun};
use crate::pacing::{self, PacedRun};
use crate::runtime::{DEFAULT_TICK, Runtime};
use crate::sink::TransformSink;

/// One step of a sequence. Each step settles with the transform the next one starts from.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Emit a fixed transform once.
    Set(Transform),
    /// Re-emit the carried transform once.
    Emit,
    /// Interpolate from the carried transform to `to`.
    Ease { to: Transform, duration_ms: u64 },
    /// Play a closed-form motion.
    Motion(MotionRun),
    /// Play a decaying-interval run.
    Paced(PacedRun),
    /// Replace the carried transform without emitting anything.
    Assume(Transform),
    /// Progress note for the diagnostic log.
    Announce(String),
}

impl Step {
    pub fn ease(to: impl Into<Transform>, duration_ms: u64) -> Self {
        Self::Ease {
            to: to.into(),
            duration_ms,
        }
    }

    /// `true` when running this step is guaranteed to sleep at least once.
    ///
    /// Zero-length eases and motions with no loops or a zero period emit (or not) and return
    /// immediately.
    pub fn is_timed(&self) -> bool {
        match self {
            Self::Ease { duration_ms, .. } => *duration_ms > 0,
            Self::Motion(run) => run.duration_ms > 0 && run.loops != Some(0),
            Self::Paced(_) => true,
            Self::Set(_) | Self::Emit | Self::Assume(_) | Self::Announce(_) => false,
        }
    }

    pub fn validate(&self) -> StewieResult<()> {
        match self {
            Self::Motion(run) => run.validate(),
            Self::Paced(run) if run.cycle_ms == 0 => {
                Err(StewieError::validation("paced cycle_ms must be > 0"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Position {
    Intro(usize),
    Body(usize),
    Done,
}

/// What [`Sequencer::advance`] just did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// A step ran; more follow.
    Stepped,
    /// The last body step ran and the sequence wrapped to its first step.
    Wrapped,
    /// The sequence is finished.
    Done,
}

/// Explicit step machine: an index into a step list plus the carried transform.
///
/// `intro` runs once; `steps` run once, or forever when looping.
#[derive(Clone, Debug)]
pub struct Sequencer {
    intro: Vec<Step>,
    steps: Vec<Step>,
    looping: bool,
    tick: Duration,
    state: Transform,
    position: Position,
    cycles: u64,
}

impl Sequencer {
    pub fn new(initial: Transform, steps: Vec<Step>) -> Self {
        Self {
            intro: Vec::new(),
            steps,
            looping: false,
            tick: DEFAULT_TICK,
            state: initial,
            position: Position::Intro(0),
            cycles: 0,
        }
    }

    pub fn with_intro(mut self, intro: Vec<Step>) -> Self {
        self.intro = intro;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// The carried transform.
    pub fn state(&self) -> &Transform {
        &self.state
    }

    /// Completed passes over the body.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn is_done(&self) -> bool {
        self.position == Position::Done
    }

    pub fn validate(&self) -> StewieResult<()> {
        if self.steps.is_empty() {
            return Err(StewieError::validation("sequence has no steps"));
        }
        if self.tick.is_zero() {
            return Err(StewieError::validation("sequence tick must be > 0"));
        }
        if self.looping && !self.steps.iter().any(Step::is_timed) {
            return Err(StewieError::validation(
                "a looping sequence needs at least one timed step",
            ));
        }
        self.intro
            .iter()
            .chain(&self.steps)
            .try_for_each(Step::validate)
    }

    /// Run the step under the cursor and move the cursor on.
    pub fn advance<C: Clock, S: TransformSink>(
        &mut self,
        rt: &mut Runtime<C, S>,
    ) -> StewieResult<Advance> {
        let position = match self.position {
            Position::Intro(i) if i >= self.intro.len() => Position::Body(0),
            other => other,
        };
        let step = match position {
            Position::Intro(i) => &self.intro[i],
            Position::Body(i) => self
                .steps
                .get(i)
                .ok_or_else(|| StewieError::validation("sequence has no steps"))?,
            Position::Done => return Ok(Advance::Done),
        };

        self.state = run_step(rt, step, &self.state, self.tick)?;

        let (next, advance) = match position {
            Position::Intro(i) => (Position::Intro(i + 1), Advance::Stepped),
            Position::Body(i) if i + 1 < self.steps.len() => {
                (Position::Body(i + 1), Advance::Stepped)
            }
            Position::Body(_) => {
                self.cycles += 1;
                if self.looping {
                    (Position::Body(0), Advance::Wrapped)
                } else {
                    (Position::Done, Advance::Done)
                }
            }
            Position::Done => (Position::Done, Advance::Done),
        };
        self.position = next;
        Ok(advance)
    }

    /// Run to completion and settle with the carried transform. Looping sequences only
    /// return on error or cancellation.
    #[tracing::instrument(level = "debug", skip_all, fields(looping = self.looping))]
    pub fn run<C: Clock, S: TransformSink>(
        &mut self,
        rt: &mut Runtime<C, S>,
    ) -> StewieResult<Transform> {
        self.validate()?;
        loop {
            match self.advance(rt)? {
                Advance::Done => return Ok(self.state.clone()),
                Advance::Wrapped => tracing::trace!(cycles = self.cycles, "sequence wrapped"),
                Advance::Stepped => {}
            }
        }
    }
}

fn run_step<C: Clock, S: TransformSink>(
    rt: &mut Runtime<C, S>,
    step: &Step,
    state: &Transform,
    tick: Duration,
) -> StewieResult<Transform> {
    match step {
        Step::Set(t) => ease::set(rt, t.clone()),
        Step::Emit => ease::set(rt, state.clone()),
        Step::Ease { to, duration_ms } => {
            // Re-base across representations (axis-angle <-> euclidean) before blending.
            let start = state.conform_to(to);
            let segment = Segment::new(start, to.clone(), Duration::from_millis(*duration_ms))?;
            ease::interpolate(rt, &segment, tick)
        }
        Step::Motion(run) => motion::play(rt, run, state, tick),
        Step::Paced(run) => pacing::play(rt, run),
        Step::Assume(t) => Ok(t.clone()),
        Step::Announce(text) => {
            tracing::info!(state = %state, "{text}");
            Ok(state.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::clock::ManualClock;
    use crate::motion::Motion;
    use crate::runtime::CancelToken;
    use crate::sink::InMemorySink;

    fn runtime() -> Runtime<ManualClock, InMemorySink> {
        Runtime::new(ManualClock::new(), InMemorySink::new())
    }

    #[test]
    fn chained_segments_start_where_the_previous_settled() {
        let mut rt = runtime();
        let mut seq = Sequencer::new(
            Transform::from([0.0]),
            vec![Step::ease([1.0], 40), Step::ease([3.0], 40)],
        );
        let out = seq.run(&mut rt).unwrap();
        assert_eq!(out, Transform::from([3.0]));
        assert_eq!(
            rt.sink().lines(),
            ["0", "0.5", "1", "1", "2", "3"],
            "second segment opens exactly on the first one's stop"
        );
        assert!(seq.is_done());
    }

    #[test]
    fn assume_rebases_silently() {
        let mut rt = runtime();
        let mut seq = Sequencer::new(
            Transform::from([1.0, 0.0, 0.0, 10.0]),
            vec![
                Step::ease([0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0),
                Step::Assume(Transform::zeros(6)),
            ],
        );
        let out = seq.run(&mut rt).unwrap();
        assert_eq!(out, Transform::zeros(6));
        assert_eq!(rt.sink().lines(), ["0 1 0 0 0 0 0"]);
    }

    #[test]
    fn ease_across_arity_pads_from_target() {
        let mut rt = runtime();
        let mut seq = Sequencer::new(
            Transform::from([1.0, 0.0, 0.0, 10.0]),
            vec![Step::ease([0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0], 100)],
        );
        seq.run(&mut rt).unwrap();
        assert_eq!(rt.sink().lines()[0], "1 0 0 10 0 0 0");
        assert!(rt.sink().transforms().iter().all(|t| t.arity() == 7));
    }

    #[test]
    fn looping_wraps_back_to_the_first_step() {
        let mut rt = runtime();
        let mut seq = Sequencer::new(
            Transform::zeros(1),
            vec![Step::Emit, Step::ease([1.0], 20), Step::Assume(Transform::zeros(1))],
        )
        .looping(true);
        let mut wraps = 0;
        while wraps < 3 {
            if seq.advance(&mut rt).unwrap() == Advance::Wrapped {
                wraps += 1;
            }
        }
        assert_eq!(seq.cycles(), 3);
        assert_eq!(rt.sink().lines(), ["0", "0", "1", "0", "0", "1", "0", "0", "1"]);
    }

    #[test]
    fn intro_runs_once() {
        let mut rt = runtime();
        let mut seq = Sequencer::new(
            Transform::zeros(1),
            vec![Step::Motion(MotionRun::new(
                Motion::Sweep {
                    axis: [0.0, 0.0, 1.0],
                    amplitude_deg: 10.0,
                },
                40,
                1,
            ))],
        )
        .with_intro(vec![Step::Set(Transform::from([7.0]))])
        .looping(true);
        for _ in 0..4 {
            seq.advance(&mut rt).unwrap();
        }
        let sevens = rt.sink().lines().iter().filter(|l| *l == "7").count();
        assert_eq!(sevens, 1);
    }

    #[test]
    fn looping_without_timed_steps_is_rejected() {
        let seq = Sequencer::new(Transform::zeros(1), vec![Step::Emit]).looping(true);
        assert!(seq.validate().is_err());
        let empty = Sequencer::new(Transform::zeros(1), vec![]);
        assert!(empty.validate().is_err());
    }

    #[test]
    fn instant_steps_do_not_count_as_timed() {
        let idle_motion = Step::Motion(MotionRun::new(Motion::wave(), 1000, 0));
        let zero_period = Step::Motion(MotionRun::new(Motion::wave(), 0, 3));
        let instant_ease = Step::ease([1.0], 0);
        for step in [&idle_motion, &zero_period, &instant_ease] {
            assert!(!step.is_timed(), "{step:?}");
            let seq = Sequencer::new(Transform::zeros(1), vec![step.clone()]).looping(true);
            assert!(seq.validate().is_err(), "{step:?}");
        }

        assert!(Step::ease([1.0], 20).is_timed());
        assert!(Step::Motion(MotionRun::forever(Motion::spin(), 1000)).is_timed());
        assert!(
            Step::Paced(PacedRun::new(crate::pacing::PacedShape::Rock { tilt: 1.0 })).is_timed()
        );
    }

    #[test]
    fn cancellation_stops_a_looping_run() {
        let token = CancelToken::new();
        let mut rt = runtime().with_cancel(token.clone());
        let mut seq =
            Sequencer::new(Transform::zeros(1), vec![Step::ease([1.0], 20)]).looping(true);
        token.cancel();
        assert!(matches!(seq.run(&mut rt), Err(StewieError::Cancelled)));
    }
}
