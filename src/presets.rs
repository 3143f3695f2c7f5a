//! Built-in motion programs for the Stewart platform.

use crate::foundation::core::Transform;
use crate::motion::{Motion, MotionRun};
use crate::pacing::{PacedRun, PacedShape};
use crate::program::Program;
use crate::sequence::Step;

/// Period of one box lap, one wave and one spin in the `motions` tour.
const TOUR_PERIOD_MS: u64 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plane {
    Xy,
    Xz,
    Yz,
}

impl Plane {
    /// The four corners of a unit box centred on the origin, in drawing order.
    pub fn corners(self) -> [Transform; 4] {
        let corner = |a: f64, b: f64| match self {
            Plane::Xy => Transform::from([0.0, 0.0, 0.0, a, b, 0.0]),
            Plane::Xz => Transform::from([0.0, 0.0, 0.0, a, 0.0, b]),
            Plane::Yz => Transform::from([0.0, 0.0, 0.0, 0.0, a, b]),
        };
        [
            corner(-0.5, 0.5),
            corner(0.5, 0.5),
            corner(0.5, -0.5),
            corner(-0.5, -0.5),
        ]
    }

    fn label(self) -> &'static str {
        match self {
            Plane::Xy => "X-Y",
            Plane::Xz => "X-Z",
            Plane::Yz => "Y-Z",
        }
    }
}

/// One lap around `plane`, starting from wherever the platform is.
pub fn box_lap(plane: Plane, lap_ms: u64) -> Vec<Step> {
    let mut steps = vec![Step::Emit];
    steps.extend(
        plane
            .corners()
            .into_iter()
            .map(|to| Step::Ease { to, duration_ms: lap_ms / 4 }),
    );
    steps
}

/// The full tour: two laps per box plane, a wave, a spin, and back to neutral.
pub fn motions() -> Program {
    let mut steps = vec![Step::Announce("Initializing".to_owned()), Step::Emit];
    for plane in [Plane::Xy, Plane::Xz, Plane::Yz] {
        steps.push(Step::Announce(format!("Doing BOX {}", plane.label())));
        steps.extend(box_lap(plane, TOUR_PERIOD_MS));
        steps.extend(box_lap(plane, TOUR_PERIOD_MS));
    }
    steps.extend([
        Step::Announce("Resetting for WAVE".to_owned()),
        Step::ease([0.0, 0.0, 0.0, 0.0, 0.0, 0.5], TOUR_PERIOD_MS / 4),
        Step::Announce("Doing WAVE".to_owned()),
        Step::Motion(MotionRun::new(Motion::wave(), TOUR_PERIOD_MS, 3)),
        Step::Announce("Doing SPIN".to_owned()),
        Step::Motion(MotionRun::new(Motion::spin(), TOUR_PERIOD_MS, 3)),
        Step::Announce("Resetting for BOX moves".to_owned()),
        Step::ease([0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0], TOUR_PERIOD_MS / 4),
        Step::Assume(Transform::zeros(6)),
    ]);
    Program {
        looping: true,
        ..Program::new(Transform::zeros(6), steps)
    }
}

/// Fast X-Y box, 200 ms per edge, starting from the lower-left corner.
pub fn box_xy() -> Program {
    let mut steps = vec![Step::Set(Transform::from([0.0, 0.0, 0.0, -0.5, -0.5, 0.0]))];
    steps.extend(
        Plane::Xy
            .corners()
            .into_iter()
            .map(|to| Step::Ease { to, duration_ms: 200 }),
    );
    Program {
        looping: true,
        ..Program::new(Transform::zeros(6), steps)
    }
}

/// Neutral once, then waves forever.
pub fn wave() -> Program {
    Program {
        looping: true,
        intro: vec![Step::Set(Transform::zeros(6))],
        ..Program::new(
            Transform::zeros(6),
            vec![
                Step::Announce("Doing WAVE".to_owned()),
                Step::Motion(MotionRun::new(Motion::wave(), TOUR_PERIOD_MS, 3)),
            ],
        )
    }
}

/// Tilt into a 5 s circle, forever, at 100 Hz.
pub fn circle() -> Program {
    Program::new(
        Transform::zeros(6),
        vec![Step::Motion(
            MotionRun::forever(Motion::circle(), 5000).with_tick_ms(10),
        )],
    )
}

/// Four tilted corners, one second each, eased at 100 Hz.
pub fn sweep() -> Program {
    let corners = [
        [0.0, 0.0, 20.0, -0.5, 0.0, 0.5],
        [-10.0, 0.0, 0.0, 0.5, 0.0, 0.5],
        [0.0, 0.0, -20.0, 0.5, 0.0, -0.5],
        [0.0, -10.0, 0.0, -0.5, 0.0, -0.5],
    ];
    let mut steps = vec![Step::Emit];
    steps.extend(corners.into_iter().map(|c| Step::ease(c, 1000)));
    Program {
        looping: true,
        tick_ms: 10,
        ..Program::new(Transform::zeros(6), steps)
    }
}

/// Rock about Z with a shrinking tick interval, then stop on neutral.
pub fn rock(tilt: f64) -> Program {
    paced(PacedShape::Rock { tilt })
}

/// Spin the tilt axis while the angle ramps up, then stop on neutral.
pub fn spin(tilt: f64) -> Program {
    paced(PacedShape::TiltSpin { tilt })
}

fn paced(shape: PacedShape) -> Program {
    Program::new(
        PacedRun::neutral(),
        vec![Step::Paced(PacedRun::new(shape))],
    )
}
