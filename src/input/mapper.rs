use crate::foundation::core::Transform;
use crate::input::event::{Button, ControllerEvent, STICK_CENTER, Stick, Trigger};

/// Largest magnitude a trigger axis reaches: half of a full 0..=255 press.
pub const TRIGGER_SCALE: f64 = 127.5;

/// `sign(v)·2^(10|v| − 10)`: flat near the centre, full scale at ±1.
pub fn expo(v: f64) -> f64 {
    if v == 0.0 {
        return 0.0;
    }
    v.signum() * (10.0 * v.abs() - 10.0).exp2()
}

/// Inverse of [`expo`]; magnitudes below `expo`'s floor map to 0.
pub fn expo_inverse(v: f64) -> f64 {
    if v == 0.0 {
        return 0.0;
    }
    v.signum() * ((v.abs().log2() + 10.0) / 10.0).max(0.0)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseCurve {
    #[default]
    Linear,
    Expo,
}

impl ResponseCurve {
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Self::Linear => v,
            Self::Expo => expo(v),
        }
    }
}

/// Latest per-axis controller values: rotation `x, y, z` and translation `t_x, t_y, t_z`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputState {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub t_x: f64,
    pub t_y: f64,
    pub t_z: f64,
}

impl InputState {
    /// Apply `curve` to every axis relative to its full scale, so a curve defined on
    /// `[-1, 1]` sees sticks and triggers alike. The result keeps each axis's own scale.
    pub fn shaped(&self, curve: ResponseCurve) -> Self {
        let stick = |v: f64| curve.apply(v.clamp(-1.0, 1.0));
        let trigger = |v: f64| TRIGGER_SCALE * curve.apply((v / TRIGGER_SCALE).clamp(-1.0, 1.0));
        Self {
            x: stick(self.x),
            y: stick(self.y),
            z: trigger(self.z),
            t_x: stick(self.t_x),
            t_y: stick(self.t_y),
            t_z: trigger(self.t_z),
        }
    }
}

/// How the accumulated state becomes a transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Normalize {
    /// Rotation and translation each rescaled to a fixed magnitude; only direction survives.
    /// Euclidean, arity 6.
    ClampDirection { max_angle: f64, max_distance: f64 },
    /// Plain per-axis scaling. Euclidean, arity 6.
    Linear {
        angle_scale: f64,
        distance_scale: f64,
    },
    /// Left stick only: tilt about the stick's direction by an angle proportional to how far
    /// it is pushed, capped at `max_angle`. Axis-angle, arity 4; `0 0 1 0` when centred.
    AxisAngle { max_angle: f64 },
}

fn rescale(v: [f64; 3], magnitude: f64) -> [f64; 3] {
    let m = v.iter().map(|c| c * c).sum::<f64>().sqrt();
    if m > 0.0 {
        v.map(|c| c * magnitude / m)
    } else {
        [0.0; 3]
    }
}

impl Normalize {
    pub fn apply(&self, s: &InputState) -> Transform {
        let euclidean = |r: [f64; 3], t: [f64; 3]| {
            Transform::from([r[0], r[1], r[2], t[0], t[1], t[2]])
        };
        match *self {
            Self::ClampDirection {
                max_angle,
                max_distance,
            } => euclidean(
                rescale([s.x, s.y, s.z], max_angle),
                rescale([s.t_x, s.t_y, s.t_z], max_distance),
            ),
            Self::Linear {
                angle_scale,
                distance_scale,
            } => euclidean(
                [s.x, s.y, s.z].map(|c| c * angle_scale),
                [s.t_x, s.t_y, s.t_z].map(|c| c * distance_scale),
            ),
            Self::AxisAngle { max_angle } => {
                let len = s.x.hypot(s.y);
                if len == 0.0 {
                    return Transform::from([0.0, 0.0, 1.0, 0.0]);
                }
                Transform::from([s.x / len, 0.0, s.y / len, len.min(1.0) * max_angle])
            }
        }
    }
}

/// What the mapper made of one event.
#[derive(Clone, Debug, PartialEq)]
pub enum Applied {
    /// State changed; a flush is pending.
    Updated,
    Connected,
    Error(String),
    /// Nothing to map.
    Ignored,
}

/// Folds controller events into [`InputState`] and debounces the output.
///
/// Every mutation marks the state dirty; [`InputMapper::flush`] yields at most one transform
/// no matter how many events landed since the previous flush.
#[derive(Clone, Debug)]
pub struct InputMapper {
    state: InputState,
    normalize: Normalize,
    curve: ResponseCurve,
    dirty: bool,
}

impl InputMapper {
    pub fn new(normalize: Normalize) -> Self {
        Self {
            state: InputState::default(),
            normalize,
            curve: ResponseCurve::Linear,
            dirty: false,
        }
    }

    pub fn with_curve(mut self, curve: ResponseCurve) -> Self {
        self.curve = curve;
        self
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn apply(&mut self, event: &ControllerEvent) -> Applied {
        let s = &mut self.state;
        match event {
            ControllerEvent::Connected => return Applied::Connected,
            ControllerEvent::Error(msg) => return Applied::Error(msg.clone()),
            ControllerEvent::Analog { trigger, value } => match trigger {
                Trigger::L1 => s.z = value / 2.0,
                Trigger::L2 => s.z = -(value / 2.0),
                Trigger::R1 => s.t_z = value / 2.0,
                Trigger::R2 => s.t_z = -(value / 2.0),
            },
            ControllerEvent::Move { stick, x, y } => {
                let nx = (x - STICK_CENTER) / STICK_CENTER;
                let ny = (y - STICK_CENTER) / STICK_CENTER;
                match stick {
                    // Pitch follows the stick's vertical, roll its horizontal.
                    Stick::Left => {
                        s.x = ny;
                        s.y = nx;
                    }
                    Stick::Right => {
                        s.t_x = nx;
                        s.t_y = ny;
                    }
                }
            }
            ControllerEvent::Button {
                button: Button::X,
                pressed: true,
            } => *s = InputState::default(),
            ControllerEvent::Button {
                button: Button::L1 | Button::L2,
                pressed: false,
            } => s.z = 0.0,
            ControllerEvent::Button {
                button: Button::R1 | Button::R2,
                pressed: false,
            } => s.t_z = 0.0,
            ControllerEvent::Button { .. }
            | ControllerEvent::Motion { .. }
            | ControllerEvent::Status { .. } => return Applied::Ignored,
        }
        self.dirty = true;
        Applied::Updated
    }

    /// Take the pending output, if any state changed since the last flush.
    pub fn flush(&mut self) -> Option<Transform> {
        if !std::mem::take(&mut self.dirty) {
            return None;
        }
        Some(self.normalize.apply(&self.state.shaped(self.curve)))
    }
}
